//! Comment thread state for the detail view.
//!
//! The thread is fetched unauthenticated; mutations go through the
//! bearer endpoints and patch the local list only after the server
//! confirms. Transport failures on mutations are logged upstream and
//! leave the list untouched.

use crate::model::Comment;

#[derive(Debug, Default)]
pub struct CommentThread {
  pub comments: Vec<Comment>,
  pub loaded: bool,
}

impl CommentThread {
  pub fn set(&mut self, comments: Vec<Comment>) {
    self.comments = comments;
    self.loaded = true;
  }

  /// New comments go to the top of the thread.
  pub fn prepend(&mut self, comment: Comment) {
    self.comments.insert(0, comment);
  }

  /// Replace an edited comment in place by id.
  pub fn replace_by_id(&mut self, comment: Comment) {
    if let Some(slot) = self.comments.iter_mut().find(|c| c.id == comment.id) {
      *slot = comment;
    }
  }

  pub fn remove_by_id(&mut self, id: &str) {
    self.comments.retain(|c| c.id != id);
  }

  pub fn len(&self) -> usize {
    self.comments.len()
  }

  pub fn is_empty(&self) -> bool {
    self.comments.is_empty()
  }
}
