//! Channel video manager: the owner's CRUD surface over their slice of
//! the catalog.
//!
//! The channel's list is never fetched separately — it is the catalog
//! filtered by owner — and every mutation patches the shared snapshot
//! only after the server confirms it. The upload/edit modal holds one
//! draft at a time; whether a submit is a create or an update is carried
//! by the draft's variant, not by sniffing for an id field.

use crate::forms::{Field, Form};
use crate::model::{Channel, VideoItem, VideoUpload};

/// Editable fields of a video draft. Everything except the description
/// is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
  pub title: String,
  pub description: String,
  pub thumbnail_url: String,
  pub video_url: String,
  pub category: String,
}

/// A video draft: either a brand-new upload or an edit of an existing
/// record identified by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
  New(DraftFields),
  Editing { id: String, fields: DraftFields },
}

impl Draft {
  pub fn fields(&self) -> &DraftFields {
    match self {
      Draft::New(fields) => fields,
      Draft::Editing { fields, .. } => fields,
    }
  }

  pub fn editing_id(&self) -> Option<&str> {
    match self {
      Draft::New(_) => None,
      Draft::Editing { id, .. } => Some(id),
    }
  }

  /// First missing required field, if any.
  pub fn validate(&self) -> Result<(), String> {
    let fields = self.fields();
    for (value, name) in [
      (&fields.title, "title"),
      (&fields.thumbnail_url, "thumbnail URL"),
      (&fields.video_url, "video URL"),
      (&fields.category, "category"),
    ] {
      if value.trim().is_empty() {
        return Err(format!("A {} is required", name));
      }
    }
    Ok(())
  }

  /// Request body for create/update, with the channel identity
  /// denormalized onto the record.
  pub fn to_upload(&self, channel: &Channel) -> VideoUpload {
    let fields = self.fields();
    VideoUpload {
      title: fields.title.clone(),
      description: fields.description.clone(),
      category: fields.category.clone(),
      video_url: fields.video_url.clone(),
      thumbnail_url: fields.thumbnail_url.clone(),
      channel_id: channel.owner_id.clone(),
      channel_name: channel.channel_name.clone(),
      channel_avatar_url: channel.profile_image_url.clone(),
    }
  }
}

/// The upload/edit modal. Only one draft may be open at a time; opening
/// is only possible from `Closed`, and both cancel and a successful
/// submit return to `Closed` with the draft discarded.
#[derive(Debug, Default)]
pub enum ModalState {
  #[default]
  Closed,
  Open {
    /// `None` = create, `Some(id)` = edit of that record.
    editing_id: Option<String>,
    form: Form,
  },
}

const FIELD_TITLE: usize = 0;
const FIELD_DESCRIPTION: usize = 1;
const FIELD_THUMBNAIL: usize = 2;
const FIELD_VIDEO_URL: usize = 3;
const FIELD_CATEGORY: usize = 4;

impl ModalState {
  pub fn is_open(&self) -> bool {
    matches!(self, ModalState::Open { .. })
  }

  /// Open with an empty draft (add video).
  pub fn open_new(&mut self) {
    if self.is_open() {
      return;
    }
    *self = ModalState::Open {
      editing_id: None,
      form: Form::new(vec![
        Field::new("Title"),
        Field::new("Description"),
        Field::new("Thumbnail URL"),
        Field::new("Video URL"),
        Field::new("Category"),
      ]),
    };
  }

  /// Open prefilled from an existing record (edit video).
  pub fn open_edit(&mut self, item: &VideoItem) {
    if self.is_open() {
      return;
    }
    *self = ModalState::Open {
      editing_id: Some(item.id.clone()),
      form: Form::new(vec![
        Field::with_value("Title", &item.title),
        Field::with_value("Description", &item.description),
        Field::with_value("Thumbnail URL", &item.thumbnail_url),
        Field::with_value("Video URL", &item.video_url),
        Field::with_value("Category", &item.category),
      ]),
    };
  }

  /// Cancel or successful submit: back to `Closed`, draft discarded.
  pub fn close(&mut self) {
    *self = ModalState::Closed;
  }

  pub fn form_mut(&mut self) -> Option<&mut Form> {
    match self {
      ModalState::Open { form, .. } => Some(form),
      ModalState::Closed => None,
    }
  }

  /// Snapshot the form into the tagged draft for submission.
  pub fn draft(&self) -> Option<Draft> {
    let ModalState::Open { editing_id, form } = self else { return None };
    let fields = DraftFields {
      title: form.value(FIELD_TITLE).trim().to_string(),
      description: form.value(FIELD_DESCRIPTION).trim().to_string(),
      thumbnail_url: form.value(FIELD_THUMBNAIL).trim().to_string(),
      video_url: form.value(FIELD_VIDEO_URL).trim().to_string(),
      category: form.value(FIELD_CATEGORY).trim().to_string(),
    };
    Some(match editing_id {
      Some(id) => Draft::Editing { id: id.clone(), fields },
      None => Draft::New(fields),
    })
  }
}

/// Indices of the channel owner's videos within the catalog snapshot,
/// in catalog order.
pub fn channel_video_indices(items: &[VideoItem], owner_id: &str) -> Vec<usize> {
  items.iter().enumerate().filter(|(_, v)| v.channel_id == owner_id).map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn video(id: &str, owner: &str) -> VideoItem {
    serde_json::from_str(&format!(
      r#"{{"_id":"{}","title":"Title","category":"Music","videoUrl":"https://cdn/v.mp4",
          "thumbnailUrl":"https://cdn/t.jpg","channelId":"{}"}}"#,
      id, owner
    ))
    .unwrap()
  }

  fn channel() -> Channel {
    Channel {
      owner_id: "u1".into(),
      channel_name: "My Channel".into(),
      about: "".into(),
      profile_image_url: "https://cdn/me.png".into(),
      banner_image_url: "".into(),
    }
  }

  // --- channel_video_indices ---

  #[test]
  fn channel_list_is_the_owners_subset_in_catalog_order() {
    let items = vec![video("v1", "u1"), video("v2", "u2"), video("v3", "u1")];
    assert_eq!(channel_video_indices(&items, "u1"), vec![0, 2]);
    assert!(channel_video_indices(&items, "u3").is_empty());
  }

  // --- Draft validation ---

  fn complete_fields() -> DraftFields {
    DraftFields {
      title: "T".into(),
      description: String::new(),
      thumbnail_url: "https://cdn/t.jpg".into(),
      video_url: "https://cdn/v.mp4".into(),
      category: "Music".into(),
    }
  }

  #[test]
  fn description_is_the_only_optional_field() {
    assert!(Draft::New(complete_fields()).validate().is_ok());

    let mut missing_title = complete_fields();
    missing_title.title = "  ".into();
    assert!(Draft::New(missing_title).validate().is_err());

    let mut missing_url = complete_fields();
    missing_url.video_url.clear();
    assert!(Draft::New(missing_url).validate().is_err());
  }

  #[test]
  fn upload_denormalizes_channel_identity() {
    let draft = Draft::New(complete_fields());
    let upload = draft.to_upload(&channel());
    assert_eq!(upload.channel_id, "u1");
    assert_eq!(upload.channel_name, "My Channel");
    assert_eq!(upload.channel_avatar_url, "https://cdn/me.png");
  }

  // --- ModalState ---

  #[test]
  fn open_new_produces_an_empty_new_draft() {
    let mut modal = ModalState::default();
    modal.open_new();
    let draft = modal.draft().unwrap();
    assert_eq!(draft, Draft::New(DraftFields::default()));
    assert!(draft.editing_id().is_none());
  }

  #[test]
  fn open_edit_prefills_and_tags_the_id() {
    let mut modal = ModalState::default();
    modal.open_edit(&video("v7", "u1"));
    let draft = modal.draft().unwrap();
    assert_eq!(draft.editing_id(), Some("v7"));
    assert_eq!(draft.fields().title, "Title");
    assert_eq!(draft.fields().category, "Music");
  }

  #[test]
  fn only_one_draft_at_a_time() {
    let mut modal = ModalState::default();
    modal.open_edit(&video("v7", "u1"));
    modal.open_new(); // ignored while a draft is open
    assert_eq!(modal.draft().unwrap().editing_id(), Some("v7"));
  }

  #[test]
  fn close_discards_the_draft() {
    let mut modal = ModalState::default();
    modal.open_new();
    modal.form_mut().unwrap().insert_char('x');
    modal.close();
    assert!(!modal.is_open());
    // Reopening starts from an empty draft again.
    modal.open_new();
    assert_eq!(modal.draft().unwrap().fields().title, "");
  }
}
