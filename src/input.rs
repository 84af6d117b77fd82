use anyhow::Result;
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, DetailFocus, View};
use crate::forms::char_to_byte_index;
use crate::interact::ToggleKind;

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  // A blocking alert swallows everything except its dismissal.
  if app.alert.is_some() {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
      app.alert = None;
    }
    return Ok(());
  }

  match app.view {
    View::Browse if app.search_focused => handle_search_key(app, key),
    View::Browse => handle_browse_key(app, key),
    View::Detail => handle_detail_key(app, key),
    View::Channel => handle_channel_key(app, key),
    View::Login | View::Register | View::CreateChannel => handle_auth_key(app, key),
  }
  Ok(())
}

// --- Browse ---

fn handle_browse_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Enter => {
      if let Some(id) = app.selected_video().map(|v| v.id.clone()) {
        app.open_detail(id);
      }
    }
    KeyCode::Char('/') => {
      app.search_focused = true;
    }
    KeyCode::Tab => app.next_category(),
    KeyCode::BackTab => app.prev_category(),
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.visible.len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| (i + 1) % count);
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      let count = app.visible.len();
      if count > 0 {
        let i =
          app.list_state.selected().map_or(0, |i| if i == 0 { count.saturating_sub(1) } else { i.saturating_sub(1) });
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Char('c') => app.open_my_channel(),
    KeyCode::Char('o') => {
      if app.session.is_some() {
        app.logout();
      } else {
        app.open_login();
      }
    }
    KeyCode::Char('r') => app.trigger_catalog(),
    KeyCode::Esc => {
      if !app.search.is_empty() {
        app.search.clear();
        app.search_cursor = 0;
        app.search_scroll = 0;
        app.recompute_visible();
      } else {
        app.should_quit = true;
      }
    }
    _ => {}
  }
}

/// Search input editing. The filter is live: every edit recomputes the
/// visible set immediately.
fn handle_search_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.search, app.search_cursor);
      app.search.insert(byte_idx, c);
      app.search_cursor += 1;
      app.recompute_visible();
    }
    KeyCode::Backspace => {
      if app.search_cursor > 0 {
        app.search_cursor -= 1;
        let byte_idx = char_to_byte_index(&app.search, app.search_cursor);
        app.search.remove(byte_idx);
        app.recompute_visible();
      }
    }
    KeyCode::Delete => {
      if app.search_cursor < app.search.chars().count() {
        let byte_idx = char_to_byte_index(&app.search, app.search_cursor);
        app.search.remove(byte_idx);
        app.recompute_visible();
      }
    }
    KeyCode::Left => {
      app.search_cursor = app.search_cursor.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.search_cursor < app.search.chars().count() {
        app.search_cursor += 1;
      }
    }
    KeyCode::Home => {
      app.search_cursor = 0;
    }
    KeyCode::End => {
      app.search_cursor = app.search.chars().count();
    }
    KeyCode::Enter => {
      app.search_focused = false;
    }
    KeyCode::Esc => {
      app.search.clear();
      app.search_cursor = 0;
      app.search_scroll = 0;
      app.search_focused = false;
      app.recompute_visible();
    }
    _ => {}
  }
}

// --- Detail ---

fn handle_detail_key(app: &mut App, key: event::KeyEvent) {
  let Some((video_id, focus, editing)) =
    app.detail.as_ref().map(|d| (d.video_id.clone(), d.focus, d.editing_comment.is_some()))
  else {
    return;
  };

  // Tab and Esc work regardless of focus.
  match key.code {
    KeyCode::Tab => {
      if let Some(detail) = app.detail.as_mut() {
        detail.focus = detail.focus.next();
      }
      return;
    }
    KeyCode::Esc => {
      if editing {
        app.cancel_comment_edit();
      } else {
        app.close_detail();
      }
      return;
    }
    _ => {}
  }

  if focus == DetailFocus::Input {
    handle_comment_input_key(app, key);
    return;
  }

  match key.code {
    KeyCode::Char('l') => app.trigger_toggle(ToggleKind::Like),
    KeyCode::Char('d') => app.trigger_toggle(ToggleKind::Dislike),
    KeyCode::Char('s') => app.trigger_toggle(ToggleKind::Subscribe),
    KeyCode::Char('v') => {
      if let Some(owner) = app.catalog.find(&video_id).map(|v| v.channel_id.clone())
        && !owner.is_empty()
      {
        app.detail = None;
        app.open_channel(owner);
      }
    }
    KeyCode::Down | KeyCode::Char('j') => detail_list_move(app, focus, 1),
    KeyCode::Up | KeyCode::Char('k') => detail_list_move(app, focus, -1),
    KeyCode::Enter if focus == DetailFocus::Suggested => {
      let ids = app.suggested_ids();
      let picked = app
        .detail
        .as_ref()
        .and_then(|d| d.list_state.selected())
        .and_then(|i| ids.get(i).cloned());
      if let Some(id) = picked {
        app.open_detail(id);
      }
    }
    KeyCode::Char('e') if focus == DetailFocus::Comments => {
      if let Some(id) = selected_own_comment(app) {
        app.start_comment_edit(&id);
        if let Some(detail) = app.detail.as_mut() {
          detail.focus = DetailFocus::Input;
        }
      }
    }
    KeyCode::Char('x') if focus == DetailFocus::Comments => {
      if let Some(id) = selected_own_comment(app) {
        app.delete_comment(id);
      }
    }
    _ => {}
  }
}

fn handle_comment_input_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => app.submit_comment(),
    _ => {
      if let Some(detail) = app.detail.as_mut() {
        apply_form_key(&mut detail.comment_form, key);
      }
    }
  }
}

/// Move the focused list selection in the detail view, wrapping.
fn detail_list_move(app: &mut App, focus: DetailFocus, delta: i64) {
  let suggested_count = app.suggested_ids().len();
  let Some(detail) = app.detail.as_mut() else { return };
  let (state, count) = match focus {
    DetailFocus::Comments => (&mut detail.comment_list, detail.comments.len()),
    DetailFocus::Suggested => (&mut detail.list_state, suggested_count),
    DetailFocus::Input => return,
  };
  if count == 0 {
    return;
  }
  let i = state.selected().map_or(0, |i| {
    if delta > 0 { (i + 1) % count } else if i == 0 { count - 1 } else { i - 1 }
  });
  state.select(Some(i));
}

/// The id of the selected comment, only if the signed-in user wrote it.
fn selected_own_comment(app: &App) -> Option<String> {
  let session = app.session.as_ref()?;
  let detail = app.detail.as_ref()?;
  let comment = detail.comments.comments.get(detail.comment_list.selected()?)?;
  (comment.user_id == session.user_id).then(|| comment.id.clone())
}

// --- Channel ---

fn handle_channel_key(app: &mut App, key: event::KeyEvent) {
  let (modal_open, confirming, owned) = match app.channel_view.as_ref() {
    Some(s) => (s.modal.is_open(), s.confirm_delete.is_some(), s.owned),
    None => return,
  };

  if modal_open {
    handle_modal_key(app, key);
    return;
  }

  if confirming {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_pending_delete(),
      KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => app.cancel_pending_delete(),
      _ => {}
    }
    return;
  }

  match key.code {
    KeyCode::Enter => {
      let picked = app
        .channel_view
        .as_ref()
        .and_then(|s| s.list_state.selected())
        .and_then(|i| app.channel_video_ids().get(i).cloned());
      if let Some(id) = picked {
        app.channel_view = None;
        app.open_detail(id);
      }
    }
    KeyCode::Down | KeyCode::Char('j') => channel_list_move(app, 1),
    KeyCode::Up | KeyCode::Char('k') => channel_list_move(app, -1),
    KeyCode::Char('a') if owned => {
      if let Some(state) = app.channel_view.as_mut() {
        state.modal.open_new();
      }
    }
    KeyCode::Char('e') if owned => {
      let item = app
        .channel_view
        .as_ref()
        .and_then(|s| s.list_state.selected())
        .and_then(|i| app.channel_video_ids().get(i).cloned())
        .and_then(|id| app.catalog.find(&id).cloned());
      if let (Some(item), Some(state)) = (item, app.channel_view.as_mut()) {
        state.modal.open_edit(&item);
      }
    }
    KeyCode::Char('x') if owned => app.request_delete(),
    KeyCode::Esc => app.close_channel(),
    _ => {}
  }
}

fn channel_list_move(app: &mut App, delta: i64) {
  let count = app.channel_video_ids().len();
  let Some(state) = app.channel_view.as_mut() else { return };
  if count == 0 {
    return;
  }
  let i = state.list_state.selected().map_or(0, |i| {
    if delta > 0 { (i + 1) % count } else if i == 0 { count - 1 } else { i - 1 }
  });
  state.list_state.select(Some(i));
}

fn handle_modal_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => app.submit_draft(),
    KeyCode::Esc => {
      if let Some(state) = app.channel_view.as_mut() {
        state.modal.close();
      }
    }
    _ => {
      if let Some(form) = app.channel_view.as_mut().and_then(|s| s.modal.form_mut()) {
        apply_form_key(form, key);
      }
    }
  }
}

// --- Auth ---

fn handle_auth_key(app: &mut App, key: event::KeyEvent) {
  if app.view == View::Login && key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
    app.open_register();
    return;
  }

  match key.code {
    KeyCode::Enter => match app.view {
      View::Login => app.submit_login(),
      View::Register => app.submit_register(),
      View::CreateChannel => app.submit_create_channel(),
      _ => {}
    },
    KeyCode::Esc => match app.view {
      View::Register => app.open_login(),
      _ => app.view = View::Browse,
    },
    _ => apply_form_key(&mut app.auth_form, key),
  }
}

/// Shared text-field editing for every form in the app.
fn apply_form_key(form: &mut crate::forms::Form, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char(c) => form.insert_char(c),
    KeyCode::Backspace => form.backspace(),
    KeyCode::Delete => form.delete(),
    KeyCode::Left => form.cursor_left(),
    KeyCode::Right => form.cursor_right(),
    KeyCode::Home => form.cursor_home(),
    KeyCode::End => form.cursor_end(),
    KeyCode::Tab | KeyCode::Down => form.focus_next(),
    KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiClient;
  use crate::catalog::CatalogState;
  use crate::model::VideoItem;
  use event::KeyEvent;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn video(id: &str, title: &str) -> VideoItem {
    serde_json::from_str(&format!(r#"{{"_id":"{}","title":"{}","channelId":"u1"}}"#, id, title)).unwrap()
  }

  fn app() -> App {
    let mut app = App::new(ApiClient::new("http://localhost:0/api"));
    app.session = None;
    app.catalog = CatalogState::Ready(vec![video("v1", "one"), video("v2", "two"), video("v3", "three")]);
    app.recompute_visible();
    app
  }

  #[test]
  fn browse_navigation_wraps() {
    let mut app = app();
    handle_key_event(&mut app, key(KeyCode::Char('j'))).unwrap();
    assert_eq!(app.list_state.selected(), Some(1));
    handle_key_event(&mut app, key(KeyCode::Char('j'))).unwrap();
    handle_key_event(&mut app, key(KeyCode::Char('j'))).unwrap();
    assert_eq!(app.list_state.selected(), Some(0));
    handle_key_event(&mut app, key(KeyCode::Char('k'))).unwrap();
    assert_eq!(app.list_state.selected(), Some(2));
  }

  #[test]
  fn search_filter_is_live() {
    let mut app = app();
    handle_key_event(&mut app, key(KeyCode::Char('/'))).unwrap();
    assert!(app.search_focused);
    for c in "two".chars() {
      handle_key_event(&mut app, key(KeyCode::Char(c))).unwrap();
    }
    assert_eq!(app.visible, vec![1]);
    // Esc clears the filter entirely.
    handle_key_event(&mut app, key(KeyCode::Esc)).unwrap();
    assert!(!app.search_focused);
    assert!(app.search.is_empty());
    assert_eq!(app.visible.len(), 3);
  }

  #[test]
  fn alert_swallows_everything_but_dismissal() {
    let mut app = app();
    app.alert = Some("Failed to delete video.".to_string());
    handle_key_event(&mut app, key(KeyCode::Char('j'))).unwrap();
    assert_eq!(app.list_state.selected(), Some(0)); // unchanged
    assert!(app.alert.is_some());
    handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
    assert!(app.alert.is_none());
  }

  #[test]
  fn enter_without_session_lands_on_login() {
    let mut app = app();
    handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
    assert_eq!(app.view, View::Login);
  }

  #[test]
  fn quit_on_ctrl_c() {
    let mut app = app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
    assert!(app.should_quit);
  }

  #[test]
  fn esc_clears_search_before_quitting() {
    let mut app = app();
    app.search = "two".to_string();
    app.recompute_visible();
    handle_key_event(&mut app, key(KeyCode::Esc)).unwrap();
    assert!(app.search.is_empty());
    assert!(!app.should_quit);
    handle_key_event(&mut app, key(KeyCode::Esc)).unwrap();
    assert!(app.should_quit);
  }
}
