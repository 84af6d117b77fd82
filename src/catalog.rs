//! Catalog store and view filter.
//!
//! The catalog is fetched once per activation (`GET /videos`) and owned
//! here; every other view reads the snapshot. The only writes after the
//! fetch are the confirmed-mutation patches (`prepend`, `replace_by_id`,
//! `remove_by_id`) applied by the channel manager once the server has
//! acknowledged a change.

use crate::model::VideoItem;

/// Three-state result of a catalog fetch. A failed fetch is terminal for
/// the activation; dependent views render the error and carry on.
#[derive(Debug, Default)]
pub enum CatalogState {
  #[default]
  Loading,
  Error(String),
  Ready(Vec<VideoItem>),
}

impl CatalogState {
  pub fn items(&self) -> &[VideoItem] {
    match self {
      CatalogState::Ready(items) => items,
      _ => &[],
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self, CatalogState::Loading)
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      CatalogState::Error(msg) => Some(msg),
      _ => None,
    }
  }

  pub fn find(&self, id: &str) -> Option<&VideoItem> {
    self.items().iter().find(|v| v.id == id)
  }

  /// Prepend a server-confirmed new record (channel manager create).
  pub fn prepend(&mut self, item: VideoItem) {
    if let CatalogState::Ready(items) = self {
      items.insert(0, item);
    }
  }

  /// Replace the record with a matching id in place, keeping its
  /// position. A miss is a no-op (the view may have refetched since).
  pub fn replace_by_id(&mut self, item: VideoItem) {
    if let CatalogState::Ready(items) = self
      && let Some(slot) = items.iter_mut().find(|v| v.id == item.id)
    {
      *slot = item;
    }
  }

  /// Remove a server-confirmed deleted record.
  pub fn remove_by_id(&mut self, id: &str) {
    if let CatalogState::Ready(items) = self {
      items.retain(|v| v.id != id);
    }
  }
}

// --- View filter ---

/// The category bar: "All" followed by every distinct non-blank category
/// in first-seen order. Duplicates differing only by case or whitespace
/// are kept distinct — that matches the backend's free-text categories.
pub fn category_list(items: &[VideoItem]) -> Vec<String> {
  let mut cats = vec!["All".to_string()];
  for item in items {
    if !item.category.trim().is_empty() && !cats.iter().any(|c| *c == item.category) {
      cats.push(item.category.clone());
    }
  }
  cats
}

/// Check whether a catalog item is visible under the current search text
/// and selected category. Title match is case-insensitive substring;
/// category match is exact equality unless "All" is selected.
pub fn matches_view(item: &VideoItem, search: &str, category: &str) -> bool {
  let matches_search = item.title.to_lowercase().contains(&search.to_lowercase());
  let matches_category = category == "All" || item.category == category;
  matches_search && matches_category
}

/// Indices into `items` of the visible subset, in catalog fetch order.
pub fn visible_indices(items: &[VideoItem], search: &str, category: &str) -> Vec<usize> {
  items.iter().enumerate().filter(|(_, item)| matches_view(item, search, category)).map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn video(id: &str, title: &str, category: &str) -> VideoItem {
    serde_json::from_str(&format!(
      r#"{{"_id":"{}","title":"{}","category":"{}","channelId":"u1"}}"#,
      id, title, category
    ))
    .unwrap()
  }

  fn sample() -> Vec<VideoItem> {
    vec![
      video("v1", "Rust in 10 minutes", "Education"),
      video("v2", "Lo-fi beats", "Music"),
      video("v3", "More Rust", "Education"),
      video("v4", "Untagged clip", ""),
    ]
  }

  // --- category_list ---

  #[test]
  fn categories_start_with_all_in_first_seen_order() {
    assert_eq!(category_list(&sample()), vec!["All", "Education", "Music"]);
  }

  #[test]
  fn blank_categories_are_skipped() {
    let items = vec![video("v1", "a", ""), video("v2", "b", "  ")];
    assert_eq!(category_list(&items), vec!["All"]);
  }

  #[test]
  fn near_duplicate_categories_stay_distinct() {
    // "music" vs "Music" vs "Music " are three entries; the backend's
    // categories are free text and the bar reflects them verbatim.
    let items = vec![video("v1", "a", "Music"), video("v2", "b", "music"), video("v3", "c", "Music ")];
    assert_eq!(category_list(&items), vec!["All", "Music", "music", "Music "]);
  }

  // --- visible_indices ---

  #[test]
  fn all_category_and_empty_search_shows_everything() {
    assert_eq!(visible_indices(&sample(), "", "All"), vec![0, 1, 2, 3]);
  }

  #[test]
  fn search_is_case_insensitive_substring() {
    assert_eq!(visible_indices(&sample(), "rust", "All"), vec![0, 2]);
    assert_eq!(visible_indices(&sample(), "RUST", "All"), vec![0, 2]);
    assert_eq!(visible_indices(&sample(), "10 MIN", "All"), vec![0]);
  }

  #[test]
  fn category_filter_is_exact_match() {
    assert_eq!(visible_indices(&sample(), "", "Education"), vec![0, 2]);
    assert_eq!(visible_indices(&sample(), "", "Music"), vec![1]);
    // Exact equality: a category nobody uses matches nothing.
    assert!(visible_indices(&sample(), "", "education").is_empty());
  }

  #[test]
  fn search_and_category_combine() {
    assert_eq!(visible_indices(&sample(), "more", "Education"), vec![2]);
    assert!(visible_indices(&sample(), "more", "Music").is_empty());
  }

  #[test]
  fn no_match_yields_empty_set() {
    assert!(visible_indices(&sample(), "zzz", "All").is_empty());
  }

  // --- patch ops ---

  #[test]
  fn prepend_puts_new_record_first() {
    let mut state = CatalogState::Ready(sample());
    state.prepend(video("v9", "Fresh upload", "Music"));
    assert_eq!(state.items()[0].id, "v9");
    assert_eq!(state.items().len(), 5);
  }

  #[test]
  fn replace_keeps_position() {
    let mut state = CatalogState::Ready(sample());
    let mut edited = video("v2", "Lo-fi beats (remaster)", "Music");
    edited.likes = 7;
    state.replace_by_id(edited);
    assert_eq!(state.items()[1].id, "v2");
    assert_eq!(state.items()[1].title, "Lo-fi beats (remaster)");
    assert_eq!(state.items().len(), 4);
  }

  #[test]
  fn replace_unknown_id_is_noop() {
    let mut state = CatalogState::Ready(sample());
    state.replace_by_id(video("missing", "x", ""));
    assert_eq!(state.items().len(), 4);
    assert!(state.find("missing").is_none());
  }

  #[test]
  fn remove_drops_only_the_matching_record() {
    let mut state = CatalogState::Ready(sample());
    state.remove_by_id("v3");
    assert_eq!(state.items().len(), 3);
    assert!(state.find("v3").is_none());
    assert!(state.find("v1").is_some());
  }

  #[test]
  fn patches_on_unready_state_are_noops() {
    let mut state = CatalogState::Loading;
    state.prepend(video("v1", "a", ""));
    state.remove_by_id("v1");
    assert!(state.items().is_empty());
  }
}
