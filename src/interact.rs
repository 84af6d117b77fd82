//! Optimistic like/dislike/subscribe state for the mounted detail view.
//!
//! Each toggle is its own little state machine, independent of the other
//! two (liking never clears disliking — deliberate permissiveness in the
//! backend contract). The flags are optimistic deltas over the server's
//! counters: the displayed count is `server + (flag ? 1 : 0)`, the flag
//! flips on click and reverts only if the mutation fails. State lives
//! only as long as the detail view; nothing is persisted or merged with
//! another client's view of the same video.

/// Which mutation a settled response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleKind {
  Like,
  Dislike,
  Subscribe,
}

impl ToggleKind {
  pub fn label(self) -> &'static str {
    match self {
      ToggleKind::Like => "like",
      ToggleKind::Dislike => "dislike",
      ToggleKind::Subscribe => "subscribe",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ToggleStatus {
  #[default]
  Idle,
  /// A mutation is in flight; `prev` is the pre-click flag so a failed
  /// response can revert. A second click while pending spawns another
  /// independent mutation — last response to settle wins.
  Pending { prev: bool },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Toggle {
  on: bool,
  status: ToggleStatus,
}

impl Toggle {
  /// Click: flip optimistically and go pending. Returns the `increment`
  /// value to send to the server (the new flag).
  pub fn begin(&mut self) -> bool {
    let prev = self.on;
    self.on = !self.on;
    self.status = ToggleStatus::Pending { prev };
    self.on
  }

  /// 2xx response: the optimistic flip stands.
  pub fn confirm(&mut self) {
    self.status = ToggleStatus::Idle;
  }

  /// Non-2xx or transport failure: revert to the pre-click flag.
  pub fn fail(&mut self) {
    if let ToggleStatus::Pending { prev } = self.status {
      self.on = prev;
    }
    self.status = ToggleStatus::Idle;
  }

  pub fn is_on(&self) -> bool {
    self.on
  }

  pub fn is_pending(&self) -> bool {
    matches!(self.status, ToggleStatus::Pending { .. })
  }

  /// Optimistic delta applied over the server-held counter.
  pub fn delta(&self) -> i64 {
    self.on as i64
  }
}

/// Per-detail-view toggle state. Created fresh on every mount and
/// discarded on unmount; the next mount starts from all-off again.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionState {
  pub like: Toggle,
  pub dislike: Toggle,
  pub subscribe: Toggle,
}

impl InteractionState {
  pub fn toggle_mut(&mut self, kind: ToggleKind) -> &mut Toggle {
    match kind {
      ToggleKind::Like => &mut self.like,
      ToggleKind::Dislike => &mut self.dislike,
      ToggleKind::Subscribe => &mut self.subscribe,
    }
  }

  pub fn toggle(&self, kind: ToggleKind) -> &Toggle {
    match kind {
      ToggleKind::Like => &self.like,
      ToggleKind::Dislike => &self.dislike,
      ToggleKind::Subscribe => &self.subscribe,
    }
  }
}

/// Displayed counter: server value plus the optimistic delta.
pub fn displayed_count(server: i64, toggle: &Toggle) -> i64 {
  server + toggle.delta()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn click_optimistically_increments_by_exactly_one() {
    let mut state = InteractionState::default();
    assert_eq!(displayed_count(10, &state.like), 10);
    let increment = state.like.begin();
    assert!(increment);
    assert_eq!(displayed_count(10, &state.like), 11);
    assert!(state.like.is_pending());
  }

  #[test]
  fn confirmed_click_keeps_the_flag() {
    let mut state = InteractionState::default();
    state.like.begin();
    state.like.confirm();
    assert!(state.like.is_on());
    assert!(!state.like.is_pending());
    assert_eq!(displayed_count(10, &state.like), 11);
  }

  #[test]
  fn failed_click_reverts_to_server_value() {
    let mut state = InteractionState::default();
    state.like.begin();
    state.like.fail();
    assert!(!state.like.is_on());
    assert_eq!(displayed_count(10, &state.like), 10);
  }

  #[test]
  fn unclick_sends_decrement_and_restores_server_count() {
    let mut state = InteractionState::default();
    state.like.begin();
    state.like.confirm();
    // Second click: increment=false, count back to the server value.
    let increment = state.like.begin();
    assert!(!increment);
    state.like.confirm();
    assert_eq!(displayed_count(10, &state.like), 10);
  }

  #[test]
  fn failed_unclick_reverts_to_liked() {
    let mut state = InteractionState::default();
    state.like.begin();
    state.like.confirm();
    state.like.begin();
    state.like.fail();
    assert!(state.like.is_on());
    assert_eq!(displayed_count(10, &state.like), 11);
  }

  #[test]
  fn toggles_are_independent() {
    // Liking does not clear disliking: both flags may be on at once.
    let mut state = InteractionState::default();
    state.dislike.begin();
    state.dislike.confirm();
    state.like.begin();
    state.like.confirm();
    assert!(state.like.is_on());
    assert!(state.dislike.is_on());
    assert_eq!(displayed_count(3, &state.dislike), 4);
    assert_eq!(displayed_count(10, &state.like), 11);
  }

  #[test]
  fn subscribe_follows_the_same_machine() {
    let mut state = InteractionState::default();
    let increment = state.toggle_mut(ToggleKind::Subscribe).begin();
    assert!(increment);
    state.toggle_mut(ToggleKind::Subscribe).confirm();
    assert_eq!(displayed_count(42, &state.subscribe), 43);
  }

  #[test]
  fn rapid_double_click_last_settle_wins() {
    let mut state = InteractionState::default();
    state.like.begin(); // on
    state.like.begin(); // off again, prev = on
    // Two mutations are now in flight. The first settles ok and clears
    // pending; the late failure finds no pending flip to revert and the
    // second click's value stands. Accepted race, no merge.
    state.like.confirm();
    state.like.fail();
    assert!(!state.like.is_pending());
    assert!(!state.like.is_on());
  }
}
