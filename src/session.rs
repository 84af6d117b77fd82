//! Persisted session: who is logged in, and the opaque bearer token.
//!
//! Stored under two distinct keys in the platform config dir —
//! `session.json` (the full user record) and `token` (the bare token) —
//! mirroring the backend web client's two storage keys. The token is
//! never validated locally; the first 401 from the server deletes both.
//!
//! In memory the session is an immutable value threaded through the app;
//! login replaces it wholesale, logout drops it. Nothing mutates a
//! `Session` in place.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::AuthResponse;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
  pub user_id: String,
  pub username: String,
  pub token: String,
  pub avatar_url: Option<String>,
}

impl Session {
  pub fn from_auth(auth: AuthResponse) -> Self {
    Self { user_id: auth.user_id, username: auth.username, token: auth.token, avatar_url: auth.avatar_url }
  }
}

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "tubular")
}

/// Read the stored session, if any. A record without a token is stale
/// and treated as absent (and cleaned up), so protected views never see
/// a half-session.
pub fn load() -> Option<Session> {
  let proj_dirs = project_dirs()?;
  let path = proj_dirs.config_dir().join("session.json");
  let content = std::fs::read_to_string(path).ok()?;
  match serde_json::from_str::<Session>(&content) {
    Ok(session) if !session.token.is_empty() => Some(session),
    Ok(_) => {
      clear();
      None
    }
    Err(e) => {
      warn!(err = %e, "stale session record, clearing");
      clear();
      None
    }
  }
}

/// Persist a fresh session (login). Best-effort: a failed write leaves
/// the in-memory session usable for the rest of the process.
pub fn save(session: &Session) {
  let Some(proj_dirs) = project_dirs() else { return };
  let config_dir = proj_dirs.config_dir();
  if std::fs::create_dir_all(config_dir).is_err() {
    return;
  }
  if let Ok(content) = serde_json::to_string(session) {
    let _ = std::fs::write(config_dir.join("session.json"), content);
  }
  let _ = std::fs::write(config_dir.join("token"), &session.token);
}

/// Delete both stored keys (logout, or any 401 from the server).
pub fn clear() {
  if let Some(proj_dirs) = project_dirs() {
    let config_dir = proj_dirs.config_dir();
    let _ = std::fs::remove_file(config_dir.join("session.json"));
    let _ = std::fs::remove_file(config_dir.join("token"));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn session_round_trips_through_json() {
    let session = Session {
      user_id: "u1".into(),
      username: "alice".into(),
      token: "tok".into(),
      avatar_url: None,
    };
    let json = serde_json::to_string(&session).unwrap();
    let back: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(back, session);
  }

  #[test]
  fn from_auth_carries_the_token() {
    let auth: AuthResponse =
      serde_json::from_str(r#"{"_id":"u1","username":"alice","token":"tok","avatarUrl":"https://a/p.png"}"#).unwrap();
    let session = Session::from_auth(auth);
    assert_eq!(session.user_id, "u1");
    assert_eq!(session.token, "tok");
    assert_eq!(session.avatar_url.as_deref(), Some("https://a/p.png"));
  }
}
