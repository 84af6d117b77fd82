//! Wire types for the video-sharing backend.
//!
//! Field names follow the backend's JSON (camelCase, Mongo-style `_id`).
//! Optional fields stay optional here; the UI substitutes fixed literal
//! fallbacks at render time instead of failing deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single video record as served by `GET /videos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
  #[serde(rename = "_id")]
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  /// Free-text category, may be empty. Empty categories are skipped by
  /// the category bar but the video still matches the "All" filter.
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub video_url: String,
  #[serde(default)]
  pub thumbnail_url: String,
  /// Owner reference, matches the channel owner's user id.
  #[serde(default)]
  pub channel_id: String,
  #[serde(default)]
  pub channel_name: Option<String>,
  #[serde(default)]
  pub channel_avatar_url: Option<String>,
  /// Display-only view count; the backend sometimes omits it.
  #[serde(default)]
  pub views: Option<u64>,
  #[serde(default)]
  pub likes: i64,
  #[serde(default)]
  pub dislikes: i64,
  #[serde(default)]
  pub subscriber_count: i64,
  #[serde(default)]
  pub uploaded_at: Option<DateTime<Utc>>,
}

/// Body for video create/update. Channel identity is denormalized onto
/// the record by the caller (the channel manager), not typed by the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpload {
  pub title: String,
  pub description: String,
  pub category: String,
  pub video_url: String,
  pub thumbnail_url: String,
  pub channel_id: String,
  pub channel_name: String,
  pub channel_avatar_url: String,
}

/// A channel record (`GET /channels/{userId}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
  #[serde(default)]
  pub owner_id: String,
  pub channel_name: String,
  #[serde(default)]
  pub about: String,
  #[serde(default)]
  pub profile_image_url: String,
  #[serde(default)]
  pub banner_image_url: String,
}

/// A single comment in a video's thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  #[serde(rename = "_id")]
  pub id: String,
  #[serde(default)]
  pub video_id: String,
  #[serde(default)]
  pub user_id: String,
  #[serde(default)]
  pub username: Option<String>,
  pub comment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
  pub username: String,
  pub email: String,
  pub password: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avatar: Option<String>,
}

/// Login response: the user record with the bearer token inlined.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
  #[serde(rename = "_id")]
  pub user_id: String,
  pub username: String,
  pub token: String,
  #[serde(default)]
  pub avatar_url: Option<String>,
}

/// Registered user record (no token; the user logs in afterwards).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
  #[serde(rename = "_id")]
  pub user_id: String,
  pub username: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn video_item_deserializes_with_missing_optionals() {
    let json = r#"{"_id":"v1","title":"First"}"#;
    let v: VideoItem = serde_json::from_str(json).unwrap();
    assert_eq!(v.id, "v1");
    assert_eq!(v.title, "First");
    assert!(v.views.is_none());
    assert_eq!(v.likes, 0);
    assert!(v.uploaded_at.is_none());
    assert!(v.category.is_empty());
  }

  #[test]
  fn video_item_deserializes_full_record() {
    let json = r#"{
      "_id":"v2","title":"Second","description":"d","category":"Music",
      "videoUrl":"https://cdn/v2.mp4","thumbnailUrl":"https://cdn/v2.jpg",
      "channelId":"u1","channelName":"Chan","channelAvatarUrl":"https://cdn/a.png",
      "views":1200,"likes":5,"dislikes":1,"subscriberCount":42,
      "uploadedAt":"2026-08-01T12:00:00Z"
    }"#;
    let v: VideoItem = serde_json::from_str(json).unwrap();
    assert_eq!(v.category, "Music");
    assert_eq!(v.views, Some(1200));
    assert_eq!(v.subscriber_count, 42);
    assert!(v.uploaded_at.is_some());
  }

  #[test]
  fn register_request_skips_absent_avatar() {
    let req = RegisterRequest {
      username: "u".into(),
      email: "e@example.com".into(),
      password: "p".into(),
      avatar: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("avatar"));
  }
}
