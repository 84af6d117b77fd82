//! REST client for the video-sharing backend.
//!
//! One shared `reqwest::Client`; every call is a single attempt with no
//! retry and no timeout. Protected endpoints take the bearer token
//! explicitly — the client holds no session state of its own.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::model::{
  AuthResponse, Channel, Comment, LoginRequest, RegisterRequest, RegisteredUser, VideoItem, VideoUpload,
};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
  /// The server rejected the bearer token. Callers clear the local
  /// session and return to the login view.
  #[error("session expired or unauthorized")]
  Unauthorized,
  /// Any other non-2xx application response.
  #[error("server returned {status}: {body}")]
  Status { status: StatusCode, body: String },
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),
}

impl ApiError {
  pub fn is_unauthorized(&self) -> bool {
    matches!(self, ApiError::Unauthorized)
  }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
  http: Client,
  base: String,
}

impl ApiClient {
  pub fn new(base: &str) -> Self {
    Self { http: Client::new(), base: base.trim_end_matches('/').to_string() }
  }

  pub fn base(&self) -> &str {
    &self.base
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base, path)
  }

  /// Map the response status before touching the body: 401 is its own
  /// variant, other non-2xx carry the body text for the alert message.
  async fn check(resp: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
      return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(ApiError::Status { status, body });
    }
    Ok(resp)
  }

  async fn into_json<T: DeserializeOwned>(resp: reqwest::Response) -> ApiResult<T> {
    let resp = Self::check(resp).await?;
    Ok(resp.json().await?)
  }

  // --- Catalog ---

  /// `GET /videos` — the full catalog, unauthenticated.
  pub async fn list_videos(&self) -> ApiResult<Vec<VideoItem>> {
    let resp = self.http.get(self.url("/videos")).send().await?;
    Self::into_json(resp).await
  }

  // --- Channels ---

  /// `GET /channels/{userId}` — unauthenticated.
  pub async fn get_channel(&self, user_id: &str) -> ApiResult<Channel> {
    let resp = self.http.get(self.url(&format!("/channels/{}", user_id))).send().await?;
    Self::into_json(resp).await
  }

  /// `POST /channels` — bearer.
  pub async fn create_channel(&self, channel: &Channel, token: &str) -> ApiResult<Channel> {
    let resp = self.http.post(self.url("/channels")).bearer_auth(token).json(channel).send().await?;
    Self::into_json(resp).await
  }

  // --- Video CRUD ---

  /// `POST /videos` — bearer.
  pub async fn create_video(&self, upload: &VideoUpload, token: &str) -> ApiResult<VideoItem> {
    let resp = self.http.post(self.url("/videos")).bearer_auth(token).json(upload).send().await?;
    Self::into_json(resp).await
  }

  /// `PUT /videos/{id}` — bearer.
  pub async fn update_video(&self, id: &str, upload: &VideoUpload, token: &str) -> ApiResult<VideoItem> {
    let resp = self.http.put(self.url(&format!("/videos/{}", id))).bearer_auth(token).json(upload).send().await?;
    Self::into_json(resp).await
  }

  /// `DELETE /videos/{id}` — bearer, empty 2xx on success.
  pub async fn delete_video(&self, id: &str, token: &str) -> ApiResult<()> {
    let resp = self.http.delete(self.url(&format!("/videos/{}", id))).bearer_auth(token).send().await?;
    Self::check(resp).await?;
    Ok(())
  }

  // --- Interaction toggles ---

  /// `PUT /videos/{kind}/{id}` with `{"increment": bool}` — bearer.
  /// Shared by like, dislike and subscribe; the server owns the counters.
  async fn put_toggle(&self, kind: &str, id: &str, increment: bool, token: &str) -> ApiResult<()> {
    let resp = self
      .http
      .put(self.url(&format!("/videos/{}/{}", kind, id)))
      .bearer_auth(token)
      .json(&json!({ "increment": increment }))
      .send()
      .await?;
    Self::check(resp).await?;
    Ok(())
  }

  pub async fn like_video(&self, id: &str, increment: bool, token: &str) -> ApiResult<()> {
    self.put_toggle("like", id, increment, token).await
  }

  pub async fn dislike_video(&self, id: &str, increment: bool, token: &str) -> ApiResult<()> {
    self.put_toggle("dislike", id, increment, token).await
  }

  pub async fn subscribe_channel(&self, id: &str, increment: bool, token: &str) -> ApiResult<()> {
    self.put_toggle("subscribe", id, increment, token).await
  }

  // --- Auth ---

  /// `POST /auth/login` — unauthenticated, returns the user with token.
  pub async fn login(&self, req: &LoginRequest) -> ApiResult<AuthResponse> {
    let resp = self.http.post(self.url("/auth/login")).json(req).send().await?;
    Self::into_json(resp).await
  }

  /// `POST /auth/register` — unauthenticated.
  pub async fn register(&self, req: &RegisterRequest) -> ApiResult<RegisteredUser> {
    let resp = self.http.post(self.url("/auth/register")).json(req).send().await?;
    Self::into_json(resp).await
  }

  // --- Comments ---

  /// `GET /comments/{videoId}` — unauthenticated.
  pub async fn list_comments(&self, video_id: &str) -> ApiResult<Vec<Comment>> {
    let resp = self.http.get(self.url(&format!("/comments/{}", video_id))).send().await?;
    Self::into_json(resp).await
  }

  /// `POST /comments` — bearer.
  pub async fn add_comment(&self, video_id: &str, text: &str, token: &str) -> ApiResult<Comment> {
    let resp = self
      .http
      .post(self.url("/comments"))
      .bearer_auth(token)
      .json(&json!({ "videoId": video_id, "comment": text }))
      .send()
      .await?;
    Self::into_json(resp).await
  }

  /// `PUT /comments/{id}` — bearer.
  pub async fn update_comment(&self, id: &str, text: &str, token: &str) -> ApiResult<Comment> {
    let resp = self
      .http
      .put(self.url(&format!("/comments/{}", id)))
      .bearer_auth(token)
      .json(&json!({ "comment": text }))
      .send()
      .await?;
    Self::into_json(resp).await
  }

  /// `DELETE /comments/{id}` — bearer.
  pub async fn delete_comment(&self, id: &str, token: &str) -> ApiResult<()> {
    let resp = self.http.delete(self.url(&format!("/comments/{}", id))).bearer_auth(token).send().await?;
    Self::check(resp).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base_url_trailing_slash_is_trimmed() {
    let client = ApiClient::new("https://example.com/api/");
    assert_eq!(client.base(), "https://example.com/api");
    assert_eq!(client.url("/videos"), "https://example.com/api/videos");
  }

  #[test]
  fn toggle_paths_match_backend_contract() {
    let client = ApiClient::new("https://example.com/api");
    assert_eq!(client.url("/videos/like/v1"), "https://example.com/api/videos/like/v1");
    assert_eq!(client.url("/videos/subscribe/v1"), "https://example.com/api/videos/subscribe/v1");
  }

  #[test]
  fn unauthorized_is_distinguishable() {
    let err = ApiError::Unauthorized;
    assert!(err.is_unauthorized());
    let other = ApiError::Status { status: StatusCode::BAD_REQUEST, body: "nope".into() };
    assert!(!other.is_unauthorized());
  }
}
