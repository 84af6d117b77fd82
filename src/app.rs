use anyhow::Result;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::catalog::{self, CatalogState};
use crate::comments::CommentThread;
use crate::config::Config;
use crate::duration::{self, DurationCache, ResolvedDuration};
use crate::forms::{Field, Form};
use crate::interact::{InteractionState, ToggleKind};
use crate::model::{AuthResponse, Channel, Comment, LoginRequest, RegisterRequest, RegisteredUser, VideoItem};
use crate::session::{self, Session};
use crate::studio::{self, Draft, ModalState};
use crate::theme::THEMES;

// --- Types ---

/// Which screen is mounted. Per-screen state lives in the matching
/// field on `App` and is created on entry, dropped on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  Browse,
  Detail,
  Channel,
  Login,
  Register,
  CreateChannel,
}

/// Which pane of the detail view has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailFocus {
  #[default]
  Input,
  Comments,
  Suggested,
}

impl DetailFocus {
  pub fn next(self) -> Self {
    match self {
      DetailFocus::Input => DetailFocus::Comments,
      DetailFocus::Comments => DetailFocus::Suggested,
      DetailFocus::Suggested => DetailFocus::Input,
    }
  }
}

/// State of the mounted detail view. Discarded on unmount; the
/// optimistic toggle flags never outlive it.
#[derive(Debug)]
pub struct DetailState {
  pub video_id: String,
  pub interactions: InteractionState,
  pub comments: CommentThread,
  pub comment_form: Form,
  /// Id of the comment being edited, if the input is in edit mode.
  pub editing_comment: Option<String>,
  pub focus: DetailFocus,
  /// Selection within the comment thread.
  pub comment_list: ListState,
  /// Selection within the suggested-videos rail.
  pub list_state: ListState,
}

impl DetailState {
  fn new(video_id: String) -> Self {
    Self {
      video_id,
      interactions: InteractionState::default(),
      comments: CommentThread::default(),
      comment_form: comment_form(),
      editing_comment: None,
      focus: DetailFocus::default(),
      comment_list: ListState::default(),
      list_state: ListState::default(),
    }
  }
}

/// State of the mounted channel view. The owner's own channel gets the
/// video manager; someone else's is read-only.
#[derive(Debug)]
pub struct ChannelState {
  pub owner_id: String,
  pub owned: bool,
  /// `None` while the channel record is still loading.
  pub channel: Option<Channel>,
  pub error: Option<String>,
  pub list_state: ListState,
  pub modal: ModalState,
  /// Video id awaiting delete confirmation.
  pub confirm_delete: Option<String>,
}

impl ChannelState {
  fn new(owner_id: String, owned: bool) -> Self {
    Self {
      owner_id,
      owned,
      channel: None,
      error: None,
      list_state: ListState::default(),
      modal: ModalState::default(),
      confirm_delete: None,
    }
  }
}

/// A settled like/dislike/subscribe mutation.
pub(crate) struct ToggleOutcome {
  pub(crate) video_id: String,
  pub(crate) kind: ToggleKind,
  pub(crate) result: Result<(), ApiError>,
}

/// A settled comment mutation.
pub(crate) enum CommentOutcome {
  Added { video_id: String, result: Result<Comment, ApiError> },
  Updated { video_id: String, result: Result<Comment, ApiError> },
  Deleted { video_id: String, comment_id: String, result: Result<(), ApiError> },
}

/// A settled video create or update from the channel manager.
pub(crate) struct SubmitOutcome {
  pub(crate) editing: bool,
  pub(crate) result: Result<VideoItem, ApiError>,
}

/// In-flight async task receivers. One-shot page fetches get a fresh
/// oneshot channel per trigger; mutations that may overlap (toggles,
/// comments) report through long-lived mpsc channels on `App` instead.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) catalog_rx: Option<oneshot::Receiver<Result<Vec<VideoItem>, ApiError>>>,
  pub(crate) channel_rx: Option<oneshot::Receiver<(String, Result<Channel, ApiError>)>>,
  pub(crate) comments_rx: Option<oneshot::Receiver<(String, Result<Vec<Comment>, ApiError>)>>,
  pub(crate) submit_rx: Option<oneshot::Receiver<SubmitOutcome>>,
  pub(crate) delete_rx: Option<oneshot::Receiver<(String, Result<(), ApiError>)>>,
  pub(crate) login_rx: Option<oneshot::Receiver<Result<AuthResponse, ApiError>>>,
  pub(crate) register_rx: Option<oneshot::Receiver<Result<RegisteredUser, ApiError>>>,
  pub(crate) create_channel_rx: Option<oneshot::Receiver<Result<Channel, ApiError>>>,
}

pub struct App {
  pub api: ApiClient,
  pub view: View,
  pub theme_index: usize,
  pub should_quit: bool,

  // Catalog and derived browse state
  pub catalog: CatalogState,
  pub durations: DurationCache,
  pub search: String,
  /// Cursor position within the search input (char index).
  pub search_cursor: usize,
  /// Horizontal scroll offset for the search input.
  pub search_scroll: usize,
  pub search_focused: bool,
  pub selected_category: String,
  /// Indices into the catalog snapshot that match the current search
  /// text and category.
  pub visible: Vec<usize>,
  pub list_state: ListState,

  // Session is an immutable value; login and logout replace it wholesale.
  pub session: Option<Session>,

  // Per-view state
  pub detail: Option<DetailState>,
  pub channel_view: Option<ChannelState>,
  pub auth_form: Form,
  pub auth_error: Option<String>,

  pub last_error: Option<String>,
  pub status_message: Option<String>,
  /// Informational message — lower priority than status/error.
  pub info_message: Option<String>,
  /// Blocking alert from a failed mutation. Dismissed with Enter/Esc
  /// before any other input is handled.
  pub alert: Option<String>,

  pub(crate) tasks: AsyncTasks,
  durations_tx: mpsc::Sender<ResolvedDuration>,
  durations_rx: mpsc::Receiver<ResolvedDuration>,
  toggle_tx: mpsc::UnboundedSender<ToggleOutcome>,
  toggle_rx: mpsc::UnboundedReceiver<ToggleOutcome>,
  comment_tx: mpsc::UnboundedSender<CommentOutcome>,
  comment_rx: mpsc::UnboundedReceiver<CommentOutcome>,

  config_api_base: Option<String>,
  /// When the last error was set — used for auto-dismiss after 5 seconds.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(api: ApiClient) -> Self {
    let config = Config::load();
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };

    let (durations_tx, durations_rx) = mpsc::channel(64);
    let (toggle_tx, toggle_rx) = mpsc::unbounded_channel();
    let (comment_tx, comment_rx) = mpsc::unbounded_channel();

    let session = session::load();
    if let Some(ref s) = session {
      info!(user = %s.username, "restored stored session");
    }

    Self {
      api,
      view: View::Browse,
      theme_index,
      should_quit: false,
      catalog: CatalogState::Loading,
      durations: DurationCache::default(),
      search: String::new(),
      search_cursor: 0,
      search_scroll: 0,
      search_focused: false,
      selected_category: "All".to_string(),
      visible: Vec::new(),
      list_state: ListState::default(),
      session,
      detail: None,
      channel_view: None,
      auth_form: login_form(),
      auth_error: None,
      last_error: None,
      status_message: None,
      info_message: None,
      alert: None,
      tasks: AsyncTasks::default(),
      durations_tx,
      durations_rx,
      toggle_tx,
      toggle_rx,
      comment_tx,
      comment_rx,
      config_api_base: config.api_base,
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  fn save_config(&self) {
    let config =
      Config { api_base: self.config_api_base.clone(), theme_name: Some(self.theme().name.to_string()) };
    config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  // --- Catalog and browse ---

  /// Fetch the full catalog. One unauthenticated read per activation;
  /// retriggering starts over from scratch.
  pub fn trigger_catalog(&mut self) {
    info!("catalog fetch triggered");
    self.catalog = CatalogState::Loading;
    self.visible.clear();
    self.list_state.select(None);
    self.status_message = Some("Loading videos…".to_string());

    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(api.list_videos().await);
    });
    self.tasks.catalog_rx = Some(rx);
  }

  /// Rebuild `visible` from the catalog and the current search text and
  /// category. Clamps the list selection to the visible range.
  pub fn recompute_visible(&mut self) {
    self.visible = catalog::visible_indices(self.catalog.items(), &self.search, &self.selected_category);
    if self.visible.is_empty() {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      if sel >= self.visible.len() {
        self.list_state.select(Some(self.visible.len() - 1));
      } else if self.list_state.selected().is_none() {
        self.list_state.select(Some(0));
      }
    }
  }

  pub fn categories(&self) -> Vec<String> {
    catalog::category_list(self.catalog.items())
  }

  pub fn next_category(&mut self) {
    let cats = self.categories();
    let idx = cats.iter().position(|c| *c == self.selected_category).unwrap_or(0);
    self.selected_category = cats[(idx + 1) % cats.len()].clone();
    self.recompute_visible();
  }

  pub fn prev_category(&mut self) {
    let cats = self.categories();
    let idx = cats.iter().position(|c| *c == self.selected_category).unwrap_or(0);
    self.selected_category = cats[(idx + cats.len() - 1) % cats.len()].clone();
    self.recompute_visible();
  }

  /// The catalog item currently selected in the browse list.
  pub fn selected_video(&self) -> Option<&VideoItem> {
    let sel = self.list_state.selected()?;
    let &idx = self.visible.get(sel)?;
    self.catalog.items().get(idx)
  }

  /// Ids for the detail view's suggested rail: every other catalog
  /// video, in catalog order.
  pub fn suggested_ids(&self) -> Vec<String> {
    let Some(ref detail) = self.detail else { return Vec::new() };
    self.catalog.items().iter().filter(|v| v.id != detail.video_id).map(|v| v.id.clone()).collect()
  }

  /// Fan out duration probes for the given (id, url) targets. Probes
  /// race freely with everything else and patch the cache one entry at
  /// a time as they settle; nothing waits for the full set and nothing
  /// is ever cancelled.
  fn spawn_probes(&self, targets: Vec<(String, String)>) {
    if targets.is_empty() {
      return;
    }
    debug!(count = targets.len(), "spawning duration probes");
    let tx = self.durations_tx.clone();
    tokio::spawn(async move {
      duration::resolve_durations(targets, duration::ffprobe_duration, tx).await;
    });
  }

  // --- Session ---

  /// Drop the session everywhere and land on the login view. Used for
  /// explicit logout and for any 401 from a protected call.
  pub fn force_logout(&mut self, reason: &str) {
    info!(reason, "clearing session");
    session::clear();
    self.session = None;
    self.detail = None;
    self.channel_view = None;
    self.auth_form = login_form();
    self.auth_error = None;
    self.view = View::Login;
    self.info_message = Some(reason.to_string());
  }

  /// Token for a protected call, or bounce to login if there is none.
  fn require_token(&mut self) -> Option<String> {
    match self.session {
      Some(ref s) => Some(s.token.clone()),
      None => {
        self.force_logout("Sign in to continue");
        None
      }
    }
  }

  // --- Detail view ---

  /// Mount the detail view for a video. Requires a stored session: an
  /// unauthenticated mount clears any stale record and lands on login
  /// without issuing a single protected call.
  pub fn open_detail(&mut self, video_id: String) {
    if self.session.is_none() {
      self.force_logout("Sign in to watch videos");
      return;
    }
    info!(video_id = %video_id, "opening detail view");
    self.detail = Some(DetailState::new(video_id.clone()));
    self.view = View::Detail;
    self.trigger_comments(video_id);
  }

  pub fn close_detail(&mut self) {
    // In-flight requests for this view keep running; their results are
    // dropped in check_pending when the video id no longer matches.
    self.detail = None;
    self.view = View::Browse;
  }

  fn trigger_comments(&mut self, video_id: String) {
    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let result = api.list_comments(&video_id).await;
      let _ = tx.send((video_id, result));
    });
    self.tasks.comments_rx = Some(rx);
  }

  /// Click one of the three toggles: flip optimistically and spawn the
  /// mutation. Clicks are fire-and-forget relative to each other; a
  /// rapid second click spawns a second independent mutation.
  pub fn trigger_toggle(&mut self, kind: ToggleKind) {
    let Some(token) = self.require_token() else { return };
    let Some(detail) = self.detail.as_mut() else { return };
    let video_id = detail.video_id.clone();
    let increment = detail.interactions.toggle_mut(kind).begin();
    debug!(video_id = %video_id, kind = kind.label(), increment, "toggle");

    let api = self.api.clone();
    let tx = self.toggle_tx.clone();
    tokio::spawn(async move {
      let result = match kind {
        ToggleKind::Like => api.like_video(&video_id, increment, &token).await,
        ToggleKind::Dislike => api.dislike_video(&video_id, increment, &token).await,
        ToggleKind::Subscribe => api.subscribe_channel(&video_id, increment, &token).await,
      };
      let _ = tx.send(ToggleOutcome { video_id, kind, result });
    });
  }

  /// Post the comment input: a new comment, or the edit in progress.
  /// Empty text is never submitted.
  pub fn submit_comment(&mut self) {
    let Some(token) = self.require_token() else { return };
    let Some(detail) = self.detail.as_mut() else { return };
    let text = detail.comment_form.value(0).trim().to_string();
    if text.is_empty() {
      return;
    }
    let video_id = detail.video_id.clone();
    let editing = detail.editing_comment.clone();
    let api = self.api.clone();
    let tx = self.comment_tx.clone();

    match editing {
      Some(comment_id) => {
        tokio::spawn(async move {
          let result = api.update_comment(&comment_id, &text, &token).await;
          let _ = tx.send(CommentOutcome::Updated { video_id, result });
        });
      }
      None => {
        tokio::spawn(async move {
          let result = api.add_comment(&video_id, &text, &token).await;
          let _ = tx.send(CommentOutcome::Added { video_id, result });
        });
      }
    }
  }

  /// Load one of the user's own comments into the input for editing.
  pub fn start_comment_edit(&mut self, comment_id: &str) {
    let Some(detail) = self.detail.as_mut() else { return };
    let Some(comment) = detail.comments.comments.iter().find(|c| c.id == comment_id) else { return };
    detail.comment_form = Form::new(vec![Field::with_value("Edit comment", &comment.comment)]);
    detail.editing_comment = Some(comment_id.to_string());
  }

  pub fn cancel_comment_edit(&mut self) {
    if let Some(detail) = self.detail.as_mut() {
      detail.comment_form = comment_form();
      detail.editing_comment = None;
    }
  }

  pub fn delete_comment(&mut self, comment_id: String) {
    let Some(token) = self.require_token() else { return };
    let Some(detail) = self.detail.as_ref() else { return };
    let video_id = detail.video_id.clone();
    let api = self.api.clone();
    let tx = self.comment_tx.clone();
    tokio::spawn(async move {
      let result = api.delete_comment(&comment_id, &token).await;
      let _ = tx.send(CommentOutcome::Deleted { video_id, comment_id, result });
    });
  }

  // --- Channel view ---

  /// Mount a channel view. Same session guard as the detail view.
  pub fn open_channel(&mut self, owner_id: String) {
    let Some(ref session) = self.session else {
      self.force_logout("Sign in to view channels");
      return;
    };
    let owned = session.user_id == owner_id;
    info!(owner_id = %owner_id, owned, "opening channel view");
    self.channel_view = Some(ChannelState::new(owner_id.clone(), owned));
    self.view = View::Channel;

    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let result = api.get_channel(&owner_id).await;
      let _ = tx.send((owner_id, result));
    });
    self.tasks.channel_rx = Some(rx);
  }

  pub fn open_my_channel(&mut self) {
    let Some(user_id) = self.session.as_ref().map(|s| s.user_id.clone()) else {
      self.force_logout("Sign in to manage your channel");
      return;
    };
    self.open_channel(user_id);
  }

  pub fn close_channel(&mut self) {
    self.channel_view = None;
    self.view = View::Browse;
  }

  /// Video ids of the mounted channel, in catalog order.
  pub fn channel_video_ids(&self) -> Vec<String> {
    let Some(ref state) = self.channel_view else { return Vec::new() };
    let items = self.catalog.items();
    studio::channel_video_indices(items, &state.owner_id).into_iter().map(|i| items[i].id.clone()).collect()
  }

  fn channel_selected_video_id(&self) -> Option<String> {
    let state = self.channel_view.as_ref()?;
    let ids = self.channel_video_ids();
    ids.get(state.list_state.selected()?).cloned()
  }

  /// Submit the open draft. Create vs update is decided by the draft's
  /// variant, never by sniffing fields.
  pub fn submit_draft(&mut self) {
    let Some(token) = self.require_token() else { return };
    let Some(state) = self.channel_view.as_mut() else { return };
    let Some(channel) = state.channel.clone() else {
      self.set_error("Channel still loading.".to_string());
      return;
    };
    let Some(draft) = state.modal.draft() else { return };
    if let Err(msg) = draft.validate() {
      self.set_error(msg);
      return;
    }

    let upload = draft.to_upload(&channel);
    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    self.status_message = Some("Saving video…".to_string());
    match draft {
      Draft::Editing { id, .. } => {
        tokio::spawn(async move {
          let result = api.update_video(&id, &upload, &token).await;
          let _ = tx.send(SubmitOutcome { editing: true, result });
        });
      }
      Draft::New(_) => {
        tokio::spawn(async move {
          let result = api.create_video(&upload, &token).await;
          let _ = tx.send(SubmitOutcome { editing: false, result });
        });
      }
    }
    self.tasks.submit_rx = Some(rx);
  }

  /// First delete press arms the confirmation; `confirm_pending_delete`
  /// fires the request, Esc disarms.
  pub fn request_delete(&mut self) {
    let Some(video_id) = self.channel_selected_video_id() else { return };
    if let Some(state) = self.channel_view.as_mut() {
      state.confirm_delete = Some(video_id);
    }
  }

  pub fn cancel_pending_delete(&mut self) {
    if let Some(state) = self.channel_view.as_mut() {
      state.confirm_delete = None;
    }
  }

  pub fn confirm_pending_delete(&mut self) {
    let Some(token) = self.require_token() else { return };
    let Some(state) = self.channel_view.as_mut() else { return };
    let Some(video_id) = state.confirm_delete.take() else { return };
    info!(video_id = %video_id, "delete confirmed");

    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    self.status_message = Some("Deleting video…".to_string());
    tokio::spawn(async move {
      let result = api.delete_video(&video_id, &token).await;
      let _ = tx.send((video_id, result));
    });
    self.tasks.delete_rx = Some(rx);
  }

  // --- Auth and channel creation ---

  pub fn open_login(&mut self) {
    self.auth_form = login_form();
    self.auth_error = None;
    self.view = View::Login;
  }

  pub fn open_register(&mut self) {
    self.auth_form = register_form();
    self.auth_error = None;
    self.view = View::Register;
  }

  pub fn open_create_channel(&mut self) {
    if self.session.is_none() {
      self.force_logout("Sign in to create a channel");
      return;
    }
    self.auth_form = create_channel_form();
    self.auth_error = None;
    self.view = View::CreateChannel;
  }

  pub fn submit_login(&mut self) {
    let email = self.auth_form.value(0).trim().to_string();
    let password = self.auth_form.value(1).to_string();
    if email.is_empty() || password.is_empty() {
      self.auth_error = Some("Email and password are required".to_string());
      return;
    }
    self.auth_error = None;
    self.status_message = Some("Signing in…".to_string());

    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(api.login(&LoginRequest { email, password }).await);
    });
    self.tasks.login_rx = Some(rx);
  }

  pub fn submit_register(&mut self) {
    let username = self.auth_form.value(0).trim().to_string();
    let email = self.auth_form.value(1).trim().to_string();
    let password = self.auth_form.value(2).to_string();
    let avatar = self.auth_form.value(3).trim().to_string();
    if username.is_empty() || email.is_empty() || password.is_empty() {
      self.auth_error = Some("Username, email and password are required".to_string());
      return;
    }
    self.auth_error = None;
    self.status_message = Some("Creating account…".to_string());

    let req = RegisterRequest { username, email, password, avatar: (!avatar.is_empty()).then_some(avatar) };
    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(api.register(&req).await);
    });
    self.tasks.register_rx = Some(rx);
  }

  pub fn submit_create_channel(&mut self) {
    let Some(token) = self.require_token() else { return };
    let Some(owner_id) = self.session.as_ref().map(|s| s.user_id.clone()) else { return };
    let channel_name = self.auth_form.value(0).trim().to_string();
    if channel_name.is_empty() {
      self.auth_error = Some("A channel name is required".to_string());
      return;
    }
    let channel = Channel {
      owner_id,
      channel_name,
      about: self.auth_form.value(1).trim().to_string(),
      profile_image_url: self.auth_form.value(2).trim().to_string(),
      banner_image_url: self.auth_form.value(3).trim().to_string(),
    };
    self.auth_error = None;
    self.status_message = Some("Creating channel…".to_string());

    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(api.create_channel(&channel, &token).await);
    });
    self.tasks.create_channel_rx = Some(rx);
  }

  pub fn logout(&mut self) {
    self.force_logout("Signed out");
    self.view = View::Browse;
  }

  // --- Pending task polling ---

  /// Drain every finished async task into app state. Called once per
  /// tick before rendering. Results belonging to a view that has been
  /// navigated away from are dropped as no-ops.
  pub fn check_pending(&mut self) -> Result<()> {
    self.poll_catalog();
    self.drain_durations();
    self.poll_channel_fetch();
    self.poll_comments_fetch();
    self.drain_toggles();
    self.poll_submit();
    self.poll_delete();
    self.drain_comment_mutations();
    self.poll_auth();
    Ok(())
  }

  fn poll_catalog(&mut self) {
    let Some(mut rx) = self.tasks.catalog_rx.take() else { return };
    match rx.try_recv() {
      Ok(result) => {
        self.status_message = None;
        match result {
          Ok(items) => {
            info!(count = items.len(), "catalog ready");
            self.catalog = CatalogState::Ready(items);
            self.recompute_visible();
            // Probe the whole snapshot; the grid renders immediately and
            // badges fill in as probes settle.
            self.spawn_probes(duration::probe_targets(self.catalog.items()));
          }
          Err(e) => {
            warn!(err = %e, "catalog fetch failed");
            self.catalog = CatalogState::Error(format!("{:#}", e));
          }
        }
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.tasks.catalog_rx = Some(rx);
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        self.status_message = None;
        self.catalog = CatalogState::Error("Catalog fetch task failed.".to_string());
      }
    }
  }

  fn drain_durations(&mut self) {
    while let Ok(resolved) = self.durations_rx.try_recv() {
      self.durations.insert(resolved);
    }
  }

  fn poll_channel_fetch(&mut self) {
    let Some(mut rx) = self.tasks.channel_rx.take() else { return };
    match rx.try_recv() {
      Ok((owner_id, result)) => {
        let Some(state) = self.channel_view.as_mut() else { return };
        if state.owner_id != owner_id {
          return; // a different channel was opened meanwhile
        }
        let missing_own_channel = state.owned
          && matches!(&result, Err(ApiError::Status { status, .. }) if *status == reqwest::StatusCode::NOT_FOUND);
        if missing_own_channel {
          // No channel record yet: walk the owner through creating one.
          self.channel_view = None;
          self.open_create_channel();
          self.info_message = Some("You don't have a channel yet. Create one to upload videos".to_string());
          return;
        }
        match result {
          Ok(channel) => state.channel = Some(channel),
          Err(e) => {
            warn!(err = %e, "channel fetch failed");
            state.error = Some(format!("{:#}", e));
          }
        }
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.tasks.channel_rx = Some(rx);
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        if let Some(state) = self.channel_view.as_mut() {
          state.error = Some("Channel fetch task failed.".to_string());
        }
      }
    }
  }

  fn poll_comments_fetch(&mut self) {
    let Some(mut rx) = self.tasks.comments_rx.take() else { return };
    match rx.try_recv() {
      Ok((video_id, result)) => {
        let Some(detail) = self.detail.as_mut() else { return };
        if detail.video_id != video_id {
          return;
        }
        match result {
          Ok(comments) => detail.comments.set(comments),
          // Secondary fetch: log it and leave the thread empty.
          Err(e) => warn!(err = %e, "comment fetch failed"),
        }
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.tasks.comments_rx = Some(rx);
      }
      Err(oneshot::error::TryRecvError::Closed) => {}
    }
  }

  fn drain_toggles(&mut self) {
    while let Ok(outcome) = self.toggle_rx.try_recv() {
      let unauthorized = outcome.result.as_ref().is_err_and(ApiError::is_unauthorized);
      match self.detail.as_mut() {
        Some(detail) if detail.video_id == outcome.video_id => match outcome.result {
          Ok(()) => detail.interactions.toggle_mut(outcome.kind).confirm(),
          Err(e) => {
            warn!(err = %e, kind = outcome.kind.label(), "toggle failed, reverting");
            detail.interactions.toggle_mut(outcome.kind).fail();
          }
        },
        // Detail view unmounted or switched: the flag state is gone,
        // nothing to patch.
        _ => {}
      }
      if unauthorized {
        self.force_logout("Session expired. Sign in again");
      }
    }
  }

  fn poll_submit(&mut self) {
    let Some(mut rx) = self.tasks.submit_rx.take() else { return };
    match rx.try_recv() {
      Ok(outcome) => {
        self.status_message = None;
        match outcome.result {
          Ok(item) => {
            info!(video_id = %item.id, editing = outcome.editing, "video saved");
            // Probe the (possibly changed) media URL; an edit's cache
            // entry is simply overwritten when the new probe settles.
            self.spawn_probes(duration::probe_targets(std::slice::from_ref(&item)));
            if outcome.editing {
              self.catalog.replace_by_id(item);
            } else {
              self.catalog.prepend(item);
            }
            self.recompute_visible();
            if let Some(state) = self.channel_view.as_mut() {
              state.modal.close();
              if state.list_state.selected().is_none() {
                state.list_state.select(Some(0));
              }
            }
          }
          Err(ApiError::Unauthorized) => self.force_logout("Session expired. Sign in again"),
          Err(ApiError::Status { .. }) => {
            self.alert =
              Some(if outcome.editing { "Failed to update video" } else { "Video upload failed" }.to_string());
          }
          Err(e) => {
            // Transport failure: logged, the draft stays open for a retry.
            warn!(err = %e, "video submit failed");
          }
        }
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.tasks.submit_rx = Some(rx);
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        self.status_message = None;
      }
    }
  }

  fn poll_delete(&mut self) {
    let Some(mut rx) = self.tasks.delete_rx.take() else { return };
    match rx.try_recv() {
      Ok((video_id, result)) => {
        self.status_message = None;
        match result {
          Ok(()) => {
            info!(video_id = %video_id, "video deleted");
            self.catalog.remove_by_id(&video_id);
            self.recompute_visible();
            if let Some(state) = self.channel_view.as_mut() {
              let count = studio::channel_video_indices(self.catalog.items(), &state.owner_id).len();
              let sel = state.list_state.selected().unwrap_or(0);
              if count == 0 {
                state.list_state.select(None);
              } else if sel >= count {
                state.list_state.select(Some(count - 1));
              }
            }
          }
          Err(ApiError::Unauthorized) => self.force_logout("Session expired. Sign in again"),
          Err(ApiError::Status { .. }) => {
            // List and duration cache stay untouched on a failed delete.
            self.alert = Some("Failed to delete video.".to_string());
          }
          Err(e) => {
            warn!(err = %e, "video delete failed");
          }
        }
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.tasks.delete_rx = Some(rx);
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        self.status_message = None;
      }
    }
  }

  fn drain_comment_mutations(&mut self) {
    while let Ok(outcome) = self.comment_rx.try_recv() {
      let unauthorized = match &outcome {
        CommentOutcome::Added { result, .. } | CommentOutcome::Updated { result, .. } => {
          matches!(result, Err(ApiError::Unauthorized))
        }
        CommentOutcome::Deleted { result, .. } => matches!(result, Err(ApiError::Unauthorized)),
      };

      match outcome {
        CommentOutcome::Added { video_id, result } => {
          if let Some(detail) = self.detail.as_mut().filter(|d| d.video_id == video_id) {
            match result {
              Ok(comment) => {
                detail.comments.prepend(comment);
                detail.comment_form = comment_form();
              }
              Err(e) => warn!(err = %e, "comment post failed"),
            }
          }
        }
        CommentOutcome::Updated { video_id, result } => {
          if let Some(detail) = self.detail.as_mut().filter(|d| d.video_id == video_id) {
            match result {
              Ok(comment) => {
                detail.comments.replace_by_id(comment);
                detail.comment_form = comment_form();
                detail.editing_comment = None;
              }
              Err(e) => warn!(err = %e, "comment update failed"),
            }
          }
        }
        CommentOutcome::Deleted { video_id, comment_id, result } => {
          if let Some(detail) = self.detail.as_mut().filter(|d| d.video_id == video_id) {
            match result {
              Ok(()) => detail.comments.remove_by_id(&comment_id),
              Err(e) => warn!(err = %e, "comment delete failed"),
            }
          }
        }
      }

      if unauthorized {
        self.force_logout("Session expired. Sign in again");
      }
    }
  }

  fn poll_auth(&mut self) {
    if let Some(mut rx) = self.tasks.login_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          match result {
            Ok(auth) => {
              let new_session = Session::from_auth(auth);
              info!(user = %new_session.username, "signed in");
              session::save(&new_session);
              self.info_message = Some(format!("Signed in as {}", new_session.username));
              self.session = Some(new_session);
              self.view = View::Browse;
            }
            Err(e) => {
              self.auth_error = Some(format!("Login failed: {:#}", e));
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.login_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.auth_error = Some("Login task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.register_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          match result {
            Ok(user) => {
              info!(user = %user.username, "registered");
              self.open_login();
              self.info_message = Some("Registration successful! Sign in to continue".to_string());
            }
            Err(e) => {
              self.auth_error = Some(format!("Registration failed: {:#}", e));
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.register_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.auth_error = Some("Registration task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.create_channel_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          match result {
            Ok(channel) => {
              info!(channel = %channel.channel_name, "channel created");
              self.info_message = Some(format!("Channel \"{}\" created", channel.channel_name));
              self.open_my_channel();
            }
            Err(ApiError::Unauthorized) => self.force_logout("Session expired. Sign in again"),
            Err(e) => {
              warn!(err = %e, "channel creation failed");
              self.auth_error = Some("Failed to create channel".to_string());
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.create_channel_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.auth_error = Some("Channel creation task failed.".to_string());
        }
      }
    }
  }
}

// --- Form layouts ---

fn comment_form() -> Form {
  Form::new(vec![Field::new("Add a comment")])
}

fn login_form() -> Form {
  Form::new(vec![Field::new("Email"), Field::masked("Password")])
}

fn register_form() -> Form {
  Form::new(vec![
    Field::new("Username"),
    Field::new("Email"),
    Field::masked("Password"),
    Field::new("Avatar URL (optional)"),
  ])
}

fn create_channel_form() -> Form {
  Form::new(vec![
    Field::new("Channel name"),
    Field::new("About"),
    Field::new("Profile image URL"),
    Field::new("Banner image URL"),
  ])
}

#[cfg(test)]
mod tests {
  use super::*;

  fn video(id: &str, title: &str, category: &str, owner: &str) -> VideoItem {
    serde_json::from_str(&format!(
      r#"{{"_id":"{}","title":"{}","category":"{}","channelId":"{}","videoUrl":"https://cdn/{}.mp4"}}"#,
      id, title, category, owner, id
    ))
    .unwrap()
  }

  fn app_with_catalog() -> App {
    let mut app = App::new(ApiClient::new("http://localhost:0/api"));
    app.session = None;
    app.catalog = CatalogState::Ready(vec![
      video("v1", "Rust in 10 minutes", "Education", "u1"),
      video("v2", "Lo-fi beats", "Music", "u2"),
      video("v3", "More Rust", "Education", "u1"),
    ]);
    app.recompute_visible();
    app
  }

  fn session() -> Session {
    Session { user_id: "u1".into(), username: "alice".into(), token: "tok".into(), avatar_url: None }
  }

  #[test]
  fn recompute_visible_clamps_selection() {
    let mut app = app_with_catalog();
    app.list_state.select(Some(2));
    app.search = "rust".to_string();
    app.recompute_visible();
    assert_eq!(app.visible, vec![0, 2]);
    assert_eq!(app.list_state.selected(), Some(1));

    app.search = "zzz".to_string();
    app.recompute_visible();
    assert!(app.visible.is_empty());
    assert_eq!(app.list_state.selected(), None);
  }

  #[test]
  fn category_cycling_wraps() {
    let mut app = app_with_catalog();
    assert_eq!(app.selected_category, "All");
    app.next_category();
    assert_eq!(app.selected_category, "Education");
    app.next_category();
    assert_eq!(app.selected_category, "Music");
    app.next_category();
    assert_eq!(app.selected_category, "All");
    app.prev_category();
    assert_eq!(app.selected_category, "Music");
  }

  #[test]
  fn selected_video_maps_through_visible_indices() {
    let mut app = app_with_catalog();
    app.search = "rust".to_string();
    app.recompute_visible();
    app.list_state.select(Some(1));
    assert_eq!(app.selected_video().unwrap().id, "v3");
  }

  #[test]
  fn detail_mount_without_session_bounces_to_login() {
    let mut app = app_with_catalog();
    app.open_detail("v1".to_string());
    assert_eq!(app.view, View::Login);
    assert!(app.detail.is_none());
    // No comment fetch was issued for the unauthenticated mount.
    assert!(app.tasks.comments_rx.is_none());
  }

  #[tokio::test]
  async fn detail_mount_with_session_creates_fresh_state() {
    let mut app = app_with_catalog();
    app.session = Some(session());
    app.open_detail("v1".to_string());
    assert_eq!(app.view, View::Detail);
    let detail = app.detail.as_ref().unwrap();
    assert_eq!(detail.video_id, "v1");
    assert!(!detail.interactions.like.is_on());
    assert!(app.tasks.comments_rx.is_some());
  }

  #[test]
  fn channel_view_lists_only_owner_videos() {
    let mut app = app_with_catalog();
    app.channel_view = Some(ChannelState::new("u1".to_string(), true));
    assert_eq!(app.channel_video_ids(), vec!["v1", "v3"]);
  }

  #[test]
  fn delete_requires_confirmation_before_any_request() {
    let mut app = app_with_catalog();
    app.session = Some(session());
    let mut state = ChannelState::new("u1".to_string(), true);
    state.list_state.select(Some(0));
    app.channel_view = Some(state);

    app.request_delete();
    assert_eq!(app.channel_view.as_ref().unwrap().confirm_delete.as_deref(), Some("v1"));
    assert!(app.tasks.delete_rx.is_none());

    app.cancel_pending_delete();
    assert!(app.channel_view.as_ref().unwrap().confirm_delete.is_none());
    assert!(app.tasks.delete_rx.is_none());
  }

  #[tokio::test]
  async fn confirmed_delete_patches_catalog_and_leaves_durations_alone() {
    let mut app = app_with_catalog();
    app.durations.insert(ResolvedDuration { video_id: "v1".into(), formatted: "2:05".into() });
    app.durations.insert(ResolvedDuration { video_id: "v2".into(), formatted: "1:00".into() });
    app.channel_view = Some(ChannelState::new("u1".to_string(), true));

    let (tx, rx) = oneshot::channel();
    tx.send(("v1".to_string(), Ok(()))).ok();
    app.tasks.delete_rx = Some(rx);
    app.check_pending().unwrap();

    assert!(app.catalog.find("v1").is_none());
    assert_eq!(app.catalog.items().len(), 2);
    // The duration cache is never purged.
    assert_eq!(app.durations.get("v1"), Some("2:05"));
  }

  #[tokio::test]
  async fn failed_delete_leaves_list_and_alerts() {
    let mut app = app_with_catalog();
    let (tx, rx) = oneshot::channel();
    tx.send((
      "v1".to_string(),
      Err(ApiError::Status { status: reqwest::StatusCode::FORBIDDEN, body: String::new() }),
    ))
    .ok();
    app.tasks.delete_rx = Some(rx);
    app.check_pending().unwrap();

    assert!(app.catalog.find("v1").is_some());
    assert_eq!(app.alert.as_deref(), Some("Failed to delete video."));
  }

  #[tokio::test]
  async fn confirmed_edit_replaces_in_place() {
    let mut app = app_with_catalog();
    app.channel_view = Some(ChannelState::new("u1".to_string(), true));
    let edited = video("v3", "More Rust (updated)", "Education", "u1");

    let (tx, rx) = oneshot::channel();
    tx.send(SubmitOutcome { editing: true, result: Ok(edited) }).ok();
    app.tasks.submit_rx = Some(rx);
    app.check_pending().unwrap();

    let items = app.catalog.items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2].id, "v3");
    assert_eq!(items[2].title, "More Rust (updated)");
  }

  #[tokio::test]
  async fn confirmed_create_prepends_canonical_record() {
    let mut app = app_with_catalog();
    app.channel_view = Some(ChannelState::new("u1".to_string(), true));
    let created = video("v9", "Fresh", "Music", "u1");

    let (tx, rx) = oneshot::channel();
    tx.send(SubmitOutcome { editing: false, result: Ok(created) }).ok();
    app.tasks.submit_rx = Some(rx);
    app.check_pending().unwrap();

    assert_eq!(app.catalog.items()[0].id, "v9");
    assert!(!app.channel_view.as_ref().unwrap().modal.is_open());
  }

  #[tokio::test]
  async fn failed_submit_keeps_draft_open_and_alerts() {
    let mut app = app_with_catalog();
    let mut state = ChannelState::new("u1".to_string(), true);
    state.modal.open_new();
    app.channel_view = Some(state);

    let (tx, rx) = oneshot::channel();
    tx.send(SubmitOutcome {
      editing: false,
      result: Err(ApiError::Status { status: reqwest::StatusCode::BAD_REQUEST, body: String::new() }),
    })
    .ok();
    app.tasks.submit_rx = Some(rx);
    app.check_pending().unwrap();

    assert_eq!(app.alert.as_deref(), Some("Video upload failed"));
    assert!(app.channel_view.as_ref().unwrap().modal.is_open());
    assert_eq!(app.catalog.items().len(), 3);
  }

  #[tokio::test]
  async fn unauthorized_mutation_forces_logout() {
    let mut app = app_with_catalog();
    app.session = Some(session());
    app.channel_view = Some(ChannelState::new("u1".to_string(), true));

    let (tx, rx) = oneshot::channel();
    tx.send(("v1".to_string(), Err(ApiError::Unauthorized))).ok();
    app.tasks.delete_rx = Some(rx);
    app.check_pending().unwrap();

    assert!(app.session.is_none());
    assert_eq!(app.view, View::Login);
  }

  #[tokio::test]
  async fn toggle_result_for_unmounted_view_is_dropped() {
    let mut app = app_with_catalog();
    app.session = Some(session());
    app.open_detail("v1".to_string());
    app.trigger_toggle(ToggleKind::Like);
    // Navigate away before the response lands.
    app.close_detail();
    tokio::time::sleep(Duration::from_millis(50)).await;
    app.check_pending().unwrap();
    assert!(app.detail.is_none());
    assert_eq!(app.view, View::Browse);
  }

  #[tokio::test]
  async fn stale_comment_fetch_is_dropped_after_navigation() {
    let mut app = app_with_catalog();
    // Response for v1 arrives after the user moved on to v2.
    let (tx, rx) = oneshot::channel();
    tx.send((
      "v1".to_string(),
      Ok(vec![
        serde_json::from_str::<Comment>(r#"{"_id":"c1","videoId":"v1","userId":"u2","comment":"hi"}"#).unwrap(),
      ]),
    ))
    .ok();
    app.detail = Some(DetailState::new("v2".to_string()));
    app.tasks.comments_rx = Some(rx);
    app.check_pending().unwrap();
    assert!(app.detail.as_ref().unwrap().comments.is_empty());
  }

  #[test]
  fn logout_clears_session_and_per_view_state() {
    let mut app = app_with_catalog();
    app.session = Some(session());
    app.detail = Some(DetailState::new("v1".to_string()));
    app.logout();
    assert!(app.session.is_none());
    assert!(app.detail.is_none());
    assert_eq!(app.view, View::Browse);
  }
}
