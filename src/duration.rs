//! Duration probing and the per-snapshot duration cache.
//!
//! Durations are not part of the catalog payload; each one is resolved
//! by probing the media URL with ffprobe. All probes for a snapshot run
//! concurrently and each settled result is sent over the channel as it
//! arrives, so the grid fills in progressively — there is no barrier.

use anyhow::{Context, Result, anyhow};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use crate::constants::constants;
use crate::model::VideoItem;

/// One settled probe, ready for the cache.
#[derive(Debug, Clone)]
pub struct ResolvedDuration {
  pub video_id: String,
  pub formatted: String,
}

/// Seconds to `"m:ss"`. Minutes are not capped and there is no hour
/// component; fractional seconds are floored.
pub fn format_duration(seconds: f64) -> String {
  let total = seconds.max(0.0).floor() as u64;
  format!("{}:{:02}", total / 60, total % 60)
}

/// Map from video id to formatted duration. Additive: entries from
/// earlier snapshots are never purged (bounded by catalog size, an
/// accepted leak). Absence means "not yet resolved", never an error.
#[derive(Debug, Default)]
pub struct DurationCache {
  entries: HashMap<String, String>,
}

impl DurationCache {
  pub fn insert(&mut self, resolved: ResolvedDuration) {
    self.entries.insert(resolved.video_id, resolved.formatted);
  }

  pub fn get(&self, video_id: &str) -> Option<&str> {
    self.entries.get(video_id).map(String::as_str)
  }

  /// Badge text for the grid: the resolved duration, or the fixed
  /// pending placeholder while the probe is still in flight.
  pub fn display(&self, video_id: &str) -> &str {
    self.get(video_id).unwrap_or(&constants().duration_pending)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// (id, media URL) pairs for a catalog snapshot. An absent media URL is
/// replaced by the fixed placeholder clip so the probe still settles.
pub fn probe_targets(items: &[VideoItem]) -> Vec<(String, String)> {
  items
    .iter()
    .map(|item| {
      let url =
        if item.video_url.is_empty() { constants().probe_fallback_url.clone() } else { item.video_url.clone() };
      (item.id.clone(), url)
    })
    .collect()
}

/// Probe the playable duration of a media URL with ffprobe.
pub async fn ffprobe_duration(url: String) -> Result<f64> {
  let output = Command::new("ffprobe")
    .args(["-v", "error", "-show_entries", "format=duration", "-of", "default=noprint_wrappers=1:nokey=1", "--", &url])
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::null())
    .output()
    .await
    .map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("ffprobe not found. Install it with: brew install ffmpeg (macOS) or apt install ffmpeg (Linux)")
      } else {
        anyhow!(e).context("Failed to execute ffprobe")
      }
    })?;

  if !output.status.success() {
    return Err(anyhow!("ffprobe failed for {}", url));
  }

  let stdout = String::from_utf8(output.stdout).context("ffprobe output non-UTF8")?;
  stdout.trim().parse::<f64>().with_context(|| format!("ffprobe returned no duration for {}", url))
}

/// Fan out duration probes for a snapshot, at most `probe_concurrency`
/// in flight. Each result is sent through `tx` the moment it settles; a
/// failed probe settles as the fixed fallback string. The receiver side
/// (the app loop) drains progressively, so early results render while
/// slow ones are still pending.
pub async fn resolve_durations<F, Fut>(targets: Vec<(String, String)>, probe: F, tx: mpsc::Sender<ResolvedDuration>)
where
  F: Fn(String) -> Fut,
  Fut: Future<Output = Result<f64>>,
{
  stream::iter(targets)
    .map(|(video_id, url)| {
      let tx = tx.clone();
      let fut = probe(url);
      async move {
        let formatted = match fut.await {
          Ok(seconds) => format_duration(seconds),
          Err(e) => {
            debug!(video_id = %video_id, err = %e, "duration probe failed, using fallback");
            constants().duration_fallback.clone()
          }
        };
        let _ = tx.send(ResolvedDuration { video_id, formatted }).await;
      }
    })
    .buffer_unordered(constants().probe_concurrency)
    .collect::<()>()
    .await;
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- format_duration ---

  #[test]
  fn format_duration_minutes_and_seconds() {
    assert_eq!(format_duration(125.0), "2:05");
    assert_eq!(format_duration(59.0), "0:59");
    assert_eq!(format_duration(0.0), "0:00");
  }

  #[test]
  fn format_duration_floors_fractional_seconds() {
    assert_eq!(format_duration(125.9), "2:05");
    assert_eq!(format_duration(59.999), "0:59");
  }

  #[test]
  fn format_duration_has_no_hour_component() {
    assert_eq!(format_duration(3600.0), "60:00");
    assert_eq!(format_duration(3723.0), "62:03");
  }

  #[test]
  fn format_duration_clamps_negative() {
    assert_eq!(format_duration(-5.0), "0:00");
  }

  // --- probe_targets ---

  fn video(id: &str, url: &str) -> VideoItem {
    serde_json::from_str(&format!(r#"{{"_id":"{}","title":"t","videoUrl":"{}"}}"#, id, url)).unwrap()
  }

  #[test]
  fn missing_url_falls_back_to_placeholder_clip() {
    let targets = probe_targets(&[video("v1", "https://cdn/v1.mp4"), video("v2", "")]);
    assert_eq!(targets[0].1, "https://cdn/v1.mp4");
    assert_eq!(targets[1].1, constants().probe_fallback_url);
  }

  // --- resolve_durations ---

  #[tokio::test]
  async fn probes_settle_independently_and_failures_use_fallback() {
    let targets = vec![
      ("v1".to_string(), "ok-90".to_string()),
      ("v2".to_string(), "fail".to_string()),
      ("v3".to_string(), "ok-125".to_string()),
    ];
    let (tx, mut rx) = mpsc::channel(8);
    resolve_durations(
      targets,
      |url| async move {
        match url.strip_prefix("ok-") {
          Some(secs) => Ok(secs.parse::<f64>().unwrap()),
          None => Err(anyhow!("no metadata")),
        }
      },
      tx,
    )
    .await;

    let mut cache = DurationCache::default();
    while let Some(resolved) = rx.recv().await {
      cache.insert(resolved);
    }
    assert_eq!(cache.get("v1"), Some("1:30"));
    assert_eq!(cache.get("v2"), Some(constants().duration_fallback.as_str()));
    assert_eq!(cache.get("v3"), Some("2:05"));
  }

  #[tokio::test]
  async fn cache_is_additive_across_snapshots() {
    let (tx, mut rx) = mpsc::channel(8);
    resolve_durations(vec![("v1".to_string(), "a".to_string())], |_| async { Ok(60.0) }, tx).await;
    let mut cache = DurationCache::default();
    while let Some(r) = rx.recv().await {
      cache.insert(r);
    }

    // Second snapshot with a different item: v1's entry survives.
    let (tx, mut rx) = mpsc::channel(8);
    resolve_durations(vec![("v2".to_string(), "b".to_string())], |_| async { Ok(30.0) }, tx).await;
    while let Some(r) = rx.recv().await {
      cache.insert(r);
    }
    assert_eq!(cache.get("v1"), Some("1:00"));
    assert_eq!(cache.get("v2"), Some("0:30"));
    assert_eq!(cache.len(), 2);
  }

  #[test]
  fn unresolved_entries_display_the_pending_placeholder() {
    let cache = DurationCache::default();
    assert_eq!(cache.display("nope"), constants().duration_pending);
  }
}
