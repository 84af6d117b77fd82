use chrono::{DateTime, Utc};

/// Human-readable age of an upload, bucketed the way the backend's web
/// client does it: months are `days / 30` and years are `days / 365`,
/// both floored. The arithmetic drifts from calendar months on purpose
/// (e.g. 364 days is 12 "months" and falls through to the years branch).
pub fn format_time_ago(uploaded: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let days = (now - uploaded).num_days();
  if days <= 0 {
    return "Today".to_string();
  }
  let months = days / 30;
  let years = days / 365;

  if days == 1 {
    return "1 day ago".to_string();
  }
  if days < 30 {
    return format!("{} days ago", days);
  }
  if months == 1 {
    return "1 month ago".to_string();
  }
  if months < 12 {
    return format!("{} months ago", months);
  }
  if years == 1 {
    return "1 year ago".to_string();
  }
  format!("{} years ago", years)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn now() -> DateTime<Utc> {
    "2026-08-30T12:00:00Z".parse().unwrap()
  }

  fn ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
  }

  #[test]
  fn same_day_is_today() {
    assert_eq!(format_time_ago(now(), now()), "Today");
    assert_eq!(format_time_ago(now() - Duration::hours(23), now()), "Today");
  }

  #[test]
  fn one_day() {
    assert_eq!(format_time_ago(ago(1), now()), "1 day ago");
  }

  #[test]
  fn days_bucket() {
    assert_eq!(format_time_ago(ago(2), now()), "2 days ago");
    assert_eq!(format_time_ago(ago(29), now()), "29 days ago");
  }

  #[test]
  fn months_bucket() {
    assert_eq!(format_time_ago(ago(30), now()), "1 month ago");
    assert_eq!(format_time_ago(ago(59), now()), "1 month ago");
    assert_eq!(format_time_ago(ago(60), now()), "2 months ago");
    assert_eq!(format_time_ago(ago(359), now()), "11 months ago");
  }

  #[test]
  fn approximate_year_boundary_drift_is_preserved() {
    // 364 days: 364/30 = 12 "months" skips the months branch, but
    // 364/365 = 0 years, so the final branch prints "0 years ago".
    // Same arithmetic as the backend's web client.
    assert_eq!(format_time_ago(ago(364), now()), "0 years ago");
  }

  #[test]
  fn years_bucket() {
    assert_eq!(format_time_ago(ago(365), now()), "1 year ago");
    assert_eq!(format_time_ago(ago(729), now()), "1 year ago");
    assert_eq!(format_time_ago(ago(730), now()), "2 years ago");
  }

  #[test]
  fn future_timestamps_clamp_to_today() {
    assert_eq!(format_time_ago(now() + Duration::days(3), now()), "Today");
  }
}
