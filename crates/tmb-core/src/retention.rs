//! Staleness rule applied by the retention sweeper.

use chrono::{DateTime, Duration, Utc};

/// Messages older than this are eligible for deletion.
pub const DEFAULT_WINDOW_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
  pub window: Duration,
}

impl Default for RetentionPolicy {
  fn default() -> Self { Self { window: Duration::seconds(DEFAULT_WINDOW_SECS) } }
}

impl RetentionPolicy {
  pub fn from_secs(secs: i64) -> Self { Self { window: Duration::seconds(secs) } }

  /// Strictly older than the window; a message exactly `window` old is kept.
  pub fn is_stale(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - timestamp > self.window
  }

  /// Earliest timestamp that survives a sweep at `now`.
  pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> { now - self.window }
}
