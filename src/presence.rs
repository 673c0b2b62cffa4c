//! Online presence tracking
//!
//! Keeps a last-seen timestamp per user and periodically evicts users that
//! have gone quiet. The resulting count is an approximation: a client that
//! heartbeats less often than the timeout is undercounted, and a closed tab
//! keeps counting until its entry expires.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default presence timeout (5 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default sweep interval (1 minute)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared presence map with a background sweeper
///
/// Cloning is cheap; all clones share the same map and sweeper.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    entries: Arc<RwLock<HashMap<String, Instant>>>,
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
    timeout: Duration,
    sweep_interval: Duration,
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_SWEEP_INTERVAL)
    }
}

impl PresenceTracker {
    /// Create a tracker; the sweeper is not running until [`Self::start`]
    ///
    /// A zero sweep interval is replaced by [`DEFAULT_SWEEP_INTERVAL`].
    #[must_use]
    pub fn new(timeout: Duration, sweep_interval: Duration) -> Self {
        let sweep_interval = if sweep_interval.is_zero() {
            DEFAULT_SWEEP_INTERVAL
        } else {
            sweep_interval
        };

        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            sweeper: Arc::new(Mutex::new(None)),
            timeout,
            sweep_interval,
        }
    }

    /// Record activity for `user_id` now
    pub async fn touch(&self, user_id: &str) {
        self.touch_at(user_id, Instant::now()).await;
    }

    /// Record activity for `user_id` at an explicit instant
    pub async fn touch_at(&self, user_id: &str, at: Instant) {
        self.entries.write().await.insert(user_id.to_string(), at);
    }

    /// Number of tracked users. Does not evict.
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Evict every entry idle for longer than the timeout
    ///
    /// Returns the number of evicted entries.
    pub async fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, last_seen| now.saturating_duration_since(*last_seen) <= self.timeout);
        before - entries.len()
    }

    /// Spawn the periodic sweeper. No-op if it is already running.
    pub async fn start(&self) {
        let mut sweeper = self.sweeper.lock().await;
        if sweeper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let tracker = self.clone();
        let period = self.sweep_interval;

        tracing::info!(
            timeout_secs = self.timeout.as_secs(),
            interval_secs = period.as_secs(),
            "presence sweeper started"
        );

        *sweeper = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;
                let removed = tracker.sweep(Instant::now()).await;
                if removed > 0 {
                    let online = tracker.count().await;
                    tracing::debug!(removed, online, "swept idle users");
                }
            }
        }));
    }

    /// Stop the periodic sweeper. No-op if it is not running.
    pub async fn stop(&self) {
        if let Some(handle) = self.sweeper.lock().await.take() {
            handle.abort();
            tracing::info!("presence sweeper stopped");
        }
    }

    /// Whether the periodic sweeper is active
    pub async fn is_running(&self) -> bool {
        self.sweeper
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// Pick the presence key for a caller
///
/// Uses the supplied identifier when it is non-blank; otherwise derives one
/// from the client origin and the current time so anonymous callers get
/// distinct slots.
#[must_use]
pub fn resolve_user_id(supplied: Option<&str>, origin: &str) -> String {
    match supplied.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("{origin}-{}", chrono::Utc::now().timestamp_millis()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_distinct_touches_are_counted() {
        let tracker = PresenceTracker::default();
        tracker.touch("u1").await;
        tracker.touch("u2").await;
        tracker.touch("u3").await;
        assert_eq!(tracker.count().await, 3);
    }

    #[tokio::test]
    async fn test_repeat_touch_keeps_single_entry() {
        let tracker = PresenceTracker::default();
        tracker.touch("u1").await;
        tracker.touch("u1").await;
        assert_eq!(tracker.count().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_after_timeout_evicts_everyone() {
        let tracker = PresenceTracker::default();
        let t0 = Instant::now();
        tracker.touch_at("u1", t0).await;
        tracker.touch_at("u2", t0).await;
        assert_eq!(tracker.count().await, 2);

        let removed = tracker.sweep(t0 + Duration::from_millis(300_001)).await;
        assert_eq!(removed, 2);
        assert_eq!(tracker.count().await, 0);
    }

    #[tokio::test]
    async fn test_sweep_keeps_entry_at_boundary() {
        let tracker = PresenceTracker::default();
        let t0 = Instant::now();
        tracker.touch_at("u1", t0).await;

        assert_eq!(tracker.sweep(t0 + DEFAULT_TIMEOUT).await, 0);
        assert_eq!(tracker.count().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_only_removes_stale_entries() {
        let tracker = PresenceTracker::default();
        let t0 = Instant::now();
        tracker.touch_at("old", t0).await;
        tracker.touch_at("fresh", t0 + Duration::from_secs(200)).await;

        let removed = tracker.sweep(t0 + Duration::from_secs(301)).await;
        assert_eq!(removed, 1);
        assert_eq!(tracker.count().await, 1);
    }

    #[tokio::test]
    async fn test_retouch_refreshes_entry() {
        let tracker = PresenceTracker::default();
        let t0 = Instant::now();
        tracker.touch_at("u1", t0).await;
        tracker.touch_at("u1", t0 + Duration::from_secs(250)).await;

        tracker.sweep(t0 + Duration::from_secs(400)).await;
        assert_eq!(tracker.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweeper_evicts_idle_users() {
        let tracker = PresenceTracker::new(Duration::from_secs(300), Duration::from_secs(60));
        tracker.touch("u1").await;
        tracker.start().await;
        assert!(tracker.is_running().await);

        tokio::time::sleep(Duration::from_secs(290)).await;
        assert_eq!(tracker.count().await, 1);

        tokio::time::sleep(Duration::from_secs(80)).await;
        assert_eq!(tracker.count().await, 0);

        tracker.stop().await;
        assert!(!tracker.is_running().await);
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let tracker = PresenceTracker::default();
        tracker.start().await;
        tracker.start().await;
        assert!(tracker.is_running().await);

        tracker.stop().await;
        tracker.stop().await;
        assert!(!tracker.is_running().await);
    }

    #[tokio::test]
    async fn test_zero_sweep_interval_still_runs() {
        let tracker = PresenceTracker::new(DEFAULT_TIMEOUT, Duration::ZERO);
        assert_eq!(tracker.sweep_interval, DEFAULT_SWEEP_INTERVAL);

        tracker.start().await;
        tokio::task::yield_now().await;
        assert!(tracker.is_running().await);

        tracker.stop().await;
    }

    #[test]
    fn test_resolve_user_id_prefers_supplied() {
        assert_eq!(resolve_user_id(Some("learner-42"), "10.0.0.1"), "learner-42");
        assert_eq!(resolve_user_id(Some("  padded  "), "10.0.0.1"), "padded");
    }

    #[test]
    fn test_resolve_user_id_falls_back_to_origin() {
        let id = resolve_user_id(None, "10.0.0.1");
        assert!(id.starts_with("10.0.0.1-"));

        let blank = resolve_user_id(Some("   "), "10.0.0.2");
        assert!(blank.starts_with("10.0.0.2-"));
    }
}
