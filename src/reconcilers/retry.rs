// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-key exponential backoff for failed reconciles

use crate::constants::requeue::{ERROR_BASE_SECS, ERROR_MAX_SECS};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Tracks consecutive failures per ClusterScan key
#[derive(Debug, Default)]
pub struct RetryTracker {
    attempts: Mutex<HashMap<String, u32>>,
}

impl RetryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure and return the new attempt count
    pub fn increment(&self, key: &str) -> u32 {
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = attempts.entry(key.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Forget failures after a successful reconcile
    pub fn reset(&self, key: &str) {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn get(&self, key: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Drop counts for scans that are no longer known to the controller
    pub fn cleanup(&self, active_keys: &[String]) {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| active_keys.contains(key));
    }
}

/// Delay before retrying attempt `attempt` (1-based): 5s, 10s, 20s, ... capped at 5 minutes.
/// Retries never stop; failures are always transient.
pub fn compute_backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let delay_secs = ERROR_BASE_SECS.saturating_mul(2u64.pow(exponent));
    Duration::from_secs(delay_secs.min(ERROR_MAX_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_tracker_increment() {
        let tracker = RetryTracker::new();

        assert_eq!(tracker.get("scans/foo"), 0);
        assert_eq!(tracker.increment("scans/foo"), 1);
        assert_eq!(tracker.increment("scans/foo"), 2);
        assert_eq!(tracker.get("scans/bar"), 0);
    }

    #[test]
    fn test_retry_tracker_reset() {
        let tracker = RetryTracker::new();

        tracker.increment("scans/foo");
        tracker.increment("scans/foo");
        tracker.reset("scans/foo");

        assert_eq!(tracker.get("scans/foo"), 0);
    }

    #[test]
    fn test_retry_tracker_cleanup_drops_deleted_scans() {
        let tracker = RetryTracker::new();

        tracker.increment("scans/foo");
        tracker.increment("scans/gone");
        tracker.cleanup(&["scans/foo".to_string()]);

        assert_eq!(tracker.get("scans/foo"), 1);
        assert_eq!(tracker.get("scans/gone"), 0);

        tracker.cleanup(&[]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(compute_backoff(1), Duration::from_secs(5));
        assert_eq!(compute_backoff(2), Duration::from_secs(10));
        assert_eq!(compute_backoff(3), Duration::from_secs(20));
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(compute_backoff(7), Duration::from_secs(300));
        assert_eq!(compute_backoff(u32::MAX), Duration::from_secs(300));
    }
}
