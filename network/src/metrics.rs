//! Per-peer request metrics keyed by RPC method name.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use cinder_messages::RpcMethod;

/// Aggregate call statistics for one RPC method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodMetrics {
    /// Completed call attempts, successful or not.
    pub calls: u64,
    /// Calls that ended in a transport failure, timeout, or bad envelope.
    pub failures: u64,
    /// Total wall-clock time spent across all completed calls.
    pub total_elapsed: Duration,
}

impl MethodMetrics {
    /// Mean call duration, or zero when no call has completed yet.
    pub fn average_elapsed(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total_elapsed / self.calls as u32
        }
    }
}

/// Full metrics record for one peer: one entry per tracked method name.
pub type MetricsSnapshot = HashMap<String, MethodMetrics>;

/// Tracks call statistics for a fixed set of RPC methods.
///
/// The key set is fixed at construction and zero-initialized, so consumers
/// can enumerate the tracked methods before any call is made. `record`
/// updates existing entries only; a method outside the configured set is
/// ignored. Updates and snapshots go through one lock, so a snapshot taken
/// concurrently with an in-flight record sees either the pre- or the
/// post-update state, never a torn one.
pub struct MetricsTracker {
    entries: Mutex<HashMap<String, MethodMetrics>>,
}

impl MetricsTracker {
    /// Create a tracker with one zeroed entry per method name.
    pub fn new(methods: &[String]) -> Self {
        let entries = methods
            .iter()
            .map(|name| (name.clone(), MethodMetrics::default()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Record one completed call attempt against its method entry.
    pub fn record(&self, method: RpcMethod, elapsed: Duration, success: bool) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(method.as_str()) {
            entry.calls += 1;
            if !success {
                entry.failures += 1;
            }
            entry.total_elapsed += elapsed;
        }
    }

    /// Clone the full record.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.entries.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methods(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn zero_initialized_with_fixed_key_set() {
        let tracker = MetricsTracker::new(&methods(&["GetBlock", "GetBlocks", "Announce"]));
        let snapshot = tracker.snapshot();

        assert_eq!(snapshot.len(), 3);
        for name in ["GetBlock", "GetBlocks", "Announce"] {
            let entry = snapshot.get(name).expect("entry present before any call");
            assert_eq!(entry.calls, 0);
            assert_eq!(entry.failures, 0);
            assert_eq!(entry.total_elapsed, Duration::ZERO);
        }
    }

    #[test]
    fn record_updates_calls_failures_and_time() {
        let tracker = MetricsTracker::new(&methods(&["GetBlock"]));

        tracker.record(RpcMethod::GetBlock, Duration::from_millis(10), true);
        tracker.record(RpcMethod::GetBlock, Duration::from_millis(30), false);

        let entry = tracker.snapshot().remove("GetBlock").unwrap();
        assert_eq!(entry.calls, 2);
        assert_eq!(entry.failures, 1);
        assert_eq!(entry.total_elapsed, Duration::from_millis(40));
        assert_eq!(entry.average_elapsed(), Duration::from_millis(20));
    }

    #[test]
    fn unconfigured_method_is_ignored() {
        let tracker = MetricsTracker::new(&methods(&["GetBlock"]));

        tracker.record(RpcMethod::PushBlock, Duration::from_millis(5), true);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["GetBlock"].calls, 0);
    }

    #[test]
    fn average_of_zero_calls_is_zero() {
        assert_eq!(MethodMetrics::default().average_elapsed(), Duration::ZERO);
    }
}
