//! Metrics registry for agromart
//!
//! - Counters only, monotonic, reset only on process start
//! - Relaxed atomics: exact values, no cross-counter ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of the dispatch layer
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    requests: AtomicU64,
    requests_rejected: AtomicU64,
    writes: AtomicU64,
    writes_rejected: AtomicU64,
    queries_executed: AtomicU64,
    queries_rejected: AtomicU64,
    reservations_committed: AtomicU64,
    reservations_rejected: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_requests_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of an add/update/remove request
    pub fn record_write(&self, ok: bool) {
        Self::record(&self.writes, &self.writes_rejected, ok);
    }

    pub fn record_query(&self, ok: bool) {
        Self::record(&self.queries_executed, &self.queries_rejected, ok);
    }

    pub fn record_reservation(&self, ok: bool) {
        Self::record(&self.reservations_committed, &self.reservations_rejected, ok);
    }

    fn record(ok_counter: &AtomicU64, rejected_counter: &AtomicU64, ok: bool) {
        let counter = if ok { ok_counter } else { rejected_counter };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            writes_rejected: self.writes_rejected.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            reservations_committed: self.reservations_committed.load(Ordering::Relaxed),
            reservations_rejected: self.reservations_rejected.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        // A struct of plain integers always serializes
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub requests_rejected: u64,
    pub writes: u64,
    pub writes_rejected: u64,
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub reservations_committed: u64,
    pub reservations_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_zero() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_outcomes_split_by_result() {
        let registry = MetricsRegistry::new();
        registry.record_write(true);
        registry.record_write(false);
        registry.record_query(true);
        registry.record_query(true);
        registry.record_reservation(false);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.writes, 1);
        assert_eq!(snapshot.writes_rejected, 1);
        assert_eq!(snapshot.queries_executed, 2);
        assert_eq!(snapshot.queries_rejected, 0);
        assert_eq!(snapshot.reservations_committed, 0);
        assert_eq!(snapshot.reservations_rejected, 1);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_requests();
        registry.increment_requests();
        registry.increment_requests_rejected();

        let json = registry.to_json();
        assert_eq!(json["requests"], 2);
        assert_eq!(json["requests_rejected"], 1);
        assert_eq!(json["writes"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..50 {
                        reg.increment_requests();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().requests, 400);
    }
}
