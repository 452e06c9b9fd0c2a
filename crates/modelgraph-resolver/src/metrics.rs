//! Cache hit/miss counters (thread-safe).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Resolution cache metrics.
///
/// A "miss" means the answer was computed by walking the metamodel; a "hit"
/// means it came out of a memo table. Counters are cheap relaxed atomics and
/// clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct ResolverMetrics {
    containment_hits: Arc<AtomicU64>,
    containment_misses: Arc<AtomicU64>,
    endpoint_hits: Arc<AtomicU64>,
    endpoint_misses: Arc<AtomicU64>,
}

/// Plain-value snapshot of [`ResolverMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub containment_hits: u64,
    pub containment_misses: u64,
    pub endpoint_hits: u64,
    pub endpoint_misses: u64,
}

impl ResolverMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a containment cache hit.
    pub fn record_containment_hit(&self) {
        self.containment_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a containment resolution computed from the metamodel.
    pub fn record_containment_miss(&self) {
        self.containment_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an endpoint cache hit.
    pub fn record_endpoint_hit(&self) {
        self.endpoint_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an endpoint resolution computed from the metamodel.
    pub fn record_endpoint_miss(&self) {
        self.endpoint_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters at once.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            containment_hits: self.containment_hits.load(Ordering::Relaxed),
            containment_misses: self.containment_misses.load(Ordering::Relaxed),
            endpoint_hits: self.endpoint_hits.load(Ordering::Relaxed),
            endpoint_misses: self.endpoint_misses.load(Ordering::Relaxed),
        }
    }
}
