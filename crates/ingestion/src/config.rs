//! Backpressure configuration and metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use contracts::{IngestionConfig, ScanStats};
use metrics::{counter, gauge};

pub use contracts::DropPolicy;

/// Backpressure configuration
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// Frame queue depth
    pub queue_depth: usize,

    /// Drop policy when full
    pub drop_policy: DropPolicy,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            queue_depth: 2,
            drop_policy: DropPolicy::DropOldest,
        }
    }
}

impl BackpressureConfig {
    /// Create new backpressure configuration
    pub fn new(queue_depth: usize, drop_policy: DropPolicy) -> Self {
        Self {
            queue_depth,
            drop_policy,
        }
    }
}

impl From<&IngestionConfig> for BackpressureConfig {
    fn from(config: &IngestionConfig) -> Self {
        Self::new(config.queue_depth, config.drop_policy)
    }
}

/// Ingestion metrics
///
/// Atomic counters for the run summary; every update is mirrored to the
/// `metrics` facade.
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Frames offered to the queue
    pub frames_received: AtomicU64,

    /// Frames evicted or rejected by the queue
    pub frames_dropped: AtomicU64,

    /// Frames consumed by warm-up
    pub frames_skipped: AtomicU64,

    /// Scans produced by the controller
    pub scans_dispatched: AtomicU64,

    /// Points outside the calibrated field of view
    pub points_out_of_fov: AtomicU64,

    /// Non-finite or near-origin points
    pub points_invalid: AtomicU64,

    /// Raw payloads that failed to decode
    pub decode_errors: AtomicU64,

    /// Current queue length
    pub queue_len: AtomicUsize,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        counter!("ringscan_frames_received_total").increment(1);
    }

    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
        counter!("ringscan_frames_dropped_total").increment(1);
    }

    pub fn record_skipped(&self) {
        self.frames_skipped.fetch_add(1, Ordering::Relaxed);
        counter!("ringscan_frames_skipped_total").increment(1);
    }

    /// Record a dispatched scan and its point accounting
    pub fn record_dispatched(&self, stats: &ScanStats) {
        self.scans_dispatched.fetch_add(1, Ordering::Relaxed);
        self.points_out_of_fov
            .fetch_add(u64::from(stats.out_of_fov), Ordering::Relaxed);
        self.points_invalid
            .fetch_add(u64::from(stats.invalid), Ordering::Relaxed);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
        counter!("ringscan_decode_errors_total").increment(1);
    }

    /// Update queue length
    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
        gauge!("ringscan_frame_queue_len").set(len as f64);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_skipped: self.frames_skipped.load(Ordering::Relaxed),
            scans_dispatched: self.scans_dispatched.load(Ordering::Relaxed),
            points_out_of_fov: self.points_out_of_fov.load(Ordering::Relaxed),
            points_invalid: self.points_invalid.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_received: u64,
    pub frames_dropped: u64,
    pub frames_skipped: u64,
    pub scans_dispatched: u64,
    pub points_out_of_fov: u64,
    pub points_invalid: u64,
    pub decode_errors: u64,
    pub queue_len: usize,
}
