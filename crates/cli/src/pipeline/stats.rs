//! Pipeline statistics and metrics.

use std::time::Duration;

use ingestion::MetricsSnapshot as IngestionSnapshot;
use observability::ScanMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Scans forwarded to the dispatcher
    pub scans_dispatched: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of registered frame sources
    pub active_sources: usize,

    /// Number of configured sinks
    pub active_sinks: usize,

    /// Frame counters at shutdown
    pub ingestion: IngestionSnapshot,

    /// Per-sink `(name, writes, failures, dropped)`
    pub sinks: Vec<(String, u64, u64, u64)>,

    /// Scan metrics aggregator
    pub scan_metrics: ScanMetricsAggregator,
}

impl PipelineStats {
    /// Scans per second
    pub fn scan_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.scans_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Frames evicted or rejected by the frame queue, as a percentage
    pub fn drop_rate(&self) -> f64 {
        let received = self.ingestion.frames_received;
        if received > 0 {
            (self.ingestion.frames_dropped as f64 / received as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Scans dispatched: {}", self.scans_dispatched);
        println!("   ├─ Scan rate: {:.2}/s", self.scan_rate());
        println!("   ├─ Active sources: {}", self.active_sources);
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\nFrames");
        println!("   ├─ Received: {}", self.ingestion.frames_received);
        println!(
            "   ├─ Dropped: {} ({:.2}%)",
            self.ingestion.frames_dropped,
            self.drop_rate()
        );
        println!("   ├─ Warm-up skipped: {}", self.ingestion.frames_skipped);
        println!("   └─ Decode errors: {}", self.ingestion.decode_errors);

        println!("\n{}", self.scan_metrics.summary());

        if !self.sinks.is_empty() {
            println!("Sinks");
            for (i, (name, writes, failures, dropped)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: {} written, {} failed, {} dropped",
                    prefix, name, writes, failures, dropped
                );
            }
        }

        println!();
    }
}
