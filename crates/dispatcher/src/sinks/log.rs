//! LogSink - logs scan summary via tracing

use contracts::{ContractError, RingScan, ScanSink};
use tracing::{info, instrument};

/// Sink that logs scan summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_scan_summary(&self, scan: &RingScan) {
        info!(
            sink = %self.name,
            scan_id = scan.scan_id,
            timestamp = scan.timestamp,
            rings = scan.ring_count(),
            empty_rings = scan.empty_rings(),
            points = scan.stats.points_assigned,
            out_of_fov = scan.stats.out_of_fov,
            invalid = scan.stats.invalid,
            "RingScan received"
        );
    }
}

impl ScanSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, scan),
        fields(sink = %self.name, scan_id = scan.scan_id)
    )]
    async fn write(&mut self, scan: &RingScan) -> Result<(), ContractError> {
        self.log_scan_summary(scan);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
