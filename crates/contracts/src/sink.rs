//! ScanSink trait - Dispatcher output interface
//!
//! Boundary to the registration collaborator and the debug outputs.

use crate::{ContractError, RingScan};

/// Scan output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(ScanSink: Send)]
pub trait LocalScanSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one ring-grouped scan
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, scan: &RingScan) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
