//! Sink implementations
//!
//! Contains LogSink, FileSink, NetworkSink and ChannelSink.

mod channel;
mod file;
mod log;
mod network;

pub use self::channel::ChannelSink;
pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::network::{
    NetworkContent, NetworkFormat, NetworkParamError, NetworkSink, NetworkSinkConfig,
};

use contracts::{RingScan, ScanStats};
use serde::{Deserialize, Serialize};

/// Point-free description of a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_id: u64,
    pub timestamp: f64,
    pub frame_id: Option<u64>,
    pub stats: ScanStats,
    /// Points per ring, indexed by ring
    pub ring_counts: Vec<usize>,
}

impl From<&RingScan> for ScanSummary {
    fn from(scan: &RingScan) -> Self {
        Self {
            scan_id: scan.scan_id,
            timestamp: scan.timestamp,
            frame_id: scan.frame_id,
            stats: scan.stats,
            ring_counts: scan.rings.iter().map(|r| r.len()).collect(),
        }
    }
}
