//! # Dispatcher
//!
//! Scan distribution module.
//!
//! Responsibilities:
//! - Consume `RingScan`s from the ingestion worker
//! - Fan out to multiple sinks, including the registration hand-off
//! - Isolate slow sinks so they never block the ingestion path

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{RingScan, ScanSink};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::{Offer, SinkHandle};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{ChannelSink, FileSink, LogSink, NetworkSink, ScanSummary};
