//! # Ingestion Pipeline
//!
//! Frame ingestion module.
//!
//! Responsibilities:
//! - Register frame sources (mock or real transport)
//! - Bounded frame queue with drop-oldest backpressure
//! - Warm-up skip and ring grouping (`IngestionController`)
//! - Single-consumer worker forwarding `RingScan`s downstream
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{BackpressureConfig, IngestionController, IngestionPipeline, IngestionWorker};
//!
//! let mut pipeline = IngestionPipeline::new(BackpressureConfig::default());
//! pipeline.register_source(Box::new(source))?;
//! let frames = pipeline.take_receiver().unwrap();
//!
//! let controller = IngestionController::new(mapper, 20);
//! let (scan_tx, mut scan_rx) = tokio::sync::mpsc::channel(4);
//! let worker = IngestionWorker::spawn(controller, frames, scan_tx, pipeline.metrics());
//!
//! pipeline.start_all();
//! while let Some(scan) = scan_rx.recv().await {
//!     // Hand off to registration
//! }
//! ```

pub mod codec;
mod config;
mod controller;
mod error;
mod mock;
mod pipeline;
mod queue;
mod worker;

// Re-exports
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use contracts::{Frame, RingScan};
pub use controller::{ControllerState, DispatchOutcome, IngestionController};
pub use error::{IngestionError, Result};
pub use mock::{MockFrameSource, MockSourceConfig};
pub use pipeline::IngestionPipeline;
pub use queue::{FrameQueue, PushOutcome};
pub use worker::{IngestionWorker, WorkerReport};
