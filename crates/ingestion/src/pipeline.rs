//! Ingestion Pipeline main entry

use std::collections::HashMap;
use std::sync::Arc;

use async_channel::Receiver;
use contracts::{Frame, FrameSource};
use tracing::{debug, info, instrument};

use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::error::{IngestionError, Result};
use crate::queue::FrameQueue;

/// Ingestion Pipeline
///
/// Connects frame sources to the bounded frame queue. Every registered
/// source feeds the same queue; the receiver goes to one `IngestionWorker`.
pub struct IngestionPipeline {
    /// Registered sources
    sources: HashMap<String, Box<dyn FrameSource>>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Producer side (shared by all sources)
    queue: FrameQueue,

    /// Consumer side
    rx: Option<Receiver<Frame>>,
}

impl IngestionPipeline {
    /// Create a pipeline with the given backpressure configuration
    pub fn new(config: BackpressureConfig) -> Self {
        let metrics = Arc::new(IngestionMetrics::new());
        let (queue, rx) = FrameQueue::bounded(&config, metrics.clone());

        Self {
            sources: HashMap::new(),
            metrics,
            queue,
            rx: Some(rx),
        }
    }

    /// Register a frame source
    ///
    /// # Errors
    /// `DuplicateSource` if a source with the same ID is registered
    #[instrument(
        name = "ingestion_register_source",
        skip(self, source),
        fields(source_id = %source.source_id())
    )]
    pub fn register_source(&mut self, source: Box<dyn FrameSource>) -> Result<()> {
        let source_id = source.source_id().to_string();
        if self.sources.contains_key(&source_id) {
            return Err(IngestionError::DuplicateSource { source_id });
        }
        debug!(source_id = %source_id, "registered frame source");
        self.sources.insert(source_id, source);
        Ok(())
    }

    /// Start all registered sources
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.sources.len(), "starting all frame sources");
        for (source_id, source) in &self.sources {
            if !source.is_listening() {
                debug!(source_id = %source_id, "starting source");
                source.listen(self.queue.callback());
            }
        }
    }

    /// Stop all sources
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.sources.len(), "stopping all frame sources");
        for (source_id, source) in &self.sources {
            if source.is_listening() {
                debug!(source_id = %source_id, "stopping source");
                source.stop();
            }
        }
    }

    /// Stop all sources and close the queue
    ///
    /// The worker drains what is still queued, then ends.
    pub fn shutdown(&self) {
        self.stop_all();
        self.queue.close();
    }

    /// Get the frame receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<Frame>> {
        self.rx.take()
    }

    /// Producer handle for pushing frames directly
    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// True while any registered source is still producing
    pub fn any_listening(&self) -> bool {
        self.sources.values().any(|s| s.is_listening())
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
