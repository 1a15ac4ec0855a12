//! Dispatcher - main loop for fan-out to sinks

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{RingScan, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{ChannelSink, FileSink, LogSink, NetworkSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<RingScan>,
}

impl DispatcherBuilder {
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<RingScan>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the dispatcher
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub async fn build(self) -> Result<Dispatcher, DispatcherError> {
        let mut handles = Vec::with_capacity(self.config.sinks.len());
        let mut channels = HashMap::new();

        for sink_config in &self.config.sinks {
            if handles.iter().any(|h: &SinkHandle| h.name() == sink_config.name) {
                return Err(DispatcherError::DuplicateSink(sink_config.name.clone()));
            }
            let (handle, channel) = create_sink_handle(sink_config).await?;
            if let Some(rx) = channel {
                channels.insert(sink_config.name.clone(), rx);
            }
            handles.push(handle);
        }

        Ok(Dispatcher {
            handles,
            channels,
            input_rx: self.input_rx,
        })
    }
}

/// Create a SinkHandle from configuration
///
/// Channel sinks also return the consumer end.
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
async fn create_sink_handle(
    config: &SinkConfig,
) -> Result<(SinkHandle, Option<mpsc::Receiver<RingScan>>), DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok((SinkHandle::spawn(sink, config.queue_capacity), None))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_open(&config.name, config.sink_type, e))?;
            Ok((SinkHandle::spawn(sink, config.queue_capacity), None))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::sink_open(&config.name, config.sink_type, e))?;
            Ok((SinkHandle::spawn(sink, config.queue_capacity), None))
        }
        SinkType::Channel => {
            let capacity = match config.params.get("capacity") {
                Some(raw) => raw.parse().map_err(|_| DispatcherError::InvalidParam {
                    name: config.name.clone(),
                    key: "capacity",
                    value: raw.clone(),
                })?,
                None => config.queue_capacity,
            };
            let (sink, rx) = ChannelSink::new(&config.name, capacity);
            Ok((SinkHandle::spawn(sink, config.queue_capacity), Some(rx)))
        }
    }
}

/// The main Dispatcher that fans out scans to sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    channels: HashMap<String, mpsc::Receiver<RingScan>>,
    input_rx: mpsc::Receiver<RingScan>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>, input_rx: mpsc::Receiver<RingScan>) -> Self {
        Self {
            handles,
            channels: HashMap::new(),
            input_rx,
        }
    }

    /// Consumer end of a channel sink
    ///
    /// Can only be taken once per sink.
    pub fn take_channel(&mut self, sink_name: &str) -> Option<mpsc::Receiver<RingScan>> {
        self.channels.remove(sink_name)
    }

    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Shared metrics of every sink, by name
    pub fn sink_metrics(&self) -> Vec<(String, Arc<crate::SinkMetrics>)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), Arc::clone(h.metrics())))
            .collect()
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the dispatcher main loop
    ///
    /// Returns when the input channel is closed, after every sink has
    /// drained its queue and closed.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "Dispatcher started");

        let mut scan_count: u64 = 0;

        while let Some(scan) = self.input_rx.recv().await {
            scan_count += 1;
            self.dispatch_scan(Arc::new(scan));

            if scan_count.is_multiple_of(100) {
                debug!(scans = scan_count, "Dispatcher progress");
            }
        }

        info!(scans = scan_count, "Dispatcher input closed, shutting down");

        for handle in self.handles {
            handle.shutdown().await;
        }

        info!("Dispatcher shutdown complete");
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    fn dispatch_scan(&self, scan: Arc<RingScan>) {
        for handle in &self.handles {
            handle.offer(Arc::clone(&scan));
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs, input_rx))]
pub async fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    input_rx: mpsc::Receiver<RingScan>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
    };
    DispatcherBuilder::new(config, input_rx).build().await
}
