//! Pipeline orchestrator - coordinates all components.
//!
//! Frames come from the synthetic source, pass the bounded frame queue and
//! the ingestion worker, and leave as ring scans through the dispatcher.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{PipelineBlueprint, RingScan};
use ingestion::{
    BackpressureConfig, IngestionController, IngestionPipeline, IngestionWorker, MockFrameSource,
    MockSourceConfig,
};
use observability::{record_scan_interval_ms, record_scan_metrics, record_scan_queue_depth};
use scan_mapper::ScanMapper;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// How long the dispatcher gets to flush its sinks on shutdown
const DISPATCHER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll period for detecting that every source has finished
const SOURCE_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The pipeline blueprint
    pub blueprint: PipelineBlueprint,

    /// Maximum number of scans to dispatch (None = unlimited)
    pub max_scans: Option<u64>,

    /// Stop the synthetic source after this many frames (None = unlimited)
    pub max_frames: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline until a limit is reached, the source ends or
    /// `shutdown` resolves
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Calibration
        let mapper =
            Arc::new(ScanMapper::from_config(&blueprint.calibration).map_err(CliError::from)?);
        let (fov_min, fov_max) = mapper.vertical_fov();
        info!(
            profile = %mapper.profile(),
            rings = mapper.ring_count(),
            fov_min,
            fov_max,
            "Scan mapper configured"
        );

        // Ingestion
        let mut ingestion =
            IngestionPipeline::new(BackpressureConfig::from(&blueprint.ingestion));
        let mut source_config = MockSourceConfig::from(&blueprint.source);
        source_config.max_frames = self.config.max_frames;
        let source =
            MockFrameSource::new(source_config, &mapper).with_metrics(ingestion.metrics());
        info!(
            points_per_frame = source.points_per_frame(),
            frequency_hz = blueprint.source.frequency_hz,
            "Synthetic source configured"
        );
        ingestion
            .register_source(Box::new(source))
            .context("Failed to register frame source")?;

        let output_capacity = blueprint.ingestion.output_capacity.max(1);
        let controller =
            IngestionController::from_config(Arc::clone(&mapper), &blueprint.ingestion);
        let frames = ingestion
            .take_receiver()
            .context("Failed to get ingestion receiver")?;
        let (scan_tx, mut scan_rx) = mpsc::channel::<RingScan>(output_capacity);
        let worker = IngestionWorker::spawn(controller, frames, scan_tx, ingestion.metrics());

        // Dispatcher
        let (dispatch_tx, dispatch_rx) = mpsc::channel::<RingScan>(output_capacity);
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - scans will be discarded");
        }
        let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), dispatch_rx)
            .await
            .context("Failed to create dispatcher")?;
        let sink_metrics = dispatcher.sink_metrics();
        let dispatcher_handle = dispatcher.spawn();
        info!(sinks = sink_metrics.len(), "Dispatcher started");

        let mut stats = PipelineStats {
            active_sources: ingestion.source_count(),
            active_sinks: sink_metrics.len(),
            ..Default::default()
        };

        ingestion.start_all();
        info!(
            max_scans = ?self.config.max_scans,
            warmup_frames = blueprint.ingestion.warmup_frames,
            "Pipeline running"
        );

        let max_scans = self.config.max_scans;
        let mut shutdown = pin!(shutdown);
        let forward = async {
            let mut last_timestamp: Option<f64> = None;
            let mut source_check = tokio::time::interval(SOURCE_CHECK_INTERVAL);
            let mut sources_done = false;

            loop {
                let scan = tokio::select! {
                    scan = scan_rx.recv() => match scan {
                        Some(scan) => scan,
                        None => {
                            info!("Scan stream ended");
                            break;
                        }
                    },
                    _ = &mut shutdown => {
                        warn!("Received shutdown signal, stopping pipeline...");
                        break;
                    }
                    _ = source_check.tick(), if !sources_done => {
                        // Closing lets the worker drain the queue and end the stream
                        if !ingestion.any_listening() {
                            info!("All frame sources finished, draining queue");
                            ingestion.queue().close();
                            sources_done = true;
                        }
                        continue;
                    }
                };

                record_scan_metrics(&scan);
                if let Some(last) = last_timestamp {
                    record_scan_interval_ms((scan.timestamp - last) * 1000.0);
                }
                last_timestamp = Some(scan.timestamp);
                stats.scan_metrics.update(&scan);
                stats.scans_dispatched += 1;

                debug!(
                    scan_id = scan.scan_id,
                    timestamp = format!("{:.3}", scan.timestamp),
                    points = scan.stats.points_assigned,
                    out_of_fov = scan.stats.out_of_fov,
                    empty_rings = scan.empty_rings(),
                    "Ring scan produced"
                );

                if dispatch_tx.send(scan).await.is_err() {
                    warn!("Dispatcher channel closed");
                    break;
                }
                record_scan_queue_depth(dispatch_tx.max_capacity() - dispatch_tx.capacity());

                if let Some(max) = max_scans {
                    if stats.scans_dispatched >= max {
                        info!(scans = stats.scans_dispatched, "Reached max scans limit");
                        break;
                    }
                }
            }
        };

        if let Some(timeout) = self.config.timeout {
            if tokio::time::timeout(timeout, forward).await.is_err() {
                warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
            }
        } else {
            forward.await;
        }

        // Shutdown: source first, then the worker, then the sinks
        info!("Shutting down pipeline...");
        ingestion.shutdown();
        drop(scan_rx);

        let report = worker
            .await
            .map_err(|e| CliError::pipeline_execution(format!("ingestion worker failed: {e}")))?;
        info!(
            frames_processed = report.frames_processed,
            frames_skipped = report.frames_skipped,
            scans = report.scans_dispatched,
            "Ingestion worker finished"
        );

        drop(dispatch_tx);
        if tokio::time::timeout(DISPATCHER_DRAIN_TIMEOUT, dispatcher_handle)
            .await
            .is_err()
        {
            warn!("Dispatcher did not drain in time");
        }

        stats.ingestion = ingestion.metrics().snapshot();
        stats.sinks = sink_metrics
            .iter()
            .map(|(name, m)| {
                (
                    name.clone(),
                    m.write_count(),
                    m.failure_count(),
                    m.dropped_count(),
                )
            })
            .collect();
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            scan_rate = format!("{:.2}", stats.scan_rate()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
