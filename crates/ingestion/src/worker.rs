//! Single-consumer frame worker

use std::sync::Arc;

use async_channel::Receiver;
use contracts::{Frame, RingScan};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::IngestionMetrics;
use crate::controller::{DispatchOutcome, IngestionController};

/// Totals of one worker run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Frames taken from the queue
    pub frames_processed: u64,
    /// Frames consumed by warm-up
    pub frames_skipped: u64,
    /// Scans handed downstream
    pub scans_dispatched: u64,
}

/// Drives an `IngestionController` from the frame queue
///
/// Exactly one worker consumes a queue, so frames are processed strictly one
/// at a time. Sending a scan waits for room downstream; while it waits the
/// frame queue fills and its drop policy takes over.
pub struct IngestionWorker;

impl IngestionWorker {
    /// Spawn the worker task
    ///
    /// The task ends when the frame queue is closed and drained, or when the
    /// scan receiver is dropped.
    pub fn spawn(
        controller: IngestionController,
        frames: Receiver<Frame>,
        scans: mpsc::Sender<RingScan>,
        metrics: Arc<IngestionMetrics>,
    ) -> JoinHandle<WorkerReport> {
        tokio::spawn(Self::run(controller, frames, scans, metrics))
    }

    #[instrument(name = "ingestion_worker", skip_all)]
    async fn run(
        mut controller: IngestionController,
        frames: Receiver<Frame>,
        scans: mpsc::Sender<RingScan>,
        metrics: Arc<IngestionMetrics>,
    ) -> WorkerReport {
        let mut report = WorkerReport::default();
        info!(
            warmup_remaining = controller.warmup_remaining(),
            "ingestion worker started"
        );

        while let Ok(frame) = frames.recv().await {
            metrics.update_queue_len(frames.len());
            report.frames_processed += 1;

            match controller.on_frame(frame) {
                DispatchOutcome::Skipped => {
                    report.frames_skipped += 1;
                    metrics.record_skipped();
                }
                DispatchOutcome::Dispatched(scan) => {
                    metrics.record_dispatched(&scan.stats);
                    let scan_id = scan.scan_id;
                    if scans.send(scan).await.is_err() {
                        warn!(scan_id, "scan receiver dropped, stopping worker");
                        break;
                    }
                    report.scans_dispatched += 1;
                    debug!(scan_id, "scan forwarded");
                }
            }
        }

        info!(
            frames = report.frames_processed,
            skipped = report.frames_skipped,
            dispatched = report.scans_dispatched,
            "ingestion worker stopped"
        );
        report
    }
}
