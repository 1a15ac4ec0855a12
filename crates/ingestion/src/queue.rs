//! Bounded frame queue in front of the controller

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{DropPolicy, Frame, FrameCallback};
use tracing::{trace, warn};

use crate::config::{BackpressureConfig, IngestionMetrics};

/// What happened to a pushed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Enqueued without loss
    Queued,
    /// Enqueued after evicting the oldest queued frame
    Evicted,
    /// Queue full, incoming frame discarded
    Rejected,
    /// Consumer gone
    Closed,
}

/// Producer side of the frame queue
///
/// Cheap to clone; every clone feeds the same single consumer.
#[derive(Clone)]
pub struct FrameQueue {
    tx: Sender<Frame>,
    drop_policy: DropPolicy,
    metrics: Arc<IngestionMetrics>,
}

impl FrameQueue {
    /// Create the queue and its consumer end
    ///
    /// A depth of 0 is treated as 1.
    pub fn bounded(
        config: &BackpressureConfig,
        metrics: Arc<IngestionMetrics>,
    ) -> (Self, Receiver<Frame>) {
        let (tx, rx) = bounded(config.queue_depth.max(1));
        (
            Self {
                tx,
                drop_policy: config.drop_policy,
                metrics,
            },
            rx,
        )
    }

    /// Offer a frame, applying the drop policy when full
    ///
    /// Never blocks.
    pub fn push(&self, frame: Frame) -> PushOutcome {
        self.metrics.record_received();
        let frame_id = frame.frame_id;

        let outcome = match self.drop_policy {
            DropPolicy::DropOldest => match self.tx.force_send(frame) {
                Ok(None) => PushOutcome::Queued,
                Ok(Some(evicted)) => {
                    self.metrics.record_dropped();
                    trace!(
                        evicted_frame = ?evicted.frame_id,
                        evicted_ts = evicted.timestamp,
                        "frame dropped (oldest)"
                    );
                    PushOutcome::Evicted
                }
                Err(_) => PushOutcome::Closed,
            },
            DropPolicy::DropNewest => match self.tx.try_send(frame) {
                Ok(()) => PushOutcome::Queued,
                Err(TrySendError::Full(_)) => {
                    self.metrics.record_dropped();
                    trace!(frame_id = ?frame_id, "frame dropped (newest)");
                    PushOutcome::Rejected
                }
                Err(TrySendError::Closed(_)) => PushOutcome::Closed,
            },
        };

        if outcome == PushOutcome::Closed {
            warn!(frame_id = ?frame_id, "frame queue closed");
        } else {
            self.metrics.update_queue_len(self.tx.len());
        }
        outcome
    }

    /// Callback that pushes every delivered frame into this queue
    pub fn callback(&self) -> FrameCallback {
        let queue = self.clone();
        Arc::new(move |frame| {
            queue.push(frame);
        })
    }

    /// Frames currently queued
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(1)
    }

    pub fn drop_policy(&self) -> DropPolicy {
        self.drop_policy
    }

    /// Close the queue; the consumer drains what is left and stops
    pub fn close(&self) -> bool {
        self.tx.close()
    }
}
