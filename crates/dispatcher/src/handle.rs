//! Per-sink queue and writer task.
//!
//! Each sink owns a bounded queue drained by its own task, so a slow or
//! failing sink only ever loses its own scans.

use std::sync::Arc;
use std::time::Instant;

use metrics::counter;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{RingScan, ScanSink};

use crate::metrics::SinkMetrics;

/// Result of offering a scan to a sink queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Queued,
    /// Queue full, the scan is lost for this sink only
    Dropped,
    /// Writer task is gone
    Closed,
}

pub struct SinkHandle {
    name: String,
    queue: mpsc::Sender<Arc<RingScan>>,
    metrics: Arc<SinkMetrics>,
    task: JoinHandle<()>,
}

impl SinkHandle {
    /// Start a writer task for `sink` behind a queue of `queue_capacity`
    pub fn spawn<S: ScanSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let (queue, pending) = mpsc::channel(queue_capacity.max(1));
        let worker = SinkWorker {
            name: sink.name().to_string(),
            sink,
            pending,
            metrics: Arc::new(SinkMetrics::new()),
        };

        let name = worker.name.clone();
        let metrics = Arc::clone(&worker.metrics);
        let task = tokio::spawn(worker.run());

        Self {
            name,
            queue,
            metrics,
            task,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Offer a scan without waiting
    pub fn offer(&self, scan: Arc<RingScan>) -> Offer {
        match self.queue.try_send(scan) {
            Ok(()) => {
                let queued = self.queue.max_capacity() - self.queue.capacity();
                self.metrics.set_queue_len(queued);
                Offer::Queued
            }
            Err(TrySendError::Full(scan)) => {
                self.metrics.inc_dropped_count();
                counter!(
                    "ringscan_sink_writes_total",
                    "sink" => self.name.clone(),
                    "status" => "dropped"
                )
                .increment(1);
                warn!(sink = %self.name, scan_id = scan.scan_id, "Sink queue full, scan dropped");
                Offer::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink writer is no longer running");
                Offer::Closed
            }
        }
    }

    /// Close the queue and wait for the writer to drain, flush and close
    #[instrument(name = "sink_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        let Self {
            name, queue, task, ..
        } = self;
        drop(queue);

        match task.await {
            Ok(()) => debug!(sink = %name, "Sink stopped"),
            Err(e) => error!(sink = %name, error = ?e, "Sink writer panicked"),
        }
    }
}

struct SinkWorker<S> {
    name: String,
    sink: S,
    pending: mpsc::Receiver<Arc<RingScan>>,
    metrics: Arc<SinkMetrics>,
}

impl<S: ScanSink> SinkWorker<S> {
    #[instrument(name = "sink_writer", skip(self), fields(sink = %self.name))]
    async fn run(mut self) {
        debug!("Sink writer started");

        while let Some(scan) = self.pending.recv().await {
            self.metrics.set_queue_len(self.pending.len());
            self.write(&scan).await;
        }

        if let Err(e) = self.sink.flush().await {
            error!(error = %e, "Sink flush failed");
        }
        if let Err(e) = self.sink.close().await {
            error!(error = %e, "Sink close failed");
        }
    }

    async fn write(&mut self, scan: &RingScan) {
        let started = Instant::now();
        let status = match self.sink.write(scan).await {
            Ok(()) => {
                self.metrics.record_write(started.elapsed());
                "ok"
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                error!(scan_id = scan.scan_id, error = %e, "Sink write failed");
                "error"
            }
        };
        counter!(
            "ringscan_sink_writes_total",
            "sink" => self.name.clone(),
            "status" => status
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, RingGroup, ScanStats};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Copy)]
    enum Behaviour {
        Record,
        Stall(Duration),
        Fail,
    }

    /// Sink that remembers which scan ids it was handed
    struct RecordingSink {
        behaviour: Behaviour,
        seen: Arc<Mutex<Vec<u64>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl RecordingSink {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                seen: Arc::default(),
                closed: Arc::default(),
            }
        }
    }

    impl ScanSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn write(&mut self, scan: &RingScan) -> Result<(), ContractError> {
            match self.behaviour {
                Behaviour::Fail => return Err(ContractError::sink_write("recording", "refused")),
                Behaviour::Stall(wait) => tokio::time::sleep(wait).await,
                Behaviour::Record => {}
            }
            self.seen.lock().unwrap().push(scan.scan_id);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    fn scan(scan_id: u64) -> Arc<RingScan> {
        Arc::new(RingScan {
            timestamp: scan_id as f64 * 0.1,
            scan_id,
            frame_id: None,
            rings: (0..4).map(RingGroup::new).collect(),
            stats: ScanStats::default(),
        })
    }

    #[tokio::test]
    async fn test_queued_scans_written_in_order_before_close() {
        let sink = RecordingSink::new(Behaviour::Record);
        let seen = Arc::clone(&sink.seen);
        let closed = Arc::clone(&sink.closed);

        let handle = SinkHandle::spawn(sink, 8);
        for id in 0..5 {
            assert_eq!(handle.offer(scan(id)), Offer::Queued);
        }
        let metrics = Arc::clone(handle.metrics());
        handle.shutdown().await;

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert!(*closed.lock().unwrap());
        assert_eq!(metrics.write_count(), 5);
    }

    #[tokio::test]
    async fn test_stalled_sink_drops_overflow() {
        let handle = SinkHandle::spawn(
            RecordingSink::new(Behaviour::Stall(Duration::from_millis(50))),
            2,
        );

        let dropped = (0..10)
            .map(|id| handle.offer(scan(id)))
            .filter(|o| *o == Offer::Dropped)
            .count();

        assert!(dropped > 0);
        assert_eq!(handle.metrics().dropped_count(), dropped as u64);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_writes_are_counted_not_fatal() {
        let sink = RecordingSink::new(Behaviour::Fail);
        let closed = Arc::clone(&sink.closed);

        let handle = SinkHandle::spawn(sink, 8);
        for id in 0..3 {
            handle.offer(scan(id));
        }
        let metrics = Arc::clone(handle.metrics());
        handle.shutdown().await;

        assert_eq!(metrics.failure_count(), 3);
        assert_eq!(metrics.write_count(), 0);
        assert!(*closed.lock().unwrap());
    }
}
