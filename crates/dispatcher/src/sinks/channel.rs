//! ChannelSink - in-process hand-off to the registration stage

use contracts::{ContractError, RingScan, ScanSink};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Sink forwarding scans to an in-process consumer
///
/// `write` waits for room in the consumer channel; the sink's own queue in
/// `SinkHandle` absorbs the wait, so a slow consumer only loses scans on this
/// sink.
pub struct ChannelSink {
    name: String,
    tx: Option<mpsc::Sender<RingScan>>,
}

impl ChannelSink {
    /// Create the sink and the consumer end
    pub fn new(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<RingScan>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                name: name.into(),
                tx: Some(tx),
            },
            rx,
        )
    }
}

impl ScanSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "channel_sink_write",
        skip(self, scan),
        fields(sink = %self.name, scan_id = scan.scan_id)
    )]
    async fn write(&mut self, scan: &RingScan) -> Result<(), ContractError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "channel closed"))?;
        tx.send(scan.clone())
            .await
            .map_err(|_| ContractError::sink_write(&self.name, "consumer dropped"))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.tx = None;
        debug!(sink = %self.name, "ChannelSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{RingGroup, ScanStats};

    fn scan(scan_id: u64) -> RingScan {
        RingScan {
            timestamp: 0.0,
            scan_id,
            frame_id: None,
            rings: vec![RingGroup::new(0), RingGroup::new(1)],
            stats: ScanStats::default(),
        }
    }

    #[tokio::test]
    async fn test_channel_sink_forwards() {
        let (mut sink, mut rx) = ChannelSink::new("registration", 4);
        sink.write(&scan(1)).await.unwrap();
        sink.write(&scan(2)).await.unwrap();
        sink.close().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().scan_id, 1);
        assert_eq!(rx.recv().await.unwrap().scan_id, 2);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_channel_sink_consumer_dropped() {
        let (mut sink, rx) = ChannelSink::new("registration", 1);
        drop(rx);
        assert!(sink.write(&scan(1)).await.is_err());
    }
}
