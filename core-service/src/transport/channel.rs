//! In-process channel transport

use tokio::sync::mpsc;

use super::{MessageSink, MessageSource, TransportError};

pub struct ChannelSource {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { rx }
    }
}

impl MessageSource for ChannelSource {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        // all senders dropped = end of stream
        Ok(self.rx.recv().await)
    }
}

pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Vec<u8>>) -> Self {
        Self { tx }
    }
}

impl MessageSink for ChannelSink {
    async fn publish(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.tx.send(payload.to_vec()).map_err(|_| TransportError::Closed)
    }
}

/// Bounded inbound pair plus unbounded outbound pair
pub fn pair(capacity: usize) -> (
    (mpsc::Sender<Vec<u8>>, ChannelSource),
    (ChannelSink, mpsc::UnboundedReceiver<Vec<u8>>),
) {
    let (in_tx, in_rx) = mpsc::channel(capacity);
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    ((in_tx, ChannelSource::new(in_rx)), (ChannelSink::new(out_tx), out_rx))
}
