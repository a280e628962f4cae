//! Transport Module - where messages come from and where predictions go
//!
//! The worker only sees `MessageSource` / `MessageSink`; adapters:
//! - `channel.rs` - in-process tokio channels (tests, embedding)
//! - `stdio.rs` - JSON lines over stdin/stdout (default binary transport)
//! - `kafka.rs` - Kafka consumer/producer (feature `kafka`)

pub mod channel;
pub mod stdio;
#[cfg(feature = "kafka")]
pub mod kafka;

pub use channel::{ChannelSink, ChannelSource};
pub use stdio::{LineSink, LineSource};

/// Broker coordinates; only used with the `kafka` feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaSettings {
    pub bootstrap_servers: String,
    pub group_id: String,
    pub input_topic: String,
    pub output_topic: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("receive failed: {0}")]
    Receive(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("transport closed")]
    Closed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inbound side. `Ok(None)` means the stream has ended.
#[allow(async_fn_in_trait)]
pub trait MessageSource {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// Outbound side. Fire-and-forget: `Ok` means handed off, not delivered.
#[allow(async_fn_in_trait)]
pub trait MessageSink {
    async fn publish(&mut self, payload: &[u8]) -> Result<(), TransportError>;

    /// Drain anything still buffered. Called once when the worker stops.
    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}
