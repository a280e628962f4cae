//! Kafka transport (librdkafka)
//!
//! Consumer joins `group.id` and starts from the latest offset; the producer
//! enqueues without awaiting the delivery report and is flushed on close.

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;

use super::{KafkaSettings, MessageSink, MessageSource, TransportError};

/// Upper bound on draining the producer queue at shutdown
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    pub fn connect(settings: &KafkaSettings) -> Result<Self, TransportError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &settings.bootstrap_servers)
            .set("group.id", &settings.group_id)
            .set("auto.offset.reset", "latest")
            .set("enable.auto.commit", "true")
            .create()
            .map_err(|e| TransportError::Receive(e.to_string()))?;

        consumer
            .subscribe(&[settings.input_topic.as_str()])
            .map_err(|e| TransportError::Receive(e.to_string()))?;

        log::info!(
            "Kafka consumer subscribed to '{}' on {} (group {})",
            settings.input_topic,
            settings.bootstrap_servers,
            settings.group_id
        );
        Ok(Self { consumer })
    }
}

impl MessageSource for KafkaSource {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| TransportError::Receive(e.to_string()))?;
        Ok(Some(message.payload().unwrap_or_default().to_vec()))
    }
}

pub struct KafkaSink {
    producer: FutureProducer,
    topic: String,
}

impl KafkaSink {
    pub fn connect(settings: &KafkaSettings) -> Result<Self, TransportError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &settings.bootstrap_servers)
            .create()
            .map_err(|e| TransportError::Publish(e.to_string()))?;

        log::info!("Kafka producer ready for topic '{}'", settings.output_topic);
        Ok(Self {
            producer,
            topic: settings.output_topic.clone(),
        })
    }
}

impl MessageSink for KafkaSink {
    async fn publish(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        let record: FutureRecord<'_, (), [u8]> = FutureRecord::to(&self.topic).payload(payload);
        // delivery report is not awaited
        self.producer
            .send_result(record)
            .map(|_| ())
            .map_err(|(e, _)| TransportError::Publish(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let producer = self.producer.clone();
        let queued = producer.in_flight_count();
        log::info!("Flushing Kafka producer ({} queued)", queued);

        // librdkafka's flush blocks the calling thread
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(FLUSH_TIMEOUT)))
            .await
            .map_err(|e| TransportError::Publish(e.to_string()))?
            .map_err(|e| TransportError::Publish(format!("flush failed: {}", e)))
    }
}
