//! Message transports.
//!
//! A transport moves already-serialized messages to the bus. Implementations
//! must be safe to share across requests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::topic::Topic;

/// Transport failures. Never surfaced to service callers.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The broker rejected or timed out the message.
    #[error("send failed: {0}")]
    Send(String),

    /// The transport was configured incorrectly.
    #[error("transport configuration: {0}")]
    Config(String),

    /// The transport has been closed.
    #[error("transport closed")]
    Closed,
}

/// A message as handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Destination topic.
    pub topic: Topic,
    /// `<entity>.<verb>` key.
    pub key: String,
    /// JSON payload.
    pub payload: Vec<u8>,
}

impl Message {
    /// Payload parsed back into JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// Delivers messages to a bus.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Sends one message.
    async fn send(&self, topic: Topic, key: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Flushes and releases any writers.
    async fn close(&self) -> Result<(), TransportError>;
}

/// Keeps every message in memory, for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every message sent so far, in send order.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.guard().clone()
    }

    /// Keys sent to `topic`, in send order.
    #[must_use]
    pub fn keys(&self, topic: Topic) -> Vec<String> {
        self.guard()
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.key.clone())
            .collect()
    }

    /// Drops every recorded message.
    pub fn clear(&self) {
        self.guard().clear();
    }
}

#[async_trait]
impl MessageTransport for InMemoryTransport {
    async fn send(&self, topic: Topic, key: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.guard().push(Message {
            topic,
            key: key.to_string(),
            payload,
        });
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Writes each message to the trace log and discards it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTransport;

#[async_trait]
impl MessageTransport for LoggingTransport {
    async fn send(&self, topic: Topic, key: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        info!(topic = %topic, key = %key, bytes = payload.len(), "Domain event");
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(feature = "kafka")]
pub use kafka::KafkaTransport;

#[cfg(feature = "kafka")]
mod kafka {
    use std::time::Duration;

    use async_trait::async_trait;
    use ledgerline_shared::config::EventsConfig;
    use rdkafka::config::ClientConfig;
    use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
    use rdkafka::util::Timeout;
    use tracing::debug;

    use super::{MessageTransport, TransportError};
    use crate::topic::Topic;

    /// Produces to Kafka or Redpanda. One producer serves every topic.
    #[derive(Clone)]
    pub struct KafkaTransport {
        producer: FutureProducer,
        timeout: Duration,
    }

    impl std::fmt::Debug for KafkaTransport {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("KafkaTransport")
                .field("timeout", &self.timeout)
                .finish_non_exhaustive()
        }
    }

    impl KafkaTransport {
        /// Creates a producer for the configured brokers.
        ///
        /// # Errors
        ///
        /// Returns `Config` when no brokers are set or the client cannot be built.
        pub fn new(config: &EventsConfig) -> Result<Self, TransportError> {
            if config.brokers.trim().is_empty() {
                return Err(TransportError::Config("events.brokers is empty".into()));
            }
            let producer: FutureProducer = ClientConfig::new()
                .set("bootstrap.servers", &config.brokers)
                .set("client.id", &config.client_id)
                .set("message.timeout.ms", config.send_timeout_ms.to_string())
                .create()
                .map_err(|e| TransportError::Config(e.to_string()))?;
            Ok(Self {
                producer,
                timeout: Duration::from_millis(config.send_timeout_ms),
            })
        }
    }

    #[async_trait]
    impl MessageTransport for KafkaTransport {
        async fn send(&self, topic: Topic, key: &str, payload: Vec<u8>) -> Result<(), TransportError> {
            let record = FutureRecord::to(topic.as_str()).key(key).payload(&payload);
            self.producer
                .send(record, Timeout::After(self.timeout))
                .await
                .map_err(|(e, _)| TransportError::Send(e.to_string()))?;
            debug!(topic = %topic, key = %key, "Produced");
            Ok(())
        }

        async fn close(&self) -> Result<(), TransportError> {
            let producer = self.producer.clone();
            let timeout = self.timeout;
            tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout)))
                .await
                .map_err(|e| TransportError::Send(e.to_string()))?
                .map_err(|e| TransportError::Send(e.to_string()))
        }
    }
}
