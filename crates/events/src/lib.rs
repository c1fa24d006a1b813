//! Domain events for Ledgerline.
//!
//! Every committed mutation is announced on a topic per entity family with a
//! `<entity>.<verb>` key and a JSON payload. Delivery never fails the caller.

pub mod publisher;
pub mod topic;
pub mod transport;

pub use publisher::{EventPublisher, finance_event_key};
pub use topic::{Topic, event_key};
pub use transport::{InMemoryTransport, LoggingTransport, Message, MessageTransport, TransportError};

#[cfg(feature = "kafka")]
pub use transport::KafkaTransport;
