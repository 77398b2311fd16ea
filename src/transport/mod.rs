//! Byte-level side of the pipeline: opens a stream of SSE frames for a
//! request and hands them over in order.

pub mod error;
pub mod http;
pub mod mock;
pub mod reader;
pub mod replay;
pub mod responses;
pub mod types;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::protocol::ResponseRequest;

pub use error::TransportError;
pub use mock::MockTransport;
pub use reader::{EventReceiver, spawn_reader};
pub use replay::ReplayTransport;
pub use responses::HttpTransport;
pub use types::{ApiKey, BaseUrl};

/// One undecoded SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub event: Option<String>,
    pub data: String,
}

impl RawEvent {
    #[must_use]
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            data: data.into(),
        }
    }

    #[must_use]
    pub fn unnamed(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
        }
    }
}

/// Finite, single-pass frame sequence. An `Err` item is terminal.
pub type RawEventStream = Pin<Box<dyn Stream<Item = Result<RawEvent, TransportError>> + Send>>;

#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    async fn open(&self, request: &ResponseRequest) -> Result<RawEventStream, TransportError>;
}
