use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use crate::protocol::ResponseRequest;
use crate::transport::error::TransportError;
use crate::transport::{RawEvent, RawEventStream, Transport};

/// One scripted `open` call.
#[derive(Debug)]
pub enum MockScript {
    Frames(Vec<Result<RawEvent, TransportError>>),
    /// Frames followed by a stream that never ends.
    Hanging(Vec<RawEvent>),
    Reject(TransportError),
}

/// Transport that replays scripted frames, one script per `open`, and
/// records every request it was given.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    scripts: Arc<Mutex<VecDeque<MockScript>>>,
    requests: Arc<Mutex<Vec<ResponseRequest>>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_script(self, script: MockScript) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.push_back(script);
        }
        self
    }

    #[must_use]
    pub fn with_frames(self, frames: impl IntoIterator<Item = RawEvent>) -> Self {
        self.with_script(MockScript::Frames(frames.into_iter().map(Ok).collect()))
    }

    #[must_use]
    pub fn with_hanging_frames(self, frames: impl IntoIterator<Item = RawEvent>) -> Self {
        self.with_script(MockScript::Hanging(frames.into_iter().collect()))
    }

    #[must_use]
    pub fn with_rejection(self, error: TransportError) -> Self {
        self.with_script(MockScript::Reject(error))
    }

    #[must_use]
    pub fn requests(&self) -> Vec<ResponseRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn next_script(&self) -> Result<MockScript, TransportError> {
        let mut scripts = self
            .scripts
            .lock()
            .map_err(|_| TransportError::Configuration("mock transport lock poisoned".into()))?;
        scripts
            .pop_front()
            .ok_or_else(|| TransportError::Configuration("MockTransport: no scripts queued".into()))
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn open(&self, request: &ResponseRequest) -> Result<RawEventStream, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.next_script()? {
            MockScript::Frames(frames) => Ok(Box::pin(tokio_stream::iter(frames))),
            MockScript::Hanging(frames) => Ok(Box::pin(
                tokio_stream::iter(frames.into_iter().map(Ok::<RawEvent, TransportError>))
                    .chain(futures::stream::pending()),
            )),
            MockScript::Reject(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_plays_scripts_in_order() {
        let mock = MockTransport::new()
            .with_frames([RawEvent::new("first", "{}")])
            .with_rejection(TransportError::Connection("refused".into()));
        let request = ResponseRequest::new("gpt-4o", "q");

        let frames: Vec<_> = tokio_test::block_on(async {
            mock.open(&request).await.expect("open").collect().await
        });
        assert_eq!(frames.len(), 1);

        let second = tokio_test::block_on(mock.open(&request));
        assert!(matches!(second, Err(TransportError::Connection(_))));

        let third = tokio_test::block_on(mock.open(&request));
        assert!(matches!(third, Err(TransportError::Configuration(_))));
    }

    #[test]
    fn test_mock_records_requests() {
        let mock = MockTransport::new().with_frames(Vec::new());
        let request = ResponseRequest::new("gpt-4o", "refund policy?");

        let _ = tokio_test::block_on(mock.open(&request));

        assert_eq!(mock.request_count(), 1);
        assert_eq!(mock.requests()[0].input, "refund policy?");
    }
}
