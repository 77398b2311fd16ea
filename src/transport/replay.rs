use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::protocol::ResponseRequest;
use crate::transport::error::TransportError;
use crate::transport::http::SseParser;
use crate::transport::{RawEventStream, Transport};

const DEFAULT_CHUNK_SIZE: usize = 512;

/// Plays back a recorded SSE capture. The request is ignored.
#[derive(Debug, Clone)]
pub struct ReplayTransport {
    path: PathBuf,
    chunk_size: usize,
}

impl ReplayTransport {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Size of the pieces fed to the parser, to mimic network reads.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Transport for ReplayTransport {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn open(&self, _request: &ResponseRequest) -> Result<RawEventStream, TransportError> {
        let contents = tokio::fs::read(&self.path).await.map_err(|e| {
            TransportError::Connection(format!("cannot read {}: {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), bytes = contents.len(), "replaying capture");

        let contents = Bytes::from(contents);
        let chunks: Vec<Result<Bytes, TransportError>> = (0..contents.len())
            .step_by(self.chunk_size)
            .map(|start| {
                let end = (start + self.chunk_size).min(contents.len());
                Ok(contents.slice(start..end))
            })
            .collect();

        Ok(Box::pin(SseParser::parse_stream(tokio_stream::iter(chunks))))
    }
}
