use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::transport::RawEvent;
use crate::transport::error::TransportError;

/// Incremental SSE framing. Bytes are buffered until a full line is
/// available, so multi-byte characters split across chunks survive.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    current_event: Option<String>,
    data_lines: Vec<String>,
}

impl SseParser {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            current_event: None,
            data_lines: Vec::new(),
        }
    }

    pub fn process_chunk(&mut self, chunk: &[u8]) -> Vec<RawEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();

        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw[..line_end]);
            let line = line.trim_end_matches('\r');

            // Lines starting with ':' are comments and fall through.

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
            } else if let Some(name) = line.strip_prefix("event:") {
                self.current_event = Some(name.trim().to_string());
            } else if let Some(data) = line.strip_prefix("data:") {
                let data = data.strip_prefix(' ').unwrap_or(data);
                if data != "[DONE]" {
                    self.data_lines.push(data.to_string());
                }
            }
        }

        events
    }

    fn dispatch(&mut self) -> Option<RawEvent> {
        if self.data_lines.is_empty() {
            self.current_event = None;
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(RawEvent {
            event: self.current_event.take(),
            data,
        })
    }

    /// Called at end of input. A frame that was started but never
    /// terminated by a blank line is an error, never a partial event.
    pub fn finish(&mut self) -> Result<(), TransportError> {
        let trailing = String::from_utf8_lossy(&self.buffer);
        let dangling = !trailing.trim().is_empty() || !self.data_lines.is_empty();
        self.buffer.clear();
        self.data_lines.clear();
        let event = self.current_event.take();

        if dangling {
            return Err(TransportError::Stream(format!(
                "connection closed mid-event ({})",
                event.as_deref().unwrap_or("unnamed")
            )));
        }
        Ok(())
    }

    /// Turns a byte stream into ordered frames. The first byte-level error
    /// ends the stream.
    pub fn parse_stream<S, E>(byte_stream: S) -> impl Stream<Item = Result<RawEvent, TransportError>> + Send
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<TransportError> + 'static,
    {
        struct State<E> {
            bytes: Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>,
            parser: SseParser,
            pending: VecDeque<RawEvent>,
            done: bool,
        }

        let state = State {
            bytes: Box::pin(byte_stream),
            parser: Self::new(),
            pending: VecDeque::new(),
            done: false,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Some((Ok(event), state));
                }
                if state.done {
                    return None;
                }
                match state.bytes.next().await {
                    Some(Ok(chunk)) => {
                        let events = state.parser.process_chunk(&chunk);
                        state.pending.extend(events);
                    }
                    Some(Err(e)) => {
                        state.done = true;
                        return Some((Err(e.into()), state));
                    }
                    None => {
                        state.done = true;
                        if let Err(e) = state.parser.finish() {
                            return Some((Err(e), state));
                        }
                    }
                }
            }
        })
    }
}
