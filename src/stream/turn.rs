use std::future::Future;

use crate::display::Display;
use crate::protocol::{ResponseRequest, ResponseStatus, Response};
use crate::transport::{Transport, TransportError, spawn_reader};

use super::state::StreamState;

/// Why a turn stopped consuming events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEnd {
    /// A terminal snapshot or an error event was applied.
    Terminal(ResponseStatus),
    /// The transport ran out of frames first.
    StreamEnded,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub response: Option<Response>,
    pub end: TurnEnd,
    pub events_applied: usize,
}

impl TurnOutcome {
    const fn cancelled() -> Self {
        Self {
            response: None,
            end: TurnEnd::Cancelled,
            events_applied: 0,
        }
    }

    /// The turn's final Response. A cancelled turn has none, even if
    /// something was merged before the cancel.
    #[must_use]
    pub fn final_response(&self) -> Option<&Response> {
        match self.end {
            TurnEnd::Cancelled => None,
            TurnEnd::Terminal(_) | TurnEnd::StreamEnded => self.response.as_ref(),
        }
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        matches!(self.end, TurnEnd::Terminal(ResponseStatus::Failed))
    }
}

/// Runs one request through the whole pipeline.
///
/// A fresh [`StreamState`] is built for the turn. Every frame that changes
/// the Response is handed to `display`; the display is completed however
/// the turn ends. `cancel` resolving stops the turn and closes the
/// connection. Transport failures are returned after the display is
/// completed, so the terminal is left in a usable state.
pub async fn run_turn<T, C>(
    transport: &T,
    request: &ResponseRequest,
    display: &mut Display,
    cancel: C,
) -> Result<TurnOutcome, TransportError>
where
    T: Transport + ?Sized,
    C: Future,
{
    tokio::pin!(cancel);

    tracing::info!(transport = transport.name(), model = %request.model, "turn started");

    let opened = tokio::select! {
        biased;
        _ = &mut cancel => None,
        opened = transport.open(request) => Some(opened),
    };
    let stream = match opened {
        None => {
            tracing::info!("turn cancelled before the stream opened");
            display.complete();
            return Ok(TurnOutcome::cancelled());
        }
        Some(Err(e)) => {
            display.complete();
            return Err(e);
        }
        Some(Ok(stream)) => stream,
    };

    let mut receiver = spawn_reader(stream);
    let mut state = StreamState::new();

    let end = loop {
        let frame = tokio::select! {
            biased;
            _ = &mut cancel => {
                receiver.cancel();
                break TurnEnd::Cancelled;
            }
            frame = receiver.recv() => frame,
        };

        match frame {
            None => break TurnEnd::StreamEnded,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "transport failed mid-turn");
                display.complete();
                return Err(e);
            }
            Some(Ok(raw)) => {
                if !state.ingest(&raw) {
                    continue;
                }
                if let Some(current) = state.current() {
                    display.handle(current);
                }
                if let Some(status) = state.terminal_status() {
                    break TurnEnd::Terminal(status);
                }
            }
        }
    };
    drop(receiver);

    display.complete();

    let events_applied = state.applied();
    let response = state.into_current();
    tracing::info!(
        end = ?end,
        events_applied,
        response_id = response.as_ref().map_or("", |r| r.id.as_str()),
        "turn finished"
    );

    Ok(TurnOutcome {
        response,
        end,
        events_applied,
    })
}
