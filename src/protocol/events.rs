use serde::Deserialize;
use thiserror::Error;

use super::types::{ItemStatus, OutputItem, Response, ResponseError};

/// Which string a text delta extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaTarget {
    OutputText,
    ReasoningSummary,
    FunctionArguments,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    pub item_id: String,
    pub output_index: usize,
    pub content_index: usize,
    pub target: DeltaTarget,
    pub delta: String,
}

impl TextDelta {
    #[must_use]
    pub fn output_text(
        item_id: impl Into<String>,
        output_index: usize,
        content_index: usize,
        delta: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            output_index,
            content_index,
            target: DeltaTarget::OutputText,
            delta: delta.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemProgress {
    pub item_id: String,
    pub output_index: usize,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDone {
    pub item_id: String,
    pub output_index: usize,
    pub content_index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedEvent {
    /// A full Response; replaces the current one.
    Snapshot(Response),
    Delta(TextDelta),
    Progress(ItemProgress),
    /// An output item added or finished at a position.
    Item {
        output_index: usize,
        item: OutputItem,
    },
    TextDone(TextDone),
    /// Server reported a stream-level failure.
    Error(ResponseError),
    /// Event name outside the known vocabulary.
    Unknown(String),
}

impl DecodedEvent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Delta(_) => "delta",
            Self::Progress(_) => "progress",
            Self::Item { .. } => "item",
            Self::TextDone(_) => "text_done",
            Self::Error(_) => "error",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl From<ResponseError> for DecodedEvent {
    fn from(error: ResponseError) -> Self {
        Self::Error(error)
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed payload for {event}: {source}")]
    Malformed {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Frame has no event name")]
    MissingEventName,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotPayload {
    Wrapped { response: Response },
    Bare(Response),
}

#[derive(Deserialize)]
struct DeltaPayload {
    #[serde(default)]
    item_id: String,
    #[serde(default)]
    output_index: usize,
    #[serde(default, alias = "summary_index")]
    content_index: usize,
    delta: String,
}

#[derive(Deserialize)]
struct ProgressPayload {
    #[serde(default)]
    item_id: String,
    #[serde(default)]
    output_index: usize,
}

#[derive(Deserialize)]
struct ItemPayload {
    output_index: usize,
    item: OutputItem,
}

#[derive(Deserialize)]
struct TextDonePayload {
    #[serde(default)]
    item_id: String,
    #[serde(default)]
    output_index: usize,
    #[serde(default)]
    content_index: usize,
    text: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct TypeOnly {
    #[serde(rename = "type")]
    event_type: String,
}

/// Decodes one SSE frame. The event name comes from the `event:` line, or
/// from the payload's `type` field when the server omits it.
pub fn decode_frame(event_name: Option<&str>, data: &str) -> Result<DecodedEvent, DecodeError> {
    match event_name {
        Some(name) if !name.is_empty() => decode(name, data),
        _ => {
            let name = serde_json::from_str::<TypeOnly>(data)
                .map_err(|_| DecodeError::MissingEventName)?
                .event_type;
            decode(&name, data)
        }
    }
}

/// Decodes a payload for a named event. Unknown names are not an error.
pub fn decode(event_name: &str, data: &str) -> Result<DecodedEvent, DecodeError> {
    let malformed = |source: serde_json::Error| DecodeError::Malformed {
        event: event_name.to_string(),
        source,
    };

    let event = match event_name {
        "response.created"
        | "response.queued"
        | "response.in_progress"
        | "response.completed"
        | "response.failed"
        | "response.incomplete"
        | "response.cancelled" => {
            let payload: SnapshotPayload = serde_json::from_str(data).map_err(malformed)?;
            match payload {
                SnapshotPayload::Wrapped { response } | SnapshotPayload::Bare(response) => {
                    DecodedEvent::Snapshot(response)
                }
            }
        }
        "response.output_text.delta" => {
            decode_delta(data, DeltaTarget::OutputText).map_err(malformed)?
        }
        "response.reasoning_summary_text.delta" => {
            decode_delta(data, DeltaTarget::ReasoningSummary).map_err(malformed)?
        }
        "response.function_call_arguments.delta" => {
            decode_delta(data, DeltaTarget::FunctionArguments).map_err(malformed)?
        }
        "response.output_text.done" => {
            let p: TextDonePayload = serde_json::from_str(data).map_err(malformed)?;
            DecodedEvent::TextDone(TextDone {
                item_id: p.item_id,
                output_index: p.output_index,
                content_index: p.content_index,
                text: p.text,
            })
        }
        "response.output_item.added" | "response.output_item.done" => {
            let p: ItemPayload = serde_json::from_str(data).map_err(malformed)?;
            DecodedEvent::Item {
                output_index: p.output_index,
                item: p.item,
            }
        }
        "error" => {
            let p: ErrorPayload = serde_json::from_str(data).map_err(malformed)?;
            DecodedEvent::Error(ResponseError {
                code: p.code,
                message: p.message.unwrap_or_else(|| "stream error".to_string()),
            })
        }
        other => match tool_progress_status(other) {
            Some(status) => {
                let p: ProgressPayload = serde_json::from_str(data).map_err(malformed)?;
                DecodedEvent::Progress(ItemProgress {
                    item_id: p.item_id,
                    output_index: p.output_index,
                    status,
                })
            }
            None => DecodedEvent::Unknown(other.to_string()),
        },
    };

    Ok(event)
}

fn decode_delta(data: &str, target: DeltaTarget) -> Result<DecodedEvent, serde_json::Error> {
    let p: DeltaPayload = serde_json::from_str(data)?;
    Ok(DecodedEvent::Delta(TextDelta {
        item_id: p.item_id,
        output_index: p.output_index,
        content_index: p.content_index,
        target,
        delta: p.delta,
    }))
}

/// Recognises `response.<tool>_call.<status>`.
fn tool_progress_status(event_name: &str) -> Option<ItemStatus> {
    let rest = event_name.strip_prefix("response.")?;
    let (tool, status) = rest.split_once('.')?;
    if !tool.ends_with("_call") || status.contains('.') {
        return None;
    }
    ItemStatus::from_event_suffix(status)
}
