use crate::protocol::events::{DecodedEvent, DeltaTarget, ItemProgress, TextDelta, TextDone};
use crate::protocol::types::{
    ContentPart, MessageItem, OutputItem, Response, ResponseStatus, SummaryText, TextPart,
};
use crate::transport::RawEvent;

use super::citations::CitationRegistry;

/// The merger's view of one turn: the current Response plus the turn's
/// citation numbering. Build a fresh one per turn.
#[derive(Debug, Default)]
pub struct StreamState {
    current: Option<Response>,
    registry: CitationRegistry,
    finished: bool,
    applied: usize,
}

impl StreamState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current(&self) -> Option<&Response> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn into_current(self) -> Option<Response> {
        self.current
    }

    #[must_use]
    pub const fn registry(&self) -> &CitationRegistry {
        &self.registry
    }

    /// True once a terminal snapshot or an error event has been applied.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub const fn applied(&self) -> usize {
        self.applied
    }

    #[must_use]
    pub fn terminal_status(&self) -> Option<ResponseStatus> {
        if !self.finished {
            return None;
        }
        self.current.as_ref().map(|r| r.status)
    }

    /// Consuming form of [`StreamState::apply`].
    #[must_use]
    pub fn merge(mut self, event: DecodedEvent) -> Self {
        self.apply(event);
        self
    }

    /// Decodes a raw frame and applies it. Frames that fail to decode are
    /// logged and dropped. Returns whether the current Response changed.
    pub fn ingest(&mut self, frame: &RawEvent) -> bool {
        match crate::protocol::decode_frame(frame.event.as_deref(), &frame.data) {
            Ok(event) => {
                tracing::debug!(
                    event = frame.event.as_deref().unwrap_or("<unnamed>"),
                    kind = event.kind(),
                    "decoded stream event"
                );
                self.apply(event)
            }
            Err(e) => {
                tracing::warn!(
                    event = frame.event.as_deref().unwrap_or("<unnamed>"),
                    error = %e,
                    "dropping undecodable stream event"
                );
                false
            }
        }
    }

    /// Folds one event into the state and re-installs citations when the
    /// Response changed. Events after the terminal one are ignored.
    pub fn apply(&mut self, event: DecodedEvent) -> bool {
        if self.finished {
            tracing::debug!(kind = event.kind(), "ignoring event after terminal state");
            return false;
        }

        let changed = match event {
            DecodedEvent::Snapshot(response) => {
                self.finished = response.is_terminal();
                self.current = Some(response);
                true
            }
            DecodedEvent::Delta(delta) => self.apply_delta(delta),
            DecodedEvent::Progress(progress) => self.apply_progress(&progress),
            DecodedEvent::Item { output_index, item } => {
                place_item(&mut self.current_or_placeholder().output, output_index, item);
                true
            }
            DecodedEvent::TextDone(done) => self.apply_text_done(done),
            DecodedEvent::Error(error) => {
                let current = self.current_or_placeholder();
                current.status = ResponseStatus::Failed;
                current.error = Some(error);
                self.finished = true;
                true
            }
            DecodedEvent::Unknown(name) => {
                tracing::debug!(event = %name, "ignoring unknown stream event");
                false
            }
        };

        if changed {
            self.applied += 1;
            if let Some(current) = self.current.as_mut() {
                self.registry.install(current);
            }
        }
        changed
    }

    fn current_or_placeholder(&mut self) -> &mut Response {
        self.current.get_or_insert_with(Response::placeholder)
    }

    fn apply_delta(&mut self, delta: TextDelta) -> bool {
        match delta.target {
            DeltaTarget::OutputText => {
                let part = text_part_mut(
                    self.current_or_placeholder(),
                    &delta.item_id,
                    delta.output_index,
                    delta.content_index,
                );
                part.text.push_str(&delta.delta);
                true
            }
            DeltaTarget::ReasoningSummary => {
                let summary = summary_mut(
                    self.current_or_placeholder(),
                    &delta.item_id,
                    delta.output_index,
                    delta.content_index,
                );
                summary.text.push_str(&delta.delta);
                true
            }
            DeltaTarget::FunctionArguments => {
                let Some(current) = self.current.as_mut() else {
                    return false;
                };
                let index = current
                    .position_of(&delta.item_id)
                    .unwrap_or(delta.output_index);
                match current.output.get_mut(index) {
                    Some(OutputItem::FunctionCall(call)) => {
                        call.arguments.push_str(&delta.delta);
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    fn apply_progress(&mut self, progress: &ItemProgress) -> bool {
        let Some(current) = self.current.as_mut() else {
            tracing::debug!(item_id = %progress.item_id, "progress before any snapshot");
            return false;
        };

        let index = if progress.item_id.is_empty() {
            Some(progress.output_index)
        } else {
            current.position_of(&progress.item_id)
        };

        match index.and_then(|i| current.output.get_mut(i)) {
            Some(item) => item.set_status(progress.status),
            None => {
                tracing::debug!(
                    item_id = %progress.item_id,
                    output_index = progress.output_index,
                    "progress for unknown item"
                );
                false
            }
        }
    }

    fn apply_text_done(&mut self, done: TextDone) -> bool {
        let part = text_part_mut(
            self.current_or_placeholder(),
            &done.item_id,
            done.output_index,
            done.content_index,
        );
        if part.text == done.text {
            return false;
        }
        part.text = done.text;
        true
    }
}

/// Puts `item` at `index`, replacing what is there or appending when the
/// index is past the end.
fn place_item(output: &mut Vec<OutputItem>, index: usize, item: OutputItem) {
    match output.get_mut(index) {
        Some(slot) => *slot = item,
        None => output.push(item),
    }
}

/// Index for an item created by a text event: `output_index` when that slot
/// exists, otherwise a new slot at the end.
fn placeholder_slot(response: &mut Response, output_index: usize, item: OutputItem) -> usize {
    if output_index < response.output.len() {
        return output_index;
    }
    response.output.push(item);
    response.output.len() - 1
}

/// Finds the message a text event targets: the message at `output_index`,
/// else the message with `item_id`, else a placeholder message put at
/// `output_index`.
fn message_mut<'a>(
    response: &'a mut Response,
    item_id: &str,
    output_index: usize,
) -> &'a mut MessageItem {
    let is_message = |item: Option<&OutputItem>| matches!(item, Some(OutputItem::Message(_)));

    let index = if is_message(response.output.get(output_index)) {
        output_index
    } else if let Some(index) = response
        .position_of(item_id)
        .filter(|&i| is_message(response.output.get(i)))
    {
        index
    } else {
        tracing::debug!(item_id, output_index, "creating placeholder message");
        placeholder_slot(
            response,
            output_index,
            OutputItem::placeholder_message(item_id),
        )
    };

    response.output[index].message_or_placeholder(item_id)
}

fn text_part_mut<'a>(
    response: &'a mut Response,
    item_id: &str,
    output_index: usize,
    content_index: usize,
) -> &'a mut TextPart {
    let message = message_mut(response, item_id, output_index);
    while message.content.len() <= content_index {
        message.content.push(ContentPart::OutputText(TextPart::default()));
    }
    message.content[content_index].output_text_or_default()
}

fn summary_mut<'a>(
    response: &'a mut Response,
    item_id: &str,
    output_index: usize,
    summary_index: usize,
) -> &'a mut SummaryText {
    let is_reasoning =
        |item: Option<&OutputItem>| matches!(item, Some(OutputItem::Reasoning(_)));

    let index = if is_reasoning(response.output.get(output_index)) {
        output_index
    } else if let Some(index) = response
        .position_of(item_id)
        .filter(|&i| is_reasoning(response.output.get(i)))
    {
        index
    } else {
        placeholder_slot(
            response,
            output_index,
            OutputItem::placeholder_reasoning(item_id),
        )
    };

    let reasoning = response.output[index].reasoning_or_placeholder(item_id);
    while reasoning.summary.len() <= summary_index {
        reasoning.summary.push(SummaryText::new(""));
    }
    &mut reasoning.summary[summary_index]
}
