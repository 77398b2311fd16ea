//! Renderer-neutral view of a Response: what to show, in display order.

use chrono::{DateTime, Utc};

use crate::protocol::types::{
    CodeOutput, ContentPart, ItemStatus, OutputItem, Response, ResponseStatus, TextPart, Usage,
};

/// One visual unit of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Tool {
        title: String,
        status: ItemStatus,
        detail: Option<String>,
    },
    Reasoning(String),
    Text(String),
    Refusal(String),
    Failure(String),
    Citations(Vec<String>),
    Usage(String),
}

/// Builds the blocks for `response`: output items in order, then any
/// failure, citation footnotes and the usage line.
#[must_use]
pub fn blocks(response: &Response) -> Vec<Block> {
    let mut blocks = Vec::new();

    for item in &response.output {
        match item {
            OutputItem::Message(message) => {
                let text: String = message
                    .content
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::OutputText(text) => Some(annotated_text(text)),
                        _ => None,
                    })
                    .collect();
                if !text.is_empty() {
                    blocks.push(Block::Text(text));
                }
                for part in &message.content {
                    if let ContentPart::Refusal { refusal } = part {
                        blocks.push(Block::Refusal(refusal.clone()));
                    }
                }
            }
            OutputItem::Reasoning(reasoning) => {
                let text = reasoning.text();
                if !text.trim().is_empty() {
                    blocks.push(Block::Reasoning(text));
                }
            }
            OutputItem::Unsupported => {}
            tool => {
                if let Some(block) = tool_block(tool) {
                    blocks.push(block);
                }
            }
        }
    }

    if let Some(failure) = failure_text(response) {
        blocks.push(Block::Failure(failure));
    }

    let citations: Vec<String> = response
        .citations()
        .into_iter()
        .map(|c| c.label.clone())
        .collect();
    if !citations.is_empty() {
        blocks.push(Block::Citations(citations));
    }

    if let Some(usage) = &response.usage {
        blocks.push(Block::Usage(usage_line(usage)));
    }

    blocks
}

fn tool_block(item: &OutputItem) -> Option<Block> {
    let (title, detail) = match item {
        OutputItem::FileSearchCall(call) => {
            let mut detail = call.queries.join(", ");
            if let Some(results) = &call.results {
                let noun = if results.len() == 1 { "result" } else { "results" };
                detail = format!("{detail} ({} {noun})", results.len());
            }
            ("file search".to_string(), Some(detail))
        }
        OutputItem::WebSearchCall(call) => {
            let detail = call
                .action
                .as_ref()
                .and_then(|a| a.query.clone().or_else(|| a.url.clone()));
            ("web search".to_string(), detail)
        }
        OutputItem::FunctionCall(call) => {
            (format!("function {}", call.name), Some(call.arguments.clone()))
        }
        OutputItem::CodeInterpreterCall(call) => {
            let logs = call
                .outputs
                .iter()
                .flatten()
                .filter_map(|o| match o {
                    CodeOutput::Logs { logs } => logs.lines().last().map(str::to_string),
                    _ => None,
                })
                .last();
            let code = call
                .code
                .as_deref()
                .and_then(|c| c.lines().find(|l| !l.trim().is_empty()))
                .map(str::to_string);
            ("code interpreter".to_string(), logs.or(code))
        }
        OutputItem::ImageGenerationCall(call) => {
            ("image generation".to_string(), call.revised_prompt.clone())
        }
        OutputItem::McpCall(call) => (
            format!("mcp {}/{}", call.server_label, call.name),
            call.error.clone().or_else(|| call.output.clone()),
        ),
        OutputItem::Message(_) | OutputItem::Reasoning(_) | OutputItem::Unsupported => {
            return None;
        }
    };

    Some(Block::Tool {
        title,
        status: item.status().unwrap_or_default(),
        detail: detail.filter(|d| !d.trim().is_empty()),
    })
}

fn failure_text(response: &Response) -> Option<String> {
    if let Some(error) = &response.error {
        return Some(match &error.code {
            Some(code) => format!("{} ({code})", error.message),
            None => error.message.clone(),
        });
    }
    match response.status {
        ResponseStatus::Failed => Some("response failed".to_string()),
        ResponseStatus::Incomplete => Some("response incomplete".to_string()),
        ResponseStatus::Cancelled => Some("response cancelled".to_string()),
        _ => None,
    }
}

/// Text of one part with `[n]` markers inserted at each cited character
/// offset. Offsets past the end put the marker at the end.
#[must_use]
pub fn annotated_text(part: &TextPart) -> String {
    let mut marks: Vec<(usize, u32)> = part
        .annotations
        .iter()
        .filter_map(|a| {
            let citation = a.citation.as_ref()?;
            let position = a.source.position()?;
            Some((position as usize, citation.display_number))
        })
        .collect();
    if marks.is_empty() {
        return part.text.clone();
    }
    marks.sort_unstable();
    marks.dedup();

    let mut out = String::with_capacity(part.text.len() + marks.len() * 4);
    let mut marks = marks.into_iter().peekable();
    for (offset, ch) in part.text.chars().enumerate() {
        while let Some((_, number)) = marks.next_if(|&(position, _)| position <= offset) {
            out.push_str(&format!("[{number}]"));
        }
        out.push(ch);
    }
    for (_, number) in marks {
        out.push_str(&format!("[{number}]"));
    }
    out
}

#[must_use]
pub fn usage_line(usage: &Usage) -> String {
    let mut input = format!("{} in", usage.input_tokens);
    if usage.cached_tokens() > 0 {
        input.push_str(&format!(" ({} cached)", usage.cached_tokens()));
    }
    let mut output = format!("{} out", usage.output_tokens);
    if usage.reasoning_tokens() > 0 {
        output.push_str(&format!(" ({} reasoning)", usage.reasoning_tokens()));
    }
    format!("tokens: {input}, {output}, {} total", usage.total_tokens)
}

/// `created_at` as a UTC timestamp.
#[must_use]
pub fn created_at(response: &Response) -> Option<String> {
    let secs = response.created_at?;
    let datetime = DateTime::<Utc>::from_timestamp(secs.trunc() as i64, 0)?;
    Some(datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{
        Annotation, AnnotationSource, Citation, FileSearchCall, MessageItem, ResponseError,
    };

    fn cited(source: AnnotationSource, number: u32) -> Annotation {
        Annotation {
            citation: Some(Citation {
                display_number: number,
                source_key: source.source_key().expect("key"),
                label: format!("[{number}] src"),
            }),
            source,
        }
    }

    #[test]
    fn markers_go_at_character_offsets() {
        let mut part = TextPart::new("caf\u{e9} ok");
        part.annotations.push(cited(AnnotationSource::file_citation("f1", 4), 1));
        part.annotations.push(cited(AnnotationSource::file_citation("f2", 99), 2));

        assert_eq!(annotated_text(&part), "caf\u{e9}[1] ok[2]");
    }

    #[test]
    fn uncited_annotations_are_not_marked() {
        let part = TextPart::new("plain").with_annotation(AnnotationSource::file_citation("f", 1));
        assert_eq!(annotated_text(&part), "plain");
    }

    #[test]
    fn duplicate_markers_collapse() {
        let mut part = TextPart::new("ab");
        let source = AnnotationSource::file_citation("f1", 1);
        part.annotations.push(cited(source.clone(), 1));
        part.annotations.push(cited(source, 1));
        assert_eq!(annotated_text(&part), "a[1]b");
    }

    #[test]
    fn blocks_follow_output_order() {
        let mut response = Response::new("resp_1", ResponseStatus::Completed).with_output(vec![
            OutputItem::FileSearchCall(FileSearchCall {
                id: "fs_1".into(),
                status: ItemStatus::Completed,
                queries: vec!["refund".into()],
                results: Some(Vec::new()),
            }),
            OutputItem::Message(MessageItem::new("msg_1").with_text(TextPart::new("Yes."))),
        ]);
        response.usage = Some(Usage::new(10, 5));

        let blocks = blocks(&response);

        assert_eq!(
            blocks,
            vec![
                Block::Tool {
                    title: "file search".into(),
                    status: ItemStatus::Completed,
                    detail: Some("refund (0 results)".into()),
                },
                Block::Text("Yes.".into()),
                Block::Usage("tokens: 10 in, 5 out, 15 total".into()),
            ]
        );
    }

    #[test]
    fn failure_block_carries_error() {
        let mut response = Response::new("resp_1", ResponseStatus::Failed);
        response.error = Some(ResponseError {
            code: Some("server_error".into()),
            message: "boom".into(),
        });
        assert_eq!(
            blocks(&response),
            vec![Block::Failure("boom (server_error)".into())]
        );
    }

    #[test]
    fn citations_block_lists_labels() {
        let mut part = TextPart::new("x");
        part.annotations.push(cited(AnnotationSource::url_citation("https://a", None), 1));
        let response = Response::new("r", ResponseStatus::Completed).with_output(vec![
            OutputItem::Message(MessageItem::new("m").with_text(part)),
        ]);

        assert!(blocks(&response).contains(&Block::Citations(vec!["[1] src".into()])));
    }

    #[test]
    fn usage_line_includes_details() {
        let mut usage = Usage::new(100, 40);
        usage.input_tokens_details = Some(crate::protocol::types::InputTokensDetails {
            cached_tokens: 64,
        });
        assert_eq!(
            usage_line(&usage),
            "tokens: 100 in (64 cached), 40 out, 140 total"
        );
    }

    #[test]
    fn created_at_formats_utc() {
        let mut response = Response::new("r", ResponseStatus::Created);
        response.created_at = Some(1_700_000_000.0);
        assert_eq!(
            created_at(&response).as_deref(),
            Some("2023-11-14 22:13:20 UTC")
        );
    }
}
