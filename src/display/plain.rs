use std::io::Write;

use crate::protocol::Response;

use super::format::{Block, blocks};
use super::{RenderError, Renderer};

/// Plain text output. Frames are only kept in memory while streaming; the
/// latest one is written once at `finalize`, so pipes get one clean copy.
pub struct PlainRenderer<W: Write + Send> {
    out: W,
    latest: Option<String>,
}

impl<W: Write + Send> PlainRenderer<W> {
    pub const fn new(out: W) -> Self {
        Self { out, latest: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for PlainRenderer<W> {
    fn render(&mut self, response: &Response) -> Result<(), RenderError> {
        self.latest = Some(format_plain(&blocks(response)));
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), RenderError> {
        if let Some(frame) = self.latest.take() {
            writeln!(self.out, "{frame}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Formats blocks as paragraphs. Consecutive tool lines stay together.
#[must_use]
pub fn format_plain(blocks: &[Block]) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut tools: Vec<String> = Vec::new();

    for block in blocks {
        let paragraph = match block {
            Block::Tool {
                title,
                status,
                detail,
            } => {
                tools.push(match detail {
                    Some(detail) => format!("[{title}: {}] {detail}", status.as_str()),
                    None => format!("[{title}: {}]", status.as_str()),
                });
                continue;
            }
            Block::Reasoning(text) => text
                .lines()
                .map(|l| format!("> {l}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Text(text) => text.clone(),
            Block::Refusal(text) => format!("Refusal: {text}"),
            Block::Failure(text) => format!("Error: {text}"),
            Block::Citations(labels) => format!("Sources:\n{}", labels.join("\n")),
            Block::Usage(line) => line.clone(),
        };
        if !tools.is_empty() {
            paragraphs.push(tools.join("\n"));
            tools.clear();
        }
        paragraphs.push(paragraph);
    }
    if !tools.is_empty() {
        paragraphs.push(tools.join("\n"));
    }

    paragraphs.join("\n\n")
}
