use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::display::format::{self, Block};
use crate::protocol::{ItemStatus, Response};

use super::theme::{BoxChars, Theme, status_glyph};

const MIN_WIDTH: u16 = 20;

/// Styled lines for a whole frame: header, then each block.
#[must_use]
pub fn response_lines(response: &Response, width: u16, frame: usize) -> Vec<Line<'static>> {
    if width < MIN_WIDTH {
        return vec![Line::from(Span::styled(
            format!("{} ...", response.status.as_str()),
            Theme::muted(),
        ))];
    }

    let ctx = LineContext {
        width: width as usize,
        frame,
    };
    let mut lines = vec![ctx.header(response)];

    for block in format::blocks(response) {
        match block {
            Block::Tool {
                title,
                status,
                detail,
            } => lines.extend(ctx.tool_card(&title, status, detail.as_deref())),
            Block::Reasoning(text) => lines.extend(ctx.quoted(&text, Theme::reasoning())),
            Block::Text(text) => {
                lines.push(Line::default());
                lines.extend(ctx.wrapped(&text, Theme::text()));
            }
            Block::Refusal(text) => {
                lines.extend(ctx.wrapped(&format!("Refusal: {text}"), Theme::warning()));
            }
            Block::Failure(text) => {
                lines.push(Line::default());
                lines.extend(ctx.wrapped(&format!("✗ {text}"), Theme::error()));
            }
            Block::Citations(labels) => {
                lines.push(Line::default());
                lines.push(ctx.divider());
                for label in labels {
                    lines.extend(ctx.wrapped(&label, Theme::secondary()));
                }
            }
            Block::Usage(usage) => lines.push(Line::from(Span::styled(usage, Theme::muted()))),
        }
    }

    lines
}

struct LineContext {
    width: usize,
    frame: usize,
}

impl LineContext {
    fn header(&self, response: &Response) -> Line<'static> {
        let mut spans = vec![Span::styled(
            format!("{} ", BoxChars::QUOTE),
            Theme::primary_bold(),
        )];
        if !response.model.is_empty() {
            spans.push(Span::styled(response.model.clone(), Theme::primary_bold()));
            spans.push(Span::styled(" · ", Theme::muted()));
        }
        spans.push(Span::styled(
            response.status.as_str().replace('_', " "),
            Theme::muted(),
        ));
        if let Some(created) = format::created_at(response) {
            spans.push(Span::styled(format!(" · {created}"), Theme::muted()));
        }
        Line::from(spans)
    }

    fn tool_card(&self, title: &str, status: ItemStatus, detail: Option<&str>) -> Vec<Line<'static>> {
        let style = Theme::status(status);
        let heading = format!(" {} {title} ", status_glyph(status, self.frame));
        let state = format!(" {} ", status.as_str());
        let fill = self
            .width
            .saturating_sub(4)
            .saturating_sub(heading.width())
            .saturating_sub(state.width());

        let mut lines = vec![Line::from(vec![
            Span::styled(BoxChars::ROUND_TOP_LEFT.to_string(), style),
            Span::styled(BoxChars::HORIZONTAL.to_string(), style),
            Span::styled(heading, style.add_modifier(Modifier::BOLD)),
            Span::styled(BoxChars::HORIZONTAL.repeat(fill), style),
            Span::styled(state, style),
            Span::styled(BoxChars::HORIZONTAL.to_string(), style),
            Span::styled(BoxChars::ROUND_TOP_RIGHT.to_string(), style),
        ])];

        let content_width = self.width.saturating_sub(4);
        if let Some(detail) = detail {
            lines.extend(
                wrap(detail, content_width)
                    .into_iter()
                    .take(2)
                    .map(|text| content_line(text.as_ref(), content_width, style)),
            );
        }

        lines.push(Line::from(Span::styled(
            format!(
                "{}{}{}",
                BoxChars::ROUND_BOTTOM_LEFT,
                BoxChars::HORIZONTAL.repeat(self.width.saturating_sub(2)),
                BoxChars::ROUND_BOTTOM_RIGHT
            ),
            style,
        )));
        lines
    }

    fn wrapped(&self, text: &str, style: Style) -> Vec<Line<'static>> {
        text.split('\n')
            .flat_map(|paragraph| {
                if paragraph.is_empty() {
                    vec![Line::default()]
                } else {
                    wrap(paragraph, self.width)
                        .into_iter()
                        .map(|l| Line::from(Span::styled(l.into_owned(), style)))
                        .collect()
                }
            })
            .collect()
    }

    fn quoted(&self, text: &str, style: Style) -> Vec<Line<'static>> {
        let inner = self.width.saturating_sub(2);
        text.split('\n')
            .flat_map(|paragraph| {
                wrap(paragraph, inner)
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect::<Vec<_>>()
            })
            .map(|l| {
                Line::from(vec![
                    Span::styled(format!("{} ", BoxChars::QUOTE), Theme::muted()),
                    Span::styled(l, style),
                ])
            })
            .collect()
    }

    fn divider(&self) -> Line<'static> {
        Line::from(Span::styled(
            BoxChars::DIVIDER_LIGHT.repeat(self.width.min(40)),
            Theme::muted(),
        ))
    }
}

fn content_line(text: &str, content_width: usize, style: Style) -> Line<'static> {
    let padding = content_width.saturating_sub(text.width());
    Line::from(vec![
        Span::styled(BoxChars::VERTICAL.to_string(), style),
        Span::raw(" ".to_string()),
        Span::styled(text.to_string(), Theme::text()),
        Span::raw(" ".repeat(padding)),
        Span::raw(" ".to_string()),
        Span::styled(BoxChars::VERTICAL.to_string(), style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{
        FileSearchCall, MessageItem, OutputItem, ResponseStatus, TextPart,
    };

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn sample(status: ItemStatus) -> Response {
        let mut response = Response::new("resp_1", ResponseStatus::InProgress).with_output(vec![
            OutputItem::FileSearchCall(FileSearchCall {
                id: "fs_1".into(),
                status,
                queries: vec!["refund".into()],
                results: None,
            }),
            OutputItem::Message(
                MessageItem::new("msg_1")
                    .with_text(TextPart::new("Refunds are allowed within thirty days.")),
            ),
        ]);
        response.model = "gpt-4o".into();
        response
    }

    #[test]
    fn card_lines_fill_the_width() {
        let lines = response_lines(&sample(ItemStatus::Completed), 40, 0);

        let top = plain(&lines[1]);
        assert!(top.starts_with('╭'));
        assert!(top.contains("ok file search"));
        assert_eq!(top.width(), 40);

        let bottom = plain(&lines[3]);
        assert_eq!(bottom.width(), 40);
    }

    #[test]
    fn running_tool_shows_spinner() {
        let lines = response_lines(&sample(ItemStatus::Searching), 40, 1);
        assert!(plain(&lines[1]).contains("◓ file search"));
    }

    #[test]
    fn message_text_wraps() {
        let lines = response_lines(&sample(ItemStatus::Completed), 20, 0);
        let text: Vec<String> = lines.iter().map(plain).collect();
        assert!(text.contains(&"Refunds are allowed".to_string()));
        assert!(text.contains(&"within thirty days.".to_string()));
    }

    #[test]
    fn header_shows_model_and_status() {
        let lines = response_lines(&sample(ItemStatus::Completed), 40, 0);
        assert!(plain(&lines[0]).contains("gpt-4o · in progress"));
    }

    #[test]
    fn too_narrow_falls_back_to_status() {
        let lines = response_lines(&sample(ItemStatus::Completed), 10, 0);
        assert_eq!(lines.len(), 1);
    }
}
