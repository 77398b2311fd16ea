//! Live terminal view built on a ratatui inline viewport.

pub mod lines;
pub mod scroll;
pub mod theme;

use std::io::Stdout;

use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::widgets::{Paragraph, Widget};
use ratatui::{Terminal, TerminalOptions, Viewport};

use crate::display::{RenderError, Renderer};
use crate::protocol::Response;

use lines::response_lines;
use scroll::TailScroll;

const MIN_VIEWPORT_HEIGHT: u16 = 3;

/// Redraws the newest part of the frame on every update; `finalize` moves
/// the full frame into scrollback and leaves an empty viewport behind.
pub struct RichRenderer<B: Backend> {
    terminal: Terminal<B>,
    scroll: TailScroll,
    frame: usize,
    latest: Option<Response>,
}

impl RichRenderer<CrosstermBackend<Stdout>> {
    /// The viewport is capped one row short of the terminal height.
    pub fn stdout(viewport_height: u16) -> Result<Self, RenderError> {
        let rows = crossterm::terminal::size().map_or(u16::MAX, |(_, rows)| rows);
        let height = viewport_height
            .min(rows.saturating_sub(1))
            .max(MIN_VIEWPORT_HEIGHT);
        let backend = CrosstermBackend::new(std::io::stdout());
        let terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(height),
            },
        )
        .map_err(|e| RenderError::Terminal(e.to_string()))?;
        Ok(Self::with_terminal(terminal))
    }
}

impl<B: Backend> RichRenderer<B> {
    pub const fn with_terminal(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            scroll: TailScroll::new(),
            frame: 0,
            latest: None,
        }
    }

    pub const fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    #[must_use]
    pub const fn scroll(&self) -> &TailScroll {
        &self.scroll
    }
}

impl<B: Backend + Send> Renderer for RichRenderer<B> {
    fn render(&mut self, response: &Response) -> Result<(), RenderError> {
        let frame = self.frame;
        let scroll = &mut self.scroll;

        self.terminal.draw(|f| {
            let area = f.area();
            let lines = response_lines(response, area.width, frame);
            let offset = scroll.follow(lines.len(), area.height as usize);
            let offset = u16::try_from(offset).unwrap_or(u16::MAX);
            f.render_widget(Paragraph::new(lines).scroll((offset, 0)), area);
        })?;

        self.frame = self.frame.wrapping_add(1);
        self.latest = Some(response.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), RenderError> {
        if let Some(response) = self.latest.take() {
            let width = self.terminal.size()?.width;
            let lines = response_lines(&response, width, self.frame);
            let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
            self.terminal.insert_before(height, |buf| {
                Paragraph::new(lines).render(buf.area, buf);
            })?;
        }
        self.terminal.clear()?;
        self.scroll.reset();
        self.frame = 0;
        Ok(())
    }
}
