//! Renderer dispatch: one active renderer per [`Display`], chosen from an
//! explicit [`RendererRegistry`].

pub mod error;
pub mod format;
pub mod json;
pub mod plain;
pub mod rich;

use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::protocol::Response;

pub use error::RenderError;
pub use json::JsonRenderer;
pub use plain::PlainRenderer;
pub use rich::RichRenderer;

/// An output format. Renderers never diff frames themselves; each call gets
/// the whole current Response.
pub trait Renderer: Send {
    fn render(&mut self, response: &Response) -> std::result::Result<(), RenderError>;

    /// Flushes visible output. The renderer must accept a new sequence of
    /// `render` calls afterwards.
    fn finalize(&mut self) -> std::result::Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Rich,
    Plain,
    Json,
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rich => "rich",
            Self::Plain => "plain",
            Self::Json => "json",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub json_lines: bool,
    pub viewport_height: u16,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            json_lines: false,
            viewport_height: 12,
        }
    }
}

pub type RendererFactory = Box<
    dyn Fn(&RenderOptions) -> std::result::Result<Box<dyn Renderer>, RenderError> + Send + Sync,
>;

/// Renderer kinds and how to build them.
#[derive(Default)]
pub struct RendererRegistry {
    factories: HashMap<RendererKind, RendererFactory>,
}

impl RendererRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain, JSON and rich renderers writing to stdout.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RendererKind::Plain, |_| {
            Ok(Box::new(PlainRenderer::new(std::io::stdout())))
        });
        registry.register(RendererKind::Json, |options| {
            Ok(Box::new(JsonRenderer::new(
                std::io::stdout(),
                options.json_lines,
            )))
        });
        registry.register(RendererKind::Rich, |options| {
            Ok(Box::new(RichRenderer::stdout(options.viewport_height)?))
        });
        registry
    }

    pub fn register<F>(&mut self, kind: RendererKind, factory: F)
    where
        F: Fn(&RenderOptions) -> std::result::Result<Box<dyn Renderer>, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
    }

    #[must_use]
    pub fn contains(&self, kind: RendererKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn create(&self, kind: RendererKind, options: &RenderOptions) -> Result<Box<dyn Renderer>> {
        let factory = self
            .factories
            .get(&kind)
            .ok_or_else(|| ClientError::UnknownRenderer(kind.to_string()))?;
        Ok(factory(options)?)
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Idle,
    Rendering,
    Finalized,
}

/// Forwards each merged Response to the active renderer and tracks its
/// lifecycle. Render failures are reported on the error sink and never
/// stop the stream.
pub struct Display {
    renderer: Box<dyn Renderer>,
    state: RendererState,
    chat: bool,
    errors: Box<dyn Write + Send>,
    failures: usize,
}

impl Display {
    pub fn new(registry: &RendererRegistry, kind: RendererKind, options: &RenderOptions) -> Result<Self> {
        let renderer = registry.create(kind, options)?;
        tracing::debug!(renderer = %kind, "display created");
        Ok(Self::from_renderer(renderer))
    }

    #[must_use]
    pub fn from_renderer(renderer: Box<dyn Renderer>) -> Self {
        Self {
            renderer,
            state: RendererState::Idle,
            chat: false,
            errors: Box::new(std::io::stderr()),
            failures: 0,
        }
    }

    /// In chat mode a finalized display starts over on the next `handle`.
    #[must_use]
    pub const fn chat(mut self, chat: bool) -> Self {
        self.chat = chat;
        self
    }

    #[must_use]
    pub fn with_error_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.errors = Box::new(sink);
        self
    }

    #[must_use]
    pub const fn state(&self) -> RendererState {
        self.state
    }

    /// Number of render or finalize calls that failed.
    #[must_use]
    pub const fn failures(&self) -> usize {
        self.failures
    }

    pub fn handle(&mut self, response: &Response) {
        if self.state == RendererState::Finalized {
            if !self.chat {
                tracing::warn!(response_id = %response.id, "update after display was finalized");
                return;
            }
            self.state = RendererState::Idle;
        }
        self.state = RendererState::Rendering;

        if let Err(e) = self.renderer.render(response) {
            self.report("render", &e);
        }
    }

    pub fn complete(&mut self) {
        if self.state == RendererState::Finalized {
            tracing::debug!("display already finalized");
            return;
        }
        if let Err(e) = self.renderer.finalize() {
            self.report("finalize", &e);
        }
        self.state = RendererState::Finalized;
    }

    fn report(&mut self, stage: &str, error: &RenderError) {
        self.failures += 1;
        tracing::error!(stage, error = %error, "renderer failed");
        if let Err(e) = writeln!(self.errors, "[{stage} error] {error}") {
            tracing::error!(stage, error = %e, "failed to write render error");
        }
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("state", &self.state)
            .field("chat", &self.chat)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}
