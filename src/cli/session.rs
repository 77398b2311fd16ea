//! Turn and conversation driving on top of [`run_turn`].

use std::future::Future;
use std::io::{IsTerminal, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::AppConfig;
use crate::display::{Display, RendererKind, RendererRegistry};
use crate::error::{ClientError, Result};
use crate::protocol::ResponseRequest;
use crate::stream::{TurnOutcome, run_turn};
use crate::transport::Transport;

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// The rich renderer needs a terminal; anything else gets plain text.
#[must_use]
pub const fn effective_renderer(kind: RendererKind, stdout_is_terminal: bool) -> RendererKind {
    match kind {
        RendererKind::Rich if !stdout_is_terminal => RendererKind::Plain,
        other => other,
    }
}

pub fn build_display(config: &AppConfig, chat: bool) -> Result<Display> {
    let kind = effective_renderer(config.renderer, std::io::stdout().is_terminal());
    let registry = RendererRegistry::with_defaults();
    Ok(Display::new(&registry, kind, &config.render_options())?.chat(chat))
}

/// Uses `prompt` when given, otherwise the whole of piped stdin.
pub fn resolve_prompt(prompt: Option<String>) -> Result<String> {
    if let Some(prompt) = prompt.filter(|p| !p.trim().is_empty()) {
        return Ok(prompt);
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(ClientError::Config(
            "No prompt given. Pass one as an argument, pipe it on stdin, or use --chat".into(),
        ));
    }

    let input = std::io::read_to_string(stdin)?;
    let input = input.trim();
    if input.is_empty() {
        return Err(ClientError::Config("Prompt on stdin is empty".into()));
    }
    Ok(input.to_string())
}

/// Conversation state across turns: which transport to use, how requests
/// are built, and the id the next turn chains from.
pub struct Session<'a, T: Transport + ?Sized> {
    transport: &'a T,
    config: &'a AppConfig,
    previous_response_id: Option<String>,
    turns: usize,
}

impl<'a, T: Transport + ?Sized> Session<'a, T> {
    pub const fn new(transport: &'a T, config: &'a AppConfig) -> Self {
        Self {
            transport,
            config,
            previous_response_id: None,
            turns: 0,
        }
    }

    #[must_use]
    pub fn previous_response_id(&self) -> Option<&str> {
        self.previous_response_id.as_deref()
    }

    #[must_use]
    pub const fn turns(&self) -> usize {
        self.turns
    }

    #[must_use]
    pub fn request(&self, input: &str) -> ResponseRequest {
        let mut request = ResponseRequest::new(&self.config.model, input)
            .with_previous_response_id(self.previous_response_id.clone());
        if let Some(instructions) = self.config.instructions.as_deref().filter(|i| !i.is_empty()) {
            request = request.with_instructions(instructions);
        }
        self.config
            .tools()
            .into_iter()
            .fold(request, ResponseRequest::with_tool)
    }

    /// Runs one turn. A final Response with an id becomes the parent of the
    /// next turn; a cancelled turn leaves the chain where it was.
    pub async fn turn<C: Future>(
        &mut self,
        input: &str,
        display: &mut Display,
        cancel: C,
    ) -> Result<TurnOutcome> {
        let request = self.request(input);
        let outcome = run_turn(self.transport, &request, display, cancel).await?;
        self.turns += 1;

        if let Some(response) = outcome.final_response().filter(|r| !r.id.is_empty()) {
            self.previous_response_id = Some(response.id.clone());
        }

        Ok(outcome)
    }
}

/// Converts a failed turn into an error so the process exits non-zero.
pub fn ensure_succeeded(outcome: &TurnOutcome) -> Result<()> {
    if !outcome.failed() {
        return Ok(());
    }
    let (id, message) = outcome.response.as_ref().map_or_else(
        || (String::new(), "no response".to_string()),
        |r| {
            (
                r.id.clone(),
                r.error
                    .as_ref()
                    .map_or_else(|| "no details".to_string(), |e| e.message.clone()),
            )
        },
    );
    Err(ClientError::ResponseFailed { id, message })
}

/// Reads prompts line by line until EOF, `exit` or `quit`, running one turn
/// per line. `cancel` is called once per turn and once per prompt read; its
/// future resolving during a read ends the chat. Turn errors are reported on
/// `prompt_out` and the chat goes on. Returns the number of turns run.
pub async fn run_chat<T, R, W, F, C>(
    session: &mut Session<'_, T>,
    display: &mut Display,
    input: R,
    prompt_out: &mut W,
    mut cancel: F,
) -> Result<usize>
where
    T: Transport + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
    F: FnMut() -> C,
    C: Future,
{
    let mut lines = input.lines();

    loop {
        write!(prompt_out, "> ")?;
        prompt_out.flush()?;

        let line = tokio::select! {
            biased;
            _ = cancel() => None,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            writeln!(prompt_out)?;
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&line) {
            break;
        }

        match session.turn(line, display, cancel()).await {
            Ok(outcome) => {
                if let Err(e) = ensure_succeeded(&outcome) {
                    writeln!(prompt_out, "Error: {e}")?;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "chat turn failed");
                writeln!(prompt_out, "Error: {e}")?;
                if let Some(hint) = e.hint() {
                    writeln!(prompt_out, "{hint}")?;
                }
            }
        }
    }

    tracing::info!(turns = session.turns(), "chat ended");
    Ok(session.turns())
}
