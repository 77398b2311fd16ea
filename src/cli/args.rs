//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::display::RendererKind;

#[derive(Parser, Debug)]
#[command(name = "respstream")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Prompt to send. Read from stdin when omitted
    pub prompt: Option<String>,

    /// Read prompts line by line and chain each turn to the previous response
    #[arg(long)]
    pub chat: bool,

    /// Model to use (e.g., gpt-4o, gpt-4.1-mini)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<RendererKind>,

    /// System-level instructions for the model
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// Enable file search over a vector store (repeatable)
    #[arg(long = "file-search", value_name = "VECTOR_STORE_ID")]
    pub file_search: Vec<String>,

    /// Enable the web search tool
    #[arg(long)]
    pub web_search: bool,

    /// Enable the code interpreter tool
    #[arg(long)]
    pub code_interpreter: bool,

    /// With --output json, write every update as one line
    #[arg(long, global = true)]
    pub json_lines: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write JSON logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a recorded SSE capture instead of calling the service
    Replay {
        /// File holding the raw event stream
        file: PathBuf,

        /// Feed the capture in chunks of this many bytes
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<usize>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommands {
    /// Initialize a new config file
    Init,
    /// Print config file location
    Where,
}

impl Cli {
    /// Layers the command-line flags over `config`.
    #[must_use]
    pub fn apply_to(&self, mut config: AppConfig) -> AppConfig {
        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(kind) = self.output {
            config.renderer = kind;
        }
        if let Some(instructions) = &self.instructions {
            config.instructions = Some(instructions.clone());
        }
        if !self.file_search.is_empty() {
            config.vector_store_ids.clone_from(&self.file_search);
        }
        config.web_search |= self.web_search;
        config.code_interpreter |= self.code_interpreter;
        config.json_lines |= self.json_lines;
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        config
    }
}
