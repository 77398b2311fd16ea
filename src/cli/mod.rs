mod args;
pub mod session;

pub use args::{Cli, Commands, ConfigSubcommands};
pub use session::{Session, build_display, ensure_succeeded, resolve_prompt, run_chat};
