//! Folding decoded events into one current Response per turn.

pub mod citations;
pub mod state;
pub mod turn;

pub use citations::{CitationRegistry, install};
pub use state::StreamState;
pub use turn::{TurnEnd, TurnOutcome, run_turn};
