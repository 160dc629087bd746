//! The interactive loop and the conversation transcript it owns.

pub mod repl;
pub mod transcript;

pub use repl::{Command, ExitReason, Repl, SessionSummary};
pub use transcript::Transcript;
