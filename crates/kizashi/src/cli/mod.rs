//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the kizashi binary.

mod commands;
mod compose;
mod history;
mod parse;
mod run;

pub use commands::{Cli, Commands};
pub use compose::compose_candidate;
pub use history::show_history;
pub use parse::parse_research;
pub use run::run_bot;
