//! Presentation layer for taskforce
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and terminal human input.

pub mod cli;
pub mod input;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormatArg};
pub use input::StdinHumanInput;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ConsoleRunObserver;
