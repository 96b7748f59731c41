// Library interface for the mocking CLI
// Exposes modules for testing and reuse

pub mod commands;
pub mod config;
pub mod launcher;
pub mod logging;
pub mod prompt;

pub use commands::Cli;
pub use config::CliConfig;
