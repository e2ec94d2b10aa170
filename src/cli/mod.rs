//! CLI module
//!
//! Command-line interface for the UniFi MCP bridge.
//!
//! # Commands
//!
//! - `serve` - Run the MCP server on stdio (default)
//! - `tools` - Print the tool declarations
//! - `call` - Run one tool and print its result
//! - `check` - Test login against the controller

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
