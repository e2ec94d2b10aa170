// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # UniFi MCP
//!
//! A Model Context Protocol server that exposes a UniFi network controller
//! as tools, resources and prompts.
//!
//! ## Features
//!
//! - **Session login**: UniFi OS login first, legacy controller login as fallback
//! - **Cookie and CSRF handling**: Tokens captured from every response
//! - **Re-authentication**: A 401 triggers one fresh login and one resend
//! - **Rate limiting**: Sliding window over all outgoing requests
//! - **25 tools**: Devices, clients, health, firewall, QoS, VPN, port forwards, routes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use unifi_mcp::{tools, ToolCall, UnifiClient, UnifiConfig};
//!
//! #[tokio::main]
//! async fn main() -> unifi_mcp::Result<()> {
//!     let config = UnifiConfig::from_env()?;
//!     let client = UnifiClient::new(&config)?;
//!
//!     let call = ToolCall::parse("list_devices", serde_json::json!({}))?;
//!     let devices = tools::execute(&call, &client, &config.site).await?;
//!     println!("{devices:#}");
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    MCP server (stdio JSON-RPC)                  │
//! │  tools/list  tools/call  resources/read  prompts/get            │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴──────────┬───────────────────────┐
//! │    Tools     │         HTTP             │        Auth           │
//! ├──────────────┼──────────────────────────┼───────────────────────┤
//! │ Args         │ UnifiClient              │ UniFi OS login        │
//! │ Handlers     │ Sliding-window limiter   │ Legacy login          │
//! │ Summaries    │ 401 retry                │ Cookies + CSRF        │
//! └──────────────┴──────────────────────────┴───────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and path helpers
pub mod types;

/// Controller connection settings
pub mod config;

/// Login schemes and session state
pub mod auth;

/// HTTP client with session handling and rate limiting
pub mod http;

/// Tool declarations, argument parsing and execution
pub mod tools;

/// MCP protocol server
pub mod mcp;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::UnifiConfig;
pub use error::{Error, Result};
pub use http::{ControllerApi, SharedClient, UnifiClient};
pub use mcp::McpServer;
pub use tools::ToolCall;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
