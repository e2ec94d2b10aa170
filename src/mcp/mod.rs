//! Model Context Protocol surface
//!
//! JSON-RPC 2.0 over stdio: `initialize`, `tools/*`, `resources/*` and
//! `prompts/*`, each answered from the shared controller client.

pub mod prompts;
pub mod resources;
pub mod rpc;
mod server;

pub use prompts::Prompt;
pub use resources::Resource;
pub use rpc::RpcError;
pub use server::{McpServer, MCP_PROTOCOL_VERSION, MCP_SERVER_NAME};
