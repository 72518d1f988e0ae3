//! Blockhub MCP Server
//!
//! Model Context Protocol server exposing cross-module search and
//! suggestions to AI assistants.

pub mod protocol;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};
