#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod executor;
pub mod format;
pub mod http;
pub mod server;
pub mod tools;

use tracing::info;

pub use error::Error;
pub use server::{HttpxServer, serve_transport};
pub use tools::{call_tool, list_tools};

/// Serve MCP tool calls on stdin/stdout until the client disconnects.
pub async fn run() -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting httpx-mcp on stdio");
    let (stdin, stdout) = rmcp::transport::stdio();
    serve_transport(stdin, stdout).await
}
