//! MCP server wiring: the tool handler and the stdio session around it.

use anyhow::Context;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ClientJsonRpcMessage, Content, Implementation,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

const SERVER_NAME: &str = "httpx-mcp";
const PIPE_CAPACITY: usize = 64 * 1024;

/// Serves the `http_request` and `http_raw` tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpxServer;

impl ServerHandler for HttpxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Implementation::default()
            },
            instructions: Some(
                "Send HTTP requests with http_request, or replay a captured request with http_raw."
                    .to_owned(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(crate::tools::list_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.into_owned();
        let arguments = request.arguments.map_or(Value::Null, Value::Object);
        debug!(tool = %name, "Tool call received");

        // The executor blocks on the network, keep it off the runtime workers.
        let text = tokio::task::spawn_blocking(move || crate::tools::call_tool(&name, arguments))
            .await
            .map_err(|e| McpError::internal_error(format!("Tool task failed: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

/// Run one MCP session over `reader`/`writer` until the client goes away.
pub async fn serve_transport<R, W>(reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let (inbound, filtered) = tokio::io::duplex(PIPE_CAPACITY);
    let forwarder = tokio::spawn(forward_messages(reader, inbound));

    let service = HttpxServer
        .serve((filtered, writer))
        .await
        .context("Failed to initialize MCP session")?;
    let reason = service
        .waiting()
        .await
        .context("MCP session task failed")?;
    info!(?reason, "MCP session ended");

    forwarder.abort();
    Ok(())
}

/// Copy newline-delimited messages from `reader` to `writer`, dropping lines that are not
/// client JSON-RPC messages. Bytes that are not UTF-8 are decoded lossily, so one bad line
/// never ends the session.
pub(crate) async fn forward_messages<R, W>(reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = serde_json::from_str::<ClientJsonRpcMessage>(line) {
            warn!(error = %e, "Dropping unreadable message");
            continue;
        }
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    debug!("Input closed");
    writer.shutdown().await
}
