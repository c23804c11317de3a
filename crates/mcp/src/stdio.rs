use crate::McpServer;
use rmcp::{ServiceExt, transport::stdio};

/// Serves the MCP tools over stdin/stdout until the client disconnects.
pub async fn run_stdio_server(server: McpServer) -> Result<(), Box<dyn std::error::Error>> {
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
