use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use jira_mcp::config::JiraConfig;
use jira_mcp::jira::JiraClient;
use jira_mcp::mcp::server::MCPServer;
use jira_mcp::mcp::transport::StdioTransport;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // stdout carries the protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match JiraConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    info!("Configured for Jira instance at {}", config.base_url);

    let client = match JiraClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let server = match MCPServer::new(client) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to register tools: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(StdioTransport::new()).await {
        error!("Server terminated with error: {}", e);
        std::process::exit(1);
    }
}
