/// MCP server plumbing: JSON-RPC message types, the stdio transport, the tool
/// registry, and the request loop that wires them together.
pub mod errors;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

/// Protocol revision echoed back during the initialize handshake.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "jira-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
