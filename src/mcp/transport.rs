use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tracing::warn;

use crate::mcp::errors::{MCPError, MCPResult, TransportError};
use crate::mcp::protocol::MCPMessage;

/// Newline-delimited JSON over stdin/stdout.
///
/// Messages are read and written strictly sequentially; there is no buffering
/// of pending requests beyond the one line currently being handled. Log
/// output must go to stderr so that stdout stays a clean protocol channel.
pub struct StdioTransport {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
        }
    }

    /// Read the next message. Returns `Ok(None)` once stdin is closed.
    ///
    /// Malformed lines must not take the server down: when the broken line
    /// still carries a recoverable `id` the client gets a JSON-RPC error
    /// response, otherwise the line is logged and skipped.
    pub async fn receive(&mut self) -> MCPResult<Option<MCPMessage>> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(TransportError::Io)?;

            let Some(line) = line else {
                return Ok(None);
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match MCPMessage::parse(trimmed) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => {
                    warn!("Malformed message on stdin: {}", e);
                    if let Some(response) = malformed_line_response(trimmed, e) {
                        self.send(&response).await?;
                    }
                }
            }
        }
    }

    /// Write one message followed by a newline and flush.
    pub async fn send(&mut self, message: &MCPMessage) -> MCPResult<()> {
        let line = message.serialize()?;

        self.stdout
            .write_all(line.as_bytes())
            .await
            .map_err(TransportError::Io)?;
        self.stdout
            .write_all(b"\n")
            .await
            .map_err(TransportError::Io)?;
        self.stdout.flush().await.map_err(TransportError::Io)?;

        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the error response for a line that failed to parse, when possible.
///
/// A lenient second parse recovers the request `id` from lines that are
/// valid JSON but invalid JSON-RPC (wrong version, a request carrying a
/// `result`, a mistyped field). Without an `id` there is nothing to answer
/// and the line is dropped.
fn malformed_line_response(line: &str, error: MCPError) -> Option<MCPMessage> {
    let value: Value = serde_json::from_str(line).ok()?;
    let id = value.get("id")?;
    if id.is_null() {
        return None;
    }

    Some(MCPMessage::error_response(id.clone(), error.into()))
}
