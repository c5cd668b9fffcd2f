//! Newline-delimited JSON-RPC 2.0 over a pair of byte streams.
//!
//! Calls are strictly sequential: one request is written, then lines are
//! read until the response carrying the same id arrives. Anything else the
//! driver prints as JSON (notifications, stale answers) is skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, trace};

use crate::error::BridgeError;

#[derive(Debug, Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    code: i64,
    message: String,
}

/// A JSON-RPC client over a reader (driver stdout) and a writer (driver stdin).
pub struct RpcChannel<R, W> {
    reader: Lines<R>,
    writer: W,
    next_id: u64,
}

impl<R, W> RpcChannel<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: reader.lines(),
            writer,
            next_id: 1,
        }
    }

    /// Send `method` with `params` and wait for its result.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Remote`] when the driver answers with an error object,
    /// [`BridgeError::Closed`] when its output ends first, and transport or
    /// decoding errors otherwise.
    pub async fn call(&mut self, method: &str, params: Value) -> Result<Value, BridgeError> {
        let id = self.next_id;
        self.next_id += 1;

        let request = Request {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let line = serde_json::to_string(&request).map_err(BridgeError::Encode)?;
        debug!(id, method, "driver request");
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(BridgeError::Io)?;
        self.writer.write_all(b"\n").await.map_err(BridgeError::Io)?;
        self.writer.flush().await.map_err(BridgeError::Io)?;

        loop {
            let Some(line) = self.reader.next_line().await.map_err(BridgeError::Io)? else {
                return Err(BridgeError::Closed);
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let response: Response =
                serde_json::from_str(line).map_err(|source| BridgeError::Decode {
                    line: line.to_string(),
                    source,
                })?;
            if response.id != Some(id) {
                trace!(expected = id, received = ?response.id, "skipping unmatched driver line");
                continue;
            }
            if let Some(RemoteError { code, message }) = response.error {
                debug!(id, method, code, %message, "driver error");
                return Err(BridgeError::Remote { code, message });
            }
            debug!(id, method, "driver response");
            return Ok(response.result.unwrap_or(Value::Null));
        }
    }
}
