//!
//! Invocations backend client
//! --------------------------
//! Resilient wrapper over the backend connection used by workers to pull
//! pending work and report outcomes. One framed-JSON request line per call,
//! one response line back.
//!
//! Failure handling: any transport-level fault tears the connection down
//! immediately and surfaces the original error; the client never retries and
//! never reuses a session that has seen a fault. Errors reported by the
//! backend in a well-formed response (authorization denials included) leave
//! the connection intact.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::acl::{OP_FAIL_REQUEST, OP_FETCH_REQUEST, OP_RESULT};
use crate::error::{Error, Result};

/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_connect_timeout() -> u64 { DEFAULT_CONNECT_TIMEOUT_MS }

impl Default for ClientConfig {
    fn default() -> Self {
        Self { connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS }
    }
}

/// One unit of pending work handed to a worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationRequest {
    pub request_id: String,
    pub func_args: String,
}

/// Framed-JSON session with the backend.
struct BackendSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl BackendSession {
    async fn connect(host: &str, port: u16, config: &ClientConfig) -> Result<Self> {
        let connect = TcpStream::connect((host, port));
        let timeout = Duration::from_millis(config.connect_timeout_ms);
        let stream = match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => return Err(Error::transport(format!("connect {host}:{port}: {e}"))),
            Err(_) => {
                return Err(Error::transport(format!(
                    "connect {host}:{port}: timed out after {}ms",
                    config.connect_timeout_ms
                )))
            }
        };
        stream.set_nodelay(true).ok();
        let (read, write) = stream.into_split();
        Ok(Self { reader: BufReader::new(read), writer: write })
    }

    /// Sends one request frame and reads one response frame. Transport-level
    /// failures (I/O, EOF, unparseable frame) surface as `Error::Transport`;
    /// backend-reported failures keep their own variants.
    async fn call(&mut self, request: &Value) -> Result<Value> {
        let mut line = request.to_string();
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        self.writer.flush().await.map_err(|e| Error::transport(e.to_string()))?;

        let mut buf = String::new();
        let n = self
            .reader
            .read_line(&mut buf)
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        if n == 0 {
            return Err(Error::transport("connection closed by backend"));
        }
        let resp: Value = serde_json::from_str(buf.trim_end())
            .map_err(|e| Error::transport(format!("unparseable response frame: {e}")))?;

        match resp.get("status").and_then(Value::as_str) {
            Some("ok") => Ok(resp),
            Some("error") => {
                let kind = resp.get("kind").and_then(Value::as_str).unwrap_or("unknown");
                let message = resp
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                if kind == "authorization" {
                    Err(Error::RemoteAuthorization { message })
                } else {
                    Err(Error::Remote { kind: kind.to_string(), message })
                }
            }
            _ => Err(Error::transport("response frame missing status")),
        }
    }
}

/// Client handle for the invocations backend. Host and port survive
/// invalidation so the owner can always construct a fresh client; the
/// session itself is gone for good once a transport fault is seen.
pub struct InvocationsClient {
    host: String,
    port: u16,
    config: ClientConfig,
    conn: Option<BackendSession>,
}

impl InvocationsClient {
    /// Establishes a live connection. Failure here is a hard error: no
    /// half-initialized client is ever returned.
    pub async fn connect(host: &str, port: u16, config: ClientConfig) -> Result<Self> {
        let session = BackendSession::connect(host, port, &config).await?;
        info!("invocations client connected to {}:{}", host, port);
        Ok(Self { host: host.to_string(), port, config, conn: Some(session) })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// False once a transport fault has torn the session down.
    pub fn is_live(&self) -> bool {
        self.conn.is_some()
    }

    /// Reports a completed invocation's result.
    pub async fn submit_result(&mut self, id: &str, result: &str) -> Result<()> {
        self.call(&json!({ "op": OP_RESULT, "id": id, "result": result }))
            .await
            .map(|_| ())
    }

    /// Pulls the next pending request for `function`, if any.
    pub async fn fetch_request(&mut self, function: &str) -> Result<Option<InvocationRequest>> {
        let resp = self
            .call(&json!({ "op": OP_FETCH_REQUEST, "function": function }))
            .await?;
        match resp.get("request") {
            None | Some(Value::Null) => Ok(None),
            Some(v) => match serde_json::from_value::<InvocationRequest>(v.clone()) {
                Ok(req) => Ok(Some(req)),
                Err(e) => {
                    // A frame that violates the protocol means the session
                    // can no longer be trusted.
                    self.invalidate();
                    Err(Error::transport(format!("malformed request payload: {e}")))
                }
            },
        }
    }

    /// Marks an invocation as failed so it can be rescheduled.
    pub async fn fail_request(&mut self, id: &str) -> Result<()> {
        self.call(&json!({ "op": OP_FAIL_REQUEST, "id": id }))
            .await
            .map(|_| ())
    }

    async fn call(&mut self, request: &Value) -> Result<Value> {
        let Some(conn) = self.conn.as_mut() else {
            return Err(Error::Invalidated);
        };
        match conn.call(request).await {
            Err(e) if e.is_transport() => {
                self.invalidate();
                Err(e)
            }
            other => other,
        }
    }

    fn invalidate(&mut self) {
        if self.conn.take().is_some() {
            warn!(
                "invocations connection to {}:{} invalidated after transport fault",
                self.host, self.port
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_defaults() {
        let cfg: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS);
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn invocation_request_roundtrip() {
        let req = InvocationRequest { request_id: "17".into(), func_args: "[2,3]".into() };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(serde_json::from_value::<InvocationRequest>(v).unwrap(), req);
    }
}
