//! TCP transport to the scripting host.
//!
//! One request-reply exchange per call: connect, write the full script text,
//! read the reply until the host closes the stream or the `Error = N.`
//! trailer is complete. The host flushes output incrementally, so the reader
//! accumulates partial chunks.

use crate::error::{BridgeError, Result};
use crate::reply::RawReply;
use crate::script::RenderedScript;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// The scripting host's conventional listening port.
pub const DEFAULT_PORT: u16 = 3040;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Slews and syncs legitimately block for tens of seconds on the remote
/// side; the default reply bound has to sit well above that.
const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(60);

/// A peer that executes one script and returns one raw reply.
///
/// The bridge talks to the real host through [`TcpScriptHost`]; tests
/// substitute scripted fakes.
#[async_trait]
pub trait ScriptHost: Send {
    async fn exchange(&mut self, script: &RenderedScript) -> Result<RawReply>;
}

/// Connects to the scripting host over TCP, once per exchange.
///
/// The mount-to-software connection can drop and be re-established outside
/// the bridge's control, so no connection state is trusted across calls:
/// every exchange dials fresh and stands alone.
pub struct TcpScriptHost {
    host: String,
    port: u16,
    connect_timeout: Duration,
    reply_timeout: Duration,
}

impl TcpScriptHost {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Override the connect and reply bounds.
    pub fn with_timeouts(mut self, connect_timeout: Duration, reply_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.reply_timeout = reply_timeout;
        self
    }
}

#[async_trait]
impl ScriptHost for TcpScriptHost {
    async fn exchange(&mut self, script: &RenderedScript) -> Result<RawReply> {
        let addr = format!("{}:{}", self.host, self.port);
        debug!("connecting to scripting host at {addr}");

        let mut stream =
            tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr.as_str()))
                .await
                .map_err(|_| BridgeError::Timeout(self.connect_timeout))??;

        stream.write_all(script.as_bytes()).await?;
        stream.flush().await?;

        let outcome = tokio::time::timeout(self.reply_timeout, read_reply(&mut stream)).await;
        match outcome {
            Ok(reply) => reply,
            Err(_) => {
                warn!(
                    "no complete reply within {:?}, abandoning exchange",
                    self.reply_timeout
                );
                // The host cannot cancel a running script. Park the socket on
                // a drain task so the script finishes against a live peer
                // instead of a half-read connection.
                tokio::spawn(async move {
                    let mut sink = Vec::new();
                    let _ = stream.read_to_end(&mut sink).await;
                });
                Err(BridgeError::Timeout(self.reply_timeout))
            }
        }
    }
}

/// Accumulate reply bytes until EOF or a complete trailer.
async fn read_reply(stream: &mut TcpStream) -> Result<RawReply> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if reply_complete(&buffer) {
            break;
        }
    }

    if buffer.is_empty() {
        return Err(BridgeError::Protocol("empty reply".into()));
    }
    Ok(RawReply::new(String::from_utf8_lossy(&buffer).into_owned()))
}

/// A reply is complete once the `|` frame divider has arrived and the
/// trailer's `Error = N.` verdict is closed off with its period.
fn reply_complete(buffer: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(buffer) else {
        return false;
    };
    match text.split_once('|') {
        Some((_, trailer)) => trailer.contains("Error = ") && trailer.trim_end().ends_with('.'),
        None => false,
    }
}
