//! The telescope operation façade.
//!
//! Composes render → execute → decode for every operation, serializes access
//! to the single-threaded scripting host, and retries transport failures for
//! the read-only status query.

use crate::error::Result;
use crate::operation::{Angle, Operation, Tracking};
use crate::operations::{DisconnectMount, GetStatus, SlewTrack, SyncMount, SyncReply};
use crate::reply::TelescopeStatus;
use crate::transport::{DEFAULT_PORT, ScriptHost, TcpScriptHost};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Bounded retry with exponential backoff and random jitter.
///
/// Applied only to operations that declare themselves idempotent; everything
/// else fails on the first transport error.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub attempts: u32,
    /// Delay before the second attempt; doubles per attempt after that.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        let doubled = self.base_delay.saturating_mul(1 << (attempt - 1));
        let jitter = rand::thread_rng().gen_range(0..=self.base_delay.as_millis() as u64);
        doubled + Duration::from_millis(jitter)
    }
}

/// The public face of the bridge.
///
/// Every method performs one full render → execute → decode round trip and
/// holds no state across calls: the remote mount connection can drop and
/// return outside the bridge's control, so each call re-validates it from
/// scratch. Calls may be issued concurrently; the execute step is serialized
/// in arrival order by an async mutex around the shared [`ScriptHost`], while
/// rendering and decoding stay outside the gate.
pub struct TelescopeBridge<H: ScriptHost = TcpScriptHost> {
    host: Arc<Mutex<H>>,
    retry: RetryPolicy,
}

impl TelescopeBridge<TcpScriptHost> {
    /// Bridge to a scripting host over TCP.
    pub fn connect_to(host: impl Into<String>, port: u16) -> Self {
        Self::with_host(TcpScriptHost::new(host, port))
    }

    /// Bridge to a scripting host on the conventional port.
    pub fn local() -> Self {
        Self::connect_to("localhost", DEFAULT_PORT)
    }
}

impl<H: ScriptHost> TelescopeBridge<H> {
    /// Bridge over any [`ScriptHost`] implementation.
    pub fn with_host(host: H) -> Self {
        Self {
            host: Arc::new(Mutex::new(host)),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the default retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Read the mount's current position and drive flags.
    pub async fn get_status(&self) -> Result<TelescopeStatus> {
        self.run_with_retry(&GetStatus::new()).await
    }

    /// Slew to an Az/Alt target and apply a tracking directive.
    ///
    /// Omitting both coordinates is legal and means "track in place without
    /// slewing"; supplying only one is rejected.
    pub async fn slew_and_track(
        &self,
        azimuth: Option<Angle>,
        altitude: Option<Angle>,
        tracking: Tracking,
    ) -> Result<()> {
        self.run(&SlewTrack::new(azimuth, altitude, tracking)).await
    }

    /// Sync the mount on a known RA/Dec position.
    ///
    /// The returned [`SyncReply`] tags whether the host blocked until the
    /// sync completed or deferred it; a deferred status carries zeroed
    /// azimuth/altitude that must not be treated as a real position.
    pub async fn sync(&self, ra: impl Into<String>, dec: impl Into<String>) -> Result<SyncReply> {
        self.run(&SyncMount::new(ra, dec)).await
    }

    /// Release the mount hardware from the scripting host.
    pub async fn disconnect_mount(&self) -> Result<()> {
        self.run(&DisconnectMount::new()).await
    }

    /// One full round trip. Rendering happens before the gate is taken and
    /// decoding after it is released, so only the exchange itself is
    /// serialized.
    async fn run<O: Operation>(&self, operation: &O) -> Result<O::Reply> {
        let script = operation.render()?;
        debug!(operation = operation.name(), "executing script");
        let raw = {
            let mut host = self.host.lock().await;
            host.exchange(&script).await?
        };
        operation.decode(&raw)
    }

    async fn run_with_retry<O: Operation>(&self, operation: &O) -> Result<O::Reply> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.run(operation).await {
                Err(err)
                    if err.is_transient()
                        && operation.is_idempotent()
                        && attempt < self.retry.attempts =>
                {
                    let delay = self.retry.delay_for(attempt);
                    info!(
                        operation = operation.name(),
                        attempt, "transport failure ({err}), retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}
