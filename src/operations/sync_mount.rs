//! [`SyncMount`] — registers the mount on a known RA/Dec position.
//!
//! The host decides whether the sync runs synchronously (the script blocks
//! until the physical sync completes and replies with a diagnostic line) or
//! asynchronously (the script replies immediately with a structured object
//! whose position is still zeroed). [`SyncReply`] tags which shape came back.

use crate::error::{BridgeError, Result};
use crate::operation::Operation;
use crate::reply::{RawReply, TelescopeStatus};
use crate::script::{RenderedScript, Template};

const TEMPLATE: Template = Template::new(
    SyncMount::NAME,
    r#"/* Java Script */
/* Socket Start Packet */
var TargetRa = "{ra}";
var TargetDec = "{dec}";
var Out;

sky6RASCOMTele.Connect();

if (sky6RASCOMTele.IsConnected == 0)
{
    Out = "Not connected";
}
else
{
    sky6RASCOMTele.Sync(TargetRa, TargetDec, "sync");
    if (sky6RASCOMTele.Asynchronous)
    {
        Out = JSON.stringify({
            az: 0,
            alt: 0,
            tr: sky6RASCOMTele.IsTracking,
            sl: sky6RASCOMTele.IsSlewComplete
        });
    }
    else
    {
        Out = "Synced";
    }
}
/* Socket End Packet */
"#,
    &["ra", "dec"],
);

/// How the host acknowledged a position sync.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncReply {
    /// The host ran the sync synchronously and blocked until it finished.
    Completed,
    /// The host queued the sync and reported drive flags only. Azimuth and
    /// altitude in the carried status are zeroed placeholders, not a
    /// recomputed position; callers must not treat them as authoritative.
    Deferred(TelescopeStatus),
}

/// Syncs the mount on an RA/Dec position in the host's native notation.
///
/// Never retried: repeating a sync against mount hardware is not idempotent.
#[derive(Debug)]
pub struct SyncMount {
    pub ra: String,
    pub dec: String,
}

impl SyncMount {
    pub const NAME: &'static str = "sync";

    pub fn new(ra: impl Into<String>, dec: impl Into<String>) -> Self {
        Self {
            ra: ra.into(),
            dec: dec.into(),
        }
    }
}

impl Operation for SyncMount {
    type Reply = SyncReply;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self) -> Result<RenderedScript> {
        if self.ra.trim().is_empty() || self.dec.trim().is_empty() {
            return Err(BridgeError::InvalidParameter {
                operation: Self::NAME,
                reason: "both ra and dec are required".into(),
            });
        }
        TEMPLATE.render(&[("ra", self.ra.clone()), ("dec", self.dec.clone())])
    }

    fn decode(&self, reply: &RawReply) -> Result<SyncReply> {
        if reply.is_not_connected() {
            return Err(BridgeError::NotConnected);
        }
        if let Some(code) = reply.engine_error() {
            return Err(BridgeError::Slew(code));
        }

        let payload = reply.payload();
        if payload.starts_with('{') {
            return Ok(SyncReply::Deferred(TelescopeStatus::from_payload(payload)?));
        }
        // A silent reply asserts nothing about connectivity; reject it
        // rather than guess which way the sync went.
        if payload.is_empty() {
            return Err(BridgeError::Protocol(reply.text().into()));
        }
        Ok(SyncReply::Completed)
    }
}
