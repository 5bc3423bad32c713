//! [`GetStatus`] — reads the mount position and drive flags.
//!
//! The script connects the scriptable mount object, reads Az/Alt, and emits
//! either the `"Not connected"` sentinel or a JSON snapshot.

use crate::error::{BridgeError, Result};
use crate::operation::Operation;
use crate::reply::{RawReply, TelescopeStatus};
use crate::script::{RenderedScript, Template};

const TEMPLATE: Template = Template::new(
    GetStatus::NAME,
    r#"/* Java Script */
/* Socket Start Packet */
var Out;

sky6RASCOMTele.Connect();

if (sky6RASCOMTele.IsConnected == 0)
{
    Out = "Not connected";
}
else
{
    sky6RASCOMTele.GetAzAlt();
    Out = JSON.stringify({
        az: sky6RASCOMTele.dAz,
        alt: sky6RASCOMTele.dAlt,
        tr: sky6RASCOMTele.IsTracking,
        sl: sky6RASCOMTele.IsSlewComplete
    });
}
/* Socket End Packet */
"#,
    &[],
);

/// Queries the mount for its current Az/Alt position and drive flags.
///
/// The only read-only operation in the set, and therefore the only one the
/// bridge will retry after a transport failure.
#[derive(Debug, Default)]
pub struct GetStatus;

impl GetStatus {
    pub const NAME: &'static str = "status";

    pub fn new() -> Self {
        Self
    }
}

impl Operation for GetStatus {
    type Reply = TelescopeStatus;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self) -> Result<RenderedScript> {
        TEMPLATE.render(&[])
    }

    fn decode(&self, reply: &RawReply) -> Result<TelescopeStatus> {
        if reply.is_not_connected() {
            return Err(BridgeError::NotConnected);
        }
        if reply.engine_error().is_some() {
            return Err(BridgeError::Protocol(reply.text().into()));
        }
        TelescopeStatus::from_payload(reply.payload())
    }

    fn is_idempotent(&self) -> bool {
        true
    }
}
