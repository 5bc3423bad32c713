//! [`DisconnectMount`] — releases the mount from the scripting host.

use crate::error::{BridgeError, Result};
use crate::operation::Operation;
use crate::reply::RawReply;
use crate::script::{RenderedScript, Template};

const TEMPLATE: Template = Template::new(
    DisconnectMount::NAME,
    r#"/* Java Script */
/* Socket Start Packet */
var Out;

if (sky6RASCOMTele.IsConnected == 0)
{
    Out = "Not connected";
}
else
{
    sky6RASCOMTele.Disconnect();
    Out = "Disconnected";
}
/* Socket End Packet */
"#,
    &[],
);

/// Disconnects the scriptable mount object from the mount hardware.
///
/// Unlike the other operations this one deliberately does not call
/// `Connect()` first: re-establishing the link just to tear it down again
/// would bounce the mount through a pointless connect cycle.
#[derive(Debug, Default)]
pub struct DisconnectMount;

impl DisconnectMount {
    pub const NAME: &'static str = "disconnect";

    pub fn new() -> Self {
        Self
    }
}

impl Operation for DisconnectMount {
    type Reply = ();

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self) -> Result<RenderedScript> {
        TEMPLATE.render(&[])
    }

    fn decode(&self, reply: &RawReply) -> Result<()> {
        if reply.is_not_connected() {
            return Err(BridgeError::NotConnected);
        }
        if reply.engine_error().is_some() {
            return Err(BridgeError::Protocol(reply.text().into()));
        }
        match reply.payload() {
            "Disconnected" => Ok(()),
            _ => Err(BridgeError::Protocol(reply.text().into())),
        }
    }
}
