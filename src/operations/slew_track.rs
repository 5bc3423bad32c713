//! [`SlewTrack`] — slews to an Az/Alt target and sets the tracking state.
//!
//! Both coordinates are optional as a pair: omitting them renders a script
//! whose slew call is guarded out, leaving a pure "track in place" command.

use crate::error::{BridgeError, Result};
use crate::operation::{Angle, Operation, Tracking};
use crate::reply::RawReply;
use crate::script::{RenderedScript, Template};

const TEMPLATE: Template = Template::new(
    SlewTrack::NAME,
    r#"/* Java Script */
/* Socket Start Packet */
var TargetAz = "{az}";
var TargetAlt = "{alt}";
var Track = "{tr}";
var Out;

sky6RASCOMTele.Connect();

if (sky6RASCOMTele.IsConnected == 0)
{
    Out = "Not connected";
}
else
{
    if (TargetAz && TargetAlt)
    {
        sky6RASCOMTele.SlewToAzAlt(TargetAz, TargetAlt, "");
    }
    if (Track)
    {
        sky6RASCOMTele.SetTracking(Track, 1, 0, 0);
    }
    Out = sky6RASCOMTele.LastSlewError();
}
/* Socket End Packet */
"#,
    &["az", "alt", "tr"],
);

/// Moves the mount to an Az/Alt target and applies a tracking directive.
///
/// Success means the host reported an empty or zero last-slew-error code.
/// Never retried: repeating a slew against mount hardware is not idempotent.
#[derive(Debug)]
pub struct SlewTrack {
    pub azimuth: Option<Angle>,
    pub altitude: Option<Angle>,
    pub tracking: Tracking,
}

impl SlewTrack {
    pub const NAME: &'static str = "slew";

    pub fn new(azimuth: Option<Angle>, altitude: Option<Angle>, tracking: Tracking) -> Self {
        Self {
            azimuth,
            altitude,
            tracking,
        }
    }

    /// A slew-less variant that only changes the tracking state.
    pub fn track_only(tracking: Tracking) -> Self {
        Self::new(None, None, tracking)
    }

    fn invalid(reason: &str) -> BridgeError {
        BridgeError::InvalidParameter {
            operation: Self::NAME,
            reason: reason.into(),
        }
    }
}

impl Operation for SlewTrack {
    type Reply = ();

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self) -> Result<RenderedScript> {
        if self.azimuth.is_some() != self.altitude.is_some() {
            return Err(Self::invalid(
                "azimuth and altitude must be supplied together",
            ));
        }
        for angle in [&self.azimuth, &self.altitude].into_iter().flatten() {
            if !angle.is_renderable() {
                return Err(Self::invalid("coordinate is not a finite angle"));
            }
        }

        let az = self.azimuth.as_ref().map(Angle::token).unwrap_or_default();
        let alt = self.altitude.as_ref().map(Angle::token).unwrap_or_default();
        TEMPLATE.render(&[
            ("az", az),
            ("alt", alt),
            ("tr", self.tracking.token().into()),
        ])
    }

    fn decode(&self, reply: &RawReply) -> Result<()> {
        if reply.is_not_connected() {
            return Err(BridgeError::NotConnected);
        }
        if let Some(code) = reply.engine_error() {
            return Err(BridgeError::Slew(code));
        }

        let code = reply.payload();
        if code.is_empty() || matches!(code.parse::<f64>(), Ok(value) if value == 0.0) {
            return Ok(());
        }
        Err(BridgeError::Slew(code.into()))
    }
}
