//! The [`Operation`] trait and the parameter types operations accept.

use crate::error::Result;
use crate::reply::RawReply;
use crate::script::RenderedScript;

/// One remote telescope operation: a script template plus the knowledge of
/// how to read its reply.
///
/// Implement this trait to add a new operation to the bridge. Then:
///
/// 1. Define `pub const NAME: &'static str` on your struct and return it
///    from [`name`](Operation::name); it labels log lines and
///    `InvalidParameter` errors.
/// 2. Embed the script body as a [`Template`](crate::script::Template)
///    constant in your module.
/// 3. Re-export the struct from `src/operations/mod.rs` and give
///    [`TelescopeBridge`](crate::bridge::TelescopeBridge) a method for it.
pub trait Operation {
    /// What a decoded reply yields for this operation.
    type Reply;

    /// The operation name, accessible at runtime.
    fn name(&self) -> &'static str;

    /// Validate this operation's parameters and produce the script to send.
    ///
    /// All semantic validation happens here, before any socket activity.
    fn render(&self) -> Result<RenderedScript>;

    /// Interpret the raw reply the host produced for this script.
    fn decode(&self, reply: &RawReply) -> Result<Self::Reply>;

    /// Whether re-issuing this operation after a transport failure is safe.
    ///
    /// Defaults to `false`: commands that move or reconfigure the mount must
    /// never be silently repeated.
    fn is_idempotent(&self) -> bool {
        false
    }
}

/// A coordinate accepted either as decimal degrees or as a preformatted
/// string in the host's native notation.
#[derive(Debug, Clone, PartialEq)]
pub enum Angle {
    Degrees(f64),
    Text(String),
}

impl Angle {
    /// The token substituted into a script slot.
    pub(crate) fn token(&self) -> String {
        match self {
            Angle::Degrees(value) => value.to_string(),
            Angle::Text(text) => text.clone(),
        }
    }

    /// Whether the angle can be rendered at all (non-finite degrees would
    /// reach the host as the literal `NaN`/`inf`).
    pub(crate) fn is_renderable(&self) -> bool {
        match self {
            Angle::Degrees(value) => value.is_finite(),
            Angle::Text(_) => true,
        }
    }
}

impl From<f64> for Angle {
    fn from(value: f64) -> Self {
        Angle::Degrees(value)
    }
}

impl From<&str> for Angle {
    fn from(value: &str) -> Self {
        Angle::Text(value.to_string())
    }
}

impl From<String> for Angle {
    fn from(value: String) -> Self {
        Angle::Text(value)
    }
}

/// Tri-state tracking directive for a slew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    /// Engage sidereal tracking after the slew.
    On,
    /// Stop the drive after the slew.
    Off,
    /// Leave the drive state untouched.
    Keep,
}

impl Tracking {
    /// The token substituted into the script's tracking slot. `Keep` renders
    /// empty, which the script body treats as "skip the tracking call".
    pub(crate) fn token(&self) -> &'static str {
        match self {
            Tracking::On => "1",
            Tracking::Off => "0",
            Tracking::Keep => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_tokens() {
        assert_eq!(Angle::from(120.5).token(), "120.5");
        assert_eq!(Angle::from("12 34 56").token(), "12 34 56");
    }

    #[test]
    fn test_angle_renderable() {
        assert!(Angle::from(0.0).is_renderable());
        assert!(!Angle::from(f64::NAN).is_renderable());
        assert!(!Angle::from(f64::INFINITY).is_renderable());
    }

    #[test]
    fn test_tracking_tokens() {
        assert_eq!(Tracking::On.token(), "1");
        assert_eq!(Tracking::Off.token(), "0");
        assert_eq!(Tracking::Keep.token(), "");
    }
}
