//! Raw replies from the scripting host and the structured status they carry.
//!
//! The host frames every reply as `payload|trailer`: the payload is whatever
//! the script assigned to its output variable, the trailer is the engine's
//! own verdict line ending in `Error = N.` where `N` is zero when the script
//! ran cleanly.

use crate::error::{BridgeError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::sync::OnceLock;

/// Nonzero engine error codes only: a single nonzero digit followed by a
/// non-digit, or two or more digits. `Error = 0.` never matches.
fn engine_error_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Error = ([1-9][^\d]|\d{2,})").unwrap())
}

/// The unparsed text returned by the remote engine for one script execution.
#[derive(Debug, Clone)]
pub struct RawReply {
    text: String,
}

impl RawReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The complete reply text, framing included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The script's output: everything before the first `|`, trimmed.
    ///
    /// Replies without a trailer (seen from hosts that close the stream
    /// early) yield the whole text.
    pub fn payload(&self) -> &str {
        match self.text.split_once('|') {
            Some((payload, _)) => payload.trim(),
            None => self.text.trim(),
        }
    }

    /// A nonzero `Error = N.` code scanned from the reply, digits only.
    pub fn engine_error(&self) -> Option<String> {
        let found = engine_error_re().captures(&self.text)?;
        let digits: String = found[1].chars().filter(char::is_ascii_digit).collect();
        (!digits.is_empty()).then_some(digits)
    }

    /// Whether the payload is one of the host's disconnect sentinels.
    pub fn is_not_connected(&self) -> bool {
        matches!(self.payload(), "Not connected" | "Mount not connected.")
    }
}

/// One snapshot of the mount as reported by the scripting host.
///
/// Only ever constructed from a reply that asserted connectivity. Fields the
/// host omits default to zero/false; in particular the structured reply to a
/// position sync reports tracking and slew flags but a zeroed position, so
/// azimuth/altitude are not authoritative there.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TelescopeStatus {
    #[serde(rename = "az", default)]
    pub azimuth: f64,
    #[serde(rename = "alt", default)]
    pub altitude: f64,
    #[serde(rename = "tr", default, deserialize_with = "flag")]
    pub is_tracking: bool,
    #[serde(rename = "sl", default, deserialize_with = "flag")]
    pub is_slew_complete: bool,
}

impl TelescopeStatus {
    /// Parse the `{az, alt, tr, sl}` object literal out of a reply payload.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Protocol`] when the payload is not the expected
    /// object shape.
    pub(crate) fn from_payload(payload: &str) -> Result<Self> {
        let mut status: TelescopeStatus =
            serde_json::from_str(payload).map_err(|_| BridgeError::Protocol(payload.into()))?;
        status.azimuth = round2(status.azimuth);
        status.altitude = round2(status.altitude);
        Ok(status)
    }
}

/// The host reports `tr`/`sl` as JSON booleans or as 0/1 numerics depending
/// on version; accept both.
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Num(f64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Num(value) => value != 0.0,
    })
}

/// Coordinates are presented at two decimals, matching what the outer server
/// displays.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
