//! Error types for the skybridge crate.

use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong between the caller and the mount.
///
/// The variants separate three worlds the outer server must treat
/// differently: local contract bugs ([`InvalidParameter`],
/// [`Protocol`]), bridge/transport failures ([`Connection`], [`Timeout`]),
/// and physical-world state the bridge cannot resolve ([`NotConnected`],
/// [`Slew`]).
///
/// [`InvalidParameter`]: BridgeError::InvalidParameter
/// [`Protocol`]: BridgeError::Protocol
/// [`Connection`]: BridgeError::Connection
/// [`Timeout`]: BridgeError::Timeout
/// [`NotConnected`]: BridgeError::NotConnected
/// [`Slew`]: BridgeError::Slew
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("invalid parameter for {operation}: {reason}")]
    InvalidParameter {
        operation: &'static str,
        reason: String,
    },

    #[error("connection to scripting host failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("no complete reply from scripting host within {0:?}")]
    Timeout(Duration),

    #[error("mount is not connected to the scripting host")]
    NotConnected,

    #[error("mount reported slew error {0}")]
    Slew(String),

    #[error("unrecognized reply from scripting host: {0:?}")]
    Protocol(String),
}

impl BridgeError {
    /// Whether retrying the same exchange could plausibly succeed.
    ///
    /// Only socket-level failures qualify. A [`NotConnected`] or [`Slew`]
    /// reply reflects mount state that a retry cannot change, and
    /// [`InvalidParameter`]/[`Protocol`] are contract bugs.
    ///
    /// [`NotConnected`]: BridgeError::NotConnected
    /// [`Slew`]: BridgeError::Slew
    /// [`InvalidParameter`]: BridgeError::InvalidParameter
    /// [`Protocol`]: BridgeError::Protocol
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::Connection(_) | BridgeError::Timeout(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
