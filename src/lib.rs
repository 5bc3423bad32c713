//! # Skybridge
//!
//! A scripted-socket bridge for driving TheSkyX telescope control from an
//! automation server.
//!
//! TheSkyX exposes its mount only through an embedded JavaScript engine
//! listening on a local TCP socket. Skybridge renders small command scripts
//! from parameterized templates, sends them to that socket, parses the
//! engine's textual reply, and turns connection and slew-error conditions
//! into typed results the calling server can act on.
//!
//! ## Quick start
//!
//! ```no_run
//! use skybridge::{Angle, TelescopeBridge, Tracking};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bridge = TelescopeBridge::connect_to("localhost", 3040);
//!
//!     let status = bridge.get_status().await?;
//!     println!("mount at az {} alt {}", status.azimuth, status.altitude);
//!
//!     bridge
//!         .slew_and_track(
//!             Some(Angle::from(120.5)),
//!             Some(Angle::from(45.0)),
//!             Tracking::On,
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Operations
//!
//! | Method | Remote effect |
//! |--------|---------------|
//! | [`get_status`](TelescopeBridge::get_status) | Read Az/Alt and the tracking/slew-complete flags |
//! | [`slew_and_track`](TelescopeBridge::slew_and_track) | Slew to an Az/Alt target and set tracking; omit the target to track in place |
//! | [`sync`](TelescopeBridge::sync) | Register the mount on a known RA/Dec position |
//! | [`disconnect_mount`](TelescopeBridge::disconnect_mount) | Release the mount hardware from the host |
//!
//! ## Failure taxonomy
//!
//! Every method returns [`BridgeError`] on failure, and the variants matter:
//! [`NotConnected`](BridgeError::NotConnected) means the mount hardware is
//! unreachable (check the cable), [`Slew`](BridgeError::Slew) means the mount
//! rejected the command (check the target), while
//! [`Connection`](BridgeError::Connection) and
//! [`Timeout`](BridgeError::Timeout) point at the network between bridge and
//! host. Transport failures are retried with backoff for the read-only status
//! query only; slews and syncs are never silently re-issued.
//!
//! ## Custom hosts
//!
//! The bridge talks to anything implementing [`ScriptHost`]. Tests (and
//! simulators) substitute an in-memory fake:
//!
//! ```no_run
//! use async_trait::async_trait;
//! use skybridge::{RawReply, RenderedScript, ScriptHost, TelescopeBridge};
//!
//! struct ParkedMount;
//!
//! #[async_trait]
//! impl ScriptHost for ParkedMount {
//!     async fn exchange(&mut self, _script: &RenderedScript) -> skybridge::Result<RawReply> {
//!         Ok(RawReply::new(
//!             r#"{"az": 0.0, "alt": 0.0, "tr": 0, "sl": 1}|No error. Error = 0."#,
//!         ))
//!     }
//! }
//!
//! let bridge = TelescopeBridge::with_host(ParkedMount);
//! ```

pub mod bridge;
pub mod error;
pub mod operation;
pub mod operations;
pub mod reply;
pub mod script;
pub mod transport;

pub use bridge::{RetryPolicy, TelescopeBridge};
pub use error::{BridgeError, Result};
pub use operation::{Angle, Operation, Tracking};
pub use operations::{DisconnectMount, GetStatus, SlewTrack, SyncMount, SyncReply};
pub use reply::{RawReply, TelescopeStatus};
pub use script::{RenderedScript, Template};
pub use transport::{DEFAULT_PORT, ScriptHost, TcpScriptHost};
