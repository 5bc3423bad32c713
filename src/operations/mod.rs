mod disconnect;
mod get_status;
mod slew_track;
mod sync_mount;

pub use disconnect::DisconnectMount;
pub use get_status::GetStatus;
pub use slew_track::SlewTrack;
pub use sync_mount::{SyncMount, SyncReply};
