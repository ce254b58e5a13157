//! Filesystem scanning that builds the structured local album model.

pub mod local_album;
pub mod scanner;

pub use local_album::{LocalAlbumData, LocalDiscData, LocalTrackData};
pub use scanner::{scan_album, scan_album_if_exists, ScanError};
