//! Steam content log reader and download state extractor.
//!
//! Each poll reads the trailing window of `content_log.txt` and derives a
//! [`DownloadSnapshot`] from it. Nothing is carried between polls: the
//! snapshot is rebuilt from whatever the window holds at read time.

mod extract;
mod snapshot;
mod window;

pub use extract::extract;
pub use snapshot::{DownloadSnapshot, DownloadStatus, Item};
pub use window::{DEFAULT_WINDOW_SIZE, LineWindow, read_window};
