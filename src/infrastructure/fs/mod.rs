//! File System Implementations
//!
//! Concrete implementation of the FileSystem port and directory listing.

mod listing;
mod local;

pub use listing::list_directory_within;
pub use local::{atomic_write, LocalFs};
