//! File watcher for deploy on save
//!
//! Implements the `watch` command with:
//! - Debouncing (100ms)
//! - Content checks that skip saves without changes
//! - Graceful Ctrl+C shutdown
//! - NDJSON output for CI

mod event;
mod sync;

pub use event::{WatchEvent, WatchOptions, DEBOUNCE_MS, IGNORED_DIRS};
pub use sync::{deploy_changes, is_watched_path, watch};
