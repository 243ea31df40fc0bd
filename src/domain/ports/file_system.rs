//! FileSystem port - abstraction over local file I/O
//!
//! Lets the lifecycle handles and plugins read and write workspace files
//! without depending on a concrete implementation (local disk, in-memory).

use std::io;
use std::path::Path;

/// Abstract file system interface
///
/// Implementations:
/// - `LocalFs` - standard file I/O with atomic writes
/// - test doubles - in-memory maps
pub trait FileSystem: Send + Sync {
    /// Read a whole file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write a whole file, creating parent directories
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and its parents
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}
