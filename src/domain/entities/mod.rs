//! Domain Entities
//!
//! Objects with identity: targets, packages, the workspace that owns them,
//! and the per-file handles plugins receive.

mod file_handles;
mod package;
mod target;
mod workspace;

pub use file_handles::{BatchScope, FileOutcome, FileToDelete, FileToDownload, FileToUpload};
pub use package::{Package, TargetSelection};
pub use target::{CompilerSettings, Target, TargetOperation};
pub use workspace::{select_workspace, Workspace};
