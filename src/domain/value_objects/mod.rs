//! Domain Value Objects
//!
//! Immutable value types shared by the domain services and adapters.

mod cancellation;
mod compile_result;
mod compiler;
mod directory_entry;
pub mod file_filter;
mod operation;
pub mod path;
pub mod platform;
pub mod string_list;

pub use cancellation::CancellationFlag;
pub use compile_result::{CompileResult, CompileResultMessage, MessageCategory};
pub use compiler::Compiler;
pub use directory_entry::{DirectoryEntry, DirectoryListing, EntryKind};
pub use file_filter::{CompiledFilter, FileFilter};
pub use operation::OperationKind;
pub use path::{is_path_of, normalize_lexically, relative_filter_path, resolve_within};
pub use platform::{current_platform, normalize_platform, platform_allowed};
