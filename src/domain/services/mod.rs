//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

pub mod file_lifecycle;
pub mod item_filters;
pub mod target_resolver;

pub use file_lifecycle::{drive_deletes, drive_downloads, drive_uploads};
pub use item_filters::{
    filter_conditional_items, filter_platform_items, is_item_active, ConditionalFilterOptions,
    ConditionalItem, PlatformItem,
};
pub use target_resolver::{select_single_target, TargetResolver};
