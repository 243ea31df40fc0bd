//! Hook Runner Port

use crate::domain::entities::{Target, TargetOperation};
use crate::error::SyncResult;

/// Executes the `before_deploy` and `deployed` steps of a target
pub trait HookRunner: Send + Sync {
    fn run(&self, target: &Target, hook: &TargetOperation) -> SyncResult<()>;
}
