//! Target Prompt Port
//!
//! Asks the user to pick one target when several apply.

use crate::domain::entities::Target;

pub trait TargetPrompt {
    /// Return the index of the chosen candidate, `None` if the user aborted.
    fn choose(&self, candidates: &[&Target]) -> Option<usize>;
}
