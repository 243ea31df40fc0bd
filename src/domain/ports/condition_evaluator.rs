//! Condition Evaluator Port
//!
//! Evaluates the boolean `if` expressions attached to targets and packages.
//! The expression language is up to the implementation.

use crate::error::SyncResult;

/// Values an expression can see
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionContext {
    /// The item being filtered, serialized
    pub item: serde_json::Value,
    /// Normalized platform identifier
    pub platform: String,
}

pub trait ConditionEvaluator: Send + Sync {
    /// Evaluate one expression to a truth value
    fn evaluate(&self, expression: &str, context: &ConditionContext) -> SyncResult<bool>;
}
