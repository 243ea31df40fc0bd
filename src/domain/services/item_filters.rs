//! Conditional and platform filtering of configured items
//!
//! Targets and packages may carry `if` expressions and a `platforms` list.
//! These helpers keep the items that are active, preserving input order.

use tracing::warn;

use crate::domain::entities::{Package, Target};
use crate::domain::ports::{ConditionContext, ConditionEvaluator};
use crate::domain::value_objects::platform_allowed;
use crate::error::SyncResult;

/// Item carrying `if` expressions
pub trait ConditionalItem {
    fn conditions(&self) -> &[String];

    /// Value handed to expressions as `item`
    fn condition_value(&self) -> serde_json::Value;
}

/// Item restricted to some platforms
pub trait PlatformItem {
    fn platforms(&self) -> &[String];
}

impl ConditionalItem for Target {
    fn conditions(&self) -> &[String] {
        &self.conditions
    }

    fn condition_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl PlatformItem for Target {
    fn platforms(&self) -> &[String] {
        &self.platforms
    }
}

impl ConditionalItem for Package {
    fn conditions(&self) -> &[String] {
        &self.conditions
    }

    fn condition_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl PlatformItem for Package {
    fn platforms(&self) -> &[String] {
        &self.platforms
    }
}

/// How evaluation failures are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionalFilterOptions {
    /// Propagate the first evaluation error instead of recovering
    pub throw_on_error: bool,
    /// Result used for an item whose evaluation failed
    pub error_result: bool,
}

/// Evaluate every condition of one item; all of them must hold.
///
/// An item without conditions is active.
pub fn is_item_active<T: ConditionalItem + ?Sized>(
    item: &T,
    evaluator: &dyn ConditionEvaluator,
    platform: &str,
    options: ConditionalFilterOptions,
) -> SyncResult<bool> {
    let conditions: Vec<&str> = item
        .conditions()
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if conditions.is_empty() {
        return Ok(true);
    }

    let context = ConditionContext {
        item: item.condition_value(),
        platform: platform.to_string(),
    };

    for expression in conditions {
        match evaluator.evaluate(expression, &context) {
            Ok(true) => continue,
            Ok(false) => return Ok(false),
            Err(e) if options.throw_on_error => return Err(e),
            Err(e) => {
                warn!(expression, error = %e, "condition evaluation failed");
                return Ok(options.error_result);
            }
        }
    }
    Ok(true)
}

/// Keep the items whose conditions all hold.
pub fn filter_conditional_items<'a, T, I>(
    items: I,
    evaluator: &dyn ConditionEvaluator,
    platform: &str,
    options: ConditionalFilterOptions,
) -> SyncResult<Vec<&'a T>>
where
    T: ConditionalItem + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut active = Vec::new();
    for item in items {
        if is_item_active(item, evaluator, platform, options)? {
            active.push(item);
        }
    }
    Ok(active)
}

/// Keep the items allowed on `platform`.
pub fn filter_platform_items<'a, T, I>(items: I, platform: &str) -> Vec<&'a T>
where
    T: PlatformItem + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter(|item| platform_allowed(item.platforms(), platform))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;

    /// Evaluator understanding `yes`, `no` and failing on anything else
    struct Literal;

    impl ConditionEvaluator for Literal {
        fn evaluate(&self, expression: &str, _context: &ConditionContext) -> SyncResult<bool> {
            match expression {
                "yes" => Ok(true),
                "no" => Ok(false),
                other => Err(SyncError::Condition {
                    expression: other.to_string(),
                    message: "unknown".to_string(),
                }),
            }
        }
    }

    fn targets() -> Vec<Target> {
        vec![
            Target::new("plain", "local"),
            Target::new("on", "local").with_conditions(["yes", "yes"]),
            Target::new("off", "local").with_conditions(["yes", "no"]),
            Target::new("broken", "local").with_conditions(["???"]),
        ]
    }

    fn names(items: &[&Target]) -> Vec<String> {
        items.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn item_without_conditions_is_kept() {
        let targets = targets();
        let kept = filter_conditional_items(
            &targets,
            &Literal,
            "linux",
            ConditionalFilterOptions::default(),
        )
        .unwrap();
        assert_eq!(names(&kept), vec!["plain", "on"]);
    }

    #[test]
    fn error_result_is_used_on_failure() {
        let targets = targets();
        let options = ConditionalFilterOptions {
            error_result: true,
            ..Default::default()
        };
        let kept = filter_conditional_items(&targets, &Literal, "linux", options).unwrap();
        assert_eq!(names(&kept), vec!["plain", "on", "broken"]);
    }

    #[test]
    fn throw_on_error_aborts_the_pass() {
        let targets = targets();
        let options = ConditionalFilterOptions {
            throw_on_error: true,
            ..Default::default()
        };
        let err = filter_conditional_items(&targets, &Literal, "linux", options).unwrap_err();
        assert!(matches!(err, SyncError::Condition { .. }));
    }

    #[test]
    fn blank_conditions_are_ignored() {
        let target = Target::new("t", "local").with_conditions(["  ", ""]);
        assert!(is_item_active(&target, &Literal, "linux", Default::default()).unwrap());
    }

    #[test]
    fn platform_filter_keeps_unrestricted_and_matching() {
        let targets = vec![
            Target::new("any", "local"),
            Target::new("win", "local").with_platforms(["Win32"]),
            Target::new("nix", "local").with_platforms(["linux", "darwin"]),
        ];
        let kept = filter_platform_items(&targets, "windows");
        assert_eq!(names(&kept), vec!["any", "win"]);
        let kept = filter_platform_items(&targets, "macos");
        assert_eq!(names(&kept), vec!["any", "nix"]);
    }
}
