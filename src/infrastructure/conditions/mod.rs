//! Condition evaluators

mod expression;

pub use expression::ExpressionEvaluator;
