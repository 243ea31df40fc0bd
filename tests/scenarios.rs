//! Scenario tests for targetsync.
//!
//! Scenarios run the CLI end-to-end against a temporary project.
//!
//! Run with: cargo test --test scenarios

mod common;

#[path = "scenarios/deploy_local.rs"]
mod deploy_local;
