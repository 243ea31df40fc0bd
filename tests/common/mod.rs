//! Common test utilities for targetsync contract and scenario tests.
//!
//! This module provides:
//! - `TestEnv`: isolated project directory plus CLI runner
//! - Test doubles for the tool runner and event sink
//! - Fixtures: reusable configuration snippets

#![allow(dead_code)]

pub mod doubles;
pub mod env;
pub mod fixtures;

pub use doubles::*;
pub use env::*;
pub use fixtures::*;
