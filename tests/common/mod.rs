//! Common test utilities for hapsync CLI and scenario tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project with a local "host" directory
//! - Assertion macros: `assert_on_host!`, `assert_not_on_host!`, `assert_output_contains!`
//! - Fixtures: Reusable configuration trees

#![allow(dead_code)]

#[macro_use]
pub mod assertions;
pub mod env;
pub mod fixtures;

pub use assertions::*;
pub use env::*;
pub use fixtures::*;
