//! Property tests for hapsync.
//!
//! Properties use randomized input generation to explore edge cases and
//! protect invariants like "never panics" and "sync converges".
//!
//! Run with: `cargo test --test properties`

#[path = "properties/planner.rs"]
mod planner;

#[path = "properties/validator.rs"]
mod validator;
