//! Terminal output for the CLI
//!
//! Views are pure `render_*` functions returning strings so they can be
//! tested without a terminal.

pub mod blocks;
pub mod context;
pub mod json;
pub mod primitives;
pub mod sink;
pub mod terminal;
pub mod theme;
pub mod views;
