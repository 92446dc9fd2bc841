//! CLI command handlers extracted from main.rs.
//!
//! Each handler returns the text to print so it can be tested directly.

// These modules contain CLI command handlers, not public library API.
#[allow(clippy::missing_errors_doc)]
pub mod document;
