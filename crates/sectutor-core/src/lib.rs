//! sectutor-core — Quiz parsing, progress tracking, and the study session.
//!
//! This crate defines the data model, the provider trait, and the logic of
//! the interactive session that the `sectutor` binary drives.

pub mod error;
pub mod model;
pub mod parser;
pub mod progress;
pub mod prompts;
pub mod quiz;
pub mod report;
pub mod session;
pub mod traits;
