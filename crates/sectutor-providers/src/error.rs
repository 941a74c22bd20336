//! Provider error types.
//!
//! The error enum itself lives in `sectutor-core` so the session can downcast
//! failed calls; providers construct it through this re-export.

pub use sectutor_core::error::ProviderError;
