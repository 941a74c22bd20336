//! sectutor-providers — LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Google Gemini, plus a mock
//! provider for tests, and loads the `sectutor` configuration.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;

pub use config::{create_provider, load_config, ConfigError, SectutorConfig};
pub use error::ProviderError;
