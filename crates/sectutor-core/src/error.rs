//! Provider and model-call error types.
//!
//! `ProviderError` is what provider implementations return. It lives in
//! `sectutor-core` so the session can downcast a failed call and classify it
//! without string matching. Only errors that are not a `ProviderError` at all
//! fall back to substring sniffing.

use thiserror::Error;

/// Maximum number of characters of an unclassified error shown to the user.
pub const MAX_ERROR_CHARS: usize = 100;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API rejected the request because of a rate limit or exhausted quota.
    #[error("rate limited (HTTP {status}): {message}")]
    RateLimited { status: u16, message: String },

    /// The API key is missing, invalid, or lacks permission for the model.
    #[error("permission denied (HTTP {status}): {message}")]
    PermissionDenied { status: u16, message: String },

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The model answered but produced no text (e.g. blocked by safety filters).
    #[error("empty response from model: {0}")]
    EmptyResponse(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Map an HTTP error status to the matching variant.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            429 => ProviderError::RateLimited { status, message },
            401 | 403 => ProviderError::PermissionDenied { status, message },
            404 => ProviderError::ModelNotFound(message),
            _ => ProviderError::ApiError { status, message },
        }
    }
}

/// A failed model call, reduced to the three cases the session reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelCallError {
    #[error("rate limited")]
    RateLimited,

    #[error("permission denied")]
    PermissionDenied,

    /// Anything else, carrying the (truncated) error text.
    #[error("{0}")]
    Other(String),
}

impl ModelCallError {
    /// Classify an error returned by `LlmProvider::generate`.
    pub fn classify(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ProviderError>() {
            Some(ProviderError::RateLimited { .. }) => Self::RateLimited,
            Some(ProviderError::PermissionDenied { .. }) => Self::PermissionDenied,
            Some(_) => Self::Other(truncate_chars(&format!("{err:#}"), MAX_ERROR_CHARS)),
            None => Self::from_message(&format!("{err:#}")),
        }
    }

    /// Classify by inspecting the error text.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if message.contains("429") || lower.contains("quota") || lower.contains("rate") {
            Self::RateLimited
        } else if message.contains("403") || lower.contains("permission") {
            Self::PermissionDenied
        } else {
            Self::Other(truncate_chars(message, MAX_ERROR_CHARS))
        }
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_errors_win_over_text() {
        let err: anyhow::Error = ProviderError::PermissionDenied {
            status: 403,
            message: "rate of something".into(),
        }
        .into();
        assert_eq!(ModelCallError::classify(&err), ModelCallError::PermissionDenied);

        let err: anyhow::Error = ProviderError::RateLimited {
            status: 429,
            message: "slow down".into(),
        }
        .into();
        assert_eq!(ModelCallError::classify(&err), ModelCallError::RateLimited);
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ProviderError::from_status(429, String::new()),
            ProviderError::RateLimited { status: 429, .. }
        ));
        assert!(matches!(
            ProviderError::from_status(401, String::new()),
            ProviderError::PermissionDenied { .. }
        ));
        assert!(matches!(
            ProviderError::from_status(404, "gemini-9".into()),
            ProviderError::ModelNotFound(_)
        ));
        assert!(matches!(
            ProviderError::from_status(500, String::new()),
            ProviderError::ApiError { status: 500, .. }
        ));
    }

    #[test]
    fn plain_errors_are_sniffed() {
        assert_eq!(
            ModelCallError::from_message("HTTP 429 Too Many Requests"),
            ModelCallError::RateLimited
        );
        assert_eq!(
            ModelCallError::from_message("Quota exceeded for project"),
            ModelCallError::RateLimited
        );
        assert_eq!(
            ModelCallError::from_message("403 Forbidden"),
            ModelCallError::PermissionDenied
        );
        assert_eq!(
            ModelCallError::from_message("caller does not have Permission"),
            ModelCallError::PermissionDenied
        );
    }

    #[test]
    fn other_errors_are_truncated() {
        let long = "x".repeat(250);
        match ModelCallError::from_message(&long) {
            ModelCallError::Other(msg) => assert_eq!(msg.chars().count(), MAX_ERROR_CHARS),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn structured_network_error_is_not_sniffed() {
        let err = anyhow::Error::new(ProviderError::NetworkError(
            "error sending request for url (http://127.0.0.1:1/v1beta/models/gemini-1.5-flash:generateContent)"
                .into(),
        ));
        match ModelCallError::classify(&err) {
            ModelCallError::Other(msg) => {
                assert!(msg.starts_with("network error: error sending request"));
                assert_eq!(msg.chars().count(), MAX_ERROR_CHARS);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn other_structured_variants_stay_other() {
        let cases = [
            ProviderError::ModelNotFound(
                "models/gemini-9 is not found for API version v1beta, or is not supported for generateContent."
                    .into(),
            ),
            ProviderError::ApiError {
                status: 500,
                message: "429 upstream quota rate".into(),
            },
            ProviderError::EmptyResponse("SAFETY".into()),
            ProviderError::Timeout(120),
        ];
        for case in cases {
            let err = anyhow::Error::new(case);
            assert!(
                matches!(ModelCallError::classify(&err), ModelCallError::Other(_)),
                "{err:#}"
            );
        }
    }

    #[test]
    fn plain_text_errors_are_still_sniffed() {
        let err = anyhow::anyhow!("upstream said: quota exceeded");
        assert_eq!(ModelCallError::classify(&err), ModelCallError::RateLimited);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
