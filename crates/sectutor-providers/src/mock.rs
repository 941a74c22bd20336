//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use sectutor_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, TokenUsage};

use crate::error::ProviderError;

/// How a mock call should fail.
#[derive(Debug, Clone)]
enum MockFailure {
    /// Fail with a structured `ProviderError` built from an HTTP status.
    Status { status: u16, message: String },
    /// Fail with a plain-text error.
    Message(String),
}

/// A mock LLM provider for exercising the study session without API calls.
///
/// Returns configurable responses based on prompt content matching.
pub struct MockProvider {
    /// Map of prompt substring → response text.
    responses: HashMap<String, String>,
    /// Default response if no prompt matches.
    default_response: String,
    failure: Option<MockFailure>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the given prompt→response mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: "I'm a mock tutor.".to_string(),
            failure: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            ..Self::new(HashMap::new())
        }
    }

    /// Create a mock whose calls fail with the given HTTP status.
    pub fn failing_with_status(status: u16, message: &str) -> Self {
        Self {
            failure: Some(MockFailure::Status {
                status,
                message: message.to_string(),
            }),
            ..Self::new(HashMap::new())
        }
    }

    /// Create a mock whose calls fail with a plain error message.
    pub fn failing_with_message(message: &str) -> Self {
        Self {
            failure: Some(MockFailure::Message(message.to_string())),
            ..Self::new(HashMap::new())
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        match &self.failure {
            Some(MockFailure::Status { status, message }) => {
                return Err(ProviderError::from_status(*status, message.clone()).into());
            }
            Some(MockFailure::Message(message)) => {
                return Err(anyhow::anyhow!("{message}"));
            }
            None => {}
        }

        // Find a matching response based on prompt content
        let content = self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        let prompt_tokens = (request.prompt.len() / 4) as u32; // Rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectutor_core::error::ModelCallError;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock".into(),
            prompt: prompt.into(),
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("Encryption scrambles data.");
        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, "Encryption scrambles data.");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn prompt_matching() {
        let mut responses = HashMap::new();
        responses.insert("Explain".to_string(), "An explanation.".to_string());
        responses.insert("quiz questions".to_string(), "[]".to_string());

        let provider = MockProvider::new(responses);

        let resp = provider.generate(&request("Explain malware")).await.unwrap();
        assert_eq!(resp.content, "An explanation.");

        let resp = provider
            .generate(&request("Create 5 multiple-choice quiz questions about malware."))
            .await
            .unwrap();
        assert_eq!(resp.content, "[]");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn failures_classify() {
        let provider = MockProvider::failing_with_status(429, "slow down");
        let err = provider.generate(&request("x")).await.unwrap_err();
        assert_eq!(ModelCallError::classify(&err), ModelCallError::RateLimited);

        let provider = MockProvider::failing_with_message("403 caller lacks access");
        let err = provider.generate(&request("x")).await.unwrap_err();
        assert_eq!(
            ModelCallError::classify(&err),
            ModelCallError::PermissionDenied
        );
    }
}
