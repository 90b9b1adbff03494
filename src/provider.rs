use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// Matches <think> tags so internal model reasoning never leaks into summaries
static THINKING_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<think>.*?</think>").expect("Invalid thinking tag regex pattern")
});

/// Token accounting for a single completion call. Accumulates additively
/// across a run; the merge is plain summation so it is order-independent.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl Usage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    pub fn add(&mut self, other: Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

/// One successful completion: the generated text, its usage report, and the
/// model identifier the provider actually served.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Usage,
    pub model: String,
}

/// Failure modes the pipeline distinguishes. ContentRejected is surfaced to
/// the user and never retried; Transient covers network, rate-limit and
/// server-side failures; Malformed covers unexpected response shapes.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("content rejected by safety filter: {0}")]
    ContentRejected(String),

    #[error("transient provider failure: {0}")]
    Transient(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// The pipeline's only external collaborator: a language-model completion
/// service reduced to a single call. Injected once as a trait object so
/// tests can substitute a scripted fake.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system_instruction: &str,
        payload: &str,
        max_response_tokens: u32,
    ) -> Result<Completion, ProviderError>;
}

/// Chat message structure for the completions API
#[derive(Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// API request structure for chat completion
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// API response structures for chat completion
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
    model: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<MessageContent>,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

/// Completion provider backed by any OpenAI-compatible chat completions
/// endpoint (LM Studio, Azure OpenAI behind a compatible proxy, etc.).
/// Holds a single reqwest client built once with the configured timeout.
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiCompatProvider {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        temperature: f32,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::Transient(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
            temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatProvider {
    async fn complete(
        &self,
        system_instruction: &str,
        payload: &str,
        max_response_tokens: u32,
    ) -> Result<Completion, ProviderError> {
        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_instruction.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: payload.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: max_response_tokens,
            stream: false,
        };

        debug!(
            "🤖 Sending completion request: {} payload chars, max {} response tokens",
            payload.len(),
            max_response_tokens
        );

        let mut request = self
            .client
            .post(&format!("{}/v1/chat/completions", self.base_url))
            .json(&chat_request);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!("❌ Completion request failed to send: {}", e);
            ProviderError::Transient(format!("request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains("content_filter") {
                return Err(ProviderError::ContentRejected(
                    "completion blocked by the provider's content filter".to_string(),
                ));
            }
            if status.as_u16() == 429 || status.is_server_error() {
                return Err(ProviderError::Transient(format!(
                    "API request failed: HTTP {}",
                    status
                )));
            }
            return Err(ProviderError::Malformed(format!(
                "API request failed: HTTP {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transient(format!("failed to read response body: {}", e)))?;

        parse_chat_response(&body, &self.model)
    }
}

/// Parse a non-streaming chat completions body into a Completion. Split out
/// of the HTTP path so the shape handling is testable without a server.
fn parse_chat_response(body: &str, requested_model: &str) -> Result<Completion, ProviderError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("JSON parse failed: {}", e)))?;

    let content = parsed
        .choices
        .first()
        .and_then(|c| c.message.as_ref())
        .and_then(|m| m.content.as_ref())
        .ok_or_else(|| ProviderError::Malformed("no choices in response".to_string()))?;

    // Strip <think> sections before anything downstream sees the text
    let text = THINKING_TAG_REGEX
        .replace_all(content, "")
        .trim()
        .to_string();
    if text.is_empty() {
        return Err(ProviderError::Malformed("empty completion content".to_string()));
    }

    let usage = parsed.usage.unwrap_or_default();
    let model = parsed.model.unwrap_or_else(|| requested_model.to_string());

    debug!(
        "✅ Completion received: {} chars, {} prompt + {} completion tokens ({})",
        text.len(),
        usage.prompt_tokens,
        usage.completion_tokens,
        model
    );

    Ok(Completion { text, usage, model })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_merge_is_additive() {
        let mut total = Usage::default();
        total.add(Usage {
            prompt_tokens: 100,
            completion_tokens: 40,
        });
        total.add(Usage {
            prompt_tokens: 7,
            completion_tokens: 3,
        });
        assert_eq!(total.prompt_tokens, 107);
        assert_eq!(total.completion_tokens, 43);
        assert_eq!(total.total(), 150);
    }

    #[test]
    fn test_parse_valid_response() {
        let body = r#"{
            "model": "gpt-4o-2024-05-13",
            "choices": [{"message": {"content": "A summary."}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        }"#;
        let completion = parse_chat_response(body, "gpt-4o").unwrap();
        assert_eq!(completion.text, "A summary.");
        assert_eq!(completion.usage.prompt_tokens, 12);
        assert_eq!(completion.usage.completion_tokens, 5);
        assert_eq!(completion.model, "gpt-4o-2024-05-13");
    }

    #[test]
    fn test_parse_strips_think_tags() {
        let body = r#"{
            "choices": [{"message": {"content": "<think>internal reasoning</think>The answer."}}]
        }"#;
        let completion = parse_chat_response(body, "test-model").unwrap();
        assert_eq!(completion.text, "The answer.");
        // Missing usage block falls back to zeroes rather than failing
        assert_eq!(completion.usage.total(), 0);
        assert_eq!(completion.model, "test-model");
    }

    #[test]
    fn test_parse_empty_choices_is_malformed() {
        let body = r#"{"choices": []}"#;
        let err = parse_chat_response(body, "m").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_parse_null_content_is_malformed() {
        let body = r#"{"choices": [{"message": {"content": null}}]}"#;
        let err = parse_chat_response(body, "m").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        let err = parse_chat_response("not json at all", "m").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }
}
