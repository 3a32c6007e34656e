//! Anthropic native provider implementation.
//!
//! Uses Anthropic's Messages API directly.
//!
//! Features:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as top-level field
//! - Assistant prefill: a trailing assistant message is continued, not answered
//! - `stop_sequences` so each call yields exactly one tagged block

use serde::{Deserialize, Serialize};
use thoughtloop_core::error::ProviderError;
use thoughtloop_core::message::{ContentSegment, Message, Role};
use thoughtloop_core::provider::{ModelRequest, ModelResponse, Provider, Usage};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic native Messages API provider.
pub struct AnthropicProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert messages to Anthropic API format.
    ///
    /// The API rejects a final assistant turn that ends in whitespace, so the
    /// last text segment of a trailing assistant message is trimmed.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        let mut result: Vec<ApiMessage> = messages
            .iter()
            .map(|msg| ApiMessage {
                role: msg.role.as_str(),
                content: msg.content().to_vec(),
            })
            .collect();

        if let Some(last) = result.last_mut() {
            if last.role == Role::Assistant.as_str() {
                if let Some(ContentSegment::Text(text)) = last.content.last_mut() {
                    let trimmed = text.trim_end().len();
                    text.truncate(trimmed);
                }
            }
        }

        result
    }

    fn to_api_request(request: &ModelRequest) -> ApiRequest<'_> {
        ApiRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: Self::to_api_messages(&request.messages),
            system: request.system.as_deref(),
            temperature: request.temperature,
            top_p: request.top_p,
            top_k: request.top_k,
            stop_sequences: request.stop_sequences.clone(),
        }
    }

    fn to_model_response(resp: ApiResponse) -> ModelResponse {
        ModelResponse {
            content: resp.content,
            stop_reason: resp.stop_reason.unwrap_or_default(),
            stop_sequence: resp.stop_sequence,
            usage: Usage {
                input_tokens: resp.usage.input_tokens,
                output_tokens: resp.usage.output_tokens,
            },
        }
    }
}

#[async_trait::async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = Self::to_api_request(&request);

        debug!(provider = "anthropic", model = %request.model, stop = ?request.stop_sequences, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Anthropic API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Anthropic API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Anthropic response: {e}"),
            })?;

        Ok(Self::to_model_response(api_resp))
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ContentSegment>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentSegment>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    stop_sequence: Option<String>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}
