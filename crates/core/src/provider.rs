//! Provider trait: the abstraction over model backends.
//!
//! A Provider takes a [`ModelRequest`] and returns a complete
//! [`ModelResponse`]. The loop depends only on this contract, never on a
//! vendor wire format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{ContentSegment, Message, Transcript};

/// Per-call generation parameters, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// The model to use (e.g. "claude-3-haiku-20240307")
    pub model: String,

    /// Maximum tokens to generate per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

fn default_max_tokens() -> u32 {
    200
}

impl GenerationSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: default_max_tokens(),
            temperature: None,
            top_p: None,
            top_k: None,
        }
    }
}

/// A single model invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub model: String,

    /// Text of the transcript's first system message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User and assistant messages, in transcript order
    pub messages: Vec<Message>,

    pub max_tokens: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Literal strings that halt generation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

impl ModelRequest {
    /// Build a request from the current transcript.
    pub fn from_transcript(
        transcript: &Transcript,
        settings: &GenerationSettings,
        stop_sequences: Vec<String>,
    ) -> Self {
        Self {
            model: settings.model.clone(),
            system: transcript.system_text(),
            messages: transcript.conversable().cloned().collect(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            top_k: settings.top_k,
            stop_sequences,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A complete (non-streaming) response from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Produced content, possibly empty when generation stopped immediately
    pub content: Vec<ContentSegment>,

    /// Why generation ended (e.g. "stop_sequence", "max_tokens", "end_turn")
    pub stop_reason: String,

    /// The stop sequence that matched, if any
    #[serde(default)]
    pub stop_sequence: Option<String>,

    #[serde(default)]
    pub usage: Usage,
}

impl ModelResponse {
    /// All text segments concatenated without separators.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentSegment::as_text)
            .collect()
    }
}

/// The core Provider trait.
///
/// Every model backend implements this trait. The loop calls `complete()`
/// once per tagged block without knowing which backend answers. No retry
/// happens at this layer: an error here ends the run.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Send a request and wait for the complete response.
    async fn complete(&self, request: ModelRequest) -> std::result::Result<ModelResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_from_transcript_splits_system() {
        let transcript = Transcript::from_prompt("Rules", "Solve: 3 * 3")
            .append(Message::assistant("<Thoughts>"));
        let settings = GenerationSettings {
            temperature: Some(0.2),
            ..GenerationSettings::new("test-model")
        };

        let req = ModelRequest::from_transcript(&transcript, &settings, vec!["</Thoughts>".into()]);
        assert_eq!(req.model, "test-model");
        assert_eq!(req.system.as_deref(), Some("Rules"));
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.max_tokens, 200);
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.top_k, None);
        assert_eq!(req.stop_sequences, vec!["</Thoughts>".to_string()]);
    }

    #[test]
    fn response_text_concatenates_text_segments() {
        let resp = ModelResponse {
            content: vec![
                ContentSegment::text("a"),
                ContentSegment::attachment("base64", "image/png", "AA=="),
                ContentSegment::text("b"),
            ],
            stop_reason: "stop_sequence".into(),
            stop_sequence: Some("</Action>".into()),
            usage: Usage::default(),
        };
        assert_eq!(resp.text(), "ab");
    }

    #[test]
    fn none_parameters_are_omitted() {
        let req = ModelRequest::from_transcript(
            &Transcript::new().append(Message::user("hi")),
            &GenerationSettings::new("m"),
            vec![],
        );
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("system").is_none());
        assert!(json.get("stop_sequences").is_none());
    }
}
