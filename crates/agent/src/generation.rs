//! Tag-bounded generation.
//!
//! The model is made to fill exactly one tagged block per call: the opening
//! tag is prefilled as an assistant message, and the closing tag is passed
//! as the stop sequence. The model's continuation and the closing tag are
//! then merged back so the transcript reads as one well-formed block.

use thoughtloop_core::error::Result;
use thoughtloop_core::message::{Message, Role, Transcript};
use thoughtloop_core::provider::{GenerationSettings, ModelRequest, Provider};
use tracing::{debug, warn};

/// The tagged blocks the loop works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Thoughts,
    Action,
    Observation,
}

impl Tag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Thoughts => "Thoughts",
            Self::Action => "Action",
            Self::Observation => "Observation",
        }
    }

    pub fn open(&self) -> String {
        format!("<{}>", self.name())
    }

    pub fn close(&self) -> String {
        format!("</{}>", self.name())
    }

    /// `<Tag>body</Tag>` followed by a newline.
    pub fn wrap(&self, body: &str) -> String {
        format!("{}{body}{}\n", self.open(), self.close())
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Have the model produce one complete `tag` block.
///
/// Returns the wrapped block text together with the extended transcript:
/// the input plus the prefilled opening tag, the model's content, and the
/// closing tag. All three are assistant messages, so they coalesce into
/// the assistant turn already in progress.
pub async fn generate_tagged(
    provider: &dyn Provider,
    settings: &GenerationSettings,
    transcript: Transcript,
    tag: Tag,
) -> Result<(String, Transcript)> {
    let close = tag.close();
    let transcript = transcript.append(Message::assistant(tag.open()));
    let request = ModelRequest::from_transcript(&transcript, settings, vec![close.clone()]);

    let response = provider.complete(request).await?;

    debug!(
        tag = %tag,
        stop_reason = %response.stop_reason,
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        "Tagged block generated"
    );
    if response.stop_sequence.as_deref() != Some(close.as_str()) {
        warn!(
            tag = %tag,
            stop_reason = %response.stop_reason,
            "Generation did not end on the closing tag"
        );
    }

    let text = response.text();
    let mut additions = Vec::with_capacity(2);
    if !response.content.is_empty() {
        additions.push(Message::new(Role::Assistant, response.content)?);
    }
    additions.push(Message::assistant(format!("{close}\n")));

    Ok((tag.wrap(&text), transcript.merge(additions)))
}
