//! Message and Transcript domain types.
//!
//! These are the value objects threaded through the whole loop:
//! the transcript is built from a system prompt and a problem statement,
//! primed and extended by the generation driver, extended with observations
//! by the dispatcher, and handed back to the caller when the loop ends.
//!
//! A [`Transcript`] never holds two adjacent messages with the same role.
//! Appending a message whose role matches the last one folds it into that
//! message instead of pushing a new entry.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (tool documentation, protocol rules)
    System,
    /// The end user, and tool observations fed back to the model
    User,
    /// The model
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binary attachment carried inline (e.g. a base64 image).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Encoding of `data`, e.g. `base64`.
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

/// One piece of message content: either text or an attachment, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSegment", into = "RawSegment")]
pub enum ContentSegment {
    Text(String),
    Attachment(Attachment),
}

impl ContentSegment {
    pub fn text(text: impl Into<String>) -> Self {
        ContentSegment::Text(text.into())
    }

    pub fn attachment(
        kind: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        ContentSegment::Attachment(Attachment {
            kind: kind.into(),
            media_type: media_type.into(),
            data: data.into(),
        })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ContentSegment::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentSegment::Text(text) => Some(text),
            ContentSegment::Attachment(_) => None,
        }
    }
}

/// Wire form of a segment: `{"type": "text", "text": ..}` or
/// `{"type": "image", "source": {..}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSegment {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<Attachment>,
}

impl TryFrom<RawSegment> for ContentSegment {
    type Error = Error;

    fn try_from(raw: RawSegment) -> Result<Self> {
        match (raw.text, raw.source) {
            (Some(text), None) => Ok(ContentSegment::Text(text)),
            (None, Some(source)) => Ok(ContentSegment::Attachment(source)),
            (None, None) => Err(Error::Validation(format!(
                "{} segment has neither text nor source",
                raw.kind
            ))),
            (Some(_), Some(_)) => Err(Error::Validation(format!(
                "{} segment has both text and source",
                raw.kind
            ))),
        }
    }
}

impl From<ContentSegment> for RawSegment {
    fn from(segment: ContentSegment) -> Self {
        match segment {
            ContentSegment::Text(text) => RawSegment {
                kind: "text".into(),
                text: Some(text),
                source: None,
            },
            ContentSegment::Attachment(source) => RawSegment {
                kind: "image".into(),
                text: None,
                source: Some(source),
            },
        }
    }
}

/// A single role-tagged message. Content is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    pub role: Role,
    content: Vec<ContentSegment>,
}

#[derive(Deserialize)]
struct RawMessage {
    role: Role,
    content: Vec<ContentSegment>,
}

impl TryFrom<RawMessage> for Message {
    type Error = Error;

    fn try_from(raw: RawMessage) -> Result<Self> {
        Message::new(raw.role, raw.content)
    }
}

impl Message {
    /// Create a message, rejecting empty content.
    pub fn new(role: Role, content: Vec<ContentSegment>) -> Result<Self> {
        if content.is_empty() {
            return Err(Error::Validation(format!(
                "{role} message content cannot be empty"
            )));
        }
        Ok(Self { role, content })
    }

    /// Create a single-segment text message.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentSegment::Text(text.into())],
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    pub fn content(&self) -> &[ContentSegment] {
        &self.content
    }

    /// All text segments joined with newlines; attachments are skipped.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentSegment::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Fold same-role content into this message.
    ///
    /// When this message ends in text and the incoming content starts with
    /// text, the two are joined with a newline; everything else is appended
    /// as separate segments.
    fn absorb(&mut self, content: Vec<ContentSegment>) {
        let mut incoming = content.into_iter().peekable();
        if let Some(ContentSegment::Text(tail)) = self.content.last_mut() {
            if let Some(ContentSegment::Text(head)) = incoming.next_if(ContentSegment::is_text) {
                tail.push('\n');
                tail.push_str(&head);
            }
        }
        self.content.extend(incoming);
    }
}

/// The ordered, role-coalesced conversation history sent to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run from a system prompt and the user's problem statement.
    pub fn from_prompt(system: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::new()
            .append(Message::system(system))
            .append(Message::user(problem))
    }

    /// Append a message, coalescing it into the last one when roles match.
    #[must_use]
    pub fn append(mut self, message: Message) -> Self {
        match self.messages.last_mut() {
            Some(last) if last.role == message.role => last.absorb(message.content),
            _ => self.messages.push(message),
        }
        self
    }

    /// Append every message of `other`, in order.
    #[must_use]
    pub fn merge(self, other: impl IntoIterator<Item = Message>) -> Self {
        other.into_iter().fold(self, Transcript::append)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Text of the first system message, if there is one.
    pub fn system_text(&self) -> Option<String> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(Message::joined_text)
    }

    /// User and assistant messages, in order.
    pub fn conversable(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}

impl FromIterator<Message> for Transcript {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Transcript::new().merge(iter)
    }
}

impl IntoIterator for Transcript {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl Serialize for Transcript {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.messages.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transcript {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<Message>::deserialize(deserializer).map(Transcript::from_iter)
    }
}
