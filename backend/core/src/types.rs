use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identity of the person talking to the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the text of a turn came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Ocr,
    Fetch,
    Chat,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceTag::Ocr => "ocr",
            SourceTag::Fetch => "fetch",
            SourceTag::Chat => "chat",
        };
        f.write_str(s)
    }
}

/// One message unit in a conversation. Immutable once appended to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub source: Option<SourceTag>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>, source: Option<SourceTag>) -> Self {
        Self {
            role,
            content: content.into(),
            source,
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>, source: SourceTag) -> Self {
        Self::new(Role::User, content, Some(source))
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, None)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, None)
    }
}

/// Transport-level classification of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Text,
    Photo,
    Document,
    Command,
}

/// Binary content received from the user, with whatever the transport knew about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            mime_type: None,
            caption: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Blob(Blob),
}

/// A normalized message handed to the pipeline by a transport.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub user: UserId,
    pub kind: EventKind,
    pub payload: Payload,
    pub received_at: DateTime<Utc>,
}

impl InboundEvent {
    pub fn new(user: impl Into<UserId>, kind: EventKind, payload: Payload) -> Self {
        Self {
            user: user.into(),
            kind,
            payload,
            received_at: Utc::now(),
        }
    }

    pub fn text(user: impl Into<UserId>, text: impl Into<String>) -> Self {
        Self::new(user, EventKind::Text, Payload::Text(text.into()))
    }

    pub fn command(user: impl Into<UserId>, text: impl Into<String>) -> Self {
        Self::new(user, EventKind::Command, Payload::Text(text.into()))
    }

    pub fn photo(user: impl Into<UserId>, blob: Blob) -> Self {
        Self::new(user, EventKind::Photo, Payload::Blob(blob))
    }

    pub fn document(user: impl Into<UserId>, blob: Blob) -> Self {
        Self::new(user, EventKind::Document, Payload::Blob(blob))
    }

    /// The text carried by the event: the message itself, or a blob's caption.
    pub fn text_content(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            Payload::Blob(blob) => blob.caption.as_deref(),
        }
    }

    pub fn blob(&self) -> Option<&Blob> {
        match &self.payload {
            Payload::Blob(blob) => Some(blob),
            Payload::Text(_) => None,
        }
    }
}

/// A file sent back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub bytes: Bytes,
    pub file_name: String,
    pub mime_type: String,
}

impl Attachment {
    pub fn pdf(bytes: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            mime_type: "application/pdf".to_string(),
        }
    }
}

/// What the pipeline hands back to the transport.
///
/// The constructors guarantee that a reply text or a document (or both) is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResult {
    reply: Option<String>,
    document: Option<Attachment>,
}

impl OutboundResult {
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            document: None,
        }
    }

    pub fn file(document: Attachment) -> Self {
        Self {
            reply: None,
            document: Some(document),
        }
    }

    /// Attach a caption/reply to a document result.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub fn reply(&self) -> Option<&str> {
        self.reply.as_deref()
    }

    pub fn document(&self) -> Option<&Attachment> {
        self.document.as_ref()
    }

    pub fn into_parts(self) -> (Option<String>, Option<Attachment>) {
        (self.reply, self.document)
    }
}
