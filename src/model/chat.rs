//! Chat transcript entries.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub message: String,
    /// Stored under `timestamp` as an RFC 3339 string.
    #[serde(rename = "timestamp")]
    pub sent_at: Timestamp,
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    /// Older documents call the assistant `nexus`.
    #[serde(alias = "nexus")]
    Assistant,
}
