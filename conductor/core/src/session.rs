//! Session Management
//!
//! The transcript of one conversation. Messages are only ever appended;
//! nothing in the crate edits or removes an entry once it is recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::messages::{MessageId, MessageRole, SessionId};
use crate::query::QueryResult;

/// A message in the conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
    /// Query result, only on successful assistant replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<QueryResult>,
}

impl Message {
    /// A question typed by the user
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into(), None)
    }

    /// An assistant reply without data (failure text)
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content.into(), None)
    }

    /// An assistant reply carrying a query result
    pub fn assistant_with_result(result: QueryResult) -> Self {
        Self::new(MessageRole::Assistant, result.headline(), Some(result))
    }

    fn new(role: MessageRole, content: String, result: Option<QueryResult>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            timestamp: Utc::now(),
            result,
        }
    }
}

/// A conversation session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Session ID
    pub id: SessionId,
    /// Project the questions are asked against
    pub project_id: String,
    /// When the session started
    pub started_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl Session {
    /// Create a new empty session for a project
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            project_id: project_id.into(),
            started_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    /// Append a message, returning its ID
    pub fn push(&mut self, message: Message) -> MessageId {
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    /// All messages in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look a message up by ID
    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// The most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if nothing has been said yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
