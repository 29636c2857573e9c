use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Address {
    pub name: Option<String>,
    pub addr: String,
}

/// An immutable email message.
///
/// A message is identified by its [`id`](Email::id) and carries an integer
/// [`timestamp`](Email::timestamp). A reply records the id of the message it
/// responds to in [`response_to`](Email::response_to); `None` marks a thread
/// root. Fields are fixed at construction, so a message can be shared freely
/// once built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Email {
    id: Uuid,
    timestamp: i64,
    #[serde(default)]
    response_to: Option<Uuid>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    from: Option<Address>,
}

impl Email {
    /// Create a thread-root message (no parent).
    pub fn new(id: Uuid, timestamp: i64) -> Self {
        Email {
            id,
            timestamp,
            response_to: None,
            subject: None,
            from: None,
        }
    }

    /// Create a reply to the message with id `parent`.
    pub fn reply(id: Uuid, timestamp: i64, parent: Uuid) -> Self {
        Email {
            id,
            timestamp,
            response_to: Some(parent),
            subject: None,
            from: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Id of the message this one replies to, or `None` for a thread root.
    pub fn response_to(&self) -> Option<Uuid> {
        self.response_to
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn from_display(&self) -> String {
        match &self.from {
            Some(addr) => addr.name.clone().unwrap_or_else(|| addr.addr.clone()),
            None => "(unknown)".to_string(),
        }
    }
}
