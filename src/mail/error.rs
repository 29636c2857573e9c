use thiserror::Error;
use uuid::Uuid;

/// Errors produced by [`Mailbox`](super::Mailbox) operations.
///
/// Most mailbox operations report absence through their return value; only
/// read-state queries treat an unknown id as a caller error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailboxError {
    /// The mailbox holds no message with this id.
    #[error("no message with id {0} in the mailbox")]
    UnknownMessage(Uuid),
}
