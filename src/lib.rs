//! In-memory mailbox: a collection of email messages with per-message
//! read/unread state, chronological views, and reply-thread views.
//!
//! The [`Mailbox`] owns its messages and their read flags. Messages are kept
//! in canonical order (newest first, ties broken by descending id) and can be
//! rendered either chronologically ([`Mailbox::timestamp_view`]) or grouped
//! into reply threads ([`Mailbox::threaded_view`]).

pub mod mail;

pub use mail::{Address, Email, Mailbox, MailboxError};
