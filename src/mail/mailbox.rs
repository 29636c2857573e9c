use std::cmp::Ordering;
use std::collections::hash_map::Entry as IndexSlot;
use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, trace};
use uuid::Uuid;

use super::error::MailboxError;
use super::threading;
use super::types::Email;

/// Canonical storage order: newest first, ties broken by descending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryKey {
    timestamp: i64,
    id: Uuid,
}

impl EntryKey {
    fn of(email: &Email) -> Self {
        EntryKey {
            timestamp: email.timestamp(),
            id: email.id(),
        }
    }
}

impl Ord for EntryKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for EntryKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One owned message plus its read flag. The flag lives in the map value so
/// toggling it never moves the entry.
#[derive(Debug, Clone)]
struct Entry {
    email: Email,
    read: bool,
}

/// A collection of email messages with per-message read/unread state.
///
/// Messages are stored in canonical order (newest first, ties by descending
/// id) and indexed by id for lookup. Every mutator takes `&mut self`, so a
/// `Mailbox` has a
/// single writer by construction; share it behind one lock if needed.
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    entries: BTreeMap<EntryKey, Entry>,
    by_id: HashMap<Uuid, EntryKey>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message, initially unread.
    ///
    /// Returns `false` without storing anything if an entry with the same
    /// (timestamp, id) key is already present.
    pub fn add(&mut self, msg: Email) -> bool {
        let key = EntryKey::of(&msg);
        if self.entries.contains_key(&key) {
            trace!("rejecting duplicate message {} at t={}", msg.id(), msg.timestamp());
            return false;
        }
        match self.by_id.entry(msg.id()) {
            // Same id stored under another timestamp: the index keeps the
            // entry that comes first in canonical order, matching a linear
            // scan over the storage.
            IndexSlot::Occupied(mut slot) => {
                if key < *slot.get() {
                    slot.insert(key);
                }
            }
            IndexSlot::Vacant(slot) => {
                slot.insert(key);
            }
        }
        self.entries.insert(key, Entry { email: msg, read: false });
        true
    }

    /// Look up a message by id.
    pub fn get(&self, id: Uuid) -> Option<&Email> {
        self.by_id
            .get(&id)
            .and_then(|key| self.entries.get(key))
            .map(|entry| &entry.email)
    }

    /// Remove every entry carrying this id. Returns whether anything was
    /// removed.
    pub fn delete(&mut self, id: Uuid) -> bool {
        if self.by_id.remove(&id).is_none() {
            return false;
        }
        let doomed: Vec<EntryKey> = self
            .entries
            .keys()
            .filter(|key| key.id == id)
            .copied()
            .collect();
        for key in &doomed {
            self.entries.remove(key);
        }
        debug!("deleted {} message(s) with id {}", doomed.len(), id);
        true
    }

    /// Number of stored messages.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Mark the message with this id as read. Returns `false` if absent.
    pub fn mark_read(&mut self, id: Uuid) -> bool {
        self.set_flag(id, true)
    }

    /// Mark the message with this id as unread. Returns `false` if absent.
    pub fn mark_unread(&mut self, id: Uuid) -> bool {
        self.set_flag(id, false)
    }

    fn set_flag(&mut self, id: Uuid, read: bool) -> bool {
        let Some(key) = self.by_id.get(&id).copied() else {
            return false;
        };
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.read = read;
                true
            }
            None => false,
        }
    }

    /// Whether the message with this id has been read.
    ///
    /// Unlike the other operations, querying an absent id is a caller error
    /// and returns [`MailboxError::UnknownMessage`].
    pub fn is_read(&self, id: Uuid) -> Result<bool, MailboxError> {
        self.by_id
            .get(&id)
            .and_then(|key| self.entries.get(key))
            .map(|entry| entry.read)
            .ok_or(MailboxError::UnknownMessage(id))
    }

    /// Number of messages still unread.
    pub fn unread_count(&self) -> usize {
        self.entries.values().filter(|entry| !entry.read).count()
    }

    /// All messages in canonical order: newest first, ties by descending id.
    pub fn timestamp_view(&self) -> Vec<&Email> {
        self.entries.values().map(|entry| &entry.email).collect()
    }

    /// All messages with `start <= timestamp <= end`, earliest first.
    ///
    /// Callers must supply `start >= 0` and `end >= start`; the bounds are
    /// not checked.
    pub fn in_range(&self, start: i64, end: i64) -> Vec<&Email> {
        let mut msgs: Vec<&Email> = self
            .entries
            .values()
            .map(|entry| &entry.email)
            .filter(|e| e.timestamp() >= start && e.timestamp() <= end)
            .collect();
        // Stable sort over canonical order keeps ties deterministic.
        msgs.sort_by_key(|e| e.timestamp());
        msgs
    }

    /// Mark the whole thread containing this message as read.
    pub fn mark_thread_read(&mut self, id: Uuid) -> bool {
        self.set_thread_flag(id, true)
    }

    /// Mark the whole thread containing this message as unread.
    pub fn mark_thread_unread(&mut self, id: Uuid) -> bool {
        self.set_thread_flag(id, false)
    }

    /// Flag the connected thread around `id`: the message itself, its
    /// ancestors up to the root, and everything below any of them.
    ///
    /// The membership is collected from a read-only traversal before any flag
    /// is written, so the walk sees one consistent snapshot. An ancestor
    /// pointer to an id not present in the mailbox ends the upward walk;
    /// visited-set guards end malformed reply cycles.
    fn set_thread_flag(&mut self, id: Uuid, read: bool) -> bool {
        let mut targets: HashSet<Uuid> = HashSet::new();
        {
            let Some(start) = self.get(id) else {
                return false;
            };
            targets.insert(id);

            let mut cursor = start.response_to();
            while let Some(parent_id) = cursor {
                let Some(parent) = self.get(parent_id) else {
                    break;
                };
                if !targets.insert(parent_id) {
                    break;
                }
                cursor = parent.response_to();
            }

            let children =
                threading::children_index(self.entries.values().map(|entry| &entry.email));
            let mut stack: Vec<Uuid> = targets.iter().copied().collect();
            while let Some(visited) = stack.pop() {
                if let Some(kids) = children.get(&visited) {
                    for &kid in kids {
                        if targets.insert(kid.id()) {
                            stack.push(kid.id());
                        }
                    }
                }
            }
        }

        let mut flagged = 0usize;
        for target in &targets {
            if let Some(key) = self.by_id.get(target).copied() {
                if let Some(entry) = self.entries.get_mut(&key) {
                    entry.read = read;
                    flagged += 1;
                }
            }
        }
        debug!("set read={} on {} message(s) in thread of {}", read, flagged, id);
        true
    }

    /// All messages grouped by reply threads.
    ///
    /// The most recently active thread comes first, and within a thread newer
    /// messages come first. Recomputed from current contents on every call.
    pub fn threaded_view(&self) -> Vec<&Email> {
        let emails: Vec<&Email> = self.entries.values().map(|entry| &entry.email).collect();
        threading::build_threaded_view(&emails)
    }
}
