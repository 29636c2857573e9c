use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::types::Email;

/// Index from a message id to the replies pointing at it, in the order the
/// messages were supplied.
pub(crate) type ChildrenIndex<'a> = HashMap<Uuid, Vec<&'a Email>>;

pub(crate) fn children_index<'a, I>(emails: I) -> ChildrenIndex<'a>
where
    I: IntoIterator<Item = &'a Email>,
{
    let mut index: ChildrenIndex = HashMap::new();
    for email in emails {
        if let Some(parent) = email.response_to() {
            index.entry(parent).or_default().push(email);
        }
    }
    index
}

/// Every message transitively below `start`, excluding `start` itself.
///
/// Iterative stack walk; the visited set bounds the traversal so a malformed
/// reply cycle terminates after touching each member once.
pub(crate) fn collect_descendants<'a>(
    start: Uuid,
    children: &ChildrenIndex<'a>,
) -> Vec<&'a Email> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    seen.insert(start);
    let mut found = Vec::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if let Some(kids) = children.get(&id) {
            for &kid in kids {
                if seen.insert(kid.id()) {
                    found.push(kid);
                    stack.push(kid.id());
                }
            }
        }
    }
    found
}

/// Build a flat, display-ready list grouped by reply threads.
///
/// Threads are anchored at messages with no parent, sorted by their most
/// recent message (descending), and within each thread messages are sorted by
/// timestamp (descending). Both sorts are stable over the supplied order, so
/// ties resolve deterministically. A reply whose parent is missing from
/// `emails` belongs to no thread and does not appear in the result.
pub(crate) fn build_threaded_view<'a>(emails: &[&'a Email]) -> Vec<&'a Email> {
    if emails.is_empty() {
        return Vec::new();
    }

    let children = children_index(emails.iter().copied());

    let mut threads: Vec<Vec<&Email>> = Vec::new();
    for &email in emails {
        if email.response_to().is_none() {
            let mut thread = vec![email];
            thread.extend(collect_descendants(email.id(), &children));
            thread.sort_by_key(|e| Reverse(e.timestamp()));
            threads.push(thread);
        }
    }

    // Most recently active thread first; each thread's newest message is its
    // first element after the per-thread sort.
    threads.sort_by_key(|t| Reverse(t[0].timestamp()));
    threads.into_iter().flatten().collect()
}
