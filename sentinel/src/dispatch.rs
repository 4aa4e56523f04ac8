//! Hash-indexed dispatch from message id to the watchpoints inspecting it.
//!
//! The index is an arena of fixed-capacity nodes addressed by integer
//! handles: the bucket array holds head indices into a message-node
//! arena, message nodes chain within a bucket and point at a chain of
//! watch-index nodes, and every chain terminates at the `NIL` sentinel.
//! No definitions are duplicated; the index borrows slot numbers only.

use crate::tables::{WatchpointDefinition, HASH_BUCKETS};

/// Chain terminator for all arena links.
const NIL: i16 = -1;

/// One distinct message id within a bucket chain.
#[derive(Debug, Clone, Copy)]
struct MessageNode {
    msg_id: u16,
    /// Head of this message's watch-index chain.
    watch_head: i16,
    /// Next distinct message id hashing to the same bucket.
    next: i16,
}

/// One watchpoint slot subscribed to a message, in definition order.
#[derive(Debug, Clone, Copy)]
struct WatchNode {
    watch_index: u16,
    next: i16,
}

/// Dispatch index built once per table load.
#[derive(Debug, Clone)]
pub struct DispatchIndex {
    buckets: [i16; HASH_BUCKETS],
    messages: Vec<MessageNode>,
    watches: Vec<WatchNode>,
}

fn bucket_of(msg_id: u16) -> usize {
    usize::from(msg_id) & (HASH_BUCKETS - 1)
}

impl DispatchIndex {
    /// An index with no subscriptions.
    pub fn empty() -> Self {
        Self {
            buckets: [NIL; HASH_BUCKETS],
            messages: Vec::new(),
            watches: Vec::new(),
        }
    }

    /// Build the index from a definition table. Tolerates a table with
    /// zero used slots. Watch indices sharing a message id are grouped
    /// under one node in definition order.
    pub fn build(definitions: &[WatchpointDefinition]) -> Self {
        let mut index = Self::empty();
        // Tail of each message's watch chain, tracked only during build.
        let mut watch_tails: Vec<i16> = Vec::new();

        for (slot, def) in definitions.iter().enumerate() {
            if !def.is_used() {
                continue;
            }

            let node = match index.find_message(def.message_id) {
                Some(node) => node,
                None => {
                    let node = index.messages.len() as i16;
                    let bucket = bucket_of(def.message_id);
                    index.messages.push(MessageNode {
                        msg_id: def.message_id,
                        watch_head: NIL,
                        next: index.buckets[bucket],
                    });
                    watch_tails.push(NIL);
                    index.buckets[bucket] = node;
                    node
                }
            };

            let watch = index.watches.len() as i16;
            index.watches.push(WatchNode {
                watch_index: slot as u16,
                next: NIL,
            });

            let tail = watch_tails[node as usize];
            if tail == NIL {
                index.messages[node as usize].watch_head = watch;
            } else {
                index.watches[tail as usize].next = watch;
            }
            watch_tails[node as usize] = watch;
        }

        index
    }

    /// Arena handle of the node for `msg_id`, if subscribed.
    fn find_message(&self, msg_id: u16) -> Option<i16> {
        let mut cursor = self.buckets[bucket_of(msg_id)];
        while cursor != NIL {
            let node = &self.messages[cursor as usize];
            if node.msg_id == msg_id {
                return Some(cursor);
            }
            cursor = node.next;
        }
        None
    }

    /// Watchpoint slots inspecting `msg_id`, in definition order.
    ///
    /// An unreferenced id yields an empty iterator; each call starts a
    /// fresh traversal.
    pub fn lookup(&self, msg_id: u16) -> WatchIter<'_> {
        let cursor = self
            .find_message(msg_id)
            .map(|node| self.messages[node as usize].watch_head)
            .unwrap_or(NIL);
        WatchIter {
            index: self,
            cursor,
        }
    }

    /// Every distinct subscribed message id.
    pub fn distinct_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.messages.iter().map(|node| node.msg_id)
    }
}

/// Iterator over the watch-index chain of one message id.
#[derive(Debug)]
pub struct WatchIter<'a> {
    index: &'a DispatchIndex,
    cursor: i16,
}

impl Iterator for WatchIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.index.watches[self.cursor as usize];
        self.cursor = node.next;
        Some(node.watch_index)
    }
}
