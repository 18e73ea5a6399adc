//! In-memory content-addressed message store with secondary indexes.
//!
//! The primary index maps a message hash to the message. Three secondary
//! indexes project the primary by owner FID, by parent CastId (reply edges),
//! and by profile-attribute owner. Every index bucket is an independently
//! synchronized map entry; a single insert touches up to three buckets with
//! no cross-index transaction, so a concurrent reader can briefly see a
//! message in the primary index before it appears in a secondary one.
//! Indexes are additive and only `remove` retracts, which takes out every
//! index entry before returning.
use crate::core::types::{CastId, Fid, Message, MessageData, MessageHash, MessageType};
use crate::store::cursor::{PageKey, PageRequest};
use dashmap::DashMap;
use std::collections::HashSet;
use thiserror::Error;

/// Message store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// One page of a paginated cast query
#[derive(Debug, Clone, Default)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Cursor for the next page; None when the result set is exhausted
    pub next_page_token: Option<String>,
}

impl MessagePage {
    fn empty() -> Self {
        Self::default()
    }
}

/// Concurrency-safe multi-index message store
#[derive(Default)]
pub struct MessageStore {
    /// hash -> message, the authoritative index
    primary: DashMap<MessageHash, Message>,
    /// fid -> hashes of its CastAdd and UserDataAdd messages
    by_fid: DashMap<Fid, HashSet<MessageHash>>,
    /// parent cast -> hashes of replies
    by_parent: DashMap<CastId, HashSet<MessageHash>>,
    /// fid -> hashes of its UserDataAdd messages
    profile_by_fid: DashMap<Fid, HashSet<MessageHash>>,
}

impl MessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a message into the primary index and every secondary index
    /// its type participates in.
    ///
    /// Inserting a hash that already exists overwrites the stored value;
    /// callers wanting store-once semantics check existence first. No event
    /// is emitted here; pairing an insert with a `MergeMessage` append is
    /// the caller's responsibility.
    pub fn insert(&self, message: Message) -> Result<Message> {
        if message.hash.is_zero() {
            return Err(StoreError::InvalidArgument("message hash is unset".to_string()));
        }

        let hash = message.hash;
        let fid = message.fid;
        let message_type = message.message_type();
        let parent = message.parent();

        // Primary first so a point lookup can always find what a secondary
        // index is about to reference.
        self.primary.insert(hash, message.clone());

        match message_type {
            MessageType::CastAdd => {
                self.by_fid.entry(fid).or_default().insert(hash);
                if let Some(parent_id) = parent {
                    self.by_parent.entry(parent_id).or_default().insert(hash);
                }
            },
            MessageType::UserDataAdd => {
                self.by_fid.entry(fid).or_default().insert(hash);
                self.profile_by_fid.entry(fid).or_default().insert(hash);
            },
            MessageType::CastRemove => {},
        }

        Ok(message)
    }

    /// Point lookup by content hash
    pub fn get_by_hash(&self, hash: &MessageHash) -> Option<Message> {
        self.primary.get(hash).map(|entry| entry.value().clone())
    }

    /// Paginated CastAdd messages owned by a FID, ordered by
    /// `(timestamp, hash)`.
    pub fn get_casts_by_fid(&self, fid: Fid, page: &PageRequest) -> MessagePage {
        let candidates = match self.by_fid.get(&fid) {
            Some(entry) => self.materialize(entry.value(), |m| m.is_cast()),
            None => return MessagePage::empty(),
        };
        paginate(candidates, page)
    }

    /// Paginated replies to a cast, ordered by `(timestamp, hash)`
    pub fn get_casts_by_parent(&self, parent: &CastId, page: &PageRequest) -> MessagePage {
        let candidates = match self.by_parent.get(parent) {
            Some(entry) => self.materialize(entry.value(), |m| m.is_cast()),
            None => return MessagePage::empty(),
        };
        paginate(candidates, page)
    }

    /// All profile-attribute messages for a FID, unpaginated.
    ///
    /// The store does not deduplicate by attribute kind; consumers reduce
    /// the list last-written-wins.
    pub fn get_user_data_by_fid(&self, fid: Fid) -> Vec<Message> {
        match self.profile_by_fid.get(&fid) {
            Some(entry) => {
                self.materialize(entry.value(), |m| m.message_type() == MessageType::UserDataAdd)
            },
            None => Vec::new(),
        }
    }

    /// Remove a message from the primary index and every secondary index it
    /// appears in. Returns whether it existed.
    pub fn remove(&self, hash: &MessageHash) -> bool {
        let Some((_, message)) = self.primary.remove(hash) else {
            return false;
        };

        let fid = message.fid;
        match &message.data {
            MessageData::CastAdd { parent, .. } => {
                self.unindex(&self.by_fid, fid, hash);
                if let Some(parent_id) = parent {
                    self.unindex(&self.by_parent, *parent_id, hash);
                }
            },
            MessageData::UserDataAdd { .. } => {
                self.unindex(&self.by_fid, fid, hash);
                self.unindex(&self.profile_by_fid, fid, hash);
            },
            MessageData::CastRemove { .. } => {},
        }

        true
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    /// Whether the store holds no messages
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Resolve a hash set against the primary index, dropping entries whose
    /// primary record vanished mid-scan.
    fn materialize<F>(&self, hashes: &HashSet<MessageHash>, keep: F) -> Vec<Message>
    where
        F: Fn(&Message) -> bool,
    {
        hashes
            .iter()
            .filter_map(|hash| self.primary.get(hash))
            .map(|entry| entry.value().clone())
            .filter(|message| keep(message))
            .collect()
    }

    fn unindex<K>(&self, index: &DashMap<K, HashSet<MessageHash>>, key: K, hash: &MessageHash)
    where
        K: std::hash::Hash + Eq,
    {
        if let Some(mut entry) = index.get_mut(&key) {
            entry.value_mut().remove(hash);
        }
        // Guard must be dropped before removing the bucket.
        index.remove_if(&key, |_, set| set.is_empty());
    }
}

/// Sort candidates by `(timestamp, hash)` and cut the requested page.
///
/// A present token must locate the exact key of the last item the previous
/// page returned; the page starts strictly after it. A token that does not
/// decode, or whose key is absent from the current candidate set (for
/// example the referenced message was removed), produces an empty page with
/// no token rather than an error.
fn paginate(mut candidates: Vec<Message>, page: &PageRequest) -> MessagePage {
    let page_size = page.effective_size();
    if page_size == 0 || candidates.is_empty() {
        return MessagePage::empty();
    }

    if page.reverse {
        candidates.sort_by(|a, b| key_of(b).cmp(&key_of(a)));
    } else {
        candidates.sort_by_key(key_of);
    }

    let start = match &page.page_token {
        Some(token) => {
            let Some(key) = PageKey::decode(token) else {
                return MessagePage::empty();
            };
            let Some(position) = candidates.iter().position(|m| key_of(m) == key) else {
                return MessagePage::empty();
            };
            position + 1
        },
        None => 0,
    };

    let end = (start + page_size).min(candidates.len());
    let messages: Vec<Message> = candidates[start..end].to_vec();

    let next_page_token = if end < candidates.len() {
        messages.last().map(|m| key_of(m).encode())
    } else {
        None
    };

    MessagePage { messages, next_page_token }
}

#[inline]
fn key_of(message: &Message) -> PageKey {
    PageKey::new(message.timestamp, message.hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UserDataType;

    fn cast(fid: u64, timestamp: u32, seed: u8, parent: Option<CastId>) -> Message {
        Message {
            fid: Fid::new(fid),
            timestamp,
            data: MessageData::CastAdd { text: format!("cast {}", seed), parent, mentions: vec![] },
            hash: MessageHash::new([seed; 20]),
            signature: vec![0; 64],
            signer: vec![0; 32],
        }
    }

    fn user_data(fid: u64, timestamp: u32, seed: u8, data_type: UserDataType) -> Message {
        Message {
            fid: Fid::new(fid),
            timestamp,
            data: MessageData::UserDataAdd { data_type, value: format!("value {}", seed) },
            hash: MessageHash::new([seed; 20]),
            signature: vec![0; 64],
            signer: vec![0; 32],
        }
    }

    mod insert_tests {
        use super::*;

        #[test]
        fn test_insert_then_get_by_hash() {
            let store = MessageStore::new();
            let msg = cast(5, 100, 1, None);

            let stored = store.insert(msg.clone()).unwrap();
            assert_eq!(stored, msg);
            assert_eq!(store.get_by_hash(&msg.hash), Some(msg));
        }

        #[test]
        fn test_insert_rejects_unset_hash() {
            let store = MessageStore::new();
            let mut msg = cast(5, 100, 1, None);
            msg.hash = MessageHash::ZERO;

            assert!(matches!(store.insert(msg), Err(StoreError::InvalidArgument(_))));
        }

        #[test]
        fn test_insert_same_hash_overwrites() {
            let store = MessageStore::new();
            store.insert(cast(5, 100, 1, None)).unwrap();

            let mut updated = cast(5, 100, 1, None);
            if let MessageData::CastAdd { text, .. } = &mut updated.data {
                *text = "rewritten".to_string();
            }
            store.insert(updated.clone()).unwrap();

            assert_eq!(store.len(), 1);
            assert_eq!(store.get_by_hash(&updated.hash), Some(updated));
        }

        #[test]
        fn test_cast_remove_is_not_owner_indexed() {
            let store = MessageStore::new();
            let remove = Message {
                fid: Fid::new(5),
                timestamp: 100,
                data: MessageData::CastRemove { target_hash: MessageHash::new([1; 20]) },
                hash: MessageHash::new([2; 20]),
                signature: vec![],
                signer: vec![],
            };
            store.insert(remove.clone()).unwrap();

            assert!(store.get_by_hash(&remove.hash).is_some());
            let page = store.get_casts_by_fid(Fid::new(5), &PageRequest::with_size(10));
            assert!(page.messages.is_empty());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_parent_and_owner_scenario() {
            // Spec scenario: a cast and a reply from another fid.
            let store = MessageStore::new();
            let h1 = cast(5, 100, 1, None);
            store.insert(h1.clone()).unwrap();

            let parent_id = CastId::new(Fid::new(5), h1.hash);
            let h2 = cast(7, 200, 2, Some(parent_id));
            store.insert(h2.clone()).unwrap();

            let replies = store.get_casts_by_parent(&parent_id, &PageRequest::with_size(10));
            assert_eq!(replies.messages, vec![h2]);
            assert!(replies.next_page_token.is_none());

            let owned = store.get_casts_by_fid(Fid::new(5), &PageRequest::with_size(10));
            assert_eq!(owned.messages, vec![h1]);
            assert!(owned.next_page_token.is_none());
        }

        #[test]
        fn test_unknown_fid_is_empty() {
            let store = MessageStore::new();
            let page = store.get_casts_by_fid(Fid::new(42), &PageRequest::with_size(10));
            assert!(page.messages.is_empty());
            assert!(page.next_page_token.is_none());
        }

        #[test]
        fn test_zero_page_size_is_empty() {
            let store = MessageStore::new();
            store.insert(cast(5, 100, 1, None)).unwrap();

            let page = store.get_casts_by_fid(Fid::new(5), &PageRequest::with_size(0));
            assert!(page.messages.is_empty());
            assert!(page.next_page_token.is_none());
        }

        #[test]
        fn test_user_data_by_fid() {
            let store = MessageStore::new();
            store.insert(user_data(9, 10, 1, UserDataType::DisplayName)).unwrap();
            store.insert(user_data(9, 11, 2, UserDataType::Bio)).unwrap();
            store.insert(cast(9, 12, 3, None)).unwrap();

            let attrs = store.get_user_data_by_fid(Fid::new(9));
            assert_eq!(attrs.len(), 2);
            assert!(attrs.iter().all(|m| m.message_type() == MessageType::UserDataAdd));

            assert!(store.get_user_data_by_fid(Fid::new(10)).is_empty());
        }

        #[test]
        fn test_read_is_idempotent() {
            let store = MessageStore::new();
            for seed in 1..=4u8 {
                store.insert(cast(5, 100 + seed as u32, seed, None)).unwrap();
            }

            let request = PageRequest::with_size(2);
            let first = store.get_casts_by_fid(Fid::new(5), &request);
            let second = store.get_casts_by_fid(Fid::new(5), &request);
            assert_eq!(first.messages, second.messages);
            assert_eq!(first.next_page_token, second.next_page_token);
        }
    }

    mod pagination_tests {
        use super::*;

        fn seeded_store() -> MessageStore {
            let store = MessageStore::new();
            for seed in 1..=5u8 {
                store.insert(cast(5, seed as u32, seed, None)).unwrap();
            }
            store
        }

        #[test]
        fn test_page_walk_forward() {
            // Spec scenario: page size 2 over 5 records with timestamps 1..5.
            let store = seeded_store();
            let fid = Fid::new(5);

            let page1 = store.get_casts_by_fid(fid, &PageRequest::with_size(2));
            assert_eq!(
                page1.messages.iter().map(|m| m.timestamp).collect::<Vec<_>>(),
                vec![1, 2]
            );
            let token1 = page1.next_page_token.expect("more pages expected");

            let page2 = store.get_casts_by_fid(fid, &PageRequest::with_size(2).after(token1));
            assert_eq!(
                page2.messages.iter().map(|m| m.timestamp).collect::<Vec<_>>(),
                vec![3, 4]
            );
            let token2 = page2.next_page_token.expect("more pages expected");

            let page3 = store.get_casts_by_fid(fid, &PageRequest::with_size(2).after(token2));
            assert_eq!(page3.messages.iter().map(|m| m.timestamp).collect::<Vec<_>>(), vec![5]);
            assert!(page3.next_page_token.is_none());
        }

        #[test]
        fn test_page_walk_reverse() {
            let store = seeded_store();
            let fid = Fid::new(5);

            let mut seen = Vec::new();
            let mut token: Option<String> = None;
            loop {
                let mut request = PageRequest::with_size(2).reversed();
                request.page_token = token.clone();
                let page = store.get_casts_by_fid(fid, &request);
                seen.extend(page.messages.iter().map(|m| m.timestamp));
                match page.next_page_token {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }

            assert_eq!(seen, vec![5, 4, 3, 2, 1]);
        }

        #[test]
        fn test_walk_returns_each_exactly_once() {
            let store = MessageStore::new();
            // Duplicate timestamps force the hash tie-break to carry the order.
            for seed in 1..=9u8 {
                store.insert(cast(5, 7, seed, None)).unwrap();
            }

            let mut seen = Vec::new();
            let mut token: Option<String> = None;
            loop {
                let mut request = PageRequest::with_size(4);
                request.page_token = token.clone();
                let page = store.get_casts_by_fid(Fid::new(5), &request);
                seen.extend(page.messages.iter().map(|m| m.hash));
                match page.next_page_token {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }

            assert_eq!(seen.len(), 9);
            let mut deduped = seen.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), 9);
            // Non-decreasing key order within equal timestamps means sorted hashes.
            assert_eq!(seen, deduped);
        }

        #[test]
        fn test_malformed_token_is_empty_not_error() {
            let store = seeded_store();
            let page = store
                .get_casts_by_fid(Fid::new(5), &PageRequest::with_size(2).after("zz-not-a-token"));
            assert!(page.messages.is_empty());
            assert!(page.next_page_token.is_none());
        }

        #[test]
        fn test_token_for_removed_record_is_empty() {
            let store = seeded_store();
            let fid = Fid::new(5);

            let page1 = store.get_casts_by_fid(fid, &PageRequest::with_size(2));
            let token = page1.next_page_token.unwrap();

            // Remove the record the token points at.
            let last_hash = page1.messages.last().unwrap().hash;
            assert!(store.remove(&last_hash));

            let page2 = store.get_casts_by_fid(fid, &PageRequest::with_size(2).after(token));
            assert!(page2.messages.is_empty());
            assert!(page2.next_page_token.is_none());
        }
    }

    mod remove_tests {
        use super::*;

        #[test]
        fn test_remove_clears_every_index() {
            let store = MessageStore::new();
            let root = cast(5, 100, 1, None);
            store.insert(root.clone()).unwrap();

            let parent_id = CastId::new(Fid::new(5), root.hash);
            let reply = cast(7, 200, 2, Some(parent_id));
            store.insert(reply.clone()).unwrap();

            assert!(store.remove(&reply.hash));
            assert_eq!(store.get_by_hash(&reply.hash), None);

            let replies = store.get_casts_by_parent(&parent_id, &PageRequest::with_size(10));
            assert!(replies.messages.is_empty());
            let owned = store.get_casts_by_fid(Fid::new(7), &PageRequest::with_size(10));
            assert!(owned.messages.is_empty());
        }

        #[test]
        fn test_remove_user_data_clears_profile_index() {
            let store = MessageStore::new();
            let attr = user_data(9, 10, 1, UserDataType::Bio);
            store.insert(attr.clone()).unwrap();

            assert!(store.remove(&attr.hash));
            assert!(store.get_user_data_by_fid(Fid::new(9)).is_empty());
        }

        #[test]
        fn test_remove_missing_returns_false() {
            let store = MessageStore::new();
            assert!(!store.remove(&MessageHash::new([1; 20])));
        }
    }
}
