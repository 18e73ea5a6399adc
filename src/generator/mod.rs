//! Synthetic workload generation.
//!
//! Two strategies populate the store through `AppState::merge_message`:
//! a fixed-population strategy (N identities, M casts each, D reply
//! rounds) and a time-based strategy that walks a simulated adoption
//! window day by day. Both are cooperative: they check a cancellation
//! token at every iteration boundary and yield to the runtime at fine
//! granularity so reads stay responsive while the dataset loads.
pub mod fixed;
pub mod identity;
pub mod timeline;

pub use fixed::run_fixed;
pub use identity::IdentityProfile;
pub use timeline::{GrowthModel, run_timeline};

use crate::core::types::{CastId, Fid, Message, MessageData, UserDataType};
use crate::core::util::{calculate_message_hash, derive_fake_signer, fake_signature};
use crate::metrics;
use thiserror::Error;
use tracing::info;

/// Generator errors
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("generation cancelled")]
    Cancelled,

    #[error("write failed: {0}")]
    Write(String),

    #[error("clock error: {0}")]
    Clock(String),
}

/// Result type for generation
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Counters reported after a generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub identities: u64,
    pub casts: u64,
    pub replies: u64,
    pub user_data: u64,
}

impl GenerationSummary {
    /// Total messages written
    pub fn messages(&self) -> u64 {
        self.casts + self.replies + self.user_data
    }
}

const CAST_PHRASES: &[&str] = &[
    "gm",
    "just shipped something new",
    "what a day on the network",
    "hot take: threads are underrated",
    "anyone else seeing this?",
    "good morning to everyone except spam bots",
    "thinking about protocol design again",
    "replies to this are going to be interesting",
    "small wins compound",
    "touch grass, then cast about it",
    "the feed is particularly good today",
    "onboarding a friend right now",
];

/// Fake cast text: a stock phrase, occasionally suffixed for variety
pub(crate) fn fake_cast_text<R: rand::Rng>(rng: &mut R) -> String {
    let phrase = CAST_PHRASES[rng.random_range(0..CAST_PHRASES.len())];
    if rng.random_bool(0.3) {
        format!("{} ({})", phrase, rng.random_range(1..10_000u32))
    } else {
        phrase.to_string()
    }
}

/// Deterministic byte encoding of the signed portion of a message.
///
/// Hand-rolled rather than serde so hashing is infallible; the layout only
/// needs to be stable and collision-free within a process lifetime.
fn signing_bytes(fid: Fid, timestamp: u32, data: &MessageData) -> Vec<u8> {
    let mut buf = Vec::with_capacity(96);
    buf.extend_from_slice(&fid.value().to_be_bytes());
    buf.extend_from_slice(&timestamp.to_be_bytes());

    match data {
        MessageData::CastAdd { text, parent, mentions } => {
            buf.push(1);
            buf.extend_from_slice(&(text.len() as u32).to_be_bytes());
            buf.extend_from_slice(text.as_bytes());
            match parent {
                Some(parent_id) => {
                    buf.push(1);
                    buf.extend_from_slice(&parent_id.fid.value().to_be_bytes());
                    buf.extend_from_slice(parent_id.hash.as_bytes());
                },
                None => buf.push(0),
            }
            for mention in mentions {
                buf.extend_from_slice(&mention.value().to_be_bytes());
            }
        },
        MessageData::CastRemove { target_hash } => {
            buf.push(2);
            buf.extend_from_slice(target_hash.as_bytes());
        },
        MessageData::UserDataAdd { data_type, value } => {
            buf.push(3);
            buf.push(match data_type {
                UserDataType::DisplayName => 1,
                UserDataType::Bio => 2,
                UserDataType::Pfp => 3,
                UserDataType::Url => 4,
            });
            buf.extend_from_slice(value.as_bytes());
        },
    }

    buf
}

/// Assemble a well-formed message: content hash over the signed bytes plus
/// a simulated signature and signer.
fn build_message(fid: Fid, timestamp: u32, data: MessageData) -> Message {
    let hash = calculate_message_hash(&signing_bytes(fid, timestamp, &data));
    let signature = fake_signature(&hash);
    let signer = derive_fake_signer(fid);
    Message { fid, timestamp, data, hash, signature, signer }
}

/// Build a CastAdd message
pub fn build_cast_add(
    fid: Fid,
    text: String,
    parent: Option<CastId>,
    mentions: Vec<Fid>,
    timestamp: u32,
) -> Message {
    build_message(fid, timestamp, MessageData::CastAdd { text, parent, mentions })
}

/// Build a CastRemove message
pub fn build_cast_remove(
    fid: Fid,
    target_hash: crate::core::types::MessageHash,
    timestamp: u32,
) -> Message {
    build_message(fid, timestamp, MessageData::CastRemove { target_hash })
}

/// Build a UserDataAdd message
pub fn build_user_data(
    fid: Fid,
    data_type: UserDataType,
    value: String,
    timestamp: u32,
) -> Message {
    build_message(fid, timestamp, MessageData::UserDataAdd { data_type, value })
}

/// Progress reporting against a planned-up-front operation total.
///
/// Logs at info once per whole percent so a multi-minute run produces at
/// most a hundred lines.
pub(crate) struct Progress {
    total: u64,
    done: u64,
    last_logged: u64,
}

impl Progress {
    pub(crate) fn new(total: u64) -> Self {
        Self { total, done: 0, last_logged: 0 }
    }

    pub(crate) fn record(&mut self, completed: u64) {
        self.done += completed;
        if self.total == 0 {
            return;
        }
        let percent = (self.done * 100) / self.total;
        if percent > self.last_logged {
            self.last_logged = percent;
            info!("generation progress: {}% ({}/{} operations)", percent, self.done, self.total);
            metrics::gauge_generation_progress(percent as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MessageHash, MessageType};

    #[test]
    fn test_built_cast_is_well_formed() {
        let msg = build_cast_add(Fid::new(7), "hello".to_string(), None, vec![Fid::new(9)], 500);

        assert_eq!(msg.fid, Fid::new(7));
        assert_eq!(msg.timestamp, 500);
        assert_eq!(msg.message_type(), MessageType::CastAdd);
        assert!(!msg.hash.is_zero());
        assert_eq!(msg.signature.len(), 64);
        assert_eq!(msg.signer.len(), 32);
    }

    #[test]
    fn test_hash_is_content_addressed() {
        let a = build_cast_add(Fid::new(7), "hello".to_string(), None, vec![], 500);
        let b = build_cast_add(Fid::new(7), "hello".to_string(), None, vec![], 500);
        let c = build_cast_add(Fid::new(7), "hello".to_string(), None, vec![], 501);

        assert_eq!(a.hash, b.hash);
        assert_ne!(a.hash, c.hash);
    }

    #[test]
    fn test_parent_changes_hash() {
        let parent = CastId::new(Fid::new(5), MessageHash::new([1; 20]));
        let top = build_cast_add(Fid::new(7), "hi".to_string(), None, vec![], 500);
        let reply = build_cast_add(Fid::new(7), "hi".to_string(), Some(parent), vec![], 500);

        assert_ne!(top.hash, reply.hash);
        assert_eq!(reply.parent(), Some(parent));
    }

    #[test]
    fn test_builders_cover_all_types() {
        let remove = build_cast_remove(Fid::new(7), MessageHash::new([1; 20]), 500);
        assert_eq!(remove.message_type(), MessageType::CastRemove);

        let attr = build_user_data(Fid::new(7), UserDataType::Bio, "bio".to_string(), 500);
        assert_eq!(attr.message_type(), MessageType::UserDataAdd);
    }

    #[test]
    fn test_signer_is_stable_per_fid() {
        let a = build_cast_add(Fid::new(7), "one".to_string(), None, vec![], 1);
        let b = build_cast_add(Fid::new(7), "two".to_string(), None, vec![], 2);
        assert_eq!(a.signer, b.signer);
    }
}
