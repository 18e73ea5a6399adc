//! Core domain types for the hub simulator
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use std::fmt;
use std::str::FromStr;

/// Farcaster timestamp epoch (January 1, 2021 UTC in milliseconds)
pub const FARCASTER_EPOCH: u64 = 1609459200000;

/// Maximum cast text length in bytes
pub const MAX_CAST_TEXT_BYTES: usize = 320;

/// Farcaster Identifier (FID)
///
/// A newtype wrapper around u64 to provide type safety for FIDs
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fid(#[serde_as(as = "DisplayFromStr")] u64);

impl Fid {
    /// Create a new FID
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fid {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u64>()?;
        Ok(Self(id))
    }
}

impl From<u64> for Fid {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Content digest used as a message's primary key (blake3, truncated to 20 bytes)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct MessageHash([u8; 20]);

impl MessageHash {
    /// Length of a message hash in bytes
    pub const LEN: usize = 20;

    /// The all-zero hash, used as the "unset" sentinel
    pub const ZERO: MessageHash = MessageHash([0u8; 20]);

    /// Create a hash from raw bytes
    #[inline]
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Create a hash from a byte slice, failing if the length is wrong
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 20] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Get the raw bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the unset sentinel
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for MessageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for MessageHash {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

/// Reference to a cast: the owning FID plus the cast's hash.
///
/// A CastId addresses a record without holding a copy of it; it is the
/// key for the reply (parent) index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CastId {
    pub fid: Fid,
    pub hash: MessageHash,
}

impl CastId {
    /// Create a new CastId
    #[inline]
    pub fn new(fid: Fid, hash: MessageHash) -> Self {
        Self { fid, hash }
    }
}

impl fmt::Display for CastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.fid, self.hash)
    }
}

/// Message types supported by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// New cast (post or reply)
    CastAdd,
    /// Removal of a previously stored cast
    CastRemove,
    /// Profile attribute update
    UserDataAdd,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::CastAdd => "cast_add",
                Self::CastRemove => "cast_remove",
                Self::UserDataAdd => "user_data_add",
            }
        )
    }
}

/// Profile attribute kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserDataType {
    DisplayName,
    Bio,
    Pfp,
    Url,
}

impl UserDataType {
    /// All attribute kinds, in the order the generator emits them
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::DisplayName, Self::Bio, Self::Pfp, Self::Url].into_iter()
    }
}

impl fmt::Display for UserDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::DisplayName => "display_name",
                Self::Bio => "bio",
                Self::Pfp => "pfp",
                Self::Url => "url",
            }
        )
    }
}

/// Variant payload of a message, keyed by message type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageData {
    CastAdd {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        parent: Option<CastId>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        mentions: Vec<Fid>,
    },
    CastRemove {
        target_hash: MessageHash,
    },
    UserDataAdd {
        data_type: UserDataType,
        value: String,
    },
}

impl MessageData {
    /// The message type this payload corresponds to
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::CastAdd { .. } => MessageType::CastAdd,
            Self::CastRemove { .. } => MessageType::CastRemove,
            Self::UserDataAdd { .. } => MessageType::UserDataAdd,
        }
    }
}

/// A content-addressed record.
///
/// The hash is computed over the serialized (fid, timestamp, data) tuple
/// and is immutable once the message is stored. Signature and signer are
/// simulated bytes; the simulator never verifies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Owning identity
    pub fid: Fid,
    /// Seconds since the Farcaster epoch
    pub timestamp: u32,
    /// Variant payload
    pub data: MessageData,
    /// Content digest, the primary key
    pub hash: MessageHash,
    /// Simulated signature bytes
    pub signature: Vec<u8>,
    /// Simulated signer public key bytes
    pub signer: Vec<u8>,
}

impl Message {
    /// The message type, derived from the payload
    #[inline]
    pub fn message_type(&self) -> MessageType {
        self.data.message_type()
    }

    /// The parent CastId if this is a reply cast
    pub fn parent(&self) -> Option<CastId> {
        match &self.data {
            MessageData::CastAdd { parent, .. } => *parent,
            _ => None,
        }
    }

    /// Whether this is a cast (CastAdd) message
    #[inline]
    pub fn is_cast(&self) -> bool {
        self.message_type() == MessageType::CastAdd
    }
}

/// Hub event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubEventType {
    MergeMessage,
    PruneMessage,
    RevokeMessage,
}

impl fmt::Display for HubEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::MergeMessage => "merge_message",
                Self::PruneMessage => "prune_message",
                Self::RevokeMessage => "revoke_message",
            }
        )
    }
}

/// An append-only notification that the store changed.
///
/// An id of 0 means "not yet assigned"; the event store assigns the next
/// sequence number at append time. Events are immutable and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubEvent {
    pub id: u64,
    pub event_type: HubEventType,
    pub message: Message,
}

impl HubEvent {
    /// Create a merge event with an unassigned id
    pub fn merge(message: Message) -> Self {
        Self { id: 0, event_type: HubEventType::MergeMessage, message }
    }
}
