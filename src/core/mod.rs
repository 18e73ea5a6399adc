//! Core domain model: identities, content-addressed messages, hub events
pub mod types;
pub mod util;

pub use types::{
    CastId, FARCASTER_EPOCH, Fid, HubEvent, HubEventType, MAX_CAST_TEXT_BYTES, Message,
    MessageData, MessageHash, MessageType, UserDataType,
};
pub use util::{
    calculate_message_hash, derive_fake_signer, fake_signature, from_farcaster_time,
    get_farcaster_time, to_farcaster_time,
};
