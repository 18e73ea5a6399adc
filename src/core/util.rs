use crate::core::types::{FARCASTER_EPOCH, Fid, MessageHash};
use thiserror::Error;

/// Time conversion errors
#[derive(Error, Debug)]
pub enum TimeError {
    #[error("time {0}ms is before the farcaster epoch")]
    BeforeEpoch(u64),

    #[error("system clock error: {0}")]
    Clock(String),
}

/// Convert a unix millisecond timestamp to Farcaster-epoch seconds
pub fn to_farcaster_time(time_ms: u64) -> Result<u32, TimeError> {
    if time_ms < FARCASTER_EPOCH {
        return Err(TimeError::BeforeEpoch(time_ms));
    }
    Ok(((time_ms - FARCASTER_EPOCH) / 1000) as u32)
}

/// Convert Farcaster-epoch seconds back to unix milliseconds
pub fn from_farcaster_time(time: u32) -> u64 {
    (time as u64) * 1000 + FARCASTER_EPOCH
}

/// Current wall-clock time in Farcaster-epoch seconds
pub fn get_farcaster_time() -> Result<u32, TimeError> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| TimeError::Clock(e.to_string()))?;
    to_farcaster_time(now.as_millis() as u64)
}

/// Content digest of serialized message bytes: blake3 truncated to 20 bytes
pub fn calculate_message_hash(data_bytes: &[u8]) -> MessageHash {
    let digest = blake3::hash(data_bytes);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest.as_bytes()[0..20]);
    MessageHash::new(out)
}

/// Simulated signer public key, derived deterministically from the FID
pub fn derive_fake_signer(fid: Fid) -> Vec<u8> {
    let mut input = Vec::with_capacity(14);
    input.extend_from_slice(b"signer");
    input.extend_from_slice(&fid.value().to_be_bytes());
    blake3::hash(&input).as_bytes().to_vec()
}

/// Simulated 64-byte signature over a message hash
pub fn fake_signature(hash: &MessageHash) -> Vec<u8> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"signature");
    hasher.update(hash.as_bytes());
    let mut out = vec![0u8; 64];
    hasher.finalize_xof().fill(&mut out);
    out
}
