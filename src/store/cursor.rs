//! Opaque pagination cursors.
//!
//! A page token encodes the `(timestamp, hash)` sort key of the last item
//! returned on the previous page. Tokens are hex so they survive any
//! transport untouched; callers must treat them as opaque.
use crate::core::types::MessageHash;

/// Sort key of a message for pagination: timestamp first, hash as tie-break.
///
/// The hash tie-break is mandatory. Timestamps are seconds and collide
/// constantly at generation scale, and the backing maps have no inherent
/// order, so `(timestamp, hash)` is the only total order available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageKey {
    pub timestamp: u32,
    pub hash: MessageHash,
}

impl PageKey {
    pub fn new(timestamp: u32, hash: MessageHash) -> Self {
        Self { timestamp, hash }
    }

    /// Encode as an opaque token: 4-byte big-endian timestamp, then the hash
    pub fn encode(&self) -> String {
        let mut bytes = Vec::with_capacity(4 + MessageHash::LEN);
        bytes.extend_from_slice(&self.timestamp.to_be_bytes());
        bytes.extend_from_slice(self.hash.as_bytes());
        hex::encode(bytes)
    }

    /// Decode a token; None for anything malformed
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = hex::decode(token).ok()?;
        if bytes.len() != 4 + MessageHash::LEN {
            return None;
        }
        let timestamp = u32::from_be_bytes(bytes[0..4].try_into().ok()?);
        let hash = MessageHash::from_slice(&bytes[4..])?;
        Some(Self { timestamp, hash })
    }
}

/// Paginated query parameters shared by the cast queries
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Maximum items per page; 0 yields an empty page
    pub page_size: usize,
    /// Cursor from a previous response, if resuming
    pub page_token: Option<String>,
    /// Walk the sort order newest-first instead of oldest-first
    pub reverse: bool,
}

/// Default page size when a caller passes none
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Hard cap on page size
pub const MAX_PAGE_SIZE: usize = 1000;

impl PageRequest {
    /// First page with the given size
    pub fn with_size(page_size: usize) -> Self {
        Self { page_size, page_token: None, reverse: false }
    }

    /// First page with the default size
    pub fn default_size() -> Self {
        Self::with_size(DEFAULT_PAGE_SIZE)
    }

    /// Resume from a previous response's token
    pub fn after(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Reverse the sort order
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Effective page size, clamped to the hard cap
    pub fn effective_size(&self) -> usize {
        self.page_size.min(MAX_PAGE_SIZE)
    }
}
