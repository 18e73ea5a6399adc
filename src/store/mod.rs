//! Volatile message and event storage with indexed retrieval
pub mod cursor;
pub mod events;
pub mod messages;

pub use cursor::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageKey, PageRequest};
pub use events::EventStore;
pub use messages::{MessagePage, MessageStore, Result as StoreResult, StoreError};
