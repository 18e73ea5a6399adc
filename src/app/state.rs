//! Application state management
use crate::{
    app::{AppError, Result},
    config::Config,
    core::types::{HubEvent, MAX_CAST_TEXT_BYTES, Message, MessageData, MessageType},
    metrics,
    store::{EventStore, MessageStore},
};
use std::sync::Arc;

/// Shared application state: the message store and the event log.
///
/// Both the workload generator and any external submitter write through
/// this state so that every successful insert is paired with a
/// MergeMessage event.
pub struct AppState {
    pub messages: Arc<MessageStore>,
    pub events: Arc<EventStore>,
}

impl AppState {
    /// Create state with empty stores
    pub fn new() -> Self {
        Self { messages: Arc::new(MessageStore::new()), events: Arc::new(EventStore::new()) }
    }

    /// Insert a message and append the paired MergeMessage event.
    ///
    /// This is the generator's write path; it performs no precondition
    /// checks because the generator only produces fresh, well-formed
    /// records.
    pub fn merge_message(&self, message: Message) -> Result<HubEvent> {
        let stored = self.messages.insert(message)?;
        let event = self.events.append(HubEvent::merge(stored));

        metrics::count_messages_merged(1);
        metrics::count_events_appended(1);

        Ok(event)
    }

    /// Submission path for externally constructed messages.
    ///
    /// Checks the preconditions an RPC front-end relies on before merging:
    /// store-once by hash, reply parents must exist and be casts, and a
    /// CastRemove must target an existing cast of the same FID. The store
    /// itself stays validation-free.
    pub fn submit_message(&self, message: Message) -> Result<HubEvent> {
        if self.messages.get_by_hash(&message.hash).is_some() {
            return Err(AppError::Duplicate(message.hash));
        }

        match &message.data {
            MessageData::CastAdd { text, parent, .. } => {
                if text.len() > MAX_CAST_TEXT_BYTES {
                    return Err(AppError::InvalidSubmission(format!(
                        "cast text is {} bytes, limit is {}",
                        text.len(),
                        MAX_CAST_TEXT_BYTES
                    )));
                }
                if let Some(parent_id) = parent {
                    match self.messages.get_by_hash(&parent_id.hash) {
                        Some(parent) if parent.message_type() == MessageType::CastAdd => {
                            if parent.fid != parent_id.fid {
                                return Err(AppError::InvalidSubmission(format!(
                                    "parent {} is not owned by fid {}",
                                    parent_id.hash, parent_id.fid
                                )));
                            }
                        },
                        Some(_) => {
                            return Err(AppError::InvalidSubmission(format!(
                                "parent {} is not a cast",
                                parent_id.hash
                            )));
                        },
                        None => {
                            return Err(AppError::InvalidSubmission(format!(
                                "parent {} not found",
                                parent_id.hash
                            )));
                        },
                    }
                }
            },
            MessageData::CastRemove { target_hash } => {
                match self.messages.get_by_hash(target_hash) {
                    Some(target) if target.message_type() == MessageType::CastAdd => {
                        if target.fid != message.fid {
                            return Err(AppError::InvalidSubmission(format!(
                                "remove target {} belongs to another fid",
                                target_hash
                            )));
                        }
                    },
                    Some(_) => {
                        return Err(AppError::InvalidSubmission(format!(
                            "remove target {} is not a cast",
                            target_hash
                        )));
                    },
                    None => {
                        return Err(AppError::InvalidSubmission(format!(
                            "remove target {} not found",
                            target_hash
                        )));
                    },
                }
            },
            _ => {},
        }

        self.merge_message(message)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// State provider that initializes application components
pub struct StateProvider {
    config: Config,
}

impl StateProvider {
    /// Create a new state provider
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config: config.clone() })
    }

    /// Initialize and provide the application state
    pub fn provide(&self) -> Result<Arc<AppState>> {
        metrics::setup_metrics(&self.config);
        Ok(Arc::new(AppState::new()))
    }
}
