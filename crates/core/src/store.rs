//! Conversation store trait — per-user dialogue state keyed by user id.
//!
//! Every operation is atomic with respect to concurrent calls for the same
//! key. Implementations decide where state lives; the orchestrator only
//! relies on this contract, so a persistent backend can replace the
//! in-memory one without touching turn logic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::message::{ConversationState, Message};

/// Result of [`ConversationStore::get_or_create`].
#[derive(Debug, Clone)]
pub struct Session {
    /// Snapshot of the state after the call
    pub state: ConversationState,
    /// Whether this call inserted the entry
    pub created: bool,
}

/// Lightweight view of an entry, handed to eviction policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub message_count: usize,
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Return the existing entry or insert an empty one.
    async fn get_or_create(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, StoreError>;

    /// Overwrite the selected kit, creating the entry if absent.
    /// Messages are left untouched.
    async fn set_kit(
        &self,
        user_id: &str,
        kit_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Append to the log (creating the entry if absent) and return the new
    /// log length.
    async fn append(&self, user_id: &str, message: Message) -> Result<usize, StoreError>;

    /// Replace the log with an empty one, keeping the kit. Unknown users are
    /// a no-op.
    async fn clear(&self, user_id: &str, now: DateTime<Utc>) -> Result<(), StoreError>;

    /// Snapshot of an entry, if present.
    async fn get(&self, user_id: &str) -> Result<Option<ConversationState>, StoreError>;

    /// Number of live entries.
    async fn session_count(&self) -> Result<usize, StoreError>;

    /// Apply an eviction policy and return the evicted user ids.
    async fn evict(
        &self,
        policy: &dyn EvictionPolicy,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, StoreError>;
}

/// Decides which entries to drop. Companion to the store, not part of the
/// turn contract: with no policy installed, entries live for the process
/// lifetime.
pub trait EvictionPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// User ids to evict from `sessions`.
    fn select(&self, sessions: &[SessionInfo], now: DateTime<Utc>) -> Vec<String>;
}
