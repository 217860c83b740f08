//! In-memory store — per-user conversation state for the process lifetime.
//!
//! The outer map lock only guards the map's shape and is never held across
//! an entry lock acquisition by ordinary operations. Each entry has its own
//! mutex for read-modify-write, so different users never contend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solstis_core::error::StoreError;
use solstis_core::store::{ConversationStore, EvictionPolicy, Session, SessionInfo};
use solstis_core::{ConversationState, Message};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

type Entry = Arc<Mutex<ConversationState>>;

#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn existing(&self, user_id: &str) -> Option<Entry> {
        self.entries.read().await.get(user_id).cloned()
    }

    /// Return the entry for `user_id`, inserting an empty one if needed.
    /// The flag is true when this call inserted it.
    async fn entry(&self, user_id: &str, now: DateTime<Utc>) -> (Entry, bool) {
        if let Some(entry) = self.existing(user_id).await {
            return (entry, false);
        }

        let mut entries = self.entries.write().await;
        // Another caller may have inserted between the read and write locks
        if let Some(entry) = entries.get(user_id) {
            return (entry.clone(), false);
        }
        let entry = Arc::new(Mutex::new(ConversationState::new(now)));
        entries.insert(user_id.to_string(), entry.clone());
        debug!(user = %user_id, "Created conversation");
        (entry, true)
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get_or_create(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let (entry, created) = self.entry(user_id, now).await;
        let mut state = entry.lock().await;
        state.last_active = now;
        Ok(Session {
            state: state.clone(),
            created,
        })
    }

    async fn set_kit(
        &self,
        user_id: &str,
        kit_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let (entry, _) = self.entry(user_id, now).await;
        let mut state = entry.lock().await;
        state.kit_id = Some(kit_id.to_string());
        state.last_active = now;
        Ok(())
    }

    async fn append(&self, user_id: &str, message: Message) -> Result<usize, StoreError> {
        let (entry, _) = self.entry(user_id, message.timestamp).await;
        let mut state = entry.lock().await;
        state.last_active = message.timestamp;
        state.messages.push(message);
        Ok(state.messages.len())
    }

    async fn clear(&self, user_id: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(entry) = self.existing(user_id).await {
            let mut state = entry.lock().await;
            state.messages = Vec::new();
            state.last_active = now;
        }
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<ConversationState>, StoreError> {
        match self.existing(user_id).await {
            Some(entry) => Ok(Some(entry.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn session_count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read().await.len())
    }

    async fn evict(
        &self,
        policy: &dyn EvictionPolicy,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, StoreError> {
        let mut entries = self.entries.write().await;

        let mut infos = Vec::with_capacity(entries.len());
        for (user_id, entry) in entries.iter() {
            let state = entry.lock().await;
            infos.push(SessionInfo {
                user_id: user_id.clone(),
                created_at: state.created_at,
                last_active: state.last_active,
                message_count: state.messages.len(),
            });
        }

        let mut evicted = policy.select(&infos, now);
        evicted.retain(|user_id| entries.remove(user_id).is_some());
        if !evicted.is_empty() {
            debug!(policy = policy.name(), count = evicted.len(), "Evicted conversations");
        }
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::{IdleTtl, NeverEvict};
    use solstis_core::Role;
    use std::time::Duration;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn get_or_create_reports_creation_once() {
        let store = InMemoryStore::new();
        let first = store.get_or_create("alice", at(0)).await.unwrap();
        assert!(first.created);
        assert!(first.state.kit_id.is_none());
        assert!(first.state.messages.is_empty());

        let second = store.get_or_create("alice", at(1)).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.state.last_active, at(1));
        assert_eq!(store.session_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn append_returns_new_length_and_creates() {
        let store = InMemoryStore::new();
        assert_eq!(store.append("bob", Message::user("hi", at(0))).await.unwrap(), 1);
        assert_eq!(
            store.append("bob", Message::assistant("hello", at(1))).await.unwrap(),
            2
        );
        let state = store.get("bob").await.unwrap().unwrap();
        assert_eq!(state.messages[0].role, Role::User);
        assert_eq!(state.messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn set_kit_keeps_messages() {
        let store = InMemoryStore::new();
        store.append("carol", Message::user("hi", at(0))).await.unwrap();
        store.set_kit("carol", "college", at(1)).await.unwrap();
        let state = store.get("carol").await.unwrap().unwrap();
        assert_eq!(state.kit_id.as_deref(), Some("college"));
        assert_eq!(state.messages.len(), 1);
    }

    #[tokio::test]
    async fn clear_keeps_kit_and_ignores_unknown_users() {
        let store = InMemoryStore::new();
        store.set_kit("dana", "oc_vehicle", at(0)).await.unwrap();
        store.append("dana", Message::user("hi", at(1))).await.unwrap();
        store.clear("dana", at(2)).await.unwrap();

        let state = store.get("dana").await.unwrap().unwrap();
        assert!(state.messages.is_empty());
        assert_eq!(state.kit_id.as_deref(), Some("oc_vehicle"));

        store.clear("nobody", at(3)).await.unwrap();
        assert!(store.get("nobody").await.unwrap().is_none());
        assert_eq!(store.session_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_appends_for_one_user_are_not_lost() {
        let store = Arc::new(InMemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append("eve", Message::user(format!("m{i}"), at(i)))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let state = store.get("eve").await.unwrap().unwrap();
        assert_eq!(state.messages.len(), 50);
        assert_eq!(store.session_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn evict_removes_selected_entries() {
        let store = InMemoryStore::new();
        store.get_or_create("stale", at(0)).await.unwrap();
        store.get_or_create("fresh", at(500)).await.unwrap();

        let none = store.evict(&NeverEvict, at(1000)).await.unwrap();
        assert!(none.is_empty());

        let ttl = IdleTtl::new(Duration::from_secs(600));
        let evicted = store.evict(&ttl, at(1000)).await.unwrap();
        assert_eq!(evicted, vec!["stale".to_string()]);
        assert!(store.get("stale").await.unwrap().is_none());
        assert!(store.get("fresh").await.unwrap().is_some());
    }
}
