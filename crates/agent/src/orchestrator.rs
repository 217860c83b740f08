//! Turn Orchestrator — one user utterance in, one assistant reply out.
//!
//! Turns, setups and resets for a user run under that user's turn lock, so
//! they never interleave. A failed or timed-out LLM call leaves the log as
//! it was right after the user message was appended; the caller may retry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use solstis_catalog::KitCatalog;
use solstis_config::AppConfig;
use solstis_core::error::{Error, ProviderError, Result};
use solstis_core::provider::{Provider, ProviderRequest};
use solstis_core::store::{ConversationStore, EvictionPolicy, SessionInfo};
use solstis_core::{Clock, ConversationState, KitDefinition, Message, SystemClock};
use tokio::sync::Mutex as TurnMutex;
use tracing::{debug, info, warn};

use crate::prompt::PromptComposer;

/// Outcome of [`TurnOrchestrator::setup`].
#[derive(Debug, Clone)]
pub struct SetupOutcome {
    /// The selected kit, if the catalog knows it
    pub kit: Option<KitDefinition>,
    pub greeting: String,
}

impl SetupOutcome {
    pub fn kit_recognized(&self) -> bool {
        self.kit.is_some()
    }
}

type TurnLocks = std::sync::Mutex<HashMap<String, Arc<TurnMutex<()>>>>;

pub struct TurnOrchestrator {
    store: Arc<dyn ConversationStore>,
    composer: PromptComposer,
    provider: Arc<dyn Provider>,
    clock: Arc<dyn Clock>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    window: usize,
    llm_timeout: Duration,
    eviction: Option<Arc<dyn EvictionPolicy>>,
    turn_locks: TurnLocks,
}

impl TurnOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        catalog: Arc<KitCatalog>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self {
            store,
            composer: PromptComposer::new(catalog),
            provider,
            clock: Arc::new(SystemClock),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            max_tokens: 500,
            window: 10,
            llm_timeout: Duration::from_secs(30),
            eviction: None,
            turn_locks: TurnLocks::default(),
        }
    }

    /// Apply the `[llm]`, `[conversation]` and `[sessions]` settings.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn ConversationStore>,
        catalog: Arc<KitCatalog>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        let mut orchestrator = Self::new(store, catalog, provider)
            .with_model(&config.llm.model)
            .with_temperature(config.llm.temperature)
            .with_max_tokens(config.llm.max_tokens)
            .with_timeout(Duration::from_secs(config.llm.timeout_secs))
            .with_window(config.conversation.window_size)
            .with_default_kit(&config.conversation.default_kit);
        if let Some(policy) = solstis_sessions::policy_from_config(&config.sessions) {
            orchestrator = orchestrator.with_eviction(policy);
        }
        orchestrator
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Number of trailing logged messages sent with each turn (at least 1).
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_default_kit(mut self, kit_id: impl Into<String>) -> Self {
        self.composer = self.composer.with_default_kit(kit_id);
        self
    }

    pub fn with_eviction(mut self, policy: Arc<dyn EvictionPolicy>) -> Self {
        self.eviction = Some(policy);
        self
    }

    pub fn kits(&self) -> &[KitDefinition] {
        self.composer.catalog().list()
    }

    /// Run one turn and return the assistant reply.
    pub async fn handle_turn(
        &self,
        user_id: &str,
        kit_id_hint: Option<&str>,
        utterance: &str,
    ) -> Result<String> {
        require("user_name", user_id)?;
        require("user_input", utterance)?;

        let lock = self.turn_lock(user_id);
        let result = {
            let _turn = lock.lock().await;
            self.run_turn(user_id, kit_id_hint, utterance).await
        };
        drop(lock);
        self.release_turn_lock(user_id);
        result
    }

    async fn run_turn(
        &self,
        user_id: &str,
        kit_id_hint: Option<&str>,
        utterance: &str,
    ) -> Result<String> {
        let now = self.clock.now();
        let session = self.store.get_or_create(user_id, now).await?;

        let kit_id = if session.created {
            let kit = kit_id_hint
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .unwrap_or(self.composer.default_kit())
                .to_string();
            self.store.set_kit(user_id, &kit, now).await?;
            debug!(user = %user_id, kit = %kit, "New conversation");
            self.evict_after_create(now).await;
            Some(kit)
        } else {
            session.state.kit_id
        };

        let user_message = Message::user(utterance, now);
        let logged = self.store.append(user_id, user_message.clone()).await?;

        let history = match self.store.get(user_id).await? {
            Some(state) => state.messages,
            None => vec![user_message],
        };
        let window = ConversationState::window_of(&history, self.window);

        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.push(Message::system(self.composer.compose(kit_id.as_deref()), now));
        messages.extend_from_slice(window);

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        };

        debug!(
            user = %user_id,
            logged,
            window = window.len(),
            provider = self.provider.name(),
            "Calling LLM"
        );

        let response =
            match tokio::time::timeout(self.llm_timeout, self.provider.complete(request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(user = %user_id, error = %e, "LLM call failed");
                    return Err(e.into());
                }
                Err(_) => {
                    warn!(
                        user = %user_id,
                        timeout_secs = self.llm_timeout.as_secs(),
                        "LLM call timed out"
                    );
                    return Err(ProviderError::Timeout(self.llm_timeout.as_secs()).into());
                }
            };

        let reply = response.content;
        let total = self
            .store
            .append(user_id, Message::assistant(reply.clone(), self.clock.now()))
            .await?;

        info!(
            user = %user_id,
            kit = kit_id.as_deref().unwrap_or("-"),
            messages = total,
            "Turn complete"
        );
        Ok(reply)
    }

    /// Start a fresh conversation with `kit_id`.
    ///
    /// Unknown kit ids are stored as given; the composer falls back to
    /// generic instructions for them and [`SetupOutcome::kit`] is `None`.
    pub async fn setup(&self, user_id: &str, kit_id: &str) -> Result<SetupOutcome> {
        require("user_name", user_id)?;
        require("kit_type", kit_id)?;
        let kit_id = kit_id.trim();

        let lock = self.turn_lock(user_id);
        let result = {
            let _turn = lock.lock().await;
            self.run_setup(user_id, kit_id).await
        };
        drop(lock);
        self.release_turn_lock(user_id);
        result
    }

    async fn run_setup(&self, user_id: &str, kit_id: &str) -> Result<SetupOutcome> {
        let now = self.clock.now();
        let session = self.store.get_or_create(user_id, now).await?;
        self.store.set_kit(user_id, kit_id, now).await?;
        self.store.clear(user_id, now).await?;
        if session.created {
            self.evict_after_create(now).await;
        }

        let kit = self.composer.catalog().lookup(kit_id).ok().cloned();
        if kit.is_none() {
            warn!(
                user = %user_id,
                kit = %kit_id,
                "Setup with unknown kit; using generic instructions"
            );
        }
        info!(user = %user_id, kit = %kit_id, "Conversation set up");

        Ok(SetupOutcome {
            kit,
            greeting: self.composer.greeting(user_id, Some(kit_id)),
        })
    }

    /// Clear a user's log, keeping the kit, and return a fresh greeting.
    /// Always succeeds for unknown users.
    pub async fn reset(&self, user_id: &str) -> Result<String> {
        let lock = self.turn_lock(user_id);
        let result = {
            let _turn = lock.lock().await;
            self.run_reset(user_id).await
        };
        drop(lock);
        self.release_turn_lock(user_id);
        result
    }

    async fn run_reset(&self, user_id: &str) -> Result<String> {
        let kit_id = match self.store.get(user_id).await? {
            Some(state) => {
                self.store.clear(user_id, self.clock.now()).await?;
                info!(user = %user_id, "Conversation cleared");
                state.kit_id
            }
            None => None,
        };
        Ok(self.composer.greeting(user_id, kit_id.as_deref()))
    }

    /// Snapshot of a user's conversation.
    pub async fn history(&self, user_id: &str) -> Result<Option<ConversationState>> {
        Ok(self.store.get(user_id).await?)
    }

    /// Apply the configured eviction policy now. Users with a turn in
    /// progress are never evicted.
    pub async fn sweep(&self) -> Result<Vec<String>> {
        let Some(policy) = &self.eviction else {
            return Ok(Vec::new());
        };
        let guarded = SparingBusy {
            inner: policy.as_ref(),
            busy: self.busy_users(),
        };
        let evicted = self.store.evict(&guarded, self.clock.now()).await?;
        if !evicted.is_empty() {
            info!(count = evicted.len(), policy = policy.name(), "Evicted idle conversations");
        }
        Ok(evicted)
    }

    async fn evict_after_create(&self, now: DateTime<Utc>) {
        let Some(policy) = &self.eviction else {
            return;
        };
        let guarded = SparingBusy {
            inner: policy.as_ref(),
            busy: self.busy_users(),
        };
        if let Err(e) = self.store.evict(&guarded, now).await {
            warn!(error = %e, "Eviction failed");
        }
    }

    fn locks(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<TurnMutex<()>>>> {
        self.turn_locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn turn_lock(&self, user_id: &str) -> Arc<TurnMutex<()>> {
        self.locks().entry(user_id.to_string()).or_default().clone()
    }

    /// Drop the lock entry once nobody holds or waits on it.
    fn release_turn_lock(&self, user_id: &str) {
        let mut locks = self.locks();
        if locks.get(user_id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(user_id);
        }
    }

    fn busy_users(&self) -> HashSet<String> {
        self.locks()
            .iter()
            .filter(|(_, lock)| Arc::strong_count(lock) > 1)
            .map(|(user, _)| user.clone())
            .collect()
    }
}

/// Wraps a policy so users mid-turn are left alone.
struct SparingBusy<'a> {
    inner: &'a dyn EvictionPolicy,
    busy: HashSet<String>,
}

impl EvictionPolicy for SparingBusy<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn select(&self, sessions: &[SessionInfo], now: DateTime<Utc>) -> Vec<String> {
        self.inner
            .select(sessions, now)
            .into_iter()
            .filter(|user| !self.busy.contains(user))
            .collect()
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}
