//! Eviction policies — which conversations to drop, and when.
//!
//! Nothing is evicted unless a policy is configured in `[sessions]`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use solstis_config::SessionsConfig;
use solstis_core::store::{EvictionPolicy, SessionInfo};

/// Keep everything until the process exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn name(&self) -> &str {
        "never"
    }

    fn select(&self, _sessions: &[SessionInfo], _now: DateTime<Utc>) -> Vec<String> {
        Vec::new()
    }
}

/// Drop conversations idle for longer than `ttl`.
#[derive(Debug, Clone, Copy)]
pub struct IdleTtl {
    ttl: Duration,
}

impl IdleTtl {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }
}

impl EvictionPolicy for IdleTtl {
    fn name(&self) -> &str {
        "idle_ttl"
    }

    fn select(&self, sessions: &[SessionInfo], now: DateTime<Utc>) -> Vec<String> {
        sessions
            .iter()
            .filter(|s| {
                (now - s.last_active)
                    .to_std()
                    .is_ok_and(|idle| idle > self.ttl)
            })
            .map(|s| s.user_id.clone())
            .collect()
    }
}

/// Keep at most `max` conversations, dropping the least recently active.
#[derive(Debug, Clone, Copy)]
pub struct MaxSessions {
    max: usize,
}

impl MaxSessions {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl EvictionPolicy for MaxSessions {
    fn name(&self) -> &str {
        "max_sessions"
    }

    fn select(&self, sessions: &[SessionInfo], _now: DateTime<Utc>) -> Vec<String> {
        if sessions.len() <= self.max {
            return Vec::new();
        }
        let mut by_activity: Vec<&SessionInfo> = sessions.iter().collect();
        by_activity.sort_by_key(|s| (s.last_active, s.created_at));
        by_activity
            .into_iter()
            .take(sessions.len() - self.max)
            .map(|s| s.user_id.clone())
            .collect()
    }
}

/// Evict anything selected by any of the inner policies.
pub struct AnyOf {
    policies: Vec<Arc<dyn EvictionPolicy>>,
}

impl AnyOf {
    pub fn new(policies: Vec<Arc<dyn EvictionPolicy>>) -> Self {
        Self { policies }
    }
}

impl EvictionPolicy for AnyOf {
    fn name(&self) -> &str {
        "any_of"
    }

    fn select(&self, sessions: &[SessionInfo], now: DateTime<Utc>) -> Vec<String> {
        let mut seen = HashSet::new();
        self.policies
            .iter()
            .flat_map(|p| p.select(sessions, now))
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }
}

/// Build the policy described by `[sessions]`, or `None` when retention is
/// unbounded.
pub fn policy_from_config(config: &SessionsConfig) -> Option<Arc<dyn EvictionPolicy>> {
    let mut policies: Vec<Arc<dyn EvictionPolicy>> = Vec::new();
    if let Some(secs) = config.idle_ttl_secs {
        policies.push(Arc::new(IdleTtl::new(Duration::from_secs(secs))));
    }
    if let Some(max) = config.max_sessions {
        policies.push(Arc::new(MaxSessions::new(max)));
    }

    match policies.len() {
        0 => None,
        1 => policies.pop(),
        _ => Some(Arc::new(AnyOf::new(policies))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn info(user_id: &str, last_active: i64) -> SessionInfo {
        SessionInfo {
            user_id: user_id.into(),
            created_at: at(0),
            last_active: at(last_active),
            message_count: 0,
        }
    }

    #[test]
    fn idle_ttl_selects_only_expired() {
        let policy = IdleTtl::new(Duration::from_secs(60));
        let sessions = [info("old", 0), info("edge", 40), info("new", 90)];
        assert_eq!(policy.select(&sessions, at(100)), vec!["old".to_string()]);
    }

    #[test]
    fn max_sessions_drops_least_recent_first() {
        let policy = MaxSessions::new(2);
        let sessions = [info("b", 20), info("a", 10), info("c", 30), info("d", 5)];
        assert_eq!(
            policy.select(&sessions, at(100)),
            vec!["d".to_string(), "a".to_string()]
        );
        assert!(policy.select(&sessions[..2], at(100)).is_empty());
    }

    #[test]
    fn any_of_unions_without_duplicates() {
        let policy = AnyOf::new(vec![
            Arc::new(IdleTtl::new(Duration::from_secs(50))),
            Arc::new(MaxSessions::new(1)),
        ]);
        let sessions = [info("old", 0), info("new", 90)];
        assert_eq!(policy.select(&sessions, at(100)), vec!["old".to_string()]);
    }

    #[test]
    fn config_without_limits_has_no_policy() {
        assert!(policy_from_config(&SessionsConfig::default()).is_none());

        let config = SessionsConfig {
            max_sessions: Some(100),
            idle_ttl_secs: Some(3600),
            ..SessionsConfig::default()
        };
        let policy = policy_from_config(&config).unwrap();
        assert_eq!(policy.name(), "any_of");
    }
}
