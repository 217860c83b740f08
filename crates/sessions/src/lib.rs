//! Conversation store implementations for Solstis.

pub mod eviction;
pub mod in_memory;

pub use eviction::{AnyOf, IdleTtl, MaxSessions, NeverEvict, policy_from_config};
pub use in_memory::InMemoryStore;
