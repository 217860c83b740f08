//! # Solstis Core
//!
//! Domain types, traits, and error definitions for the Solstis first-aid
//! assistant backend. This crate has **no framework dependencies**: it
//! defines the model every other crate implements against.
//!
//! ## Layout
//!
//! - [`kit`] — kit definitions supplied by the catalog
//! - [`message`] — role-tagged messages and per-user conversation state
//! - [`provider`] — the LLM collaborator seam
//! - [`speech`] — transcription and speech-synthesis collaborator seams
//! - [`store`] — the conversation store seam and its eviction companion
//! - [`clock`] — injectable time source for message timestamps

pub mod clock;
pub mod error;
pub mod kit;
pub mod message;
pub mod provider;
pub mod speech;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result, UpstreamError};
pub use kit::{KitDefinition, KitItem};
pub use message::{ConversationState, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use speech::{AudioClip, SpeechSynthesizer, Transcriber};
pub use store::{ConversationStore, EvictionPolicy, Session, SessionInfo};
