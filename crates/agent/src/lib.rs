//! Conversation logic for Solstis.
//!
//! The [`PromptComposer`] turns a kit selection into instruction text; the
//! [`TurnOrchestrator`] runs turns against the conversation store and the
//! LLM collaborator:
//!
//! 1. **Resolve** the user's conversation, defaulting the kit when new
//! 2. **Log** the utterance
//! 3. **Compose** instructions and take the trailing window of history
//! 4. **Ask** the LLM once, with a timeout
//! 5. **Log** and return the reply

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{SetupOutcome, TurnOrchestrator};
pub use prompt::{DEFAULT_KIT_ID, FALLBACK_INSTRUCTION, PromptComposer, render_item};
