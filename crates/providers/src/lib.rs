//! Collaborator clients for Solstis.
//!
//! The LLM provider implements `solstis_core::Provider`; the speech clients
//! implement `Transcriber` and `SpeechSynthesizer`. [`build_from_config`]
//! wires them from `AppConfig`.

pub mod elevenlabs;
pub mod factory;
pub mod openai_compat;
pub mod whisper;

#[cfg(test)]
mod test_support;

pub use elevenlabs::ElevenLabsSynthesizer;
pub use factory::{Collaborators, build_from_config};
pub use openai_compat::OpenAiCompatProvider;
pub use whisper::WhisperTranscriber;
