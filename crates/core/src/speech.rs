//! Speech collaborators — transcription in, synthesis out.
//!
//! Pure pass-through seams: no conversation logic lives behind them.

use async_trait::async_trait;

use crate::error::SpeechError;

/// Encoded audio plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// File extension to advertise to services that sniff by file name.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/ogg" => "ogg",
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
            _ => "webm",
        }
    }
}

/// Speech-to-text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;

    async fn transcribe(&self, audio: AudioClip) -> Result<String, SpeechError>;
}

/// Text-to-speech.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    /// Voice the synthesizer speaks with.
    fn voice_id(&self) -> &str;

    async fn synthesize(&self, text: &str) -> Result<AudioClip, SpeechError>;
}
