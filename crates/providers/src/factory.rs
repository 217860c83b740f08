//! Builds the external collaborators from configuration.

use std::sync::Arc;

use solstis_config::AppConfig;
use solstis_core::Provider;
use solstis_core::speech::{SpeechSynthesizer, Transcriber};
use tracing::warn;

use crate::elevenlabs::ElevenLabsSynthesizer;
use crate::openai_compat::OpenAiCompatProvider;
use crate::whisper::WhisperTranscriber;

/// The third-party services a running instance talks to.
///
/// Speech collaborators are `None` when their credentials are missing, so
/// the request layer can report "not configured" instead of failing upstream.
#[derive(Clone)]
pub struct Collaborators {
    pub llm: Arc<dyn Provider>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
}

/// Build every collaborator from configuration.
pub fn build_from_config(config: &AppConfig) -> Collaborators {
    Collaborators {
        llm: build_llm(config),
        synthesizer: build_synthesizer(config),
        transcriber: build_transcriber(config),
    }
}

pub fn build_llm(config: &AppConfig) -> Arc<dyn Provider> {
    let api_key = config.api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        warn!("No LLM API key configured; set OPENAI_API_KEY or api_key in config.toml");
    }
    Arc::new(
        OpenAiCompatProvider::new(&config.llm.provider, &config.llm.base_url, api_key)
            .with_timeout(config.llm.timeout_secs),
    )
}

pub fn build_synthesizer(config: &AppConfig) -> Option<Arc<dyn SpeechSynthesizer>> {
    let speech = &config.speech;
    let api_key = speech.elevenlabs_api_key.as_ref()?;
    Some(Arc::new(
        ElevenLabsSynthesizer::new(api_key, &speech.voice_id)
            .with_base_url(&speech.elevenlabs_base_url)
            .with_model(&speech.tts_model)
            .with_voice_settings(speech.stability, speech.similarity_boost)
            .with_timeout(speech.timeout_secs),
    ))
}

pub fn build_transcriber(config: &AppConfig) -> Option<Arc<dyn Transcriber>> {
    let api_key = config.api_key.as_ref()?;
    Some(Arc::new(
        WhisperTranscriber::new(&config.llm.base_url, api_key)
            .with_model(&config.speech.transcription_model)
            .with_timeout(config.speech.timeout_secs),
    ))
}
