//! Whisper transcription over the OpenAI audio API.

use async_trait::async_trait;
use serde::Deserialize;
use solstis_core::error::SpeechError;
use solstis_core::speech::{AudioClip, Transcriber};
use tracing::{debug, warn};

use crate::openai_compat::http_client;

pub struct WhisperTranscriber {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl WhisperTranscriber {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: "whisper-1".into(),
            client: http_client(60),
        }
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("https://api.openai.com/v1", api_key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = http_client(timeout_secs);
        self
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn transcribe(&self, audio: AudioClip) -> Result<String, SpeechError> {
        if audio.bytes.is_empty() {
            return Err(SpeechError::InvalidAudio("audio is empty".into()));
        }

        let file_name = format!("recording.{}", audio.extension());
        debug!(bytes = audio.bytes.len(), mime = %audio.mime_type, "Requesting transcription");

        let part = reqwest::multipart::Part::bytes(audio.bytes)
            .file_name(file_name)
            .mime_str(&audio.mime_type)
            .map_err(|e| SpeechError::InvalidAudio(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Transcription service returned error");
            return Err(SpeechError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let parsed: TranscriptionResponse =
            response.json().await.map_err(|e| SpeechError::ApiError {
                status_code: 200,
                message: format!("Failed to parse transcription: {e}"),
            })?;
        Ok(parsed.text)
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}
