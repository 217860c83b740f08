//! HTTP API — the routes the Solstis web and voice clients call.
//!
//! Endpoints:
//!
//! - `GET  /api/kits`             — Full kit catalog
//! - `POST /api/setup`            — Select a kit and start a conversation
//! - `POST /api/chat`             — One turn: utterance in, reply out
//! - `POST /api/clear`            — Clear a user's conversation
//! - `GET  /api/history/{user}`   — Conversation snapshot
//! - `POST /api/tts`              — Synthesize speech (audio/mpeg)
//! - `POST /api/transcribe`       — Transcribe base64 audio
//! - `GET  /api/tts-test`         — Speech configuration status
//! - `GET  /api/health`           — Liveness

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use solstis_agent::TurnOrchestrator;
use solstis_config::SpeechConfig;
use solstis_core::error::{Error, SpeechError};
use solstis_core::speech::{AudioClip, SpeechSynthesizer, Transcriber};
use solstis_core::{KitDefinition, Message};
use solstis_providers::Collaborators;

// ── State ─────────────────────────────────────────────────────────────────

pub struct ApiState {
    pub orchestrator: Arc<TurnOrchestrator>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    /// Reported by `/api/tts-test`; never the key itself
    pub speech: SpeechStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechStatus {
    pub elevenlabs_configured: bool,
    pub voice_id: String,
    pub api_key_length: usize,
}

impl SpeechStatus {
    pub fn from_config(speech: &SpeechConfig) -> Self {
        let key_len = speech.elevenlabs_api_key.as_ref().map_or(0, |k| k.len());
        Self {
            elevenlabs_configured: key_len > 0,
            voice_id: speech.voice_id.clone(),
            api_key_length: key_len,
        }
    }
}

impl ApiState {
    pub fn new(
        orchestrator: Arc<TurnOrchestrator>,
        collaborators: &Collaborators,
        speech: &SpeechConfig,
    ) -> Self {
        Self {
            orchestrator,
            synthesizer: collaborators.synthesizer.clone(),
            transcriber: collaborators.transcriber.clone(),
            speech: SpeechStatus::from_config(speech),
        }
    }
}

pub type SharedApiState = Arc<ApiState>;

pub fn api_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/api/kits", get(kits_handler))
        .route("/api/setup", post(setup_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/clear", post(clear_handler))
        .route("/api/history/{user}", get(history_handler))
        .route("/api/tts", post(tts_handler))
        .route("/api/transcribe", post(transcribe_handler))
        .route("/api/tts-test", get(tts_test_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SetupRequest {
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    kit_type: Option<String>,
}

#[derive(Serialize)]
struct SetupResponse {
    status: &'static str,
    kit_recognized: bool,
    greeting: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    user_input: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    kit_type: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    status: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct ClearRequest {
    #[serde(default)]
    user_name: Option<String>,
}

#[derive(Serialize)]
struct ClearResponse {
    status: &'static str,
    greeting: String,
}

#[derive(Serialize)]
struct HistoryResponse {
    user_name: String,
    kit_id: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct TtsRequest {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct TranscribeRequest {
    #[serde(default)]
    audio_base64: String,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Serialize)]
struct TranscribeResponse {
    transcript: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// `InvalidInput` → 400 with the reason; `Upstream` → 502 with `summary`
/// and the upstream detail.
fn error_response(err: Error, summary: &str) -> ApiError {
    match err {
        Error::InvalidInput(reason) => (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(reason))),
        Error::Upstream(upstream) => {
            error!(
                service = %upstream.service,
                status = ?upstream.status_code,
                detail = %upstream.detail,
                "{summary}"
            );
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: summary.into(),
                    details: Some(upstream.to_string()),
                }),
            )
        }
    }
}

fn speech_error_response(err: SpeechError, summary: &str) -> ApiError {
    match err {
        SpeechError::NotConfigured(service) => not_configured(&service),
        other => error_response(other.into(), summary),
    }
}

fn not_configured(service: &str) -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new(format!("{service} is not configured"))),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn kits_handler(State(state): State<SharedApiState>) -> Json<Vec<KitDefinition>> {
    Json(state.orchestrator.kits().to_vec())
}

async fn setup_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<SetupRequest>,
) -> Result<Json<SetupResponse>, ApiError> {
    let (Some(user_name), Some(kit_type)) = (payload.user_name, payload.kit_type) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing user_name or kit_type")),
        ));
    };

    let outcome = state
        .orchestrator
        .setup(&user_name, &kit_type)
        .await
        .map_err(|e| error_response(e, "Failed to set up conversation"))?;

    Ok(Json(SetupResponse {
        status: "success",
        kit_recognized: outcome.kit_recognized(),
        greeting: outcome.greeting,
    }))
}

async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let user_name = payload.user_name.unwrap_or_default();
    let user_input = payload.user_input.unwrap_or_default();
    info!(user = %user_name, chars = user_input.len(), "Chat request");

    let response = state
        .orchestrator
        .handle_turn(&user_name, payload.kit_type.as_deref(), &user_input)
        .await
        .map_err(|e| error_response(e, "Failed to get response"))?;

    Ok(Json(ChatResponse {
        response,
        status: "success",
    }))
}

/// The web client posts with no body at all, so an empty or unreadable
/// body clears nothing and still succeeds.
async fn clear_handler(
    State(state): State<SharedApiState>,
    body: Bytes,
) -> Result<Json<ClearResponse>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ClearRequest::default()
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring malformed clear request body");
            ClearRequest::default()
        })
    };

    let user_name = request.user_name.unwrap_or_default();
    let greeting = state
        .orchestrator
        .reset(&user_name)
        .await
        .map_err(|e| error_response(e, "Failed to clear conversation"))?;

    Ok(Json(ClearResponse {
        status: "success",
        greeting,
    }))
}

async fn history_handler(
    State(state): State<SharedApiState>,
    Path(user): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let conversation = state
        .orchestrator
        .history(&user)
        .await
        .map_err(|e| error_response(e, "Failed to load conversation"))?;

    match conversation {
        Some(conversation) => Ok(Json(HistoryResponse {
            user_name: user,
            kit_id: conversation.kit_id,
            messages: conversation.messages,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("No conversation for {user}"))),
        )),
    }
}

async fn tts_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<TtsRequest>,
) -> Result<Response, ApiError> {
    if payload.text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new("No text provided"))));
    }
    let Some(synthesizer) = &state.synthesizer else {
        return Err(not_configured("Text-to-speech"));
    };

    let clip = synthesizer
        .synthesize(&payload.text)
        .await
        .map_err(|e| speech_error_response(e, "Failed to synthesize speech"))?;

    info!(bytes = clip.bytes.len(), voice = synthesizer.voice_id(), "Speech synthesized");
    Ok(([(header::CONTENT_TYPE, clip.mime_type)], clip.bytes).into_response())
}

async fn transcribe_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<TranscribeRequest>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let Some(transcriber) = &state.transcriber else {
        return Err(not_configured("Transcription"));
    };

    // Browsers hand over data URLs; accept either form
    let encoded = match payload.audio_base64.split_once(";base64,") {
        Some((_, data)) => data,
        None => payload.audio_base64.as_str(),
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Invalid base64 audio: {e}"))),
            )
        })?;

    let mime_type = payload.mime_type.unwrap_or_else(|| "audio/webm".into());
    let transcript = transcriber
        .transcribe(AudioClip::new(bytes, mime_type))
        .await
        .map_err(|e| speech_error_response(e, "Failed to transcribe audio"))?;

    info!(chars = transcript.len(), "Audio transcribed");
    Ok(Json(TranscribeResponse { transcript }))
}

async fn tts_test_handler(State(state): State<SharedApiState>) -> Json<SpeechStatus> {
    Json(state.speech.clone())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
