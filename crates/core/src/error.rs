//! Error types for the Solstis domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each collaborator has
//! its own error enum; all of them collapse into [`Error::Upstream`] at the
//! orchestrator boundary so no collaborator type leaks to callers.

use thiserror::Error;

/// The caller-visible error type for conversation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field was missing or empty. Raised before any state
    /// mutation or upstream call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A collaborator (LLM, speech service, store backend) failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Detail carried by [`Error::Upstream`].
#[derive(Debug, Clone, Error)]
#[error("{service} failed: {detail}")]
pub struct UpstreamError {
    /// Which collaborator failed ("llm", "tts", "transcription", "store").
    pub service: String,
    /// HTTP status reported by the collaborator, when there was one.
    pub status_code: Option<u16>,
    /// Human-readable detail suitable for logging.
    pub detail: String,
}

impl UpstreamError {
    pub fn new(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            status_code: None,
            detail: detail.into(),
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// The HTTP status associated with this failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } => Some(*status_code),
            Self::RateLimited { .. } => Some(429),
            Self::AuthenticationFailed(_) => Some(401),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    #[error("Speech API error: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Speech service not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Kit not found: {0}")]
    NotFound(String),

    #[error("Duplicate kit id: {0}")]
    DuplicateId(String),

    #[error("Kit catalog is empty")]
    Empty,

    #[error("Invalid item in kit {kit_id}: {reason}")]
    InvalidItem { kit_id: String, reason: String },

    #[error("Failed to read kit file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse kit file {path}: {reason}")]
    Parse { path: String, reason: String },
}

// --- Boundary translation ---

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        let mut upstream = UpstreamError::new("llm", err.to_string());
        upstream.status_code = err.status_code();
        Error::Upstream(upstream)
    }
}

impl From<SpeechError> for Error {
    fn from(err: SpeechError) -> Self {
        match &err {
            SpeechError::InvalidAudio(_) => Error::InvalidInput(err.to_string()),
            SpeechError::ApiError { status_code, .. } => Error::Upstream(
                UpstreamError::new("speech", err.to_string()).with_status(*status_code),
            ),
            _ => Error::Upstream(UpstreamError::new("speech", err.to_string())),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Upstream(UpstreamError::new("store", err.to_string()))
    }
}
