//! Configuration loading, validation, and management for Solstis.
//!
//! Loads configuration from `~/.solstis/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM API key (can also come from `OPENAI_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// LLM collaborator settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Turn orchestration settings
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Kit catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Session retention
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Speech collaborators
    #[serde(default)]
    pub speech: SpeechConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("llm", &self.llm)
            .field("conversation", &self.conversation)
            .field("catalog", &self.catalog)
            .field("sessions", &self.sessions)
            .field("gateway", &self.gateway)
            .field("speech", &self.speech)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name used in logs
    #[serde(default = "default_provider")]
    pub provider: String,

    /// OpenAI-compatible base URL
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Reply length bound per turn
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// How long a turn may wait on the provider
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    500
}
fn default_llm_timeout() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_llm_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Trailing messages sent with every turn
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Kit applied when a conversation starts without a selection
    #[serde(default = "default_kit")]
    pub default_kit: String,
}

fn default_window_size() -> usize {
    10
}
fn default_kit() -> String {
    "standard".into()
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            default_kit: default_kit(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON file replacing the built-in kits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kits_file: Option<PathBuf>,
}

/// Session retention. With nothing set, sessions live until restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Cap on live sessions; least recently active are dropped first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sessions: Option<usize>,

    /// Drop sessions idle for longer than this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_ttl_secs: Option<u64>,

    /// How often the gateway sweeps for evictable sessions
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_sessions: None,
            idle_ttl_secs: None,
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl SessionsConfig {
    /// Whether any eviction policy is configured.
    pub fn evicts(&self) -> bool {
        self.max_sessions.is_some() || self.idle_ttl_secs.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Request body limit in bytes (audio uploads dominate)
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5001
}
fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".into()]
}
fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevenlabs_api_key: Option<String>,

    #[serde(default = "default_elevenlabs_base_url")]
    pub elevenlabs_base_url: String,

    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    #[serde(default = "default_stability")]
    pub stability: f32,

    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,

    /// Whisper model; transcription reuses the LLM key and base URL
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,
}

fn default_elevenlabs_base_url() -> String {
    "https://api.elevenlabs.io".into()
}
fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".into()
}
fn default_tts_model() -> String {
    "eleven_monolingual_v1".into()
}
fn default_stability() -> f32 {
    0.5
}
fn default_similarity_boost() -> f32 {
    0.5
}
fn default_transcription_model() -> String {
    "whisper-1".into()
}
fn default_speech_timeout() -> u64 {
    60
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            elevenlabs_api_key: None,
            elevenlabs_base_url: default_elevenlabs_base_url(),
            voice_id: default_voice_id(),
            tts_model: default_tts_model(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            transcription_model: default_transcription_model(),
            timeout_secs: default_speech_timeout(),
        }
    }
}

impl std::fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("elevenlabs_api_key", &redact(&self.elevenlabs_api_key))
            .field("elevenlabs_base_url", &self.elevenlabs_base_url)
            .field("voice_id", &self.voice_id)
            .field("tts_model", &self.tts_model)
            .field("stability", &self.stability)
            .field("similarity_boost", &self.similarity_boost)
            .field("transcription_model", &self.transcription_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Path resolution: `path` if given, else `$SOLSTIS_CONFIG`, else
    /// `~/.solstis/config.toml`. Environment overrides are applied on top:
    /// - `OPENAI_API_KEY`
    /// - `SOLSTIS_MODEL`
    /// - `ELEVENLABS_API_KEY`, `ELEVENLABS_VOICE_ID`
    /// - `SOLSTIS_HOST`, `PORT`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("SOLSTIS_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Self::config_dir().join("config.toml")),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`, so callers (and tests)
    /// decide where values come from.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("OPENAI_API_KEY");
        }
        if let Some(model) = non_empty("SOLSTIS_MODEL") {
            self.llm.model = model;
        }
        if self.speech.elevenlabs_api_key.is_none() {
            self.speech.elevenlabs_api_key = non_empty("ELEVENLABS_API_KEY");
        }
        if let Some(voice) = non_empty("ELEVENLABS_VOICE_ID") {
            self.speech.voice_id = voice;
        }
        if let Some(host) = non_empty("SOLSTIS_HOST") {
            self.gateway.host = host;
        }
        if let Some(port) = non_empty("PORT") {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got '{port}'"))
            })?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".solstis")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "llm.max_tokens must be > 0".into(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.timeout_secs must be > 0".into(),
            ));
        }
        if self.conversation.window_size == 0 {
            return Err(ConfigError::ValidationError(
                "conversation.window_size must be >= 1".into(),
            ));
        }
        if self.conversation.default_kit.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "conversation.default_kit must not be empty".into(),
            ));
        }
        if self.sessions.max_sessions == Some(0) {
            return Err(ConfigError::ValidationError(
                "sessions.max_sessions must be >= 1 when set".into(),
            ));
        }
        if self.sessions.idle_ttl_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "sessions.idle_ttl_secs must be > 0 when set".into(),
            ));
        }
        if self.sessions.sweep_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.sweep_interval_secs must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Check if an LLM API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.conversation.window_size, 10);
        assert_eq!(config.conversation.default_kit, "standard");
        assert_eq!(config.gateway.port, 5001);
        assert!(!config.sessions.evicts());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.llm.model, config.llm.model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml_str = r#"
[conversation]
window_size = 6

[sessions]
idle_ttl_secs = 3600
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.conversation.window_size, 6);
        assert_eq!(config.conversation.default_kit, "standard");
        assert_eq!(config.sessions.idle_ttl_secs, Some(3600));
        assert!(config.sessions.evicts());
        assert_eq!(config.llm.temperature, 0.7);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.llm.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let mut config = AppConfig::default();
        config.conversation.window_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_max_sessions_rejected() {
        let mut config = AppConfig::default();
        config.sessions.max_sessions = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/solstis.toml")).unwrap();
        assert_eq!(config.gateway.port, 5001);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4o-mini\"\nmax_tokens = 300\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 300);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("ELEVENLABS_API_KEY", "xi-test"),
                ("ELEVENLABS_VOICE_ID", "voice-9"),
                ("PORT", "8080"),
            ]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.speech.elevenlabs_api_key.as_deref(), Some("xi-test"));
        assert_eq!(config.speech.voice_id, "voice-9");
        assert_eq!(config.gateway.port, 8080);
    }

    #[test]
    fn file_key_wins_over_env_key() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config
            .apply_env_overrides(env(&[("OPENAI_API_KEY", "from-env")]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn bad_port_env_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        config.speech.elevenlabs_api_key = Some("xi-secret".into());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(!rendered.contains("xi-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-3.5-turbo"));
        assert!(toml_str.contains("5001"));
    }
}
