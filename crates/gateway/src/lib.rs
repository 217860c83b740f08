//! HTTP gateway for Solstis.
//!
//! Exposes the `/api/...` routes the web and voice clients use and runs
//! the optional session sweeper. Built on Axum.

pub mod api;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use solstis_agent::TurnOrchestrator;
use solstis_catalog::KitCatalog;
use solstis_config::{AppConfig, GatewayConfig};
use solstis_core::ConversationStore;
use solstis_sessions::InMemoryStore;

pub use api::{ApiState, SharedApiState, SpeechStatus};

/// Build the router with CORS, body limit, and request tracing applied.
pub fn build_router(state: SharedApiState, gateway: &GatewayConfig) -> Router {
    api::api_router(state)
        .layer(DefaultBodyLimit::max(gateway.body_limit_bytes))
        .layer(cors_layer(&gateway.cors_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS for the configured origins. A `*` inside an origin matches any run
/// of characters, so `https://*.onrender.com` covers preview deployments.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let patterns: Vec<String> = origins.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &axum::http::request::Parts| {
                origin
                    .to_str()
                    .is_ok_and(|o| patterns.iter().any(|p| origin_matches(p, o)))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            origin.len() >= prefix.len() + suffix.len()
                && origin.starts_with(prefix)
                && origin.ends_with(suffix)
        }
        None => pattern == origin,
    }
}

/// Periodically apply the orchestrator's eviction policy.
fn spawn_sweeper(
    orchestrator: Arc<TurnOrchestrator>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = orchestrator.sweep().await {
                warn!(error = %e, "Session sweep failed");
            }
        }
    })
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let catalog = Arc::new(KitCatalog::load(config.catalog.kits_file.as_deref())?);
    let collaborators = solstis_providers::build_from_config(&config);
    let store: Arc<dyn ConversationStore> = Arc::new(InMemoryStore::new());
    let orchestrator = Arc::new(TurnOrchestrator::from_config(
        &config,
        store,
        catalog.clone(),
        collaborators.llm.clone(),
    ));

    if config.sessions.evicts() {
        spawn_sweeper(
            orchestrator.clone(),
            Duration::from_secs(config.sessions.sweep_interval_secs),
        );
    }

    let state = Arc::new(ApiState::new(orchestrator, &collaborators, &config.speech));
    let app = build_router(state, &config.gateway);

    info!(
        addr = %addr,
        kits = catalog.len(),
        model = %config.llm.model,
        tts = collaborators.synthesizer.is_some(),
        transcription = collaborators.transcriber.is_some(),
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use solstis_core::ManualClock;
    use solstis_core::error::ProviderError;
    use solstis_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use solstis_providers::Collaborators;
    use solstis_sessions::IdleTtl;
    use tower::ServiceExt;

    struct EchoProvider;

    #[async_trait::async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let last = request.messages.last().map(|m| m.content.clone());
            Ok(ProviderResponse {
                content: last.unwrap_or_default(),
                model: request.model,
                usage: None,
            })
        }
    }

    fn test_router(config: &AppConfig) -> Router {
        let orchestrator = Arc::new(TurnOrchestrator::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(KitCatalog::builtin()),
            Arc::new(EchoProvider),
        ));
        let collaborators = Collaborators {
            llm: Arc::new(EchoProvider),
            synthesizer: None,
            transcriber: None,
        };
        let state = Arc::new(ApiState::new(orchestrator, &collaborators, &config.speech));
        build_router(state, &config.gateway)
    }

    #[test]
    fn origin_patterns() {
        assert!(origin_matches("http://localhost:3000", "http://localhost:3000"));
        assert!(!origin_matches("http://localhost:3000", "http://localhost:3001"));
        assert!(origin_matches("https://*.onrender.com", "https://solstis-pr-12.onrender.com"));
        assert!(!origin_matches("https://*.onrender.com", "https://evil.com"));
        assert!(origin_matches("*", "https://anything.example"));
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = test_router(&AppConfig::default());
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_allows_configured_origin_only() {
        let app = test_router(&AppConfig::default());

        let preflight = |origin: &str| {
            Request::builder()
                .method("OPTIONS")
                .uri("/api/chat")
                .header("origin", origin)
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap()
        };

        let allowed = app
            .clone()
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );

        let denied = app.oneshot(preflight("https://elsewhere.test")).await.unwrap();
        assert!(denied.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let mut config = AppConfig::default();
        config.gateway.body_limit_bytes = 64;
        let app = test_router(&config);
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(format!(
                r#"{{"user_name":"a","user_input":"{}"}}"#,
                "x".repeat(500)
            )))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_idle_sessions() {
        let start = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let store = Arc::new(InMemoryStore::new());
        let orchestrator = Arc::new(
            TurnOrchestrator::new(
                store.clone(),
                Arc::new(KitCatalog::builtin()),
                Arc::new(EchoProvider),
            )
            .with_clock(clock.clone())
            .with_eviction(Arc::new(IdleTtl::new(Duration::from_secs(60)))),
        );

        orchestrator.handle_turn("idle", None, "hi").await.unwrap();
        assert_eq!(store.session_count().await.unwrap(), 1);

        clock.advance(chrono::Duration::seconds(120));
        let sweeper = spawn_sweeper(orchestrator, Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(15)).await;

        assert_eq!(store.session_count().await.unwrap(), 0);
        sweeper.abort();
    }
}
