use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth::{self, IdentityVerifier},
    config::AppConfig,
    error::ServiceError,
    model::{TranslationRequest, TranslationResponse, Translator},
};

/// Display names offered to the frontend. Advisory only: /translate accepts
/// any language strings and never checks them against this list.
pub const SUPPORTED_LANGUAGES: [&str; 20] = [
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Russian",
    "Japanese",
    "Korean",
    "Chinese",
    "Arabic",
    "Hindi",
    "Dutch",
    "Swedish",
    "Greek",
    "Turkish",
    "Polish",
    "Vietnamese",
    "Thai",
    "Indonesian",
];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub translator: Arc<dyn Translator>,
    pub verifier: Arc<IdentityVerifier>,
}

#[derive(Serialize)]
struct LanguagesResponse {
    languages: Vec<&'static str>,
}

pub fn build_router(
    config: Arc<AppConfig>,
    translator: Arc<dyn Translator>,
    verifier: Arc<IdentityVerifier>,
) -> Result<Router, ServiceError> {
    let state = AppState {
        config,
        translator,
        verifier,
    };

    let origin = state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|_| {
            ServiceError::Startup(format!(
                "invalid allowed origin: {}",
                state.config.allowed_origin
            ))
        })?;
    // Credentials rule out wildcard CORS values; mirror what the browser asks.
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    let mut translate_routes = Router::new().route("/translate", post(translate));
    if state.config.require_auth {
        translate_routes = translate_routes.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));
    } else {
        // The bearer dependency exists but is not attached unless configured;
        // make the open surface visible in the logs.
        tracing::warn!("serving /translate without bearer-token enforcement");
    }

    Ok(Router::new()
        .merge(translate_routes)
        .route("/languages", get(languages))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

async fn health() -> &'static str {
    "ok"
}

async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<TranslationResponse>, ServiceError> {
    let response = state.translator.translate(request).await?;
    Ok(Json(response))
}

async fn languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: SUPPORTED_LANGUAGES.to_vec(),
    })
}
