//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::error::ApiError;
use super::handlers;
use super::models::{
    ApiResponse, GenerateSubtitlesRequest, GeneratedSubtitles, InfoRequest, LanguageEntry,
    LocalGeneratedSubtitles, TranslateSubtitlesRequest, TranslatedSubtitles,
};
use crate::config::Config;
use crate::download::{Downloader, VideoDescriptor};
use crate::transcription::AssemblyAiTranscriber;
use crate::translation::TranslationService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub downloader: Arc<Downloader>,
    pub transcriber: Arc<AssemblyAiTranscriber>,
    pub translator: Arc<TranslationService>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let downloader = Arc::new(Downloader::new(
            config.downloader.clone(),
            config.storage.clone(),
        ));
        let transcriber = Arc::new(AssemblyAiTranscriber::new(config.transcription.clone())?);
        let translator = Arc::new(TranslationService::new(&config.translation)?);

        Ok(Self {
            config,
            downloader,
            transcriber,
            translator,
        })
    }
}

/// Configure and start the HTTP server.
pub async fn start_http_server(state: AppState, port: u16) -> Result<()> {
    info!("🚀 Starting HTTP server on port {}", port);

    // Hourly stale-file sweep; uncoordinated with in-flight requests.
    spawn_sweeper(
        state.downloader.clone(),
        state.config.storage.sweep_interval_secs,
    );

    // Permissive CORS so the browser UI can call from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let temp_dir = state.config.storage.temp_dir.clone();

    let app = Router::new()
        // Health check endpoints (both paths for compatibility)
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        // Video endpoints
        .route("/api/video/info", post(video_info_handler))
        .route("/api/video/generate-subtitles", post(generate_subtitles_handler))
        .route(
            "/api/video/generate-subtitles-local",
            post(generate_subtitles_local_handler),
        )
        .route(
            "/api/video/translate-subtitles",
            post(translate_subtitles_handler),
        )
        .route("/api/video/languages", get(languages_handler))
        // Generated .vtt files and downloaded videos live in the temp dir
        .nest_service("/subtitles", ServeDir::new(temp_dir.clone()))
        .nest_service("/videos", ServeDir::new(temp_dir))
        // Add state and middleware
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🌐 API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_sweeper(downloader: Arc<Downloader>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_secs));
        // the first tick fires immediately; skip it
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match downloader.sweep_stale().await {
                Ok(0) => {}
                Ok(removed) => info!("🗑️ Swept {} stale temp files", removed),
                Err(e) => warn!("Temp sweep failed: {}", e),
            }
        }
    });
}

/// Health check handler
async fn health_handler() -> Json<serde_json::Value> {
    Json(handlers::health_check().await)
}

/// Video metadata handler
async fn video_info_handler(
    State(state): State<AppState>,
    Json(req): Json<InfoRequest>,
) -> Result<Json<ApiResponse<VideoDescriptor>>, ApiError> {
    let data = handlers::video_info(&state, req).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Subtitle generation handler (YouTube embed playback)
async fn generate_subtitles_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateSubtitlesRequest>,
) -> Result<Json<ApiResponse<GeneratedSubtitles>>, ApiError> {
    let data = handlers::generate_subtitles(&state, req).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Subtitle generation handler (local playback, downloads the video)
async fn generate_subtitles_local_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateSubtitlesRequest>,
) -> Result<Json<ApiResponse<LocalGeneratedSubtitles>>, ApiError> {
    let data = handlers::generate_subtitles_local(&state, req).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Re-translation handler for existing subtitle tracks
async fn translate_subtitles_handler(
    State(state): State<AppState>,
    Json(req): Json<TranslateSubtitlesRequest>,
) -> Result<Json<ApiResponse<TranslatedSubtitles>>, ApiError> {
    let data = handlers::translate_subtitles(&state, req).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Supported languages handler
async fn languages_handler() -> Json<ApiResponse<Vec<LanguageEntry>>> {
    Json(ApiResponse::ok(handlers::available_languages()))
}
