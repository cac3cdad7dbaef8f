//! HTTP server for note generation.
//!
//! Exposes the note pipeline as a small JSON API.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::LecternError;
use crate::notes::NoteStyle;
use crate::openai::is_api_key_configured;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP server.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;
    let app = router(orchestrator);

    let host = host.unwrap_or(&settings.server.host);
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lectern Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Generate notes", "POST /generate_notes");
    Output::kv("Transcript", "POST /transcript");
    println!();
    if !is_api_key_configured() {
        Output::warning("OPENAI_API_KEY is not set; /generate_notes will fail until it is.");
    }
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router around an orchestrator.
fn router(orchestrator: Orchestrator) -> Router {
    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/generate_notes", post(generate_notes))
        .route("/transcript", post(transcript))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct NotesRequest {
    #[serde(default)]
    youtube_url: Option<String>,
    #[serde(default)]
    style: Option<String>,
}

#[derive(Serialize)]
struct NotesResponse {
    notes: String,
}

#[derive(Deserialize)]
struct TranscriptRequest {
    #[serde(default)]
    youtube_url: Option<String>,
}

#[derive(Serialize)]
struct TranscriptResponse {
    video_id: String,
    transcript: String,
    strategy: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map a pipeline error to an HTTP response.
///
/// Bad input and missing transcripts are the caller's problem (400); everything
/// else is ours (500), reported as "`action`: ...".
fn pipeline_error(err: LecternError, action: &str) -> Response {
    match err {
        LecternError::InvalidUrl(_) => error_response(StatusCode::BAD_REQUEST, "Invalid YouTube URL."),
        LecternError::TranscriptUnavailable(cause) => {
            error_response(StatusCode::BAD_REQUEST, cause.to_string())
        }
        other => {
            error!("{} failed: {}", action, other);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error {}: {}", action, other),
            )
        }
    }
}

/// Pull a non-empty URL out of a request body.
fn require_url(url: Option<String>) -> Result<String, Response> {
    url.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Please enter a YouTube URL."))
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_notes(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NotesRequest>,
) -> Response {
    let url = match require_url(req.youtube_url) {
        Ok(url) => url,
        Err(response) => return response,
    };
    let style = req.style.as_deref().map(NoteStyle::parse_lenient);

    match state.orchestrator.generate_notes(&url, style).await {
        Ok(generated) => Json(NotesResponse {
            notes: generated.notes,
        })
        .into_response(),
        Err(e) => pipeline_error(e, "generating notes"),
    }
}

async fn transcript(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscriptRequest>,
) -> Response {
    let url = match require_url(req.youtube_url) {
        Ok(url) => url,
        Err(response) => return response,
    };

    match state.orchestrator.fetch_transcript(&url).await {
        Ok(resolved) => Json(TranscriptResponse {
            video_id: resolved.video_id.to_string(),
            transcript: resolved.transcript.into_string(),
            strategy: resolved.strategy.to_string(),
        })
        .into_response(),
        Err(e) => pipeline_error(e, "fetching transcript"),
    }
}
