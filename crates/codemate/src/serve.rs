use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use codemate_core::project::ProjectRequest;
use codemate_core::result::{PipelineResult, Status};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{GeneratorArgs, GeneratorConfig, PipelineSettings, DEFAULT_OUTPUT_DIR};
use crate::pipeline::generate_project;
use crate::prelude::{eprintln, *};
use crate::whoami::resolve_requester;

#[derive(Debug, clap::Parser)]
#[command(name = "serve")]
#[command(about = "Serve the generator over HTTP for a web front-end")]
pub struct App {
    /// Port to listen on
    #[arg(short, long, env = "CODEMATE_PORT", default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "CODEMATE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Root directory for generated projects
    #[arg(short, long, env = "CODEMATE_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    #[clap(flatten)]
    generator: GeneratorArgs,
}

/// Immutable configuration shared by every request.
#[derive(Debug)]
pub struct AppState {
    generator: GeneratorConfig,
    output_root: PathBuf,
    github_api_url: String,
}

/// Body of `POST /api/projects`.
#[derive(Debug, Deserialize)]
pub struct CreateProjectPayload {
    pub description: String,
    #[serde(default)]
    pub user: Option<String>,
    /// Publishing is skipped when absent; the server never substitutes its own token.
    #[serde(default)]
    pub github_token: Option<String>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = app.generator.into_config();
    config.validate()?;

    let addr = format!("{}:{}", app.host, app.port);
    let state = Arc::new(AppState {
        generator: config,
        output_root: app.output_dir,
        github_api_url: global.github_api_url,
    });

    if global.verbose {
        eprintln!("codemate listening on http://{addr}");
        eprintln!("Projects endpoint: http://{addr}/api/projects");
        eprintln!("Output directory: {}", state.output_root.display());
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;
    log::info!("Listening on {addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/projects", post(create_project_handler))
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_project_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProjectPayload>,
) -> (StatusCode, Json<PipelineResult>) {
    if payload.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(PipelineResult::error("Please provide a project description.")),
        );
    }

    let requester = resolve_requester(
        payload.user.as_deref(),
        payload.github_token.as_deref(),
        &state.github_api_url,
    )
    .await;
    let request = ProjectRequest::new(payload.description, requester, payload.github_token);
    let settings = PipelineSettings::new(state.output_root.clone(), state.github_api_url.clone());

    log::debug!("Generating project '{}' for {}", request.slug(), request.requester);
    let result = generate_project(&state.generator, settings, &request).await;

    (status_code(result.status), Json(result))
}

/// Warnings still carry usable local files, so only errors are failures.
fn status_code(status: Status) -> StatusCode {
    match status {
        Status::Success | Status::Warning => StatusCode::OK,
        Status::Error => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
