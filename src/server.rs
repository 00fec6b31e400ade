use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::api;
use crate::config::AppConfig;
use crate::openai::OpenAiAssistantsClient;
use crate::session::AssistantDirectory;

/// Assemble the full application: JSON API, static page, CORS and tracing.
///
/// Anything not matched by the API is looked up in `static_dir`, so `/`
/// serves `static_dir/index.html`.
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .merge(api::build_router())
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let api_key = config.require_api_key()?;
    let client = OpenAiAssistantsClient::new(&config.openai.base_url, api_key)?;

    info!(
        name: "openai.config.loaded",
        base_url = %client.base_url(),
        "Assistants API configuration loaded"
    );

    let directory = AssistantDirectory::new(config.assistants.iter().cloned());
    if directory.is_empty() {
        tracing::warn!(
            name: "assistant.directory.empty",
            "No assistants configured; every lookup will return 404"
        );
    }
    for name in directory.names() {
        info!(name: "assistant.registered", assistant = %name, "Assistant available");
    }

    let state = AppState::new(Arc::new(client), directory, config.run.poll_policy());
    let app = build_router(state, &config.server.static_dir);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        static_dir = %config.server.static_dir,
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
