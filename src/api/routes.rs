use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use tracing::{info, instrument};

use super::types::{
    AssistantResponse, ResolveAssistantRequest, RunRequest, RunResponse, ThreadResponse,
};
use crate::AppState;
use crate::error::AppError;
use crate::normalized::NormalizedMessage;
use crate::openai::run_to_completion;

pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/api/assistants", post(resolve_assistant))
        .route("/api/threads", post(create_thread))
        .route("/api/run", post(run_turn))
}

fn invalid_body(rejection: &JsonRejection) -> AppError {
    AppError::InvalidInput(rejection.body_text())
}

/// POST /api/assistants - Select an assistant by display name.
#[instrument(skip_all)]
async fn resolve_assistant(
    State(state): State<AppState>,
    payload: Result<Json<ResolveAssistantRequest>, JsonRejection>,
) -> Result<Json<AssistantResponse>, AppError> {
    let Json(req) = payload.map_err(|e| invalid_body(&e))?;
    let name = req.name.unwrap_or_default();

    let Some(assistant_id) = state.directory.lookup(&name) else {
        return Err(AppError::NotFound(format!(
            "No assistant found with name '{name}'."
        )));
    };

    let assistant = state
        .api
        .retrieve_assistant(assistant_id)
        .await
        .map_err(|e| AppError::upstream_with_status("Failed to fetch assistant", e))?;

    state
        .session
        .set_assistant(assistant.id.clone(), assistant.name.clone());

    info!(
        name: "assistant.resolved",
        requested = %name,
        assistant_id = %assistant.id,
        assistant_name = ?assistant.name,
        "Assistant selected"
    );

    Ok(Json(AssistantResponse {
        assistant_id: assistant.id,
        assistant_name: assistant.name,
    }))
}

/// POST /api/threads - Start a new conversation thread.
#[instrument(skip_all)]
async fn create_thread(State(state): State<AppState>) -> Result<Json<ThreadResponse>, AppError> {
    let thread = state
        .api
        .create_thread()
        .await
        .map_err(|e| AppError::upstream("Failed to create thread", e))?;

    let Some(thread_id) = thread.usable_id() else {
        return Err(AppError::Internal("No thread ID found".into()));
    };

    state.session.set_thread(thread_id);
    info!(name: "thread.created", thread_id = %thread_id, "Thread created");

    Ok(Json(ThreadResponse {
        thread_id: thread_id.to_string(),
    }))
}

/// POST /api/run - Send a user message, run the assistant, return the history.
///
/// A missing thread or assistant is reported before the body is looked at.
/// Nothing is rolled back if a later upstream step fails.
#[instrument(skip_all)]
async fn run_turn(
    State(state): State<AppState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, AppError> {
    let ctx = state.session.snapshot().turn_context()?;
    let Json(req) = payload.map_err(|e| invalid_body(&e))?;
    let content = req.into_text()?;

    info!(
        name: "run.requested",
        thread_id = %ctx.thread_id,
        assistant_id = %ctx.assistant_id,
        "Running assistant turn"
    );

    state
        .api
        .create_message(&ctx.thread_id, &content)
        .await
        .map_err(|e| AppError::upstream("Failed to run assistant", e))?;

    run_to_completion(
        state.api.as_ref(),
        &ctx.thread_id,
        &ctx.assistant_id,
        &state.poll,
    )
    .await
    .map_err(|e| AppError::upstream("Failed to run assistant", e))?;

    let messages: Vec<NormalizedMessage> = state
        .api
        .list_messages(&ctx.thread_id)
        .await
        .map_err(|e| AppError::upstream("Failed to run assistant", e))?
        .iter()
        .map(NormalizedMessage::from)
        .collect();

    info!(
        name: "run.completed",
        thread_id = %ctx.thread_id,
        messages = messages.len(),
        "Assistant turn finished"
    );

    Ok(Json(RunResponse { messages }))
}
