//! Assistant Relay
//!
//! A small web chat client that relays messages between a browser page and
//! a hosted assistant API, keeping one server-side session (one assistant,
//! one conversation thread) at a time.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server serving the JSON API and the static page
//! - **Upstream**: typed client over the Assistants API, with bounded run polling
//! - **Session**: the single active assistant/thread record
//!
//! # Modules
//!
//! - [`api`]: the three JSON endpoints
//! - [`config`]: layered configuration (defaults, file, env, CLI)
//! - [`error`]: request errors and their HTTP mapping
//! - [`normalized`]: flattening of message content to plain text
//! - [`openai`]: Assistants API client
//! - [`server`]: router assembly and startup
//! - [`session`]: session record and assistant directory

pub mod api;
pub mod config;
pub mod error;
pub mod normalized;
pub mod openai;
pub mod server;
pub mod session;

use std::sync::Arc;

use openai::{AssistantsApi, PollPolicy};
use session::{AssistantDirectory, SessionState};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Upstream Assistants API.
    pub api: Arc<dyn AssistantsApi>,
    /// The single active session.
    pub session: SessionState,
    /// Configured assistant names.
    pub directory: Arc<AssistantDirectory>,
    /// Run polling schedule.
    pub poll: PollPolicy,
}

impl AppState {
    #[must_use]
    pub fn new(api: Arc<dyn AssistantsApi>, directory: AssistantDirectory, poll: PollPolicy) -> Self {
        Self {
            api,
            session: SessionState::new(),
            directory: Arc::new(directory),
            poll,
        }
    }
}
