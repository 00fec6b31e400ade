//! Client for the hosted Assistants API.
//!
//! The relay only needs five upstream operations: retrieve an assistant,
//! create a thread, append a message, run the assistant on a thread, and
//! list the thread's messages. They are expressed by the [`AssistantsApi`]
//! trait so handlers can be exercised against an in-memory fake.
//!
//! # Modules
//!
//! - [`client`]: `reqwest` implementation talking to `/v1/assistants`, `/v1/threads`
//! - [`poll`]: bounded, backing-off wait for a run to finish
//! - [`types`]: wire types
//! - [`error`]: upstream error kinds

pub mod client;
pub mod error;
pub mod poll;
pub mod types;

pub use client::OpenAiAssistantsClient;
pub use error::{Result, UpstreamError};
pub use poll::{PollPolicy, run_to_completion};
pub use types::{Assistant, MessageRole, Run, RunStatus, Thread, ThreadMessage};

/// The upstream operations the relay depends on.
#[async_trait::async_trait]
pub trait AssistantsApi: Send + Sync + std::fmt::Debug {
    /// Fetch an assistant's details by id.
    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant>;

    /// Create a new, empty conversation thread.
    async fn create_thread(&self) -> Result<Thread>;

    /// Append a `user` message to a thread.
    async fn create_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage>;

    /// Start an assistant run on a thread. The returned run is usually
    /// still `queued`; see [`run_to_completion`].
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    /// Fetch the current state of a run.
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// All messages of a thread, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>>;
}
