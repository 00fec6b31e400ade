//! The relay's single conversation session.
//!
//! The server tracks exactly one active assistant and one active thread for
//! the whole process. Every handler reads and overwrites the same record;
//! the last writer wins.
//!
//! # Architecture
//!
//! - [`Session`]: snapshot of the selected assistant and thread
//! - [`SessionState`]: shared, lock-guarded handle to the live session
//! - [`AssistantDirectory`]: configured display-name → assistant-id table
//!
//! # Example
//!
//! ```rust
//! use assistant_relay::session::SessionState;
//!
//! let state = SessionState::new();
//! state.set_assistant("asst_123", Some("BankTest".to_string()));
//! state.set_thread("thread_abc");
//!
//! let ctx = state.snapshot().turn_context().unwrap();
//! assert_eq!(ctx.thread_id, "thread_abc");
//! ```

mod directory;
mod state;

pub use directory::AssistantDirectory;
pub use state::{Session, SessionState, TurnContext};
