//! JSON endpoints driving the conversation.
//!
//! - `POST /api/assistants`: select an assistant by display name
//! - `POST /api/threads`: start a new conversation thread
//! - `POST /api/run`: send a message and get the thread's history back

pub mod routes;
pub mod types;

pub use routes::build_router;
