//! Process-wide session record.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::error::AppError;

/// The currently selected assistant and thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub assistant_id: Option<String>,
    pub assistant_name: Option<String>,
    pub thread_id: Option<String>,
}

/// Ids a turn needs, taken from one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    pub thread_id: String,
    pub assistant_id: String,
}

impl Session {
    /// Both ids required to run a turn, or `MissingState` naming the first
    /// one absent.
    pub fn turn_context(&self) -> Result<TurnContext, AppError> {
        let Some(thread_id) = self.thread_id.clone() else {
            return Err(AppError::MissingState("No thread ID available.".into()));
        };
        let Some(assistant_id) = self.assistant_id.clone() else {
            return Err(AppError::MissingState("No assistant ID available.".into()));
        };
        Ok(TurnContext {
            thread_id,
            assistant_id,
        })
    }
}

/// Shared handle to the live session.
///
/// Clones point at the same record. The lock is held only while copying or
/// overwriting fields, never across an upstream call.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<RwLock<Session>>,
}

impl SessionState {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the selected assistant, discarding the previous one.
    pub fn set_assistant(&self, id: impl Into<String>, name: Option<String>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.assistant_id = Some(id.into());
        guard.assistant_name = name;
    }

    /// Replace the active thread, discarding the previous one.
    pub fn set_thread(&self, id: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.thread_id = Some(id.into());
    }
}
