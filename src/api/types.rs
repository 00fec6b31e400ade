//! Request and response bodies of the JSON API.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::normalized::NormalizedMessage;

/// Body of `POST /api/assistants`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveAssistantRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `POST /api/assistants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub assistant_id: String,
    pub assistant_name: Option<String>,
}

/// Response of `POST /api/threads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub thread_id: String,
}

/// Body of `POST /api/run`.
///
/// Every level is optional so that a wrong shape is reported as
/// `Invalid message format` rather than a deserialization failure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<IncomingText>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IncomingText {
    #[serde(default)]
    pub value: Option<String>,
}

impl RunRequest {
    /// A text message to send upstream.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            message: Some(IncomingMessage {
                kind: Some("text".into()),
                text: Some(IncomingText {
                    value: Some(value.into()),
                }),
            }),
        }
    }

    /// The message text, if the body is a `text` message with a non-empty value.
    pub fn into_text(self) -> Result<String, AppError> {
        self.message
            .filter(|m| m.kind.as_deref() == Some("text"))
            .and_then(|m| m.text)
            .and_then(|t| t.value)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Invalid message format".into()))
    }
}

/// Response of `POST /api/run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResponse {
    pub messages: Vec<NormalizedMessage>,
}
