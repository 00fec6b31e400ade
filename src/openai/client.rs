//! `reqwest` implementation of [`AssistantsApi`].

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::error::{Result, UpstreamError};
use super::types::{
    Assistant, CreateMessageRequest, CreateRunRequest, ListPage, MessageRole, Run, Thread,
    ThreadMessage,
};
use super::AssistantsApi;

/// Page size used when listing thread messages (the API maximum).
const LIST_PAGE_LIMIT: &str = "100";

/// HTTP client for the Assistants API.
///
/// Every request carries the bearer credential and the
/// `OpenAI-Beta: assistants=v2` header the API requires.
#[derive(Clone)]
pub struct OpenAiAssistantsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for OpenAiAssistantsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAssistantsClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenAiAssistantsClient {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        Self::with_client(base_url, api_key, reqwest::Client::new())
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(
        base_url: &str,
        api_key: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self> {
        // A trailing slash makes `Url::join` append instead of replacing
        // the last path segment.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2"))
    }

    async fn send<T: DeserializeOwned>(rb: RequestBuilder) -> Result<T> {
        let response = rb.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(UpstreamError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait::async_trait]
impl AssistantsApi for OpenAiAssistantsClient {
    #[instrument(skip(self))]
    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        let rb = self.request(Method::GET, &format!("assistants/{assistant_id}"))?;
        Self::send(rb).await
    }

    #[instrument(skip(self))]
    async fn create_thread(&self) -> Result<Thread> {
        let rb = self
            .request(Method::POST, "threads")?
            .json(&serde_json::json!({}));
        Self::send(rb).await
    }

    #[instrument(skip(self, content), fields(len = content.len()))]
    async fn create_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage> {
        let rb = self
            .request(Method::POST, &format!("threads/{thread_id}/messages"))?
            .json(&CreateMessageRequest {
                role: MessageRole::User,
                content,
            });
        Self::send(rb).await
    }

    #[instrument(skip(self))]
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let rb = self
            .request(Method::POST, &format!("threads/{thread_id}/runs"))?
            .json(&CreateRunRequest { assistant_id });
        Self::send(rb).await
    }

    #[instrument(skip(self))]
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let rb = self.request(Method::GET, &format!("threads/{thread_id}/runs/{run_id}"))?;
        Self::send(rb).await
    }

    #[instrument(skip(self))]
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        let path = format!("threads/{thread_id}/messages");
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("order", "desc"), ("limit", LIST_PAGE_LIMIT)];
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }
            let rb = self.request(Method::GET, &path)?.query(&query);
            let page: ListPage<ThreadMessage> = Self::send(rb).await?;

            messages.extend(page.data);
            match page.last_id {
                Some(last) if page.has_more => after = Some(last),
                _ => break,
            }
        }

        debug!(count = messages.len(), "Thread messages listed");
        Ok(messages)
    }
}
