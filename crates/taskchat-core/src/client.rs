use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SendError;

/// What the backend did in response to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TaskCompleted,
    TaskUncompleted,
    TasksListed,
    NoAction,
    #[serde(other)]
    Other,
}

/// Optional details attached to a reply. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatMetadata {
    pub action: ChatAction,
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub metadata: Option<ChatMetadata>,
}

impl ChatReply {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            metadata: None,
        }
    }
}

/// The single request/response operation the conversation depends on
pub trait ChatBackend {
    fn send(
        &self,
        message: &str,
    ) -> impl std::future::Future<Output = Result<ChatReply, SendError>> + Send;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP client for the task assistant's `/api/chat` endpoint
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn chat(&self, message: &str) -> Result<ChatReply, SendError> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(%url, "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let description = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
            tracing::warn!(status = status.as_u16(), %description, "chat request rejected");
            return Err(SendError::Status {
                status: status.as_u16(),
                description,
            });
        }

        let reply: ChatReply = serde_json::from_str(&body)?;
        Ok(reply)
    }
}

impl ChatBackend for ChatClient {
    fn send(
        &self,
        message: &str,
    ) -> impl std::future::Future<Output = Result<ChatReply, SendError>> + Send {
        self.chat(message)
    }
}
