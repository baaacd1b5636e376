//! Advisor capability boundary.
//!
//! The advisor is an opaque chat endpoint that may suggest new times for
//! flexible tasks. It is passed into the optimizer explicitly; nothing here
//! reads process-wide state.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// A chat message with role and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Result of a reachability probe. Used for messaging only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisorStatus {
    Reachable,
    Unreachable { reason: String },
}

impl AdvisorStatus {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

/// Every advisor backend implements this trait.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Identifier reported as the plan provider (e.g. the model name).
    fn name(&self) -> &str;

    /// Send one chat turn and return the raw reply text.
    async fn send_chat_turn(&self, messages: &[ChatMessage]) -> Result<String, AdvisorError>;

    /// Whether the advisor currently answers.
    async fn probe(&self) -> AdvisorStatus {
        AdvisorStatus::Reachable
    }
}

/// Advisor connection options, read from the `[advisor]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// When false the optimizer runs local-only.
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible server.
    pub endpoint: String,
    pub model: String,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout_ms: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Request body for /v1/chat/completions.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
}

/// Response from /v1/chat/completions.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// A single choice in the response.
#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Advisor backed by an OpenAI-compatible chat completions server.
#[derive(Clone)]
pub struct HttpAdvisor {
    client: reqwest::Client,
    config: AdvisorConfig,
    base_url: String,
}

impl HttpAdvisor {
    /// # Errors
    /// Returns [`AdvisorError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: AdvisorConfig) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AdvisorError::Transport(e.to_string()))?;
        let base_url = config.endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    fn map_error(&self, err: reqwest::Error) -> AdvisorError {
        if err.is_timeout() {
            AdvisorError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl Advisor for HttpAdvisor {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn send_chat_turn(&self, messages: &[ChatMessage]) -> Result<String, AdvisorError> {
        if !self.config.enabled {
            return Err(AdvisorError::Disabled);
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: 0.2,
            stream: false,
        };
        let url = format!("{}/v1/chat/completions", self.base_url);
        tracing::debug!(%url, model = %self.config.model, "sending advisor request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Status { status, body });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| self.map_error(e))?;
        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AdvisorError::EmptyReply)
    }

    async fn probe(&self) -> AdvisorStatus {
        if !self.config.enabled {
            return AdvisorStatus::Unreachable {
                reason: AdvisorError::Disabled.to_string(),
            };
        }
        let url = format!("{}/v1/models", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => AdvisorStatus::Reachable,
            Ok(response) => AdvisorStatus::Unreachable {
                reason: format!("HTTP {}", response.status().as_u16()),
            },
            Err(e) => AdvisorStatus::Unreachable {
                reason: self.map_error(e).to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(url: &str) -> AdvisorConfig {
        AdvisorConfig {
            endpoint: url.to_string(),
            model: "test-model".to_string(),
            timeout_ms: 2_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let advisor = HttpAdvisor::new(config_for("http://localhost:8000/")).unwrap();
        assert_eq!(advisor.base_url, "http://localhost:8000");
        assert_eq!(advisor.name(), "test-model");
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"{\"summary\":\"ok\",\"tasks\":[]}"}}]}"#)
            .create_async()
            .await;

        let advisor = HttpAdvisor::new(config_for(&server.url())).unwrap();
        let reply = advisor
            .send_chat_turn(&[ChatMessage::system("s"), ChatMessage::user("u")])
            .await
            .unwrap();

        assert_eq!(reply, r#"{"summary":"ok","tasks":[]}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let advisor = HttpAdvisor::new(config_for(&server.url())).unwrap();
        let err = advisor.send_chat_turn(&[ChatMessage::user("u")]).await.unwrap_err();
        match err {
            AdvisorError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let advisor = HttpAdvisor::new(config_for(&server.url())).unwrap();
        let err = advisor.send_chat_turn(&[ChatMessage::user("u")]).await.unwrap_err();
        assert!(matches!(err, AdvisorError::EmptyReply));
    }

    #[tokio::test]
    async fn disabled_advisor_never_sends() {
        let config = AdvisorConfig {
            enabled: false,
            ..config_for("http://127.0.0.1:9")
        };
        let advisor = HttpAdvisor::new(config).unwrap();
        let err = advisor.send_chat_turn(&[ChatMessage::user("u")]).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Disabled));
        assert!(!advisor.probe().await.is_reachable());
    }

    #[tokio::test]
    async fn probe_reports_reachability() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let advisor = HttpAdvisor::new(config_for(&server.url())).unwrap();
        assert_eq!(advisor.probe().await, AdvisorStatus::Reachable);

        let unreachable = HttpAdvisor::new(config_for("http://127.0.0.1:9")).unwrap();
        assert!(!unreachable.probe().await.is_reachable());
    }
}
