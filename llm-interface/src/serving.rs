//! Model serving endpoints hosted in the data workspace.

use crate::response::{extract_reply, retry_after, send_error, status_error};
use crate::ChatProvider;
use intel_core::{ChatMessage, CoreError, LlmError, WorkspaceCredentials};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROVIDER: &str = "serving-endpoint";

/// Endpoint tasks that accept a chat-completions payload.
pub const SUPPORTED_CHAT_TASKS: &[&str] = &["agent/v1/chat", "agent/v2/chat", "llm/v1/chat"];

pub fn is_chat_task(task: &str) -> bool {
    SUPPORTED_CHAT_TASKS.contains(&task)
}

#[derive(Debug, Serialize)]
struct InvocationRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct EndpointDetails {
    #[serde(default)]
    task: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServingEndpointProvider {
    http_client: Client,
    base_url: String,
    endpoint: String,
    token: String,
}

impl ServingEndpointProvider {
    pub fn new(
        workspace: &WorkspaceCredentials,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(CoreError::InvalidInput {
                message: "Serving endpoint name is empty".to_string(),
            });
        }

        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: workspace.base_url(),
            endpoint,
            token: workspace.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn invocations_url(&self) -> String {
        format!(
            "{}/serving-endpoints/{}/invocations",
            self.base_url, self.endpoint
        )
    }

    /// Reads the endpoint's declared task, if it has one.
    pub async fn endpoint_task(&self) -> Result<Option<String>, CoreError> {
        let url = format!("{}/api/2.0/serving-endpoints/{}", self.base_url, self.endpoint);
        debug!("Fetching serving endpoint details from {}", url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry = retry_after(&response);
            return Err(status_error(PROVIDER, &self.endpoint, status, retry));
        }

        let details: EndpointDetails = response.json().await?;
        Ok(details.task)
    }

    /// Fails unless the endpoint serves a chat-completions task; returns the
    /// task otherwise.
    pub async fn ensure_chat_compatible(&self) -> Result<String, CoreError> {
        let task = self.endpoint_task().await?.unwrap_or_default();
        if is_chat_task(&task) {
            info!("Serving endpoint {} has chat task {}", self.endpoint, task);
            Ok(task)
        } else {
            warn!(
                "Serving endpoint {} has unsupported task '{}'",
                self.endpoint, task
            );
            Err(CoreError::Llm(LlmError::UnsupportedEndpoint {
                endpoint: self.endpoint.clone(),
                task,
            }))
        }
    }
}

impl ChatProvider for ServingEndpointProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, CoreError> {
        let body = InvocationRequest {
            messages,
            max_tokens,
        };

        debug!(
            "Invoking {} with {} messages",
            self.endpoint,
            messages.len()
        );
        let response = self
            .http_client
            .post(self.invocations_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry = retry_after(&response);
            return Err(status_error(PROVIDER, &self.endpoint, status, retry));
        }

        let payload: Value = response.json().await?;
        extract_reply(PROVIDER, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> WorkspaceCredentials {
        WorkspaceCredentials {
            host: "adb-1.azuredatabricks.net".to_string(),
            token: "dapi-test".to_string(),
        }
    }

    #[test]
    fn test_chat_tasks() {
        assert!(is_chat_task("llm/v1/chat"));
        assert!(is_chat_task("agent/v2/chat"));
        assert!(!is_chat_task("llm/v1/completions"));
        assert!(!is_chat_task("llm/v1/embeddings"));
        assert!(!is_chat_task(""));
    }

    #[test]
    fn test_invocations_url() {
        let provider =
            ServingEndpointProvider::new(&workspace(), "course-bot", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            provider.invocations_url(),
            "https://adb-1.azuredatabricks.net/serving-endpoints/course-bot/invocations"
        );
        assert_eq!(provider.name(), "serving-endpoint");
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        assert!(ServingEndpointProvider::new(&workspace(), " ", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![
            ChatMessage::system("Use the following course information when answering:\nctx"),
            ChatMessage::user("Is CPSC 355 hard?"),
        ];
        let body = serde_json::to_value(InvocationRequest {
            messages: &messages,
            max_tokens: 256,
        })
        .unwrap();
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Is CPSC 355 hard?");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_errors() {
        let creds = WorkspaceCredentials {
            host: "http://127.0.0.1:9".to_string(),
            token: "t".to_string(),
        };
        let provider =
            ServingEndpointProvider::new(&creds, "course-bot", Duration::from_secs(2)).unwrap();
        let result = provider
            .complete(&[ChatMessage::user("CPSC 355")], 16)
            .await;
        assert!(result.is_err());
    }
}
