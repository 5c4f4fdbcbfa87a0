//! Direct OpenAI chat completions.

use crate::response::{extract_reply, retry_after, send_error, status_error};
use crate::ChatProvider;
use intel_core::{ChatMessage, CoreError, OpenAiConfig};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(
        config: &OpenAiConfig,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One-shot prompt helper. Never fails; problems are reported in the
    /// returned text.
    pub async fn respond_to_prompt(&self, input: &str) -> String {
        if input.trim().is_empty() {
            return "Error: Input string is empty".to_string();
        }

        match self
            .complete(&[ChatMessage::user(input)], self.max_tokens)
            .await
        {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                error!("OpenAI prompt failed: {}", e);
                format!("Error calling OpenAI API: {}", e)
            }
        }
    }
}

impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, CoreError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens,
            temperature: self.temperature,
        };

        debug!("Requesting {} completion from {}", self.model, url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry = retry_after(&response);
            return Err(status_error(PROVIDER, "chat/completions", status, retry));
        }

        let payload: Value = response.json().await?;
        extract_reply(PROVIDER, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> OpenAiProvider {
        let config = OpenAiConfig {
            base_url: base_url.to_string(),
            ..OpenAiConfig::default()
        };
        OpenAiProvider::new(&config, "sk-test".to_string(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_empty_prompt() {
        let openai = provider("https://api.openai.com/v1");
        assert_eq!(
            openai.respond_to_prompt("").await,
            "Error: Input string is empty"
        );
    }

    #[tokio::test]
    async fn test_failure_is_reported_as_text() {
        let openai = provider("http://127.0.0.1:9/v1");
        let reply = openai.respond_to_prompt("Summarize CPSC 331").await;
        assert!(reply.starts_with("Error calling OpenAI API: "));
    }

    #[test]
    fn test_request_body_shape() {
        let messages = [ChatMessage::user("hello")];
        let body = serde_json::to_value(CompletionRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
            max_tokens: 256,
            temperature: 0.5,
        })
        .unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_defaults() {
        let openai = provider("https://api.openai.com/v1/");
        assert_eq!(openai.model(), "gpt-3.5-turbo");
        assert_eq!(openai.base_url, "https://api.openai.com/v1");
    }
}
