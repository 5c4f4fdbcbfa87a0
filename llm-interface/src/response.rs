//! Parsing shared by the chat-completions backends.

use intel_core::{CoreError, LlmError};
use reqwest::{Response, StatusCode};
use serde_json::Value;

/// Pulls the reply text out of a completion body.
///
/// Chat endpoints answer in the `choices[0].message.content` shape. Agent
/// endpoints may instead return a `messages` list, in which case the last
/// message carries the reply.
pub fn extract_reply(provider: &str, body: &Value) -> Result<String, CoreError> {
    let from_choices = body
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str);

    let from_messages = || {
        body.get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.last())
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
    };

    from_choices
        .or_else(from_messages)
        .map(str::to_string)
        .ok_or_else(|| {
            CoreError::Llm(LlmError::InvalidResponseFormat {
                provider: provider.to_string(),
            })
        })
}

/// Maps a non-success status to the matching provider error.
pub fn status_error(
    provider: &str,
    endpoint: &str,
    status: StatusCode,
    retry_after: Option<u64>,
) -> CoreError {
    let provider = provider.to_string();
    let err = match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed { provider },
        404 => LlmError::EndpointNotFound {
            endpoint: endpoint.to_string(),
        },
        429 => LlmError::RateLimitExceeded {
            provider,
            retry_after: retry_after.unwrap_or(60),
        },
        408 | 504 => LlmError::RequestTimeout { provider },
        code if (500..600).contains(&code) => LlmError::ServiceUnavailable { provider },
        code => {
            return CoreError::RequestFailed {
                message: format!("{} returned an unexpected status", provider),
                status_code: Some(code),
            }
        }
    };
    CoreError::Llm(err)
}

pub(crate) fn retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

pub(crate) fn send_error(provider: &str, e: reqwest::Error) -> CoreError {
    if e.is_timeout() {
        CoreError::Llm(LlmError::RequestTimeout {
            provider: provider.to_string(),
        })
    } else {
        CoreError::Network(e)
    }
}
