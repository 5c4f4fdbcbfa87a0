use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::ForumApi(e) => {
                error!("Forum API error details: {:?}", e);
            }
            CoreError::Warehouse(e) => {
                error!("Warehouse error details: {:?}", e);
            }
            CoreError::Llm(e) => {
                error!("LLM error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::ForumApi(e) => e.user_friendly_message(),
            CoreError::Warehouse(e) => e.user_friendly_message(),
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::Scoring(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { .. } => {
                "Invalid input provided. Please check your input and try again.".to_string()
            }
            CoreError::RequestFailed { message, .. } => {
                format!("Request failed: {}", message)
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::ForumApi(_) => "FORUM_API".to_string(),
            CoreError::Warehouse(_) => "WAREHOUSE".to_string(),
            CoreError::Llm(_) => "LLM".to_string(),
            CoreError::Scoring(_) => "SCORING".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::RequestFailed { .. } => "REQUEST_FAILED".to_string(),
        }
    }
}

impl ErrorExt for ForumApiError {
    fn log_error(&self) -> &Self {
        error!("ForumApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ForumApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ForumApiError::AuthenticationFailed { .. } => {
                "Forum authentication failed. Please check your client credentials.".to_string()
            }
            ForumApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            ForumApiError::Forbidden { resource } => format!(
                "Access denied to {}. You may not have permission to view this content.",
                resource
            ),
            ForumApiError::PostNotFound { .. } => {
                "The requested post could not be found.".to_string()
            }
            ForumApiError::InvalidToken => {
                "Forum authentication token is invalid. Please re-authenticate.".to_string()
            }
            ForumApiError::RequestTimeout => {
                "Request to the forum timed out. Please try again.".to_string()
            }
            _ => "Forum API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ForumApiError::AuthenticationFailed { .. } => "FORUM_AUTH_FAILED".to_string(),
            ForumApiError::RateLimitExceeded { .. } => "FORUM_RATE_LIMIT".to_string(),
            ForumApiError::Forbidden { .. } => "FORUM_FORBIDDEN".to_string(),
            ForumApiError::PostNotFound { .. } => "FORUM_POST_NOT_FOUND".to_string(),
            ForumApiError::InvalidToken => "FORUM_INVALID_TOKEN".to_string(),
            ForumApiError::RequestTimeout => "FORUM_TIMEOUT".to_string(),
            ForumApiError::InvalidResponse { .. } => "FORUM_INVALID_RESPONSE".to_string(),
            ForumApiError::ServerError { .. } => "FORUM_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for WarehouseError {
    fn log_error(&self) -> &Self {
        error!("WarehouseError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("WarehouseError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            WarehouseError::ConnectionFailed { .. } => {
                "Could not reach the course data warehouse. Please try again.".to_string()
            }
            WarehouseError::InvalidTableName { table } => {
                format!("'{}' is not a valid course table name.", table)
            }
            WarehouseError::UploadFailed { path, .. } => {
                format!("Uploading to {} failed.", path)
            }
            _ => "Course data lookup failed. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            WarehouseError::ConnectionFailed { .. } => "WH_CONNECTION_FAILED".to_string(),
            WarehouseError::StatementFailed { .. } => "WH_STATEMENT_FAILED".to_string(),
            WarehouseError::InvalidTableName { .. } => "WH_INVALID_TABLE".to_string(),
            WarehouseError::InvalidResult { .. } => "WH_INVALID_RESULT".to_string(),
            WarehouseError::UploadFailed { .. } => "WH_UPLOAD_FAILED".to_string(),
            WarehouseError::Sql(_) => "WH_SQL_ERROR".to_string(),
        }
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LlmError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LlmError::AuthenticationFailed { provider } => format!(
                "Authentication failed for {}. Please check your API key.",
                provider
            ),
            LlmError::RateLimitExceeded {
                provider,
                retry_after,
            } => format!(
                "Rate limit exceeded for {}. Please wait {} seconds.",
                provider, retry_after
            ),
            LlmError::EndpointNotFound { endpoint } => {
                format!("Serving endpoint '{}' does not exist.", endpoint)
            }
            LlmError::UnsupportedEndpoint { .. } => {
                "The specified endpoint is not compatible with this chatbot. \
                 Please use a chat-completions-compatible endpoint."
                    .to_string()
            }
            LlmError::ServiceUnavailable { provider } => format!(
                "{} service is temporarily unavailable. Please try again later.",
                provider
            ),
            _ => "AI service error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            LlmError::AuthenticationFailed { .. } => "LLM_AUTH_FAILED".to_string(),
            LlmError::RateLimitExceeded { .. } => "LLM_RATE_LIMIT".to_string(),
            LlmError::EndpointNotFound { .. } => "LLM_ENDPOINT_NOT_FOUND".to_string(),
            LlmError::UnsupportedEndpoint { .. } => "LLM_UNSUPPORTED_ENDPOINT".to_string(),
            LlmError::ServiceUnavailable { .. } => "LLM_SERVICE_UNAVAILABLE".to_string(),
            LlmError::RequestTimeout { .. } => "LLM_TIMEOUT".to_string(),
            LlmError::InvalidResponseFormat { .. } => "LLM_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ScoringError {
    fn log_error(&self) -> &Self {
        error!("ScoringError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ScoringError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ScoringError::MissingField { field, .. } => {
                format!("A comment was skipped because its {} is missing.", field)
            }
            ScoringError::InvalidWeights { reason } => {
                format!("Scoring weights are invalid: {}.", reason)
            }
            ScoringError::InvalidParameter { name, .. } => {
                format!("Scoring parameter '{}' is out of range.", name)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ScoringError::MissingField { .. } => "SCORING_MISSING_FIELD".to_string(),
            ScoringError::InvalidWeights { .. } => "SCORING_INVALID_WEIGHTS".to_string(),
            ScoringError::InvalidParameter { .. } => "SCORING_INVALID_PARAMETER".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::MissingFields { fields } => format!(
                "Set the following environment variables or config keys: {}.",
                fields.join(", ")
            ),
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::UnknownUniversity { id } => {
                format!("University '{}' is not configured.", id)
            }
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::MissingFields { .. } => "CONFIG_MISSING_FIELDS".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::UnknownUniversity { .. } => "CONFIG_UNKNOWN_UNIVERSITY".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Reports a fatal error with its code and the message shown to the user.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }
}
