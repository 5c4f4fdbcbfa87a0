use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Forum API error: {0}")]
    ForumApi(#[from] ForumApiError),

    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Request failed: {message}")]
    RequestFailed {
        message: String,
        status_code: Option<u16>,
    },
}

#[derive(Error, Debug, Clone)]
pub enum ForumApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Statement {statement_id} finished in state {state}: {message}")]
    StatementFailed {
        statement_id: String,
        state: String,
        message: String,
    },

    #[error("Invalid table name: {table}")]
    InvalidTableName { table: String },

    #[error("Unexpected result shape: {details}")]
    InvalidResult { details: String },

    #[error("Upload failed for {path}: status {status_code}")]
    UploadFailed { path: String, status_code: u16 },

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Provider authentication failed: {provider}")]
    AuthenticationFailed { provider: String },

    #[error("Rate limit exceeded for {provider}. Retry after {retry_after} seconds")]
    RateLimitExceeded { provider: String, retry_after: u64 },

    #[error("Endpoint not found: {endpoint}")]
    EndpointNotFound { endpoint: String },

    #[error("Endpoint {endpoint} does not serve chat completions (task: {task})")]
    UnsupportedEndpoint { endpoint: String, task: String },

    #[error("Provider service unavailable: {provider}")]
    ServiceUnavailable { provider: String },

    #[error("Request timeout for {provider}")]
    RequestTimeout { provider: String },

    #[error("Invalid response format from {provider}")]
    InvalidResponseFormat { provider: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Comment {comment_id} is missing field: {field}")]
    MissingField {
        comment_id: String,
        field: &'static str,
    },

    #[error("Invalid scoring weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("Invalid scoring parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Missing required configuration: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Unknown university: {id}")]
    UnknownUniversity { id: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
