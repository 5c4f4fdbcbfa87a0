use intel_core::{
    ConfigError, CoreError, ErrorExt, ErrorReporter, ForumApiError, LlmError, ScoringError,
    WarehouseError,
};

#[test]
fn test_error_codes() {
    let forum_error = CoreError::ForumApi(ForumApiError::InvalidToken);
    assert_eq!(forum_error.error_code(), "FORUM_API");

    let warehouse_error = CoreError::Warehouse(WarehouseError::InvalidTableName {
        table: "courses; DROP TABLE x".to_string(),
    });
    assert_eq!(warehouse_error.error_code(), "WAREHOUSE");

    let llm_error = CoreError::Llm(LlmError::AuthenticationFailed {
        provider: "openai".to_string(),
    });
    assert_eq!(llm_error.error_code(), "LLM");

    let scoring_error = CoreError::Scoring(ScoringError::InvalidWeights {
        reason: "weights sum to zero".to_string(),
    });
    assert_eq!(scoring_error.error_code(), "SCORING");

    let config_error = CoreError::Config(ConfigError::UnknownUniversity {
        id: "waterloo".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");
}

#[test]
fn test_missing_fields_message_names_every_variable() {
    let error = CoreError::Config(ConfigError::MissingFields {
        fields: vec![
            "DATABRICKS_SERVER_NAME".to_string(),
            "DATABRICKS_ACCESS_TOKEN".to_string(),
        ],
    });

    let display = error.to_string();
    assert!(display.contains("DATABRICKS_SERVER_NAME, DATABRICKS_ACCESS_TOKEN"));

    let message = error.user_friendly_message();
    assert!(message.contains("DATABRICKS_SERVER_NAME"));
    assert!(message.contains("DATABRICKS_ACCESS_TOKEN"));
}

#[test]
fn test_user_friendly_messages() {
    let forum_error = CoreError::ForumApi(ForumApiError::InvalidToken);
    let message = forum_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let llm_error = CoreError::Llm(LlmError::UnsupportedEndpoint {
        endpoint: "my-embeddings".to_string(),
        task: "llm/v1/embeddings".to_string(),
    });
    assert!(llm_error
        .user_friendly_message()
        .contains("chat-completions-compatible"));

    let config_error = CoreError::Config(ConfigError::UnknownUniversity {
        id: "waterloo".to_string(),
    });
    assert!(config_error.user_friendly_message().contains("waterloo"));
}

#[test]
fn test_nested_error_codes() {
    assert_eq!(
        ForumApiError::RateLimitExceeded { retry_after: 60 }.error_code(),
        "FORUM_RATE_LIMIT"
    );
    assert_eq!(
        ScoringError::MissingField {
            comment_id: "abc".to_string(),
            field: "body"
        }
        .error_code(),
        "SCORING_MISSING_FIELD"
    );
}

#[test]
fn test_error_reporter() {
    let error = CoreError::ForumApi(ForumApiError::InvalidToken);

    // This test just ensures the methods don't panic
    ErrorReporter::new().report_error(&error);
    error.log_warn();
}
