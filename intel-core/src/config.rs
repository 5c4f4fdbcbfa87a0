//! Application configuration.
//!
//! Values come from an optional TOML file and are then overridden by the
//! environment. Nothing is validated until a command asks for the section it
//! needs, so `catalog` runs without warehouse credentials and `chat` runs
//! without forum credentials.

use crate::error::{ConfigError, ScoringError};
use crate::types::University;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_WAREHOUSE_HOST: &str = "DATABRICKS_SERVER_NAME";
pub const ENV_WAREHOUSE_HTTP_PATH: &str = "DATABRICKS_HTTP_PATH";
pub const ENV_WAREHOUSE_TOKEN: &str = "DATABRICKS_ACCESS_TOKEN";
pub const ENV_SERVING_ENDPOINT: &str = "SERVING_ENDPOINT";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_FORUM_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_FORUM_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_FORUM_USER_AGENT: &str = "REDDIT_USER_AGENT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub warehouse: WarehouseConfig,
    pub serving: ServingConfig,
    pub openai: OpenAiConfig,
    pub forum: ForumConfig,
    pub scoring: ScoringConfig,
    pub pipeline: PipelineConfig,
    pub catalog: CatalogConfig,
    pub http: HttpConfig,
    pub universities: Vec<University>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            warehouse: WarehouseConfig::default(),
            serving: ServingConfig::default(),
            openai: OpenAiConfig::default(),
            forum: ForumConfig::default(),
            scoring: ScoringConfig::default(),
            pipeline: PipelineConfig::default(),
            catalog: CatalogConfig::default(),
            http: HttpConfig::default(),
            universities: default_universities(),
        }
    }
}

fn default_universities() -> Vec<University> {
    let table = "workspace.default.reddit_posts".to_string();
    vec![
        University {
            id: "uoft".to_string(),
            label: "University of Toronto".to_string(),
            table: table.clone(),
        },
        University {
            id: "uw".to_string(),
            label: "University of Waterloo".to_string(),
            table: table.clone(),
        },
        University {
            id: "calgary".to_string(),
            label: "University of Calgary".to_string(),
            table,
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub host: Option<String>,
    pub http_path: Option<String>,
    pub token: Option<String>,
    /// How long the statement API may block before returning.
    pub wait_timeout_secs: u32,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            host: None,
            http_path: None,
            token: None,
            wait_timeout_secs: 30,
        }
    }
}

impl WarehouseConfig {
    /// The warehouse id is the last segment of the HTTP path,
    /// e.g. `/sql/1.0/warehouses/abc123`.
    pub fn warehouse_id(&self) -> Option<&str> {
        self.http_path
            .as_deref()
            .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingConfig {
    pub endpoint: Option<String>,
    pub max_tokens: u32,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            max_tokens: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 256,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: String,
    pub subreddits: Vec<String>,
    pub api_base: String,
    pub auth_url: String,
    pub token_url: String,
    /// Pause between consecutive forum requests.
    pub courtesy_delay_ms: u64,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            user_agent: "htn-reddit-scraper".to_string(),
            subreddits: vec![
                "uofc".to_string(),
                "UCalgary".to_string(),
                "UofCalgary".to_string(),
                "Calgary".to_string(),
            ],
            api_base: "https://oauth.reddit.com".to_string(),
            auth_url: "https://www.reddit.com/api/v1/authorize".to_string(),
            token_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            courtesy_delay_ms: 1000,
        }
    }
}

impl ForumConfig {
    pub fn courtesy_delay(&self) -> Duration {
        Duration::from_millis(self.courtesy_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub vote_weight: f64,
    pub recency_weight: f64,
    pub length_weight: f64,
    /// Exponential decay per day of comment age.
    pub recency_decay: f64,
    pub min_length: usize,
    pub optimal_length: usize,
    /// Vote count that maps to a full vote score.
    pub max_vote_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            vote_weight: 0.25,
            recency_weight: 0.25,
            length_weight: 0.5,
            recency_decay: 0.1,
            min_length: 20,
            optimal_length: 200,
            max_vote_score: 100.0,
        }
    }
}

impl ScoringConfig {
    pub fn with_weights(mut self, vote: f64, recency: f64, length: f64) -> Self {
        self.vote_weight = vote;
        self.recency_weight = recency;
        self.length_weight = length;
        self
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        let weights = [self.vote_weight, self.recency_weight, self.length_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ScoringError::InvalidWeights {
                reason: format!("weights must be finite and non-negative, got {:?}", weights),
            });
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(ScoringError::InvalidWeights {
                reason: "weights sum to zero".to_string(),
            });
        }
        if !self.recency_decay.is_finite() || self.recency_decay < 0.0 {
            return Err(ScoringError::InvalidParameter {
                name: "recency_decay",
                value: self.recency_decay,
            });
        }
        if self.optimal_length == 0 {
            return Err(ScoringError::InvalidParameter {
                name: "optimal_length",
                value: 0.0,
            });
        }
        // below optimal/10 the ramp would dip under the short-comment score
        if self.min_length > self.optimal_length
            || self.min_length.saturating_mul(10) < self.optimal_length
        {
            return Err(ScoringError::InvalidParameter {
                name: "min_length",
                value: self.min_length as f64,
            });
        }
        if !self.max_vote_score.is_finite() || self.max_vote_score <= 0.0 {
            return Err(ScoringError::InvalidParameter {
                name: "max_vote_score",
                value: self.max_vote_score,
            });
        }
        Ok(())
    }
}

/// Sort window for the popularity half of the search mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::Hour => "hour",
            TimePeriod::Day => "day",
            TimePeriod::Week => "week",
            TimePeriod::Month => "month",
            TimePeriod::Year => "year",
            TimePeriod::All => "all",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub posts_per_course: usize,
    pub comments_per_post: usize,
    pub top_period: TimePeriod,
    /// Extra results requested from each search to absorb duplicates.
    pub overfetch: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            posts_per_course: 5,
            comments_per_post: 5,
            top_period: TimePeriod::All,
            overfetch: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub endpoint: String,
    pub origin: String,
    pub subject: String,
    pub page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://calendar.ucalgary.ca/graphql".to_string(),
            origin: "https://calendar.ucalgary.ca".to_string(),
            subject: "CPSC".to_string(),
            page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Validated workspace host and token, shared by the warehouse and the
/// serving endpoint.
#[derive(Debug, Clone)]
pub struct WorkspaceCredentials {
    pub host: String,
    pub token: String,
}

impl WorkspaceCredentials {
    /// Host as an absolute URL without a trailing slash. Server names are
    /// usually given without a scheme.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

/// Validated warehouse credentials.
#[derive(Debug, Clone)]
pub struct WarehouseCredentials {
    pub workspace: WorkspaceCredentials,
    pub http_path: String,
    pub warehouse_id: String,
}

/// Validated forum credentials.
#[derive(Debug, Clone)]
pub struct ForumCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Overrides credentials with values from `lookup`. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_WAREHOUSE_HOST) {
            self.warehouse.host = Some(v);
        }
        if let Some(v) = get(ENV_WAREHOUSE_HTTP_PATH) {
            self.warehouse.http_path = Some(v);
        }
        if let Some(v) = get(ENV_WAREHOUSE_TOKEN) {
            self.warehouse.token = Some(v);
        }
        if let Some(v) = get(ENV_SERVING_ENDPOINT) {
            self.serving.endpoint = Some(v);
        }
        if let Some(v) = get(ENV_OPENAI_API_KEY) {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = get(ENV_FORUM_CLIENT_ID) {
            self.forum.client_id = Some(v);
        }
        if let Some(v) = get(ENV_FORUM_CLIENT_SECRET) {
            self.forum.client_secret = Some(v);
        }
        if let Some(v) = get(ENV_FORUM_USER_AGENT) {
            self.forum.user_agent = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring
            .validate()
            .map_err(|e| ConfigError::ValidationFailed {
                reason: e.to_string(),
            })?;
        if self.universities.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one university must be configured".to_string(),
            });
        }
        if self.catalog.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "catalog.page_size".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn require_warehouse(&self) -> Result<WarehouseCredentials, ConfigError> {
        let mut missing = Vec::new();
        let host = present(&self.warehouse.host, ENV_WAREHOUSE_HOST, &mut missing);
        let http_path = present(&self.warehouse.http_path, ENV_WAREHOUSE_HTTP_PATH, &mut missing);
        let token = present(&self.warehouse.token, ENV_WAREHOUSE_TOKEN, &mut missing);

        match (host, http_path, token) {
            (Some(host), Some(http_path), Some(token)) => {
                let warehouse_id = self
                    .warehouse
                    .warehouse_id()
                    .ok_or_else(|| ConfigError::InvalidValue {
                        field: ENV_WAREHOUSE_HTTP_PATH.to_string(),
                        value: http_path.clone(),
                    })?
                    .to_string();
                Ok(WarehouseCredentials {
                    workspace: WorkspaceCredentials { host, token },
                    http_path,
                    warehouse_id,
                })
            }
            _ => Err(ConfigError::MissingFields { fields: missing }),
        }
    }

    /// Host and token only; the serving endpoint does not need a warehouse.
    pub fn require_workspace(&self) -> Result<WorkspaceCredentials, ConfigError> {
        let mut missing = Vec::new();
        let host = present(&self.warehouse.host, ENV_WAREHOUSE_HOST, &mut missing);
        let token = present(&self.warehouse.token, ENV_WAREHOUSE_TOKEN, &mut missing);

        match (host, token) {
            (Some(host), Some(token)) => Ok(WorkspaceCredentials { host, token }),
            _ => Err(ConfigError::MissingFields { fields: missing }),
        }
    }

    pub fn require_serving_endpoint(&self) -> Result<String, ConfigError> {
        let mut missing = Vec::new();
        present(&self.serving.endpoint, ENV_SERVING_ENDPOINT, &mut missing)
            .ok_or(ConfigError::MissingFields { fields: missing })
    }

    pub fn require_openai_key(&self) -> Result<String, ConfigError> {
        let mut missing = Vec::new();
        present(&self.openai.api_key, ENV_OPENAI_API_KEY, &mut missing)
            .ok_or(ConfigError::MissingFields { fields: missing })
    }

    pub fn require_forum(&self) -> Result<ForumCredentials, ConfigError> {
        let mut missing = Vec::new();
        let client_id = present(&self.forum.client_id, ENV_FORUM_CLIENT_ID, &mut missing);
        let client_secret = present(
            &self.forum.client_secret,
            ENV_FORUM_CLIENT_SECRET,
            &mut missing,
        );

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(ForumCredentials {
                client_id,
                client_secret,
                user_agent: self.forum.user_agent.clone(),
            }),
            _ => Err(ConfigError::MissingFields { fields: missing }),
        }
    }

    pub fn university(&self, id: &str) -> Result<University, ConfigError> {
        self.universities
            .iter()
            .find(|u| u.id.eq_ignore_ascii_case(id))
            .cloned()
            .ok_or_else(|| ConfigError::UnknownUniversity { id: id.to_string() })
    }
}

fn present(value: &Option<String>, name: &str, missing: &mut Vec<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            missing.push(name.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.scoring.length_weight, 0.5);
        assert_eq!(config.serving.max_tokens, 256);
        assert_eq!(config.forum.courtesy_delay(), Duration::from_secs(1));
        assert_eq!(config.universities.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_require_warehouse_reports_every_missing_field() {
        let config = AppConfig::default();
        let err = config.require_warehouse().unwrap_err();
        match err {
            ConfigError::MissingFields { fields } => {
                assert_eq!(
                    fields,
                    vec![
                        ENV_WAREHOUSE_HOST.to_string(),
                        ENV_WAREHOUSE_HTTP_PATH.to_string(),
                        ENV_WAREHOUSE_TOKEN.to_string()
                    ]
                );
            }
            other => panic!("Expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            (ENV_WAREHOUSE_HOST, "https://adb-123.azuredatabricks.net"),
            (ENV_WAREHOUSE_HTTP_PATH, "/sql/1.0/warehouses/abc123"),
            (ENV_WAREHOUSE_TOKEN, "dapi-token"),
            (ENV_SERVING_ENDPOINT, "   "),
        ]);
        let mut config = AppConfig::default();
        config.apply_env_from(|key| vars.get(key).cloned());

        let creds = config.require_warehouse().unwrap();
        assert_eq!(creds.warehouse_id, "abc123");
        assert_eq!(creds.workspace.token, "dapi-token");
        assert_eq!(
            creds.workspace.base_url(),
            "https://adb-123.azuredatabricks.net"
        );

        // blank values do not count as configured
        assert!(config.require_serving_endpoint().is_err());
    }

    #[test]
    fn test_workspace_base_url_adds_scheme() {
        let creds = WorkspaceCredentials {
            host: "adb-42.cloud.databricks.com/".to_string(),
            token: "t".to_string(),
        };
        assert_eq!(creds.base_url(), "https://adb-42.cloud.databricks.com");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[scoring]
vote_weight = 1.0
recency_weight = 1.0
length_weight = 2.0

[pipeline]
posts_per_course = 8
top_period = "year"

[[universities]]
id = "calgary"
label = "University of Calgary"
table = "workspace.default.course_summaries"
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.scoring.length_weight, 2.0);
        assert_eq!(config.scoring.recency_decay, 0.1);
        assert_eq!(config.pipeline.posts_per_course, 8);
        assert_eq!(config.pipeline.top_period, TimePeriod::Year);
        assert_eq!(config.universities.len(), 1);
        assert_eq!(
            config.university("CALGARY").unwrap().table,
            "workspace.default.course_summaries"
        );
        assert!(matches!(
            config.university("uoft"),
            Err(ConfigError::UnknownUniversity { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file(Path::new("/nonexistent/course-intel.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut config = AppConfig::default();
        config.scoring = config.scoring.with_weights(0.0, 0.0, 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));

        config.scoring = config.scoring.with_weights(-1.0, 1.0, 1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_length_must_keep_length_ramp_above_floor() {
        assert!(ScoringConfig::default().validate().is_ok());

        for (min_length, optimal_length) in [(0, 200), (19, 200), (300, 200)] {
            let scoring = ScoringConfig {
                min_length,
                optimal_length,
                ..ScoringConfig::default()
            };
            assert!(
                matches!(
                    scoring.validate(),
                    Err(ScoringError::InvalidParameter {
                        name: "min_length",
                        ..
                    })
                ),
                "min_length {} accepted for optimal {}",
                min_length,
                optimal_length
            );
        }
    }
}
