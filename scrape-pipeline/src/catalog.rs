//! Course catalog scraping over the university calendar's GraphQL API.

use intel_core::{CatalogConfig, CoreError, CourseSeed};
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

const COURSES_QUERY: &str = r#"
query Courses($query: String!, $skip: Int!, $limit: Int!) {
  searchCourses(query: $query, skip: $skip, limit: $limit) {
    listLength
    data {
      code
      description
      subjectCode
      status
    }
  }
}
"#;

const ACTIVE_STATUS: &str = "Active";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePage {
    #[serde(default)]
    pub list_length: u32,
    #[serde(default, rename = "data")]
    pub items: Vec<CatalogItem>,
}

/// A paged course search.
pub trait CoursePageSource {
    /// One page of results, or `None` when the response carries no data.
    async fn fetch_page(
        &self,
        query: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Option<CoursePage>, CoreError>;
}

#[derive(Debug, Clone)]
pub struct CalendarClient {
    http_client: Client,
    endpoint: String,
}

impl CalendarClient {
    pub fn new(config: &CatalogConfig, timeout: Duration) -> Result<Self, CoreError> {
        let mut headers = HeaderMap::new();
        let referer = format!(
            "{}/courses?subjectCode={}&page=1&cq=",
            config.origin, config.subject
        );
        for (name, value) in [
            (ORIGIN, config.origin.as_str()),
            (REFERER, referer.as_str()),
            (USER_AGENT, "Mozilla/5.0"),
        ] {
            let value = HeaderValue::from_str(value).map_err(|e| CoreError::InvalidInput {
                message: format!("Invalid {} header: {}", name, e),
            })?;
            headers.insert(name, value);
        }

        let http_client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl CoursePageSource for CalendarClient {
    async fn fetch_page(
        &self,
        query: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Option<CoursePage>, CoreError> {
        let body = json!({
            "query": COURSES_QUERY,
            "variables": { "query": query, "skip": skip, "limit": limit },
        });

        debug!("Fetching catalog page skip={} limit={}", skip, limit);
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        parse_page(payload)
    }
}

/// Extracts `data.searchCourses` from a GraphQL payload.
pub fn parse_page(payload: Value) -> Result<Option<CoursePage>, CoreError> {
    match payload.get("data").filter(|data| !data.is_null()) {
        Some(data) => {
            let block = data.get("searchCourses").cloned().unwrap_or(Value::Null);
            if block.is_null() {
                return Ok(None);
            }
            Ok(Some(serde_json::from_value(block)?))
        }
        None => {
            let preview: String = payload.to_string().chars().take(300).collect();
            warn!("Unexpected catalog response: {}", preview);
            Ok(None)
        }
    }
}

/// Pages through the catalog and keeps active courses of `subject`.
pub async fn collect_active_courses<S: CoursePageSource>(
    source: &S,
    subject: &str,
    page_size: u32,
) -> Result<Vec<CourseSeed>, CoreError> {
    if page_size == 0 {
        return Err(CoreError::InvalidInput {
            message: "Catalog page size must be positive".to_string(),
        });
    }

    let mut courses = Vec::new();
    let mut skip = 0u32;

    loop {
        let page = match source.fetch_page(subject, skip, page_size).await? {
            Some(page) => page,
            None => break,
        };

        courses.extend(page.items.into_iter().filter_map(|item| {
            let keep = item.subject_code.as_deref() == Some(subject)
                && item.status.as_deref() == Some(ACTIVE_STATUS);
            keep.then(|| CourseSeed {
                code: item.code.unwrap_or_default(),
                description: item.description.unwrap_or_default().trim().to_string(),
            })
        }));

        skip = skip.saturating_add(page_size);
        if skip >= page.list_length {
            break;
        }
    }

    info!("Collected {} active {} courses", courses.len(), subject);
    Ok(courses)
}
