use crate::pacing::Pacer;
use crate::SearchSort;
use intel_core::{CoreError, ForumApiError, ForumPost, RawComment};
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// Reddit caps listing pages at 100 items.
pub const MAX_LISTING_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub author: Option<String>,
    pub subreddit: String,
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u32,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub stickied: bool,
}

/// A `t1` node of a comment tree. `replies` is either an empty string or a
/// nested listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    #[serde(default)]
    pub id: String,
    pub author: Option<String>,
    pub body: Option<String>,
    pub score: Option<i64>,
    pub created_utc: Option<f64>,
    #[serde(default)]
    pub replies: Value,
}

impl From<RedditPostData> for ForumPost {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            title: post_data.title,
            url: post_data.url,
            permalink: post_data.permalink,
            subreddit: post_data.subreddit,
            score: post_data.score,
            num_comments: post_data.num_comments,
            created_utc: post_data.created_utc,
        }
    }
}

impl From<RedditCommentData> for RawComment {
    fn from(data: RedditCommentData) -> Self {
        Self {
            id: data.id,
            author: data.author,
            body: data.body,
            score: data.score,
            created_utc: data.created_utc,
        }
    }
}

/// Flattens a comment listing depth-first.
///
/// `more` placeholders are dropped rather than expanded, so only comments the
/// forum returned inline are kept. Deep threads are truncated wherever the
/// forum decided to paginate.
pub fn flatten_comment_tree(listing: RedditListing<Value>) -> Vec<RawComment> {
    let mut comments = Vec::new();
    collect_comments(listing.data.children, &mut comments);
    comments
}

fn collect_comments(children: Vec<RedditListingChild<Value>>, out: &mut Vec<RawComment>) {
    for child in children {
        match child.kind.as_str() {
            "t1" => match serde_json::from_value::<RedditCommentData>(child.data) {
                Ok(mut data) => {
                    let replies = std::mem::take(&mut data.replies);
                    out.push(data.into());
                    if replies.is_object() {
                        match serde_json::from_value::<RedditListing<Value>>(replies) {
                            Ok(nested) => collect_comments(nested.data.children, out),
                            Err(e) => warn!("Ignoring malformed replies listing: {}", e),
                        }
                    }
                }
                Err(e) => warn!("Skipping malformed comment node: {}", e),
            },
            "more" => debug!("Dropping 'load more' placeholder"),
            other => debug!("Ignoring unexpected node kind {}", other),
        }
    }
}

/// Query parameters for a subreddit search.
pub fn search_params(query: &str, sort: SearchSort, limit: usize) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", query.to_string()),
        ("restrict_sr", "1".to_string()),
        ("sort", sort.sort_param().to_string()),
        ("limit", limit.min(MAX_LISTING_LIMIT).to_string()),
        ("raw_json", "1".to_string()),
    ];
    if let SearchSort::Top(period) = sort {
        params.push(("t", period.as_str().to_string()));
    }
    params
}

#[derive(Debug)]
pub struct ForumApiClient {
    http_client: Client,
    pacer: Arc<Pacer>,
    api_base: String,
    user_agent: String,
}

impl ForumApiClient {
    pub fn new(
        api_base: &str,
        user_agent: String,
        timeout: Duration,
        courtesy_delay: Duration,
    ) -> Result<Self, CoreError> {
        let parsed = Url::parse(api_base).map_err(|e| CoreError::InvalidInput {
            message: format!("Invalid forum API base '{}': {}", api_base, e),
        })?;

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            pacer: Arc::new(Pacer::new(courtesy_delay)),
            api_base: parsed.as_str().trim_end_matches('/').to_string(),
            user_agent,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, String)],
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.api_base, endpoint);

        let waited = self.pacer.wait().await;
        if !waited.is_zero() {
            debug!("Courtesy delay of {:?} before {} {}", waited, method, endpoint);
        }

        let request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .query(query_params);

        info!("Making forum API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::ForumApi(ForumApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let err = match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                ForumApiError::RateLimitExceeded { retry_after }
            }
            401 => ForumApiError::InvalidToken,
            403 => ForumApiError::Forbidden {
                resource: endpoint.to_string(),
            },
            404 => ForumApiError::InvalidResponse {
                details: "Resource not found".to_string(),
            },
            code if status.is_server_error() => ForumApiError::ServerError { status_code: code },
            code => ForumApiError::InvalidResponse {
                details: format!("Unexpected status {}", code),
            },
        };
        Err(CoreError::ForumApi(err))
    }

    pub async fn search_posts(
        &self,
        access_token: &str,
        subreddits: &str,
        query: &str,
        sort: SearchSort,
        limit: usize,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/search", subreddits);
        let params = search_params(query, sort, limit);

        let response = self
            .make_request(Method::GET, &endpoint, access_token, &params)
            .await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse search results: {}", e);
            CoreError::ForumApi(ForumApiError::InvalidResponse {
                details: format!("Failed to parse search results for '{}'", query),
            })
        })?;

        info!(
            "Search '{}' ({}) returned {} posts",
            query,
            sort,
            listing.data.children.len()
        );
        Ok(listing)
    }

    /// Fetches the comment tree of a post, flattened.
    pub async fn get_comments(
        &self,
        access_token: &str,
        post_id: &str,
    ) -> Result<Vec<RawComment>, CoreError> {
        let endpoint = format!("/comments/{}", post_id);
        let params = [("raw_json", "1".to_string())];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, &params)
            .await?;

        // The response is [post listing, comment listing].
        let mut listings: Vec<RedditListing<Value>> = response.json().await.map_err(|e| {
            error!("Failed to parse comment tree for {}: {}", post_id, e);
            CoreError::ForumApi(ForumApiError::InvalidResponse {
                details: format!("Failed to parse comments for post {}", post_id),
            })
        })?;

        if listings.len() < 2 {
            return Err(CoreError::ForumApi(ForumApiError::PostNotFound {
                post_id: post_id.to_string(),
            }));
        }

        let comments = flatten_comment_tree(listings.swap_remove(1));
        debug!("Loaded {} comments for post {}", comments.len(), post_id);
        Ok(comments)
    }
}
