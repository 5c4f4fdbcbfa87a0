pub mod api;
pub mod auth;
pub mod pacing;

#[cfg(test)]
mod tests;

pub use api::{flatten_comment_tree, ForumApiClient};
pub use auth::{AppOnlyAuth, ForumToken};
pub use pacing::Pacer;

use intel_core::{CoreError, ForumConfig, ForumCredentials, ForumPost, RawComment, TimePeriod};
use std::fmt;
use std::time::Duration;

/// Ordering requested from a forum search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSort {
    New,
    Top(TimePeriod),
}

impl SearchSort {
    pub fn sort_param(&self) -> &'static str {
        match self {
            SearchSort::New => "new",
            SearchSort::Top(_) => "top",
        }
    }
}

impl fmt::Display for SearchSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchSort::New => write!(f, "new"),
            SearchSort::Top(period) => write!(f, "top/{}", period.as_str()),
        }
    }
}

/// Anything that can search discussion posts and load their comments.
pub trait PostSource {
    async fn search_posts(
        &self,
        query: &str,
        sort: SearchSort,
        limit: usize,
    ) -> Result<Vec<ForumPost>, CoreError>;

    async fn fetch_comments(&self, post: &ForumPost) -> Result<Vec<RawComment>, CoreError>;
}

/// Authenticated, paced client over a fixed set of subreddits.
#[derive(Debug)]
pub struct ForumClient {
    auth: AppOnlyAuth,
    api: ForumApiClient,
    subreddits: String,
}

impl ForumClient {
    pub fn new(
        config: &ForumConfig,
        credentials: ForumCredentials,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        if config.subreddits.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "At least one subreddit must be configured".to_string(),
            });
        }

        let auth = AppOnlyAuth::new(config, &credentials, timeout)?;
        let api = ForumApiClient::new(
            &config.api_base,
            credentials.user_agent,
            timeout,
            config.courtesy_delay(),
        )?;

        Ok(Self {
            auth,
            api,
            subreddits: config.subreddits.join("+"),
        })
    }

    pub fn subreddits(&self) -> &str {
        &self.subreddits
    }

    pub fn auth(&self) -> &AppOnlyAuth {
        &self.auth
    }

    pub fn api(&self) -> &ForumApiClient {
        &self.api
    }
}

impl PostSource for ForumClient {
    async fn search_posts(
        &self,
        query: &str,
        sort: SearchSort,
        limit: usize,
    ) -> Result<Vec<ForumPost>, CoreError> {
        let token = self.auth.access_token().await?;
        let listing = self
            .api
            .search_posts(&token, &self.subreddits, query, sort, limit)
            .await?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| ForumPost::from(child.data))
            .collect())
    }

    async fn fetch_comments(&self, post: &ForumPost) -> Result<Vec<RawComment>, CoreError> {
        let token = self.auth.access_token().await?;
        self.api.get_comments(&token, &post.id).await
    }
}
