use crate::error::ScoringError;
use serde::{Deserialize, Serialize};

/// A forum comment with every field the scorer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: f64,
}

/// A comment as the forum returns it. Deleted accounts, removed bodies and
/// partially loaded records leave fields empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    pub id: String,
    pub author: Option<String>,
    pub body: Option<String>,
    pub score: Option<i64>,
    pub created_utc: Option<f64>,
}

impl TryFrom<RawComment> for Comment {
    type Error = ScoringError;

    fn try_from(raw: RawComment) -> Result<Self, Self::Error> {
        let missing = |field| ScoringError::MissingField {
            comment_id: raw.id.clone(),
            field,
        };

        let body = raw.body.clone().ok_or_else(|| missing("body"))?;
        let score = raw.score.ok_or_else(|| missing("score"))?;
        let created_utc = raw.created_utc.ok_or_else(|| missing("created_utc"))?;

        Ok(Self {
            id: raw.id,
            author: raw.author.unwrap_or_else(|| "[deleted]".to_string()),
            body,
            score,
            created_utc,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: String,
    pub title: String,
    pub url: String,
    pub permalink: String,
    pub subreddit: String,
    pub score: i64,
    pub num_comments: u32,
    pub created_utc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The university a chat request is scoped to, and the table its course
/// insights live in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub id: String,
    pub label: String,
    pub table: String,
}

/// One entry of the scraping seed list, as produced by the catalog scraper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSeed {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_comment_conversion() {
        let raw = RawComment {
            id: "c1".to_string(),
            author: None,
            body: Some("Take it with Dr. Smith.".to_string()),
            score: Some(4),
            created_utc: Some(1_700_000_000.0),
        };

        let comment = Comment::try_from(raw).unwrap();
        assert_eq!(comment.author, "[deleted]");
        assert_eq!(comment.score, 4);
    }

    #[test]
    fn test_raw_comment_missing_score() {
        let raw = RawComment {
            id: "c2".to_string(),
            body: Some("body".to_string()),
            created_utc: Some(1.0),
            ..Default::default()
        };

        let err = Comment::try_from(raw).unwrap_err();
        assert_eq!(
            err,
            ScoringError::MissingField {
                comment_id: "c2".to_string(),
                field: "score"
            }
        );
    }

    #[test]
    fn test_chat_role_serialization() {
        let message = ChatMessage::user("CPSC 355");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"CPSC 355"}"#);
    }
}
