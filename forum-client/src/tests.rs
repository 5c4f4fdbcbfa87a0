#[cfg(test)]
mod tests {
    use crate::api::{self, RedditListing, RedditPostData};
    use crate::{AppOnlyAuth, ForumClient, ForumToken, PostSource, SearchSort};
    use intel_core::{ForumConfig, ForumCredentials, ForumPost, TimePeriod};
    use serde_json::{json, Value};
    use std::time::{Duration, SystemTime};

    fn create_test_credentials() -> ForumCredentials {
        ForumCredentials {
            client_id: "test_client_id".to_string(),
            client_secret: "test_client_secret".to_string(),
            user_agent: "course-intel/1.0 by test_user".to_string(),
        }
    }

    fn comment_node(id: &str, body: Value, score: Value, replies: Value) -> Value {
        json!({
            "kind": "t1",
            "data": {
                "id": id,
                "author": "student",
                "body": body,
                "score": score,
                "created_utc": 1_725_000_000.0,
                "replies": replies
            }
        })
    }

    fn comment_listing() -> Value {
        json!({
            "kind": "Listing",
            "data": {
                "after": null,
                "before": null,
                "dist": null,
                "children": [
                    comment_node(
                        "a",
                        json!("Assignments take 20+ hours."),
                        json!(23),
                        json!({
                            "kind": "Listing",
                            "data": {
                                "after": null,
                                "before": null,
                                "children": [
                                    comment_node("a1", json!("Start early."), json!(4), json!("")),
                                    { "kind": "more", "data": { "count": 12, "children": ["x", "y"] } }
                                ]
                            }
                        })
                    ),
                    comment_node("b", json!("[removed]"), json!(1), json!("")),
                    comment_node("c", Value::Null, Value::Null, json!("")),
                    { "kind": "more", "data": { "count": 40, "children": ["z"] } }
                ]
            }
        })
    }

    #[test]
    fn test_flatten_drops_more_placeholders() {
        let listing: RedditListing<Value> = serde_json::from_value(comment_listing()).unwrap();
        let comments = api::flatten_comment_tree(listing);

        let ids: Vec<_> = comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "b", "c"]);
        assert_eq!(comments[0].score, Some(23));
        assert_eq!(comments[1].body.as_deref(), Some("Start early."));
        // partial records are passed through for the ranker to reject
        assert_eq!(comments[3].body, None);
        assert_eq!(comments[3].score, None);
    }

    #[test]
    fn test_flatten_empty_listing() {
        let listing: RedditListing<Value> = serde_json::from_value(json!({
            "kind": "Listing",
            "data": { "children": [], "after": null, "before": null }
        }))
        .unwrap();
        assert!(api::flatten_comment_tree(listing).is_empty());
    }

    #[test]
    fn test_search_listing_parses_into_posts() {
        let listing: RedditListing<RedditPostData> = serde_json::from_value(json!({
            "kind": "Listing",
            "data": {
                "after": "t3_next",
                "before": null,
                "dist": 1,
                "children": [{
                    "kind": "t3",
                    "data": {
                        "id": "ucalg001",
                        "title": "CPSC 355 is killing me",
                        "selftext": "Any tips?",
                        "author": "throwaway123",
                        "subreddit": "UCalgary",
                        "url": "https://www.reddit.com/r/UCalgary/comments/ucalg001/",
                        "permalink": "/r/UCalgary/comments/ucalg001/",
                        "created_utc": 1_725_193_800.0,
                        "score": 23,
                        "num_comments": 14
                    }
                }]
            }
        }))
        .unwrap();

        assert_eq!(listing.data.after.as_deref(), Some("t3_next"));
        let post: ForumPost = listing.data.children[0].data.clone().into();
        assert_eq!(post.id, "ucalg001");
        assert_eq!(post.title, "CPSC 355 is killing me");
        assert_eq!(post.score, 23);
        assert_eq!(post.num_comments, 14);
    }

    #[test]
    fn test_search_sort_display() {
        assert_eq!(SearchSort::New.to_string(), "new");
        assert_eq!(SearchSort::Top(TimePeriod::All).to_string(), "top/all");
        assert_eq!(SearchSort::Top(TimePeriod::Month).sort_param(), "top");
    }

    #[test]
    fn test_client_creation() {
        let client = ForumClient::new(
            &ForumConfig::default(),
            create_test_credentials(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.subreddits(), "uofc+UCalgary+UofCalgary+Calgary");
        assert_eq!(client.api().user_agent(), "course-intel/1.0 by test_user");
        assert_eq!(client.api().pacer().interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_client_requires_subreddits() {
        let config = ForumConfig {
            subreddits: Vec::new(),
            ..ForumConfig::default()
        };
        assert!(ForumClient::new(&config, create_test_credentials(), Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_token_expiry() {
        let valid = ForumToken {
            access_token: "valid".to_string(),
            expires_at: SystemTime::now() + Duration::from_secs(3600),
        };
        let nearly_expired = ForumToken {
            access_token: "soon".to_string(),
            expires_at: SystemTime::now() + Duration::from_secs(30),
        };
        assert!(!valid.is_expired());
        assert!(nearly_expired.is_expired());
    }

    #[tokio::test]
    async fn test_cached_token_is_reused() {
        let auth = AppOnlyAuth::new(
            &ForumConfig::default(),
            &create_test_credentials(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(!auth.is_authenticated().await);

        auth.set_token(ForumToken {
            access_token: "cached-token".to_string(),
            expires_at: SystemTime::now() + Duration::from_secs(3600),
        })
        .await;

        assert!(auth.is_authenticated().await);
        assert_eq!(auth.access_token().await.unwrap(), "cached-token");
    }

    #[tokio::test]
    async fn test_search_with_unreachable_api_fails() {
        let config = ForumConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            courtesy_delay_ms: 0,
            ..ForumConfig::default()
        };
        let client =
            ForumClient::new(&config, create_test_credentials(), Duration::from_secs(2)).unwrap();
        client
            .auth()
            .set_token(ForumToken {
                access_token: "cached-token".to_string(),
                expires_at: SystemTime::now() + Duration::from_secs(3600),
            })
            .await;

        let result = client.search_posts("CPSC 355", SearchSort::New, 5).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_token_serialization() {
        let token = ForumToken {
            access_token: "test_access_token".to_string(),
            expires_at: SystemTime::UNIX_EPOCH + Duration::from_secs(1640995200),
        };

        let serialized = serde_json::to_string(&token).unwrap();
        assert!(serialized.contains("test_access_token"));

        let deserialized: ForumToken = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.access_token, token.access_token);
        assert_eq!(deserialized.expires_at, token.expires_at);
    }
}
