use chrono::{TimeZone, Utc};
use comment_ranking::CommentRanker;
use intel_core::{RawComment, ScoringConfig};

fn thread() -> Vec<RawComment> {
    let now = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap().timestamp() as f64;
    (0..40)
        .map(|i| {
            let body = if i % 7 == 0 {
                String::new()
            } else {
                format!("Comment {} about CPSC 355: {}", i, "assembly ".repeat(i))
            };
            RawComment {
                id: format!("c{}", i),
                author: Some(format!("user{}", i)),
                body: Some(body),
                score: Some((i as i64 * 13) % 29 - 5),
                created_utc: Some(now - (i as f64) * 3_700.0 * 11.0),
            }
        })
        .collect()
}

#[test]
fn ranking_is_deterministic() {
    let now = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
    let ranker = CommentRanker::new(ScoringConfig::default()).unwrap();

    let first = ranker.rank(thread(), 10, now);
    for _ in 0..5 {
        let again = ranker.rank(thread(), 10, now);
        assert_eq!(first, again);
    }
}

#[test]
fn ranked_output_is_sorted_and_excludes_empty_bodies() {
    let now = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
    let ranker = CommentRanker::new(ScoringConfig::default()).unwrap();

    let result = ranker.rank(thread(), 100, now);
    assert_eq!(result.filtered, 6);
    assert_eq!(result.len(), 34);
    assert!(result.comments.iter().all(|r| !r.comment.body.is_empty()));
    assert!(result
        .comments
        .windows(2)
        .all(|pair| pair[0].breakdown.composite >= pair[1].breakdown.composite));
}

#[test]
fn breakdown_serializes_for_display() {
    let now = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
    let ranker = CommentRanker::new(ScoringConfig::default()).unwrap();

    let result = ranker.rank(thread(), 1, now);
    let json = serde_json::to_value(&result.comments[0].breakdown).unwrap();
    for key in ["vote_score", "recency_score", "length_score", "composite", "votes", "age_days", "char_length"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
}
