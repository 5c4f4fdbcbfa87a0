use crate::scoring::{CommentScorer, ScoreBreakdown};
use chrono::{DateTime, Utc};
use intel_core::{Comment, ErrorExt, RawComment, ScoringConfig, ScoringError};
use serde::Serialize;
use tracing::debug;

/// Bodies the forum substitutes for moderated or deleted comments.
const REMOVED_BODIES: [&str; 2] = ["[removed]", "[deleted]"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedComment {
    pub comment: Comment,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedResult {
    /// Highest composite score first.
    pub comments: Vec<RankedComment>,
    /// Comments dropped for an empty or removed body.
    pub filtered: usize,
    /// Comments dropped because they could not be scored.
    pub skipped: usize,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CommentRanker {
    scorer: CommentScorer,
}

impl CommentRanker {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringError> {
        Ok(Self {
            scorer: CommentScorer::new(config)?,
        })
    }

    pub fn scorer(&self) -> &CommentScorer {
        &self.scorer
    }

    /// Scores every usable comment and keeps the best `top_n`.
    ///
    /// Equal composite scores keep their input order.
    pub fn rank(
        &self,
        comments: Vec<RawComment>,
        top_n: usize,
        now: DateTime<Utc>,
    ) -> RankedResult {
        let mut result = RankedResult::default();
        let mut ranked = Vec::with_capacity(comments.len());

        for raw in comments {
            if is_removed(raw.body.as_deref()) {
                result.filtered += 1;
                continue;
            }

            match Comment::try_from(raw) {
                Ok(comment) => {
                    let breakdown = self.scorer.score(&comment, now);
                    ranked.push(RankedComment { comment, breakdown });
                }
                Err(e) => {
                    e.log_warn();
                    result.skipped += 1;
                }
            }
        }

        // sort_by is stable
        ranked.sort_by(|a, b| b.breakdown.composite.total_cmp(&a.breakdown.composite));
        ranked.truncate(top_n);

        debug!(
            "Ranked {} comments ({} filtered, {} skipped)",
            ranked.len(),
            result.filtered,
            result.skipped
        );
        result.comments = ranked;
        result
    }
}

/// A present but blank or moderator-replaced body. A missing body is left for
/// the scorer to reject.
fn is_removed(body: Option<&str>) -> bool {
    match body.map(str::trim) {
        Some(text) => text.is_empty() || REMOVED_BODIES.contains(&text),
        None => false,
    }
}
