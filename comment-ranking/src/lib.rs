//! Comment scoring and ranking.
//!
//! Each comment is reduced to three normalized features (votes, recency and
//! length), combined into a composite score with renormalized weights, and
//! ranked per discussion thread.

pub mod ranker;
pub mod scoring;

pub use ranker::{CommentRanker, RankedComment, RankedResult};
pub use scoring::{
    age_days, length_score, recency_score, vote_score, CommentScorer, NormalizedWeights,
    ScoreBreakdown,
};
