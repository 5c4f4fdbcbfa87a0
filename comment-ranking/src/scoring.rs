use chrono::{DateTime, Utc};
use intel_core::{Comment, ScoringConfig, ScoringError};
use serde::Serialize;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Score given to comments shorter than the minimum length.
const SHORT_COMMENT_SCORE: f64 = 0.1;
/// Floor for comments longer than the optimal length.
const LONG_COMMENT_FLOOR: f64 = 0.5;
const NEGATIVE_VOTE_SCORE: f64 = 0.05;
const ZERO_VOTE_SCORE: f64 = 0.3;

/// Exponential recency decay. Negative ages count as brand new.
pub fn recency_score(age_days: f64, decay: f64) -> f64 {
    (-decay * age_days.max(0.0)).exp().min(1.0)
}

/// Piecewise length score, always within `[0.1, 1.0]`.
pub fn length_score(char_length: usize, min_length: usize, optimal_length: usize) -> f64 {
    if char_length < min_length {
        return SHORT_COMMENT_SCORE;
    }

    let length = char_length as f64;
    let optimal = optimal_length as f64;
    if char_length <= optimal_length {
        (length / optimal).max(SHORT_COMMENT_SCORE)
    } else {
        let excess = length - optimal;
        (1.0 - excess / (2.0 * optimal)).max(LONG_COMMENT_FLOOR)
    }
}

/// Log-compressed vote score. Downvoted comments keep a small positive score
/// so they can still be ranked.
pub fn vote_score(score: i64, max_score: f64) -> f64 {
    match score {
        s if s < 0 => NEGATIVE_VOTE_SCORE,
        0 => ZERO_VOTE_SCORE,
        s => ((s as f64 + 1.0).ln() / (max_score + 1.0).ln()).min(1.0),
    }
}

pub fn age_days(created_utc: f64, now: DateTime<Utc>) -> f64 {
    let now_secs = now.timestamp_millis() as f64 / 1000.0;
    ((now_secs - created_utc) / SECONDS_PER_DAY).max(0.0)
}

/// Feature weights divided by their sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedWeights {
    pub vote: f64,
    pub recency: f64,
    pub length: f64,
}

impl NormalizedWeights {
    pub fn from_config(config: &ScoringConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        let total = config.vote_weight + config.recency_weight + config.length_weight;
        Ok(Self {
            vote: config.vote_weight / total,
            recency: config.recency_weight / total,
            length: config.length_weight / total,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub vote_score: f64,
    pub recency_score: f64,
    pub length_score: f64,
    pub composite: f64,
    pub votes: i64,
    pub age_days: f64,
    pub char_length: usize,
}

impl ScoreBreakdown {
    /// One-line rendering for logs and debugging output.
    pub fn summary(&self) -> String {
        format!(
            "composite {:.3} (votes {} -> {:.3}, age {:.1}d -> {:.3}, {} chars -> {:.3})",
            self.composite,
            self.votes,
            self.vote_score,
            self.age_days,
            self.recency_score,
            self.char_length,
            self.length_score
        )
    }
}

#[derive(Debug, Clone)]
pub struct CommentScorer {
    config: ScoringConfig,
    weights: NormalizedWeights,
}

impl CommentScorer {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringError> {
        let weights = NormalizedWeights::from_config(&config)?;
        Ok(Self { config, weights })
    }

    pub fn weights(&self) -> NormalizedWeights {
        self.weights
    }

    pub fn score(&self, comment: &Comment, now: DateTime<Utc>) -> ScoreBreakdown {
        let age = age_days(comment.created_utc, now);
        let char_length = comment.body.chars().count();

        let vote = vote_score(comment.score, self.config.max_vote_score);
        let recency = recency_score(age, self.config.recency_decay);
        let length = length_score(
            char_length,
            self.config.min_length,
            self.config.optimal_length,
        );

        let composite = self.weights.vote * vote
            + self.weights.recency * recency
            + self.weights.length * length;

        ScoreBreakdown {
            vote_score: vote,
            recency_score: recency,
            length_score: length,
            composite,
            votes: comment.score,
            age_days: age,
            char_length,
        }
    }
}
