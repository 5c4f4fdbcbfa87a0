use crate::mixer::{CandidateOrigin, SearchMixer};
use chrono::{DateTime, Utc};
use comment_ranking::{CommentRanker, RankedComment};
use forum_client::PostSource;
use intel_core::{CoreError, CourseSeed, ErrorExt, PipelineConfig, ScoringConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Course code → scraped posts, ordered by course code.
pub type ScrapeOutput = BTreeMap<String, Vec<PostRecord>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub author: String,
    pub body: String,
    pub score: i64,
    pub composite_score: f64,
}

impl From<RankedComment> for CommentRecord {
    fn from(ranked: RankedComment) -> Self {
        Self {
            author: ranked.comment.author,
            body: ranked.comment.body,
            score: ranked.comment.score,
            composite_score: ranked.breakdown.composite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub score: i64,
    pub num_comments: u32,
    pub created_utc: f64,
    pub origin: CandidateOrigin,
    pub comments: Vec<CommentRecord>,
}

/// Splits a catalog code into the form people type in posts,
/// e.g. `CPSC355` becomes `CPSC 355`.
pub fn search_term(code: &str) -> String {
    let code = code.trim();
    match code.find(|c: char| c.is_ascii_digit()) {
        Some(split) if split > 0 && !code[..split].ends_with(' ') => {
            format!("{} {}", &code[..split], &code[split..])
        }
        _ => code.to_string(),
    }
}

pub struct BatchPipeline<S> {
    source: S,
    mixer: SearchMixer,
    ranker: CommentRanker,
    posts_per_course: usize,
    comments_per_post: usize,
}

impl<S: PostSource> BatchPipeline<S> {
    pub fn new(
        source: S,
        config: &PipelineConfig,
        scoring: ScoringConfig,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            source,
            mixer: SearchMixer::from_config(config),
            ranker: CommentRanker::new(scoring)?,
            posts_per_course: config.posts_per_course,
            comments_per_post: config.comments_per_post,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn run(&self, courses: &[CourseSeed]) -> ScrapeOutput {
        self.run_at(courses, Utc::now()).await
    }

    /// Scrapes every course, scoring comment age against `now`.
    pub async fn run_at(&self, courses: &[CourseSeed], now: DateTime<Utc>) -> ScrapeOutput {
        let mut output = ScrapeOutput::new();

        for (index, course) in courses.iter().enumerate() {
            info!(
                "Scraping {} ({}/{})",
                course.code,
                index + 1,
                courses.len()
            );
            let posts = self.scrape_course(&course.code, now).await;
            if output.insert(course.code.clone(), posts).is_some() {
                warn!(
                    "Course {} is listed more than once; keeping the last scrape",
                    course.code
                );
            }
        }

        let post_count: usize = output.values().map(Vec::len).sum();
        info!(
            "Scraped {} posts across {} courses",
            post_count,
            output.len()
        );
        output
    }

    pub async fn scrape_course(&self, code: &str, now: DateTime<Utc>) -> Vec<PostRecord> {
        let term = search_term(code);
        let candidates = self
            .mixer
            .mix(&self.source, &term, self.posts_per_course)
            .await;
        if candidates.is_empty() {
            info!("No posts found for '{}'", term);
            return Vec::new();
        }

        let mut records = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let comments = match self.source.fetch_comments(&candidate.post).await {
                Ok(comments) => comments,
                Err(e) => {
                    e.log_warn();
                    debug!("Skipped post {} for {}", candidate.post.id, code);
                    continue;
                }
            };

            let ranked = self.ranker.rank(comments, self.comments_per_post, now);
            if let Some(best) = ranked.comments.first() {
                debug!("Best comment on {}: {}", candidate.post.id, best.breakdown.summary());
            }
            let post = candidate.post;
            records.push(PostRecord {
                id: post.id,
                title: post.title,
                url: post.url,
                score: post.score,
                num_comments: post.num_comments,
                created_utc: post.created_utc,
                origin: candidate.origin,
                comments: ranked.comments.into_iter().map(CommentRecord::from).collect(),
            });
        }
        records
    }
}
