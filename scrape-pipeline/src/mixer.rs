use forum_client::{PostSource, SearchSort};
use intel_core::{ForumPost, PipelineConfig, TimePeriod};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Which search produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateOrigin {
    Newest,
    Top,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub post: ForumPost,
    pub origin: CandidateOrigin,
}

/// Interleaves a newest-first search with a top-by-period search.
#[derive(Debug, Clone)]
pub struct SearchMixer {
    top_period: TimePeriod,
    overfetch: usize,
}

impl SearchMixer {
    pub fn new(top_period: TimePeriod, overfetch: usize) -> Self {
        Self {
            top_period,
            overfetch,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.top_period, config.overfetch)
    }

    /// Each search asks for a little over half the total so the merge still
    /// fills up after duplicates are dropped.
    pub fn per_search_limit(&self, total: usize) -> usize {
        (total + 1) / 2 + self.overfetch
    }

    /// Returns at most `total` unique posts for `term`.
    ///
    /// If either search fails the result is empty rather than partial.
    pub async fn mix<S: PostSource>(
        &self,
        source: &S,
        term: &str,
        total: usize,
    ) -> Vec<SearchCandidate> {
        if total == 0 {
            return Vec::new();
        }

        let limit = self.per_search_limit(total);
        let newest = match source.search_posts(term, SearchSort::New, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!("Newest search for '{}' failed: {}", term, e);
                return Vec::new();
            }
        };

        let top_sort = SearchSort::Top(self.top_period);
        let top = match source.search_posts(term, top_sort, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!("{} search for '{}' failed: {}", top_sort, term, e);
                return Vec::new();
            }
        };

        debug!(
            "Merging {} newest and {} top posts for '{}'",
            newest.len(),
            top.len(),
            term
        );
        merge_round_robin(newest, top, total)
    }
}

/// Alternates between the two lists, skipping ids already taken, until
/// `total` posts are collected or both lists run out.
pub fn merge_round_robin(
    newest: Vec<ForumPost>,
    top: Vec<ForumPost>,
    total: usize,
) -> Vec<SearchCandidate> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(total);
    let mut newest = newest.into_iter();
    let mut top = top.into_iter();

    loop {
        let next_new = newest.next();
        let next_top = top.next();
        if next_new.is_none() && next_top.is_none() {
            break;
        }

        for (post, origin) in [
            (next_new, CandidateOrigin::Newest),
            (next_top, CandidateOrigin::Top),
        ] {
            let Some(post) = post else { continue };
            if merged.len() >= total {
                return merged;
            }
            if seen.insert(post.id.clone()) {
                merged.push(SearchCandidate { post, origin });
            }
        }

        if merged.len() >= total {
            break;
        }
    }

    merged
}
