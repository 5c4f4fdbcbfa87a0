//! Offline batch tooling: course catalog scraping and forum thread scraping.

pub mod catalog;
pub mod mixer;
pub mod output;
pub mod pipeline;


pub use catalog::{
    collect_active_courses, CalendarClient, CatalogItem, CoursePage, CoursePageSource,
};
pub use mixer::{merge_round_robin, CandidateOrigin, SearchCandidate, SearchMixer};
pub use output::{load_courses, write_json};
pub use pipeline::{search_term, BatchPipeline, CommentRecord, PostRecord, ScrapeOutput};
