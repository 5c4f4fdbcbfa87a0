pub mod insight;
pub mod local;
pub mod statement;
pub mod volume;


pub use insight::{format_context, CourseInsight, COURSE_FETCH_ERROR, NO_COURSE_INFO};
pub use local::SqliteCourseTable;
pub use statement::StatementTable;
pub use volume::{default_volume_path, VolumeUploader, DEFAULT_VOLUME_DIR};

use intel_core::{CoreError, University, WarehouseError};
use tracing::{error, info};

/// A structured table of per-course insights, keyed by course code.
pub trait CourseTable {
    /// Rows whose `course_code` equals `code`, ignoring case.
    async fn find_course(&self, table: &str, code: &str)
        -> Result<Vec<CourseInsight>, CoreError>;
}

/// Looks up a course for a university and renders it as model context.
///
/// Never fails: an empty result and a failed lookup are reported through the
/// `NO_COURSE_INFO` and `COURSE_FETCH_ERROR` sentinels.
pub async fn lookup_context<T: CourseTable>(
    table: &T,
    university: &University,
    query: &str,
) -> String {
    let code = query.trim();
    match table.find_course(&university.table, code).await {
        Ok(rows) if rows.is_empty() => {
            info!("No rows for {} in {}", code, university.table);
            NO_COURSE_INFO.to_string()
        }
        Ok(rows) => {
            info!("Found {} rows for {} in {}", rows.len(), code, university.table);
            format_context(&rows)
        }
        Err(e) => {
            error!("Error fetching context for {}: {}", code, e);
            COURSE_FETCH_ERROR.to_string()
        }
    }
}

/// Accepts dotted identifiers such as `workspace.default.reddit_posts`.
///
/// Table names are interpolated into SQL, so anything outside
/// `[A-Za-z0-9_]` per segment is refused.
pub fn validate_table_name(table: &str) -> Result<&str, WarehouseError> {
    let valid = !table.is_empty()
        && table.split('.').all(|segment| {
            !segment.is_empty()
                && !segment.starts_with(|c: char| c.is_ascii_digit())
                && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if valid {
        Ok(table)
    } else {
        Err(WarehouseError::InvalidTableName {
            table: table.to_string(),
        })
    }
}
