use intel_core::{CoreError, CourseSeed};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Reads a `[{code, description}]` course list.
pub async fn load_courses(path: &Path) -> Result<Vec<CourseSeed>, CoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    let courses: Vec<CourseSeed> = serde_json::from_str(&content)?;
    info!("Loaded {} courses from {}", courses.len(), path.display());
    Ok(courses)
}

/// Writes `value` as pretty-printed JSON.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    let content = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, content).await?;
    info!("Wrote {}", path.display());
    Ok(())
}
