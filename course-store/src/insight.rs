use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const NO_COURSE_INFO: &str = "No relevant course info found.";
pub const COURSE_FETCH_ERROR: &str = "Error fetching course data.";

const SEPARATOR: &str = "\n\n---\n\n";

/// One row of the course insights table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseInsight {
    pub course_code: String,
    pub course_name: Option<String>,
    pub how_hard: Option<String>,
    pub time_consuming: Option<String>,
    pub project_vs_theory: Option<String>,
    pub resume_value: Option<String>,
    pub best_professors: Option<String>,
    pub worst_professors: Option<String>,
    #[sqlx(default)]
    pub summary: Option<String>,
    #[sqlx(default)]
    pub official_description: Option<String>,
}

impl CourseInsight {
    /// Builds an insight from named string columns. Returns `None` without a
    /// `course_code` column.
    pub fn from_columns(columns: &HashMap<String, Option<String>>) -> Option<Self> {
        let get = |name: &str| columns.get(name).cloned().flatten();
        Some(Self {
            course_code: get("course_code")?,
            course_name: get("course_name"),
            how_hard: get("how_hard"),
            time_consuming: get("time_consuming"),
            project_vs_theory: get("project_vs_theory"),
            resume_value: get("resume_value"),
            best_professors: get("best_professors"),
            worst_professors: get("worst_professors"),
            summary: get("summary"),
            official_description: get("official_description"),
        })
    }

    /// Renders the row as a block of model context.
    pub fn to_context(&self) -> String {
        let mut block = format!(
            "Course: {} — {}\n\
             Difficulty: {}\n\
             Time Consuming: {}\n\
             Project vs Theory: {}\n\
             Resume Value: {}\n\
             Best Professors: {}\n\
             Complaints: {}",
            self.course_code,
            show(&self.course_name),
            show(&self.how_hard),
            show(&self.time_consuming),
            show(&self.project_vs_theory),
            show(&self.resume_value),
            show(&self.best_professors),
            show(&self.worst_professors),
        );

        if let Some(summary) = &self.summary {
            block.push_str("\nSummary: ");
            block.push_str(summary);
        }
        if let Some(description) = &self.official_description {
            block.push_str("\nOfficial Description: ");
            block.push_str(description);
        }
        block
    }
}

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

/// Joins every row's context block with a horizontal rule.
pub fn format_context(rows: &[CourseInsight]) -> String {
    rows.iter()
        .map(CourseInsight::to_context)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
