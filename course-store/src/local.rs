//! SQLite mirror of the course table for offline development.

use crate::{validate_table_name, CourseInsight, CourseTable};
use intel_core::{CoreError, WarehouseError};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SqliteCourseTable {
    pool: SqlitePool,
}

impl SqliteCourseTable {
    pub async fn connect(database_url: &str) -> Result<Self, CoreError> {
        info!("Opening local course table at {}", database_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(WarehouseError::Sql)?;
        Ok(Self { pool })
    }

    /// A private in-memory database. One connection, since every
    /// connection to `:memory:` would otherwise see its own database.
    pub async fn in_memory() -> Result<Self, CoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(WarehouseError::Sql)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create_table(&self, table: &str) -> Result<(), CoreError> {
        let name = local_table_name(table)?;
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                course_code TEXT NOT NULL,
                course_name TEXT,
                how_hard TEXT,
                time_consuming TEXT,
                project_vs_theory TEXT,
                resume_value TEXT,
                best_professors TEXT,
                worst_professors TEXT,
                summary TEXT,
                official_description TEXT
            )",
            name
        );
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(WarehouseError::Sql)?;
        debug!("Ensured local table {}", name);
        Ok(())
    }

    pub async fn insert(&self, table: &str, insight: &CourseInsight) -> Result<(), CoreError> {
        let name = local_table_name(table)?;
        let sql = format!(
            "INSERT INTO {} (course_code, course_name, how_hard, time_consuming,
                project_vs_theory, resume_value, best_professors, worst_professors,
                summary, official_description)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            name
        );
        sqlx::query(&sql)
            .bind(&insight.course_code)
            .bind(&insight.course_name)
            .bind(&insight.how_hard)
            .bind(&insight.time_consuming)
            .bind(&insight.project_vs_theory)
            .bind(&insight.resume_value)
            .bind(&insight.best_professors)
            .bind(&insight.worst_professors)
            .bind(&insight.summary)
            .bind(&insight.official_description)
            .execute(&self.pool)
            .await
            .map_err(WarehouseError::Sql)?;
        Ok(())
    }
}

impl CourseTable for SqliteCourseTable {
    async fn find_course(
        &self,
        table: &str,
        code: &str,
    ) -> Result<Vec<CourseInsight>, CoreError> {
        let name = local_table_name(table)?;
        let sql = format!(
            "SELECT * FROM {} WHERE LOWER(course_code) = LOWER(?)",
            name
        );
        let rows = sqlx::query_as::<_, CourseInsight>(&sql)
            .bind(code)
            .fetch_all(&self.pool)
            .await
            .map_err(WarehouseError::Sql)?;
        debug!("Local lookup for {} returned {} rows", code, rows.len());
        Ok(rows)
    }
}

/// SQLite has no catalogs, so only the last segment of a dotted warehouse
/// name is used.
pub fn local_table_name(table: &str) -> Result<&str, WarehouseError> {
    let table = validate_table_name(table)?;
    Ok(table.rsplit('.').next().unwrap_or(table))
}
