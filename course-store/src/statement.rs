//! Lookups through the warehouse's SQL statement execution API.

use crate::{validate_table_name, CourseInsight, CourseTable};
use intel_core::{CoreError, WarehouseCredentials, WarehouseError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info};

/// The API accepts waits between 5 and 50 seconds.
const MIN_WAIT_SECS: u32 = 5;
const MAX_WAIT_SECS: u32 = 50;

#[derive(Debug, Serialize)]
pub struct StatementRequest {
    pub warehouse_id: String,
    pub statement: String,
    pub parameters: Vec<StatementParameter>,
    pub wait_timeout: String,
    pub on_wait_timeout: &'static str,
    pub format: &'static str,
    pub disposition: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatementParameter {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct StatementResponse {
    #[serde(default)]
    pub statement_id: String,
    pub status: StatementStatus,
    #[serde(default)]
    pub manifest: Option<StatementManifest>,
    #[serde(default)]
    pub result: Option<StatementResult>,
}

#[derive(Debug, Deserialize)]
pub struct StatementStatus {
    pub state: String,
    #[serde(default)]
    pub error: Option<StatementErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct StatementErrorDetail {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StatementManifest {
    pub schema: StatementSchema,
}

#[derive(Debug, Deserialize)]
pub struct StatementSchema {
    pub columns: Vec<StatementColumn>,
}

#[derive(Debug, Deserialize)]
pub struct StatementColumn {
    pub name: String,
    pub position: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub data_array: Vec<Vec<Value>>,
}

/// Builds the parameterized lookup statement for `table`.
pub fn lookup_statement(table: &str) -> Result<String, WarehouseError> {
    let table = validate_table_name(table)?;
    Ok(format!(
        "SELECT * FROM {} WHERE LOWER(course_code) = LOWER(:code)",
        table
    ))
}

/// Turns a finished statement into insight rows.
pub fn parse_rows(response: StatementResponse) -> Result<Vec<CourseInsight>, WarehouseError> {
    if response.status.state != "SUCCEEDED" {
        let message = response
            .status
            .error
            .map(|e| e.message)
            .unwrap_or_default();
        return Err(WarehouseError::StatementFailed {
            statement_id: response.statement_id,
            state: response.status.state,
            message,
        });
    }

    let rows = match response.result {
        Some(result) => result.data_array,
        None => return Ok(Vec::new()),
    };
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let columns = response
        .manifest
        .map(|m| m.schema.columns)
        .ok_or_else(|| WarehouseError::InvalidResult {
            details: "rows returned without a schema".to_string(),
        })?;

    rows.into_iter()
        .map(|row| {
            let named: HashMap<String, Option<String>> = columns
                .iter()
                .map(|column| {
                    let value = row.get(column.position).and_then(cell_text);
                    (column.name.to_ascii_lowercase(), value)
                })
                .collect();

            CourseInsight::from_columns(&named).ok_or_else(|| WarehouseError::InvalidResult {
                details: "row has no course_code".to_string(),
            })
        })
        .collect()
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Course table hosted in the SQL warehouse.
#[derive(Debug, Clone)]
pub struct StatementTable {
    http_client: Client,
    base_url: String,
    token: String,
    warehouse_id: String,
    wait_timeout_secs: u32,
}

impl StatementTable {
    pub fn new(
        credentials: &WarehouseCredentials,
        wait_timeout_secs: u32,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: credentials.workspace.base_url(),
            token: credentials.workspace.token.clone(),
            warehouse_id: credentials.warehouse_id.clone(),
            wait_timeout_secs: wait_timeout_secs.clamp(MIN_WAIT_SECS, MAX_WAIT_SECS),
        })
    }

    pub fn request_for(
        &self,
        table: &str,
        code: &str,
    ) -> Result<StatementRequest, WarehouseError> {
        Ok(StatementRequest {
            warehouse_id: self.warehouse_id.clone(),
            statement: lookup_statement(table)?,
            parameters: vec![StatementParameter {
                name: "code".to_string(),
                value: code.to_string(),
                kind: "STRING",
            }],
            wait_timeout: format!("{}s", self.wait_timeout_secs),
            on_wait_timeout: "CANCEL",
            format: "JSON_ARRAY",
            disposition: "INLINE",
        })
    }
}

impl CourseTable for StatementTable {
    async fn find_course(
        &self,
        table: &str,
        code: &str,
    ) -> Result<Vec<CourseInsight>, CoreError> {
        let request = self.request_for(table, code)?;
        let url = format!("{}/api/2.0/sql/statements", self.base_url);

        info!("Querying {} for course {}", table, code);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Warehouse request failed: {}", e);
                WarehouseError::ConnectionFailed {
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Warehouse returned status {}", status);
            return Err(CoreError::RequestFailed {
                message: format!("statement execution for {}", table),
                status_code: Some(status.as_u16()),
            });
        }

        let body: StatementResponse = response.json().await?;
        debug!(
            "Statement {} finished in state {}",
            body.statement_id, body.status.state
        );
        Ok(parse_rows(body)?)
    }
}
