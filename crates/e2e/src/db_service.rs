//! Reporting layer over a [`DatabaseAdapter`]
//!
//! Every call is logged and its SQL, parameters and results are attached to
//! the step reporter, so a failing scenario carries the data it saw.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use stagecraft_common::{DatabaseAdapter, Rows, ScriptOutcome};

use crate::error::E2eResult;
use crate::reporter::{Attachment, StepReporter};

#[derive(Clone)]
pub struct DbService {
    adapter: Arc<dyn DatabaseAdapter>,
    reporter: Arc<dyn StepReporter>,
}

impl DbService {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>, reporter: Arc<dyn StepReporter>) -> Self {
        Self { adapter, reporter }
    }

    pub async fn connect(&self) -> E2eResult<()> {
        Ok(self.adapter.connect().await?)
    }

    pub async fn close(&self) -> E2eResult<()> {
        Ok(self.adapter.close_connection().await?)
    }

    pub async fn execute_script(&self, script_path: &Path) -> E2eResult<Rows> {
        info!("Executing SQL script {}", script_path.display());
        let rows = self.adapter.execute_script(script_path).await?;
        self.reporter
            .attach(Attachment::json("SQL script result", &rows));
        Ok(rows)
    }

    pub async fn replace_values_and_execute_script(
        &self,
        script_path: &Path,
        values: &[String],
    ) -> E2eResult<ScriptOutcome> {
        info!(
            "Executing SQL script {} with values: {}",
            script_path.display(),
            values.join(", ")
        );
        let outcome = self
            .adapter
            .replace_values_and_execute_script(script_path, values)
            .await?;
        self.reporter
            .attach(Attachment::text("Modified SQL", outcome.modified_sql.clone()));
        self.reporter
            .attach(Attachment::json("SQL script result", &outcome.rows));
        Ok(outcome)
    }

    pub async fn query(&self, sql: &str, params: &[Value]) -> E2eResult<Rows> {
        self.reporter.attach(Attachment::text("SQL query", sql));
        if !params.is_empty() {
            info!("Running query with {} parameter(s)", params.len());
            self.reporter
                .attach(Attachment::json("Query parameters", params));
        }

        let rows = self.adapter.query(sql, params).await?;
        if rows.is_empty() {
            info!("Query returned no rows");
        }
        Ok(rows)
    }

    pub async fn execute(&self, sql: &str, params: &[Value]) -> E2eResult<usize> {
        info!("Running statement with {} parameter(s)", params.len());
        self.reporter.attach(Attachment::text("SQL statement", sql));
        self.reporter
            .attach(Attachment::json("Statement parameters", params));
        Ok(self.adapter.execute(sql, params).await?)
    }
}
