use std::path::PathBuf;

use async_trait::async_trait;

use crate::abilities::AccessDatabase;
use crate::error::E2eResult;
use crate::screenplay::{Actor, Task};

/// Run a SQL file and keep its rows in the notepad
#[derive(Debug, Clone)]
pub struct ExecuteSqlScript {
    path: PathBuf,
}

impl ExecuteSqlScript {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Task for ExecuteSqlScript {
    fn step_name(&self) -> String {
        format!("Execute SQL script: {}", self.path.display())
    }

    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        let rows = actor
            .ability_to::<AccessDatabase>()?
            .db(actor)
            .execute_script(&self.path)
            .await?;

        actor.notepad().script_rows = Some(rows);
        Ok(())
    }
}

/// Run a SQL file after filling its `$$` placeholders in order. Keeps the
/// substituted SQL and the rows in the notepad.
#[derive(Debug, Clone)]
pub struct ExecuteSqlScriptWithValues {
    path: PathBuf,
    values: Vec<String>,
}

impl ExecuteSqlScriptWithValues {
    pub fn from_file_with_values<I, S>(path: impl Into<PathBuf>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Task for ExecuteSqlScriptWithValues {
    fn step_name(&self) -> String {
        format!(
            "Execute SQL script with values: {} [{}]",
            self.path.display(),
            self.values.join(", ")
        )
    }

    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        let outcome = actor
            .ability_to::<AccessDatabase>()?
            .db(actor)
            .replace_values_and_execute_script(&self.path, &self.values)
            .await?;

        let mut notepad = actor.notepad();
        notepad.modified_sql = Some(outcome.modified_sql);
        notepad.script_rows = Some(outcome.rows);
        Ok(())
    }
}
