use std::path::PathBuf;

use async_trait::async_trait;

use stagecraft_common::Rows;

use crate::abilities::AccessDatabase;
use crate::error::E2eResult;
use crate::screenplay::{Actor, Question};

/// Rows produced by running a SQL file
#[derive(Debug, Clone)]
pub struct QueryDatabase {
    path: PathBuf,
}

impl QueryDatabase {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Question for QueryDatabase {
    type Answer = Rows;

    fn step_name(&self) -> String {
        format!("Query database: {}", self.path.display())
    }

    async fn answered_by(&self, actor: &Actor) -> E2eResult<Rows> {
        actor
            .ability_to::<AccessDatabase>()?
            .db(actor)
            .execute_script(&self.path)
            .await
    }
}

#[derive(Debug, Clone)]
enum Source {
    Rows(Rows),
    LastScript,
}

/// Whether a row set is non-empty
#[derive(Debug, Clone)]
pub struct DoesDataExist {
    source: Source,
}

impl DoesDataExist {
    pub fn from_rows(rows: Rows) -> Self {
        Self {
            source: Source::Rows(rows),
        }
    }

    /// Rows kept by the last `ExecuteSqlScript` task. No script run yet
    /// counts as no data.
    pub fn from_last_script() -> Self {
        Self {
            source: Source::LastScript,
        }
    }
}

#[async_trait]
impl Question for DoesDataExist {
    type Answer = bool;

    fn step_name(&self) -> String {
        match &self.source {
            Source::Rows(rows) => format!("Does data exist ({} rows)", rows.len()),
            Source::LastScript => "Does data exist in last script result".to_string(),
        }
    }

    async fn answered_by(&self, actor: &Actor) -> E2eResult<bool> {
        actor.ability_to::<AccessDatabase>()?;

        Ok(match &self.source {
            Source::Rows(rows) => !rows.is_empty(),
            Source::LastScript => actor
                .notepad()
                .script_rows
                .as_ref()
                .is_some_and(|rows| !rows.is_empty()),
        })
    }
}
