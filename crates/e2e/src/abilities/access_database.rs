use std::sync::Arc;

use stagecraft_common::DatabaseAdapter;

use crate::db_service::DbService;
use crate::screenplay::{Ability, Actor};

/// Lets an actor run SQL against a content database
pub struct AccessDatabase {
    adapter: Arc<dyn DatabaseAdapter>,
}

impl AccessDatabase {
    pub fn using(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &Arc<dyn DatabaseAdapter> {
        &self.adapter
    }

    /// Service over the adapter that reports to `actor`'s reporter
    pub fn db(&self, actor: &Actor) -> DbService {
        DbService::new(self.adapter.clone(), actor.reporter())
    }
}

impl Ability for AccessDatabase {
    const NAME: &'static str = "AccessDatabase";
}
