//! Typed access to the `users` table

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::db_service::DbService;
use crate::error::E2eResult;

/// Row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
}

pub struct UserRepository {
    db: DbService,
}

impl UserRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    pub async fn get_user_by_id(&self, id: i64) -> E2eResult<Option<UserRecord>> {
        debug!("Fetching user {}", id);
        let rows = self
            .db
            .query("SELECT id, username, email FROM users WHERE id = ?", &[json!(id)])
            .await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Insert a user, returning the number of rows written
    pub async fn insert_user(&self, username: &str, email: &str) -> E2eResult<usize> {
        debug!("Inserting user {}", username);
        self.db
            .execute(
                "INSERT INTO users (username, email) VALUES (?, ?)",
                &[json!(username), json!(email)],
            )
            .await
    }

    pub async fn update_user_email(&self, id: i64, email: &str) -> E2eResult<usize> {
        debug!("Updating email of user {}", id);
        self.db
            .execute(
                "UPDATE users SET email = ? WHERE id = ?",
                &[json!(email), json!(id)],
            )
            .await
    }

    pub async fn delete_user(&self, id: i64) -> E2eResult<usize> {
        debug!("Deleting user {}", id);
        self.db
            .execute("DELETE FROM users WHERE id = ?", &[json!(id)])
            .await
    }
}
