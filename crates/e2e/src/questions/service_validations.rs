use async_trait::async_trait;

use crate::error::E2eResult;
use crate::screenplay::{Actor, Question};

/// Whether the last account creation returned a well-formed response for
/// the expected user: a non-blank id and a matching username
#[derive(Debug, Clone)]
pub struct ServiceValidationsWereApplied {
    expected_user_name: String,
}

impl ServiceValidationsWereApplied {
    pub fn for_user(user_name: impl Into<String>) -> Self {
        Self {
            expected_user_name: user_name.into(),
        }
    }
}

#[async_trait]
impl Question for ServiceValidationsWereApplied {
    type Answer = bool;

    fn step_name(&self) -> String {
        format!("Service validations applied for {}", self.expected_user_name)
    }

    async fn answered_by(&self, actor: &Actor) -> E2eResult<bool> {
        let notepad = actor.notepad();
        let Some(response) = notepad.user_creation.as_ref() else {
            return Ok(false);
        };

        Ok(response.username == self.expected_user_name && !response.user_id.trim().is_empty())
    }
}
