use async_trait::async_trait;

use crate::abilities::CallAccountService;
use crate::account::User;
use crate::error::E2eResult;
use crate::screenplay::{Actor, Task};

/// Register an account through the actor's account service. The response is
/// kept in the notepad for later questions.
#[derive(Debug, Clone)]
pub struct CreateUserViaService {
    user: User,
}

impl CreateUserViaService {
    pub fn with_credentials(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_data(User::new(user_name, password))
    }

    pub fn with_data(user: User) -> Self {
        Self { user }
    }
}

#[async_trait]
impl Task for CreateUserViaService {
    fn step_name(&self) -> String {
        format!("Create user via service: {}", self.user.user_name)
    }

    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        let response = actor
            .ability_to::<CallAccountService>()?
            .service()
            .create_user(&self.user)
            .await?;

        actor.notepad().user_creation = Some(response);
        Ok(())
    }
}
