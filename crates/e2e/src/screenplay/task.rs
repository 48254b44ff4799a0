use async_trait::async_trait;

use crate::error::E2eResult;
use crate::screenplay::Actor;

/// An action performed through an actor. Tasks pull the abilities they need
/// from the actor they are given and produce side effects only.
#[async_trait]
pub trait Task: Send + Sync {
    /// Display name used for step reporting
    fn step_name(&self) -> String;

    async fn perform_as(&self, actor: &Actor) -> E2eResult<()>;

    /// Box the task for [`Actor::attempts_to_all`]
    fn boxed(self) -> Box<dyn Task>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

#[async_trait]
impl<'t, T: Task + ?Sized> Task for &'t T {
    fn step_name(&self) -> String {
        (**self).step_name()
    }

    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        (**self).perform_as(actor).await
    }
}
