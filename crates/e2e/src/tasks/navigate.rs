use async_trait::async_trait;

use crate::abilities::BrowseTheWeb;
use crate::error::E2eResult;
use crate::screenplay::{Actor, Task};

/// Open a page in the actor's browser
#[derive(Debug, Clone)]
pub struct NavigateTo {
    url: String,
}

impl NavigateTo {
    pub fn the_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The application's root page
    pub fn home() -> Self {
        Self::the_url("/")
    }
}

#[async_trait]
impl Task for NavigateTo {
    fn step_name(&self) -> String {
        format!("Navigate to {}", self.url)
    }

    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        actor
            .ability_to::<BrowseTheWeb>()?
            .home_page()
            .goto(&self.url)
            .await
    }
}
