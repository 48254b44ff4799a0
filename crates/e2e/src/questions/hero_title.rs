use async_trait::async_trait;

use crate::abilities::BrowseTheWeb;
use crate::error::E2eResult;
use crate::screenplay::{Actor, Question};

/// Whether the home page hero title is showing
#[derive(Debug, Clone, Copy, Default)]
pub struct IsHeroTitleVisible;

impl IsHeroTitleVisible {
    pub fn on_page() -> Self {
        Self
    }
}

#[async_trait]
impl Question for IsHeroTitleVisible {
    type Answer = bool;

    fn step_name(&self) -> String {
        "Is hero title visible".to_string()
    }

    async fn answered_by(&self, actor: &Actor) -> E2eResult<bool> {
        actor
            .ability_to::<BrowseTheWeb>()?
            .home_page()
            .is_hero_title_visible()
            .await
    }
}
