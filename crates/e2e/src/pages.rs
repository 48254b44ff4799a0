//! Page objects

use std::sync::Arc;

use crate::error::{E2eError, E2eResult};
use crate::playwright::BrowserSession;

pub struct HomePage {
    session: Arc<dyn BrowserSession>,
}

impl HomePage {
    pub const HERO_TITLE: &'static str = r#"[data-testid="hero-title"]"#;

    pub fn new(session: Arc<dyn BrowserSession>) -> Self {
        Self { session }
    }

    pub async fn goto(&self, url: &str) -> E2eResult<()> {
        self.session.navigate(url).await
    }

    pub async fn is_hero_title_visible(&self) -> E2eResult<bool> {
        self.session.is_visible(Self::HERO_TITLE).await
    }

    /// Fail unless the hero title reads exactly `title`
    pub async fn expect_hero_title(&self, title: &str) -> E2eResult<()> {
        let actual = self.session.text_content(Self::HERO_TITLE).await?;
        match actual.as_deref().map(str::trim) {
            Some(text) if text == title => Ok(()),
            other => Err(E2eError::assertion(
                "Hero title".to_string(),
                format!("expected {:?}, found {:?}", title, other),
            )),
        }
    }
}
