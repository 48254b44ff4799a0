use std::sync::Arc;

use crate::pages::HomePage;
use crate::playwright::BrowserSession;
use crate::screenplay::Ability;

/// Lets an actor drive a browser session
pub struct BrowseTheWeb {
    session: Arc<dyn BrowserSession>,
}

impl BrowseTheWeb {
    pub fn using(session: Arc<dyn BrowserSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &dyn BrowserSession {
        self.session.as_ref()
    }

    pub fn home_page(&self) -> HomePage {
        HomePage::new(self.session.clone())
    }
}

impl Ability for BrowseTheWeb {
    const NAME: &'static str = "BrowseTheWeb";
}
