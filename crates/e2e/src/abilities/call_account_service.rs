use std::sync::Arc;

use crate::account::AccountApi;
use crate::screenplay::Ability;

/// Lets an actor manage accounts through an [`AccountApi`], usually an
/// `AccountService`
pub struct CallAccountService {
    service: Arc<dyn AccountApi>,
}

impl CallAccountService {
    pub fn using(service: Arc<dyn AccountApi>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &dyn AccountApi {
        self.service.as_ref()
    }
}

impl Ability for CallAccountService {
    const NAME: &'static str = "CallAccountService";
}
