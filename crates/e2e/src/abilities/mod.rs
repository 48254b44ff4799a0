//! Abilities granted to actors

mod access_database;
mod browse_the_web;
mod call_account_service;

pub use access_database::AccessDatabase;
pub use browse_the_web::BrowseTheWeb;
pub use call_account_service::CallAccountService;
