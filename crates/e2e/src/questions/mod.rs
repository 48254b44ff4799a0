//! Questions actors can ask

mod database;
mod hero_title;
mod service_validations;

pub use database::{DoesDataExist, QueryDatabase};
pub use hero_title::IsHeroTitleVisible;
pub use service_validations::ServiceValidationsWereApplied;
