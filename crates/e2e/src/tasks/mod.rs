//! Tasks actors can perform

mod create_user;
mod execute_sql;
mod navigate;

pub use create_user::CreateUserViaService;
pub use execute_sql::{ExecuteSqlScript, ExecuteSqlScriptWithValues};
pub use navigate::NavigateTo;
