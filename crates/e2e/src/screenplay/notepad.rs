use stagecraft_common::Rows;

use crate::account::UserCreationResponse;

/// Per-actor scratch slots that let a task hand its result to a later
/// question in the same test
#[derive(Debug, Clone, Default)]
pub struct Notepad {
    /// Response of the last user creation
    pub user_creation: Option<UserCreationResponse>,

    /// Rows returned by the last SQL script
    pub script_rows: Option<Rows>,

    /// SQL of the last script run with substituted values
    pub modified_sql: Option<String>,
}

impl Notepad {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
