//! Screenplay core
//!
//! An [`Actor`] is granted [`Ability`] instances, then performs [`Task`]s and
//! asks [`Question`]s. The actor is the only thing tasks and questions talk
//! to: they receive it per call and pull the abilities they need from it.
//!
//! ```text
//! Actor::named("Tester")
//!     .who_can(AccessDatabase::using(db))      // ability registry
//!     .attempts_to(ExecuteSqlScript::from_file(...))   // started -> passed|failed
//!     .asks_for(DoesDataExist::from_last_script())     // started -> passed|failed
//! ```

mod ability;
mod actor;
mod notepad;
mod question;
mod task;

pub use ability::{Ability, AbilityRegistry};
pub use actor::Actor;
pub use notepad::Notepad;
pub use question::{Answer, ErrorKind, Question, ValidationOptions};
pub use task::Task;
