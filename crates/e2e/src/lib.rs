//! Stagecraft E2E harness
//!
//! Screenplay-style end-to-end testing: actors are granted abilities, then
//! perform tasks and ask questions. The actor reports every step as a
//! started/passed/failed event pair so a run reads as a narrative.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Actor (screenplay)                    │
//! │    ├── who_can(ability)          AbilityRegistry            │
//! │    ├── attempts_to(task)         Task -> E2eResult<()>      │
//! │    ├── attempts_to_all(tasks)    join_all, first error      │
//! │    └── asks_for(question)        Question -> Answer         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Abilities                                                  │
//! │    ├── AccessDatabase      -> DbService -> DatabaseAdapter  │
//! │    ├── CallAccountService  -> AccountService -> AccountApi  │
//! │    └── BrowseTheWeb        -> HomePage -> BrowserSession    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  StepReporter: Tracing | Recording | Multi                  │
//! │  TestRunner: Scenario, Stage, TestSuiteResult               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod abilities;
pub mod account;
pub mod db_service;
pub mod error;
pub mod pages;
pub mod playwright;
pub mod questions;
pub mod reporter;
pub mod repository;
pub mod runner;
pub mod screenplay;
pub mod tasks;

pub use error::{E2eError, E2eResult};
pub use runner::{Scenario, Stage, TestRunner};
pub use screenplay::{Ability, Actor, Question, Task, ValidationOptions};
