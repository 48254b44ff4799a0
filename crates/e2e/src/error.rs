//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("{actor} does not have ability {ability}")]
    MissingAbility { actor: String, ability: String },

    #[error("Task \"{step}\" failed: {message}")]
    TaskFailed {
        step: String,
        message: String,
        source: Box<E2eError>,
    },

    #[error("Question \"{step}\" validation failed: {message}")]
    QuestionValidation { step: String, message: String },

    #[error("Assertion failed in \"{step}\": {message}")]
    Assertion { step: String, message: String },

    #[error("API Error [{status}] {endpoint}: {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Database(#[from] stagecraft_common::Error),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Default error kind for questions whose answer hit an invalid value
    pub fn question_validation(step: String, message: String) -> Self {
        E2eError::QuestionValidation { step, message }
    }

    /// Alternative error kind for question validation failures
    pub fn assertion(step: String, message: String) -> Self {
        E2eError::Assertion { step, message }
    }

    /// The failure that started it all, looking through task wrappers
    pub fn root_cause(&self) -> &E2eError {
        let mut current = self;
        while let E2eError::TaskFailed { source, .. } = current {
            current = source;
        }
        current
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
