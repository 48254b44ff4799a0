//! Questions, their answers, and how answers are validated

use std::fmt;

use async_trait::async_trait;

use crate::error::{E2eError, E2eResult};
use crate::screenplay::Actor;

/// A value a question can produce.
///
/// Each answer type declares the sentinel values that signal a broken
/// precondition by default: `false` for `bool`, `None` for options, and
/// `null`/`false` for JSON values. Strings, numbers and row sets have none.
pub trait Answer: fmt::Debug + PartialEq + Send + Sync + 'static {
    fn default_invalid_values() -> Vec<Self>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

impl Answer for bool {
    fn default_invalid_values() -> Vec<Self> {
        vec![false]
    }
}

impl<T: Answer> Answer for Option<T> {
    fn default_invalid_values() -> Vec<Self> {
        vec![None]
    }
}

impl Answer for serde_json::Value {
    fn default_invalid_values() -> Vec<Self> {
        vec![serde_json::Value::Null, serde_json::Value::Bool(false)]
    }
}

impl Answer for String {}
impl Answer for i64 {}
impl Answer for u64 {}
impl Answer for usize {}
impl Answer for f64 {}
impl<T: Answer> Answer for Vec<T> {}

/// An inquiry answered through an actor
#[async_trait]
pub trait Question: Send + Sync {
    type Answer: Answer;

    /// Display name used for step reporting
    fn step_name(&self) -> String;

    async fn answered_by(&self, actor: &Actor) -> E2eResult<Self::Answer>;
}

#[async_trait]
impl<'q, Q: Question + ?Sized> Question for &'q Q {
    type Answer = Q::Answer;

    fn step_name(&self) -> String {
        (**self).step_name()
    }

    async fn answered_by(&self, actor: &Actor) -> E2eResult<Self::Answer> {
        (**self).answered_by(actor).await
    }
}

/// Builds the error raised when an answer is rejected, from the step name and
/// the failure message
pub type ErrorKind = fn(String, String) -> E2eError;

/// Per-call validation settings for [`Actor::asks_for_with`]
pub struct ValidationOptions<T> {
    invalid_values: Option<Vec<T>>,
    error_message: Option<String>,
    error_kind: ErrorKind,
}

impl<T: Answer> Default for ValidationOptions<T> {
    fn default() -> Self {
        Self {
            invalid_values: None,
            error_message: None,
            error_kind: E2eError::question_validation,
        }
    }
}

impl<T: Answer> ValidationOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the answer type's default sentinels
    pub fn invalid_values(mut self, values: Vec<T>) -> Self {
        self.invalid_values = Some(values);
        self
    }

    /// Accept every answer
    pub fn accept_any(self) -> Self {
        self.invalid_values(Vec::new())
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn error_kind(mut self, kind: ErrorKind) -> Self {
        self.error_kind = kind;
        self
    }

    pub fn rejects(&self, answer: &T) -> bool {
        match &self.invalid_values {
            Some(values) => values.contains(answer),
            None => T::default_invalid_values().contains(answer),
        }
    }

    /// Error for a rejected answer
    pub fn failure(&self, step: &str, answer: &T) -> E2eError {
        let message = self
            .error_message
            .clone()
            .unwrap_or_else(|| format!("Question \"{}\" returned invalid value: {:?}", step, answer));
        (self.error_kind)(step.to_string(), message)
    }
}
