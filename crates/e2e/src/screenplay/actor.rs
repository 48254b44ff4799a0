//! The actor: holds abilities and runs tasks and questions inside a uniform
//! step-reporting envelope

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::reporter::{StepEvent, StepKind, StepReporter, TracingReporter};
use crate::screenplay::{Ability, AbilityRegistry, Notepad, Question, Task, ValidationOptions};

pub struct Actor {
    name: String,
    abilities: AbilityRegistry,
    notepad: Mutex<Notepad>,
    reporter: Arc<dyn StepReporter>,
}

impl Actor {
    /// Create an actor with no abilities that reports to the log
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abilities: AbilityRegistry::new(),
            notepad: Mutex::new(Notepad::default()),
            reporter: Arc::new(TracingReporter),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send step events to `reporter` instead of the log
    pub fn reporting_to(mut self, reporter: Arc<dyn StepReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn reporter(&self) -> Arc<dyn StepReporter> {
        self.reporter.clone()
    }

    /// Grant an ability. A second ability of the same type replaces the first.
    pub fn who_can<A: Ability>(mut self, ability: A) -> Self {
        if self.abilities.insert(ability) {
            debug!(actor = %self.name, "Replaced ability {}", A::NAME);
        } else {
            debug!(actor = %self.name, "Granted ability {}", A::NAME);
        }
        self
    }

    /// Look up an ability, failing when the actor was never granted it
    pub fn ability_to<A: Ability>(&self) -> E2eResult<&A> {
        self.abilities.get::<A>().ok_or_else(|| E2eError::MissingAbility {
            actor: self.name.clone(),
            ability: A::NAME.to_string(),
        })
    }

    pub fn can<A: Ability>(&self) -> bool {
        self.abilities.contains::<A>()
    }

    pub fn ability_names(&self) -> Vec<&'static str> {
        self.abilities.names()
    }

    /// Scratch slots shared between this actor's tasks and questions.
    /// Do not hold the guard across an await.
    pub fn notepad(&self) -> MutexGuard<'_, Notepad> {
        self.notepad.lock()
    }

    /// Perform a single task
    pub async fn attempts_to<T: Task>(&self, task: T) -> E2eResult<()> {
        self.perform(&task).await
    }

    /// Perform several tasks concurrently on the current async task.
    ///
    /// Every task runs to completion even if another fails. When any fail,
    /// the error of the first failing task in `tasks` order is returned.
    /// Side effects are interleaved, so tasks that depend on each other
    /// belong in separate calls.
    pub async fn attempts_to_all(&self, tasks: Vec<Box<dyn Task>>) -> E2eResult<()> {
        let outcomes = join_all(tasks.iter().map(|task| self.perform(task.as_ref()))).await;
        match outcomes.into_iter().find_map(Result::err) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn perform(&self, task: &dyn Task) -> E2eResult<()> {
        let step = task.step_name();
        self.reporter
            .record(StepEvent::started(StepKind::Task, &self.name, &step));

        match task.perform_as(self).await {
            Ok(()) => {
                self.reporter
                    .record(StepEvent::passed(StepKind::Task, &self.name, &step, None));
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                self.reporter.record(StepEvent::failed(
                    StepKind::Task,
                    &self.name,
                    &step,
                    message.clone(),
                ));
                Err(E2eError::TaskFailed {
                    step,
                    message,
                    source: Box::new(err),
                })
            }
        }
    }

    /// Ask a question, rejecting the answer type's default invalid values
    pub async fn asks_for<Q: Question>(&self, question: Q) -> E2eResult<Q::Answer> {
        self.asks_for_with(question, ValidationOptions::default()).await
    }

    /// Ask a question with explicit validation options.
    ///
    /// Errors raised while answering are returned as they are; only rejected
    /// answers are turned into validation errors.
    pub async fn asks_for_with<Q: Question>(
        &self,
        question: Q,
        options: ValidationOptions<Q::Answer>,
    ) -> E2eResult<Q::Answer> {
        let step = question.step_name();
        self.reporter
            .record(StepEvent::started(StepKind::Question, &self.name, &step));

        let answer = match question.answered_by(self).await {
            Ok(answer) => answer,
            Err(err) => {
                self.reporter.record(StepEvent::failed(
                    StepKind::Question,
                    &self.name,
                    &step,
                    err.to_string(),
                ));
                return Err(err);
            }
        };

        if options.rejects(&answer) {
            let err = options.failure(&step, &answer);
            self.reporter.record(StepEvent::failed(
                StepKind::Question,
                &self.name,
                &step,
                err.to_string(),
            ));
            return Err(err);
        }

        self.reporter.record(StepEvent::passed(
            StepKind::Question,
            &self.name,
            &step,
            Some(format!("{:?}", answer)),
        ));
        Ok(answer)
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("name", &self.name)
            .field("abilities", &self.abilities)
            .finish()
    }
}
