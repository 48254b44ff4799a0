//! Step reporting sinks
//!
//! The actor emits one `Started` event and then exactly one terminal event
//! (`Passed` or `Failed`) for every task and question it runs. Collaborators
//! may also attach payloads (SQL text, JSON results) to the current report.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// What kind of step an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Task,
    Question,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Task => write!(f, "Task"),
            StepKind::Question => write!(f, "Question"),
        }
    }
}

/// Position of an event in a step's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    Started,
    Passed,
    Failed,
}

impl StepPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepPhase::Started)
    }
}

/// A single step lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEvent {
    pub kind: StepKind,
    pub actor: String,
    pub name: String,
    pub phase: StepPhase,
    /// Failure diagnostic, or the answer for passed questions
    pub message: Option<String>,
    pub at: DateTime<Utc>,
}

impl StepEvent {
    pub fn started(kind: StepKind, actor: &str, name: &str) -> Self {
        Self::new(kind, actor, name, StepPhase::Started, None)
    }

    pub fn passed(kind: StepKind, actor: &str, name: &str, detail: Option<String>) -> Self {
        Self::new(kind, actor, name, StepPhase::Passed, detail)
    }

    pub fn failed(kind: StepKind, actor: &str, name: &str, message: String) -> Self {
        Self::new(kind, actor, name, StepPhase::Failed, Some(message))
    }

    fn new(kind: StepKind, actor: &str, name: &str, phase: StepPhase, message: Option<String>) -> Self {
        Self {
            kind,
            actor: actor.to_string(),
            name: name.to_string(),
            phase,
            message,
            at: Utc::now(),
        }
    }
}

/// A named payload attached to the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content: String,
    pub media_type: String,
}

impl Attachment {
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            media_type: "text/plain".to_string(),
        }
    }

    pub fn json<T: Serialize + ?Sized>(name: impl Into<String>, value: &T) -> Self {
        let content = serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("<unserializable: {}>", e));
        Self {
            name: name.into(),
            content,
            media_type: "application/json".to_string(),
        }
    }
}

/// Sink for step events and attachments
pub trait StepReporter: Send + Sync {
    fn record(&self, event: StepEvent);

    fn attach(&self, attachment: Attachment);
}

/// Renders step events as log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl StepReporter for TracingReporter {
    fn record(&self, event: StepEvent) {
        match event.phase {
            StepPhase::Started => {
                info!(actor = %event.actor, "Starting {}: {}", event.kind, event.name);
            }
            StepPhase::Passed => match &event.message {
                Some(detail) => {
                    info!(actor = %event.actor, "{} completed: {} = {}", event.kind, event.name, detail)
                }
                None => info!(actor = %event.actor, "{} completed: {}", event.kind, event.name),
            },
            StepPhase::Failed => {
                error!(
                    actor = %event.actor,
                    "{} failed: {} - {}",
                    event.kind,
                    event.name,
                    event.message.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }

    fn attach(&self, attachment: Attachment) {
        debug!(media_type = %attachment.media_type, "Attachment '{}':\n{}", attachment.name, attachment.content);
    }
}

#[derive(Debug, Default)]
struct Recorded {
    events: Vec<StepEvent>,
    attachments: Vec<Attachment>,
}

/// Keeps every event and attachment in memory; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StepEvent> {
        self.inner.lock().events.clone()
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.inner.lock().attachments.clone()
    }

    /// Number of recorded events with the given kind and phase
    pub fn count(&self, kind: StepKind, phase: StepPhase) -> usize {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|e| e.kind == kind && e.phase == phase)
            .count()
    }

    /// Events recorded for one step name, in order
    pub fn events_for(&self, name: &str) -> Vec<StepEvent> {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Drain everything recorded so far
    pub fn take(&self) -> (Vec<StepEvent>, Vec<Attachment>) {
        let mut inner = self.inner.lock();
        (
            std::mem::take(&mut inner.events),
            std::mem::take(&mut inner.attachments),
        )
    }
}

impl StepReporter for RecordingReporter {
    fn record(&self, event: StepEvent) {
        self.inner.lock().events.push(event);
    }

    fn attach(&self, attachment: Attachment) {
        self.inner.lock().attachments.push(attachment);
    }
}

/// Fans events out to several reporters
#[derive(Clone, Default)]
pub struct MultiReporter {
    reporters: Vec<Arc<dyn StepReporter>>,
}

impl MultiReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reporter: Arc<dyn StepReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }
}

impl StepReporter for MultiReporter {
    fn record(&self, event: StepEvent) {
        for reporter in &self.reporters {
            reporter.record(event.clone());
        }
    }

    fn attach(&self, attachment: Attachment) {
        for reporter in &self.reporters {
            reporter.attach(attachment.clone());
        }
    }
}
