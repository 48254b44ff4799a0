//! Scenario runner: executes registered scenarios against one configuration
//! and collects their step events into a JSON report

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use stagecraft_common::HarnessConfig;

use crate::error::{E2eError, E2eResult};
use crate::reporter::{Attachment, MultiReporter, RecordingReporter, StepEvent, StepReporter, TracingReporter};
use crate::screenplay::Actor;

/// A named end-to-end test
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &str;

    fn tags(&self) -> &[&'static str] {
        &[]
    }

    /// Why the scenario cannot run under `config`, if it cannot
    fn skip_reason(&self, _config: &HarnessConfig) -> Option<String> {
        None
    }

    async fn run(&self, stage: &Stage) -> E2eResult<()>;
}

/// Per-scenario context. Actors created here report to the log and to the
/// scenario's result.
pub struct Stage {
    config: Arc<HarnessConfig>,
    recorder: RecordingReporter,
    reporter: Arc<dyn StepReporter>,
}

impl Stage {
    pub fn new(config: Arc<HarnessConfig>) -> Self {
        let recorder = RecordingReporter::new();
        let reporter = MultiReporter::new()
            .with(Arc::new(TracingReporter))
            .with(Arc::new(recorder.clone()));

        Self {
            config,
            recorder,
            reporter: Arc::new(reporter),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn actor_named(&self, name: &str) -> Actor {
        Actor::named(name).reporting_to(self.reporter.clone())
    }

    pub fn recorder(&self) -> &RecordingReporter {
        &self.recorder
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
    /// Innermost failure when `error` wraps task failures
    pub root_cause: Option<String>,
    pub steps: Vec<StepEvent>,
    pub attachments: Vec<Attachment>,
}

impl ScenarioResult {
    fn skipped(name: &str, reason: String) -> Self {
        Self {
            name: name.to_string(),
            status: ScenarioStatus::Skipped,
            duration_ms: 0,
            error: Some(reason),
            root_cause: None,
            steps: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.status != ScenarioStatus::Failed
    }
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

pub struct TestRunner {
    config: Arc<HarnessConfig>,
    scenarios: Vec<Box<dyn Scenario>>,
}

impl TestRunner {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config: Arc::new(config),
            scenarios: Vec::new(),
        }
    }

    pub fn with_scenario(mut self, scenario: impl Scenario + 'static) -> Self {
        self.scenarios.push(Box::new(scenario));
        self
    }

    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    pub async fn run_all(&self) -> TestSuiteResult {
        self.run_matching(|_| true).await
    }

    /// Run scenarios carrying `tag`
    pub async fn run_tagged(&self, tag: &str) -> TestSuiteResult {
        self.run_matching(|s| s.tags().iter().any(|t| *t == tag)).await
    }

    /// Run a specific scenario by name
    pub async fn run_named(&self, name: &str) -> E2eResult<ScenarioResult> {
        let scenario = self
            .scenarios
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| E2eError::InvalidInput(format!("Scenario not found: {}", name)))?;

        Ok(self.run_scenario(scenario.as_ref()).await)
    }

    async fn run_matching(&self, filter: impl Fn(&dyn Scenario) -> bool) -> TestSuiteResult {
        let start = Instant::now();
        let selected: Vec<&dyn Scenario> = self
            .scenarios
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| filter(*s))
            .collect();

        info!("Running {} scenario(s)...", selected.len());

        let mut results = Vec::with_capacity(selected.len());
        for scenario in selected {
            results.push(self.run_scenario(scenario).await);
        }

        let suite = summarize(results, start.elapsed().as_millis() as u64);
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );
        suite
    }

    /// Run one scenario on a fresh stage
    pub async fn run_scenario(&self, scenario: &dyn Scenario) -> ScenarioResult {
        let name = scenario.name();

        if let Some(reason) = scenario.skip_reason(&self.config) {
            warn!("- {} skipped: {}", name, reason);
            return ScenarioResult::skipped(name, reason);
        }

        debug!("Running scenario: {}", name);
        let stage = Stage::new(self.config.clone());
        let start = Instant::now();
        let outcome = scenario.run(&stage).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let (steps, attachments) = stage.recorder().take();

        match outcome {
            Ok(()) => {
                info!("✓ {} ({} ms)", name, duration_ms);
                ScenarioResult {
                    name: name.to_string(),
                    status: ScenarioStatus::Passed,
                    duration_ms,
                    error: None,
                    root_cause: None,
                    steps,
                    attachments,
                }
            }
            Err(e) => {
                error!("✗ {} - {}", name, e);
                let root = e.root_cause();
                ScenarioResult {
                    name: name.to_string(),
                    status: ScenarioStatus::Failed,
                    duration_ms,
                    error: Some(e.to_string()),
                    root_cause: matches!(e, E2eError::TaskFailed { .. }).then(|| root.to_string()),
                    steps,
                    attachments,
                }
            }
        }
    }

    /// Write suite results to `test-results.json` in the report directory
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        let output_dir = &self.config.report.output_dir;
        std::fs::create_dir_all(output_dir)?;

        let path = output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Fold scenario results into suite totals
pub fn summarize(results: Vec<ScenarioResult>, duration_ms: u64) -> TestSuiteResult {
    let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();

    TestSuiteResult {
        total: results.len(),
        passed: count(ScenarioStatus::Passed),
        failed: count(ScenarioStatus::Failed),
        skipped: count(ScenarioStatus::Skipped),
        duration_ms,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screenplay::Task;

    struct Noop;

    #[async_trait]
    impl Task for Noop {
        fn step_name(&self) -> String {
            "Do nothing".into()
        }

        async fn perform_as(&self, _actor: &Actor) -> E2eResult<()> {
            Ok(())
        }
    }

    struct Passing;

    #[async_trait]
    impl Scenario for Passing {
        fn name(&self) -> &str {
            "passing"
        }

        fn tags(&self) -> &[&'static str] {
            &["smoke"]
        }

        async fn run(&self, stage: &Stage) -> E2eResult<()> {
            stage.actor_named("Tester").attempts_to(Noop).await
        }
    }

    struct Failing;

    #[async_trait]
    impl Scenario for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn run(&self, _stage: &Stage) -> E2eResult<()> {
            Err(E2eError::InvalidInput("nope".into()))
        }
    }

    struct NeedsBaseUrl;

    #[async_trait]
    impl Scenario for NeedsBaseUrl {
        fn name(&self) -> &str {
            "needs-base-url"
        }

        fn skip_reason(&self, config: &HarnessConfig) -> Option<String> {
            config.base_url.is_none().then(|| "BASE_URL is not set".to_string())
        }

        async fn run(&self, _stage: &Stage) -> E2eResult<()> {
            Ok(())
        }
    }

    fn runner() -> TestRunner {
        TestRunner::new(HarnessConfig::default())
            .with_scenario(Passing)
            .with_scenario(Failing)
            .with_scenario(NeedsBaseUrl)
    }

    #[tokio::test]
    async fn test_run_all_counts_outcomes() {
        let suite = runner().run_all().await;

        assert_eq!((suite.total, suite.passed, suite.failed, suite.skipped), (3, 1, 1, 1));
        assert_eq!(suite.results[0].steps.len(), 2);
        assert_eq!(suite.results[1].error.as_deref(), Some("nope"));
        assert!(suite.results[1].root_cause.is_none());
    }

    #[tokio::test]
    async fn test_run_tagged_and_named() {
        let runner = runner();
        let tagged = runner.run_tagged("smoke").await;
        assert_eq!(tagged.total, 1);

        assert!(runner.run_named("failing").await.unwrap().status == ScenarioStatus::Failed);
        assert!(matches!(runner.run_named("missing").await, Err(E2eError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::default();
        config.report.output_dir = dir.path().join("report");

        let runner = TestRunner::new(config).with_scenario(Passing);
        let suite = runner.run_all().await;
        let path = runner.write_results(&suite).unwrap();

        let written: TestSuiteResult =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.passed, 1);
    }
}
