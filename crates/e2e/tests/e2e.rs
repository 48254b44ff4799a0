//! E2E test harness entry point
//!
//! Runs the built-in scenarios against the configured environment. Browser
//! and account scenarios need `BASE_URL`; the database scenario runs against
//! a scratch SQLite file.
//! Run with: cargo test --package stagecraft-e2e --test e2e

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stagecraft_common::{DatabaseAdapter, DatabaseConfig, HarnessConfig, SqliteAdapter};
use stagecraft_e2e::abilities::{AccessDatabase, BrowseTheWeb, CallAccountService};
use stagecraft_e2e::account::{AccountService, DemoQaAccountApi};
use stagecraft_e2e::playwright::{PlaywrightBrowser, PlaywrightConfig};
use stagecraft_e2e::questions::{DoesDataExist, IsHeroTitleVisible, QueryDatabase, ServiceValidationsWereApplied};
use stagecraft_e2e::runner::TestSuiteResult;
use stagecraft_e2e::tasks::{CreateUserViaService, ExecuteSqlScript, ExecuteSqlScriptWithValues, NavigateTo};
use stagecraft_e2e::{E2eError, E2eResult, Scenario, Stage, TestRunner};

const SQL_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/sql");

#[derive(Parser, Debug)]
#[command(name = "stagecraft-e2e")]
#[command(about = "Screenplay E2E scenarios")]
#[command(ignore_errors = true)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// List scenarios and exit
    #[arg(long)]
    list: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let config = HarnessConfig::resolve(args.config.as_deref())?;

    let runner = TestRunner::new(config)
        .with_scenario(HomePageLoads)
        .with_scenario(RegisterUserThroughService)
        .with_scenario(ServiceRejectsWeakPassword)
        .with_scenario(SeedAndQueryDatabase);

    if args.list {
        for name in runner.scenario_names() {
            println!("{}", name);
        }
        return Ok(true);
    }

    let results = if let Some(name) = args.name {
        let result = runner.run_named(&name).await?;
        stagecraft_e2e::runner::summarize(vec![result.clone()], result.duration_ms)
    } else if let Some(tag) = args.tag {
        runner.run_tagged(&tag).await
    } else {
        runner.run_all().await
    };

    runner.write_results(&results)?;
    Ok(all_passed(&results))
}

fn all_passed(results: &TestSuiteResult) -> bool {
    results.failed == 0
}

fn needs_base_url(config: &HarnessConfig) -> Option<String> {
    config
        .base_url
        .is_none()
        .then(|| "BASE_URL is not set".to_string())
}

/// The home page renders its hero title
struct HomePageLoads;

#[async_trait]
impl Scenario for HomePageLoads {
    fn name(&self) -> &str {
        "home-page-loads"
    }

    fn tags(&self) -> &[&'static str] {
        &["browser", "smoke"]
    }

    fn skip_reason(&self, config: &HarnessConfig) -> Option<String> {
        needs_base_url(config).or_else(|| {
            PlaywrightBrowser::check_playwright_installed()
                .err()
                .map(|e| e.to_string())
        })
    }

    async fn run(&self, stage: &Stage) -> E2eResult<()> {
        let browser = Arc::new(PlaywrightBrowser::new(PlaywrightConfig::from_harness(stage.config())?)?);
        let tester = stage
            .actor_named("Tester")
            .who_can(BrowseTheWeb::using(browser.clone()));

        tester.attempts_to(NavigateTo::home()).await?;
        tester.asks_for(IsHeroTitleVisible::on_page()).await?;
        browser.screenshot("home-page").await?;
        Ok(())
    }
}

fn account_service(config: &HarnessConfig) -> E2eResult<CallAccountService> {
    let api = DemoQaAccountApi::new(&config.account_api)?;
    Ok(CallAccountService::using(Arc::new(AccountService::new(api))))
}

/// A new account is created and the response names it
struct RegisterUserThroughService;

#[async_trait]
impl Scenario for RegisterUserThroughService {
    fn name(&self) -> &str {
        "register-user-through-service"
    }

    fn tags(&self) -> &[&'static str] {
        &["api"]
    }

    fn skip_reason(&self, config: &HarnessConfig) -> Option<String> {
        needs_base_url(config)
    }

    async fn run(&self, stage: &Stage) -> E2eResult<()> {
        let tester = stage
            .actor_named("API Tester")
            .who_can(account_service(stage.config())?);
        let user_name = format!("serviceuser_{}", chrono::Utc::now().timestamp_millis());

        tester
            .attempts_to(CreateUserViaService::with_credentials(&user_name, "784512Asd!"))
            .await?;
        tester
            .asks_for(ServiceValidationsWereApplied::for_user(&user_name))
            .await?;
        Ok(())
    }
}

/// Weak passwords are refused before any request is sent
struct ServiceRejectsWeakPassword;

#[async_trait]
impl Scenario for ServiceRejectsWeakPassword {
    fn name(&self) -> &str {
        "service-rejects-weak-password"
    }

    fn tags(&self) -> &[&'static str] {
        &["api", "smoke"]
    }

    async fn run(&self, stage: &Stage) -> E2eResult<()> {
        let tester = stage
            .actor_named("API Tester")
            .who_can(account_service(stage.config())?);

        let attempt = tester
            .attempts_to(CreateUserViaService::with_credentials("weakling", "123"))
            .await;

        match attempt.as_ref().map_err(E2eError::root_cause) {
            Err(E2eError::InvalidInput(message)) if message.starts_with("Password must be at least") => Ok(()),
            other => Err(E2eError::assertion(
                "Weak password rejected".to_string(),
                format!("expected a password rule violation, got {:?}", other),
            )),
        }
    }
}

/// Seed the users table, then read it back through scripts and questions
struct SeedAndQueryDatabase;

#[async_trait]
impl Scenario for SeedAndQueryDatabase {
    fn name(&self) -> &str {
        "seed-and-query-database"
    }

    fn tags(&self) -> &[&'static str] {
        &["database", "smoke"]
    }

    async fn run(&self, stage: &Stage) -> E2eResult<()> {
        let scratch = tempfile::tempdir()?;
        let adapter = Arc::new(SqliteAdapter::new(&DatabaseConfig {
            path: scratch.path().join("content.db"),
            ..stage.config().database.clone()
        }));
        adapter.connect().await?;

        let tester = stage
            .actor_named("Tester")
            .who_can(AccessDatabase::using(adapter.clone()));

        tester
            .attempts_to(ExecuteSqlScript::from_file(format!("{}/seed_users.sql", SQL_DIR)))
            .await?;
        tester.asks_for(DoesDataExist::from_last_script()).await?;

        tester
            .attempts_to(ExecuteSqlScriptWithValues::from_file_with_values(
                format!("{}/find_user.sql", SQL_DIR),
                ["alice"],
            ))
            .await?;
        tester.asks_for(DoesDataExist::from_last_script()).await?;

        let rows = tester
            .asks_for(QueryDatabase::from_file(format!("{}/connection_check.sql", SQL_DIR)))
            .await?;
        tester.asks_for(DoesDataExist::from_rows(rows)).await?;

        adapter.close_connection().await?;
        Ok(())
    }
}
