//! CLI command definitions for testpilot.
//!
//! Each subcommand maps to one agent operation: read suite state, call the
//! model, print a human summary or JSON.

use clap::Parser;
use tracing::info;

use crate::agents::TestAutomationAgent;
use crate::config::AgentConfig;
use crate::model::SuiteSummary;

/// AI-assisted maintenance for Playwright test suites.
#[derive(Parser)]
#[command(name = "testpilot")]
#[command(about = "AI-assisted analysis, generation, and repair for Playwright test suites")]
#[command(version)]
#[command(
    long_about = "testpilot reads your Playwright run artifacts and spec files, then uses the Anthropic API to analyze failures, generate new tests, review the suite, suggest fixes for flaky tests, and generate page objects.\n\nExample usage:\n  testpilot analyze --results ./test-results\n  testpilot generate \"users can reset their password\"\n  testpilot page-objects https://example.com/login"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Model identifier for all completion requests.
    #[arg(short, long, global = true, env = "TESTPILOT_MODEL")]
    pub model: Option<String>,

    /// Directory containing Playwright run artifacts (results.json).
    #[arg(short, long, global = true, env = "TEST_RESULTS_PATH")]
    pub results: Option<String>,

    /// Directory containing test spec files.
    #[arg(short, long, global = true)]
    pub tests_dir: Option<String>,

    /// Emit machine-readable JSON instead of a human summary.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Analyze the failures from the latest test run.
    Analyze,

    /// Generate Playwright tests from natural-language requirements.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Review every spec file and suggest improvements.
    Improve,

    /// Suggest fixes for tests with mixed pass/fail history.
    #[command(name = "fix-flaky")]
    FixFlaky,

    /// Generate page object classes for the given URLs.
    #[command(name = "page-objects")]
    PageObjects(PageObjectArgs),

    /// Generate advanced reporting scaffolding for the suite.
    #[command(name = "enhance-reports")]
    EnhanceReports,

    /// Generate helper classes for a business domain.
    #[command(name = "generate-helpers")]
    GenerateHelpers(HelperArgs),

    /// Print a pass/fail summary of the latest run.
    Summary,
}

/// Arguments for `testpilot generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Natural-language requirements for the tests to generate.
    pub requirements: String,
}

/// Arguments for `testpilot generate-helpers`.
#[derive(Parser, Debug)]
pub struct HelperArgs {
    /// Business domain to generate helpers for (e.g. e-commerce, banking).
    #[arg(short, long, default_value = "general")]
    pub domain: String,
}

/// Arguments for `testpilot page-objects`.
#[derive(Parser, Debug)]
pub struct PageObjectArgs {
    /// Page URLs to generate page objects for.
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Output directory for the generated files.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Parse CLI arguments without running a command.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Scaffolding commands emit fixed output and run without credentials.
    match &cli.command {
        Commands::EnhanceReports => return run_enhance_reports(cli.json),
        Commands::GenerateHelpers(args) => return run_generate_helpers(args, cli.json),
        _ => {}
    }

    let config = build_config(&cli)?;
    let agent = TestAutomationAgent::from_config(config.clone());

    match cli.command {
        Commands::Analyze => run_analyze(&agent, cli.json).await?,
        Commands::Generate(args) => run_generate(&agent, args, cli.json).await?,
        Commands::Improve => run_improve(&agent, cli.json).await?,
        Commands::FixFlaky => run_fix_flaky(&agent, cli.json).await?,
        Commands::PageObjects(args) => run_page_objects(&agent, args, cli.json).await?,
        Commands::Summary => run_summary(&config, cli.json).await?,
        // Handled above.
        Commands::EnhanceReports | Commands::GenerateHelpers(_) => {}
    }
    Ok(())
}

/// Builds the configuration from the environment plus CLI overrides.
fn build_config(cli: &Cli) -> anyhow::Result<AgentConfig> {
    let mut config = AgentConfig::from_env()?;
    if let Some(model) = &cli.model {
        config = config.with_model(model);
    }
    if let Some(results) = &cli.results {
        config = config.with_results_path(results);
    }
    if let Some(tests_dir) = &cli.tests_dir {
        config = config.with_test_dir(tests_dir);
    }
    if let Commands::PageObjects(args) = &cli.command {
        if let Some(output) = &args.output {
            config = config.with_pages_dir(output);
        }
    }
    Ok(config)
}

async fn run_analyze(agent: &TestAutomationAgent, json: bool) -> anyhow::Result<()> {
    info!("Analyzing latest test run");
    let result = agent.analyze_test_failures().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}\n", result.message);
    if let Some(causes) = &result.root_causes {
        println!("Root causes:");
        for cause in causes {
            println!("  - {}", cause);
        }
    }
    if !result.suggestions.is_empty() {
        println!("Suggestions:");
        for suggestion in &result.suggestions {
            println!("  - {}", suggestion);
        }
    }
    if let Some(confidence) = result.confidence {
        println!("Confidence: {:.0}%", confidence * 100.0);
    }
    Ok(())
}

async fn run_generate(
    agent: &TestAutomationAgent,
    args: GenerateArgs,
    json: bool,
) -> anyhow::Result<()> {
    info!("Generating tests from requirements");
    let tests = agent
        .generate_tests_from_requirements(&args.requirements)
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&tests)?);
        return Ok(());
    }

    for (i, test) in tests.iter().enumerate() {
        if tests.len() > 1 {
            println!("// --- generated test {} ---", i + 1);
        }
        println!("{}\n", test);
    }
    Ok(())
}

async fn run_improve(agent: &TestAutomationAgent, json: bool) -> anyhow::Result<()> {
    info!("Reviewing spec files");
    let suggestions = agent.suggest_test_improvements().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No suggestions.");
        return Ok(());
    }
    for suggestion in &suggestions {
        let line = suggestion
            .line
            .map(|l| format!(":{}", l))
            .unwrap_or_default();
        println!(
            "[{}] {} ({}{})",
            suggestion.priority, suggestion.description, suggestion.file, line
        );
    }
    Ok(())
}

async fn run_fix_flaky(agent: &TestAutomationAgent, json: bool) -> anyhow::Result<()> {
    info!("Looking for flaky tests");
    let fixes = agent.auto_fix_flaky_tests().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&fixes)?);
        return Ok(());
    }

    if fixes.is_empty() {
        println!("No flaky tests detected.");
        return Ok(());
    }
    for fix in &fixes {
        println!("{} ({})", fix.test_file, fix.issue);
        println!("{}", fix.suggested_fix);
        println!("Confidence: {:.0}%\n", fix.confidence * 100.0);
    }
    Ok(())
}

async fn run_page_objects(
    agent: &TestAutomationAgent,
    args: PageObjectArgs,
    json: bool,
) -> anyhow::Result<()> {
    info!("Generating page objects for {} URL(s)", args.urls.len());
    let models = agent.generate_page_objects(&args.urls).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    for model in &models {
        println!(
            "{} -> {} ({} methods)",
            model.url,
            model.file_name,
            model.methods.len()
        );
    }
    Ok(())
}

fn run_enhance_reports(json: bool) -> anyhow::Result<()> {
    use crate::agents::scaffolding;

    let enhancement = scaffolding::enhance_reporting();

    if json {
        println!("{}", serde_json::to_string_pretty(&enhancement)?);
        return Ok(());
    }

    println!("Reporting scaffolding generated. Features:");
    for feature in &enhancement.features {
        println!("  - {}", feature);
    }
    println!("\nReporter:\n{}", enhancement.reporter_code);
    Ok(())
}

fn run_generate_helpers(args: &HelperArgs, json: bool) -> anyhow::Result<()> {
    use crate::agents::scaffolding;

    let suggestions = scaffolding::generate_helper_methods(&args.domain);

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    for suggestion in &suggestions {
        println!(
            "[{}] {} - {}",
            suggestion.category, suggestion.class_name, suggestion.description
        );
        println!("{}", suggestion.code);
    }
    Ok(())
}

async fn run_summary(config: &AgentConfig, json: bool) -> anyhow::Result<()> {
    use crate::agents::TestDataSource;
    use crate::source::PlaywrightDataSource;

    let source =
        PlaywrightDataSource::new(config.results_path.clone(), config.test_dir.clone());
    let results = source.latest_test_results().await?;
    let summary = SuiteSummary::from_results(&results);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if let Some(started) = source.run_started_at().await? {
        println!("Run started: {}", started.to_rfc3339());
    }
    println!(
        "{} tests: {} passed, {} failed, {} skipped ({}% pass rate)",
        summary.total, summary.passed, summary.failed, summary.skipped, summary.pass_rate()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_parses_with_defaults() {
        let cli = Cli::try_parse_from(["testpilot", "analyze"]).unwrap();
        assert_eq!(cli.log_level, "info");
        assert!(!cli.json);
        assert!(matches!(cli.command, Commands::Analyze));
    }

    #[test]
    fn test_generate_takes_requirements() {
        let cli = Cli::try_parse_from(["testpilot", "generate", "users can reset passwords"])
            .unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.requirements, "users can reset passwords");
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_generate_alias() {
        let cli = Cli::try_parse_from(["testpilot", "gen", "reqs"]).unwrap();
        assert!(matches!(cli.command, Commands::Generate(_)));
    }

    #[test]
    fn test_page_objects_requires_at_least_one_url() {
        assert!(Cli::try_parse_from(["testpilot", "page-objects"]).is_err());

        let cli = Cli::try_parse_from([
            "testpilot",
            "page-objects",
            "https://a.example",
            "https://b.example",
            "--output",
            "./pages",
        ])
        .unwrap();
        match cli.command {
            Commands::PageObjects(args) => {
                assert_eq!(args.urls.len(), 2);
                assert_eq!(args.output, Some("./pages".to_string()));
            }
            _ => panic!("Expected PageObjects command"),
        }
    }

    #[test]
    fn test_global_overrides_parse() {
        let cli = Cli::try_parse_from([
            "testpilot",
            "analyze",
            "--model",
            "claude-3-5-haiku-latest",
            "--results",
            "./artifacts",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.model, Some("claude-3-5-haiku-latest".to_string()));
        assert_eq!(cli.results, Some("./artifacts".to_string()));
        assert!(cli.json);
    }

    #[test]
    fn test_enhance_reports_parses() {
        let cli = Cli::try_parse_from(["testpilot", "enhance-reports"]).unwrap();
        assert!(matches!(cli.command, Commands::EnhanceReports));
    }

    #[test]
    fn test_generate_helpers_domain_default_and_override() {
        let cli = Cli::try_parse_from(["testpilot", "generate-helpers"]).unwrap();
        match cli.command {
            Commands::GenerateHelpers(args) => assert_eq!(args.domain, "general"),
            _ => panic!("Expected GenerateHelpers command"),
        }

        let cli = Cli::try_parse_from([
            "testpilot",
            "generate-helpers",
            "--domain",
            "e-commerce",
        ])
        .unwrap();
        match cli.command {
            Commands::GenerateHelpers(args) => assert_eq!(args.domain, "e-commerce"),
            _ => panic!("Expected GenerateHelpers command"),
        }
    }

    #[test]
    fn test_fix_flaky_name() {
        let cli = Cli::try_parse_from(["testpilot", "fix-flaky"]).unwrap();
        assert!(matches!(cli.command, Commands::FixFlaky));
    }
}
