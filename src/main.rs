//! Course-Audit main entry point
//!
//! This is the command-line interface for the Course-Audit engagement auditor.

use anyhow::Context;
use clap::Parser;
use course_audit::api::{user_agent_string, CanvasApi};
use course_audit::audit::run_audit;
use course_audit::config::{load_config_with_hash, Config};
use course_audit::output::{
    print_summary, ConsoleTable, CsvSink, MarkdownSink, RecordLayout, ResultSink, RunSummary,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Course-Audit: engagement statistics for LMS courses
///
/// Course-Audit walks the LMS REST API one request at a time and reports,
/// per course, how many active students take part in quizzes, assignments
/// and discussions, and how many module pages embed tracked media.
#[derive(Parser, Debug)]
#[command(name = "course-audit")]
#[command(version)]
#[command(about = "Engagement statistics for LMS courses", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Audit this course instead of the configured list (repeatable)
    #[arg(long = "course", value_name = "ID")]
    courses: Vec<u64>,

    /// Write the CSV export here (overrides output.csv-path)
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Write the markdown report here (overrides output.summary-path)
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Validate config and show the planned requests without sending any
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let course_ids = if cli.courses.is_empty() {
        config.audit.course_ids.clone()
    } else {
        cli.courses.clone()
    };

    if cli.dry_run {
        return handle_dry_run(&config, &course_ids);
    }

    handle_audit(&cli, &config, &course_ids, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("course_audit=info,warn"),
            1 => EnvFilter::new("course_audit=debug,info"),
            2 => EnvFilter::new("course_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved config and planned requests
fn handle_dry_run(config: &Config, course_ids: &[u64]) -> anyhow::Result<()> {
    println!("=== Course-Audit Dry Run ===\n");

    println!("LMS:");
    println!("  Base URL: {}", config.canvas.base_url);
    println!("  Page size: {}", config.canvas.per_page);
    println!(
        "  Access token: {}",
        if config.access_token().is_some() {
            "set"
        } else {
            "not set"
        }
    );

    println!("\nPacing:");
    println!("  Request delay: {}ms", config.pager.request_delay);
    println!(
        "  Default Retry-After: {}s",
        config.pager.retry_after_default
    );
    println!("  Max pages per collection: {}", config.pager.max_pages);
    println!(
        "  Page body attempts: {}",
        config.pager.page_body_attempts
    );
    println!("  Timeout: {}s", config.pager.timeout);

    println!("\nUser Agent: {}", user_agent_string(&config.user_agent));

    println!("\nNew Quiz Domains ({}):", config.audit.new_quiz_domains.len());
    for domain in &config.audit.new_quiz_domains {
        println!("  - {}", domain);
    }

    println!("\nProviders ({}):", config.providers.len());
    for provider in &config.providers {
        println!("  - {} ({})", provider.label, provider.id);
    }

    let api = CanvasApi::from_config(config)?;
    println!("\nCourses ({}):", course_ids.len());
    for course_id in course_ids {
        println!("  - {}", course_id);
        for url in api.seed_urls(*course_id)? {
            println!("    GET {}", url);
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Runs the audit and hands the records to every configured sink
async fn handle_audit(
    cli: &Cli,
    config: &Config,
    course_ids: &[u64],
    config_hash: String,
) -> anyhow::Result<()> {
    tracing::info!(
        "Auditing {} courses against {}",
        course_ids.len(),
        config.canvas.base_url
    );

    let started_at = chrono::Utc::now();
    let records = run_audit(config, course_ids).await?;
    let finished_at = chrono::Utc::now();

    let layout = RecordLayout::from_config(config);
    ConsoleTable::stdout().emit(&layout, &records)?;

    let csv_path = cli
        .csv
        .clone()
        .or_else(|| config.output.csv_path.as_ref().map(PathBuf::from));
    if let Some(path) = csv_path {
        CsvSink::new(&path)
            .emit(&layout, &records)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let summary = RunSummary::from_records(started_at, finished_at, &config.providers, &records)
        .with_config_hash(config_hash);

    let summary_path = cli
        .summary
        .clone()
        .or_else(|| config.output.summary_path.as_ref().map(PathBuf::from));
    if let Some(path) = summary_path {
        MarkdownSink::new(&path, summary.clone())
            .emit(&layout, &records)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    print_summary(&summary);

    if summary.courses_failed > 0 {
        tracing::warn!(
            "{} of {} courses failed",
            summary.courses_failed,
            summary.courses_audited
        );
    }

    Ok(())
}
