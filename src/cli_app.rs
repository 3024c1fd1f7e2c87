//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use artifact_sweeper::cli::interrupt::InterruptFlag;
use artifact_sweeper::cli::selector::{SelectionOutcome, Selector};
use artifact_sweeper::cli::spinner::Spinner;
use artifact_sweeper::core::config::Config;
use artifact_sweeper::core::errors::SweepError;
use artifact_sweeper::core::format::{format_bytes, format_file_count};
use artifact_sweeper::core::paths::resolve_scan_root;
use artifact_sweeper::logger::activity::{ActivityEvent, ActivityLog};
use artifact_sweeper::scanner::deletion::{
    DeletionConfig, DeletionExecutor, DeletionOutcome, DeletionReport,
};
use artifact_sweeper::scanner::engine::{ArtifactRecord, ArtifactScanner, ScanOptions};
use artifact_sweeper::scanner::filter::{CategoryFilter, StaleFilter, parse_duration};
use artifact_sweeper::scanner::patterns::ArtifactPatternRegistry;

/// Find and delete regenerable build and dependency artifacts.
#[derive(Debug, Parser)]
#[command(
    name = "sweep",
    version,
    about = "Find build and dependency artifacts, pick what to delete, reclaim the space",
    long_about = None
)]
pub struct Cli {
    /// Directory to scan.
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
    /// Only match these categories (comma separated or repeated).
    #[arg(long, value_name = "CATEGORY", value_delimiter = ',', conflicts_with = "exclude")]
    only: Vec<String>,
    /// Never match these categories (comma separated or repeated).
    #[arg(long, value_name = "CATEGORY", value_delimiter = ',')]
    exclude: Vec<String>,
    /// Keep only artifacts untouched for at least this long (e.g. 30d, 2w, 12h).
    #[arg(long, value_name = "DURATION")]
    stale: Option<String>,
    /// Print known categories and their directory names, then exit.
    #[arg(long)]
    list_categories: bool,
    /// Show what would be deleted without deleting anything.
    #[arg(long)]
    dry_run: bool,
    /// Skip the interactive selector and delete everything found.
    #[arg(short = 'y', long)]
    yes: bool,
    /// Print scan results as JSON and exit.
    #[arg(long, conflicts_with = "yes")]
    json: bool,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors and final summary only).
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Some deletions failed.
    #[error("{0}")]
    Partial(String),
    /// SIGINT/SIGTERM or Ctrl-C in the selector.
    #[error("interrupted")]
    Interrupted,
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) | Self::Json(_) => 2,
            Self::Partial(_) => 4,
            Self::Interrupted => 130,
        }
    }
}

impl From<SweepError> for CliError {
    fn from(err: SweepError) -> Self {
        if err.is_user_error() {
            Self::User(err.to_string())
        } else {
            Self::Runtime(err.to_string())
        }
    }
}

/// Dispatch the command line.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        control::set_override(false);
    }

    if let Some(Command::Completions(args)) = &cli.command {
        let mut command = Cli::command();
        let binary_name = command.get_name().to_string();
        generate(args.shell, &mut command, binary_name, &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    if cli.verbose {
        eprintln!(
            "[ASW-CONFIG] loaded {}",
            cli.config
                .clone()
                .unwrap_or_else(Config::default_path)
                .display()
        );
    }
    let registry = ArtifactPatternRegistry::default().with_custom(config.patterns.clone());

    if cli.list_categories {
        return list_categories(cli, &registry);
    }

    let root = resolve_scan_root(cli.path.as_deref().unwrap_or_else(|| Path::new(".")))?;
    let filter = resolve_filter(cli, &config, &registry)?;
    let stale = resolve_stale(cli, &config)?;
    let interrupt = InterruptFlag::install();
    let log = ActivityLog::from_config(&config.log);

    let result = sweep(cli, &config, &registry, &root, filter, stale, &interrupt, &log);
    if let Err(e) = &result {
        log.record(ActivityEvent::Error {
            code: error_code(e).to_string(),
            message: e.to_string(),
        });
        log.flush();
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn sweep(
    cli: &Cli,
    config: &Config,
    registry: &ArtifactPatternRegistry,
    root: &Path,
    filter: Option<CategoryFilter>,
    stale: Option<StaleFilter>,
    interrupt: &InterruptFlag,
    log: &ActivityLog,
) -> Result<(), CliError> {
    let started = Instant::now();
    let records = scan_with_spinner(cli, registry, root, filter, interrupt);
    if interrupt.is_raised() {
        return Err(CliError::Interrupted);
    }
    let records = match stale {
        Some(stale) => stale.retain(records, SystemTime::now()),
        None => records,
    };
    let elapsed = started.elapsed();
    let total_bytes = total_size(&records);

    log.record(ActivityEvent::ScanCompleted {
        root: root.display().to_string(),
        artifacts: records.len(),
        total_bytes,
        duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    });
    if cli.verbose {
        eprintln!(
            "[ASW-SCAN] {} artifacts under {} in {:.2}s",
            records.len(),
            root.display(),
            elapsed.as_secs_f64()
        );
    }

    if cli.json {
        let payload = scan_json(root, registry, &records, elapsed);
        write_json_line(&payload)?;
        return Ok(());
    }

    if records.is_empty() {
        println!("No artifacts found under {}.", root.display());
        return Ok(());
    }

    let selected = if cli.yes {
        if !cli.quiet {
            println!(
                "Found {} artifacts ({}).",
                records.len(),
                format_bytes(total_bytes).bold()
            );
        }
        records
    } else {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            return Err(CliError::User(
                "interactive selection needs a terminal; pass --yes to delete everything found or --json to list".to_string(),
            ));
        }
        let outcome = Selector::new(root)
            .min_visible_rows(config.selector.min_visible_rows)
            .interrupt_flag(interrupt.clone())
            .run(records)?;
        let (count, bytes) = match &outcome {
            SelectionOutcome::Confirmed(chosen) => (chosen.len(), total_size(chosen)),
            SelectionOutcome::Cancelled | SelectionOutcome::Interrupted => (0, 0),
        };
        log.record(ActivityEvent::SelectionResolved {
            outcome: outcome.label().to_string(),
            selected: count,
            total_bytes: bytes,
        });
        match outcome {
            SelectionOutcome::Confirmed(chosen) => chosen,
            SelectionOutcome::Cancelled => {
                println!("Cancelled. Nothing deleted.");
                return Ok(());
            }
            SelectionOutcome::Interrupted => return Err(CliError::Interrupted),
        }
    };

    if selected.is_empty() {
        println!("Nothing selected. Nothing deleted.");
        return Ok(());
    }

    let executor = DeletionExecutor::new(DeletionConfig { dry_run: cli.dry_run }, log)
        .with_cancel_flag(interrupt.shared());
    let report = executor.execute(&selected, |outcome| {
        if !cli.quiet {
            print_outcome(&outcome);
        }
    });
    print_summary(&report);

    if report.cancelled {
        return Err(CliError::Interrupted);
    }
    if report.has_failures() {
        return Err(CliError::Partial(format!(
            "{} of {} deletions failed",
            report.items_failed,
            selected.len()
        )));
    }
    Ok(())
}

fn scan_with_spinner(
    cli: &Cli,
    registry: &ArtifactPatternRegistry,
    root: &Path,
    filter: Option<CategoryFilter>,
    interrupt: &InterruptFlag,
) -> Vec<ArtifactRecord> {
    let spinner = Spinner::start(!cli.quiet && !cli.json);
    let status = spinner.handle();
    let options = ScanOptions { filter };
    let records = ArtifactScanner::new(registry, &options)
        .with_progress(move |msg| status.set_status(msg))
        .with_cancel_flag(interrupt.shared())
        .scan(root);
    spinner.stop();
    records
}

/// Command-line lists win over config defaults; only one side is consulted.
fn resolve_filter(
    cli: &Cli,
    config: &Config,
    registry: &ArtifactPatternRegistry,
) -> Result<Option<CategoryFilter>, CliError> {
    let filter = if cli.only.is_empty() && cli.exclude.is_empty() {
        CategoryFilter::from_lists(&config.scan.only, &config.scan.exclude)?
    } else {
        CategoryFilter::from_lists(&cli.only, &cli.exclude)?
    };
    if let Some(filter) = &filter {
        filter.validate(registry)?;
    }
    Ok(filter)
}

fn resolve_stale(cli: &Cli, config: &Config) -> Result<Option<StaleFilter>, CliError> {
    cli.stale
        .as_deref()
        .or(config.scan.stale.as_deref())
        .map(|raw| parse_duration(raw).map(StaleFilter::new))
        .transpose()
        .map_err(CliError::from)
}

fn list_categories(cli: &Cli, registry: &ArtifactPatternRegistry) -> Result<(), CliError> {
    if cli.json {
        let categories: serde_json::Map<String, Value> = registry
            .categories()
            .iter()
            .map(|(name, members)| (name.clone(), json!(members)))
            .collect();
        return write_json_line(&json!({ "categories": categories }));
    }

    let mut stdout = io::stdout().lock();
    for (name, members) in registry.categories() {
        let names: Vec<&str> = members.iter().map(String::as_str).collect();
        writeln!(stdout, "{:<10} {}", name.bold(), names.join(", "))?;
    }
    Ok(())
}

fn print_outcome(outcome: &DeletionOutcome<'_>) {
    match outcome {
        DeletionOutcome::Deleted(record) => println!(
            "{} {} ({})",
            "✓".green(),
            record.relative_path.display(),
            format_bytes(record.size_bytes)
        ),
        DeletionOutcome::WouldDelete(record) => println!(
            "{} would delete {} ({})",
            "-".cyan(),
            record.relative_path.display(),
            format_bytes(record.size_bytes)
        ),
        DeletionOutcome::Skipped(record, reason) => println!(
            "{} {} skipped: {}",
            "!".yellow(),
            record.relative_path.display(),
            reason.as_str()
        ),
        DeletionOutcome::Failed(record, err) => println!(
            "{} {} {}",
            "✗".red(),
            record.relative_path.display(),
            err.error.red()
        ),
    }
}

fn print_summary(report: &DeletionReport) {
    let dirs = if report.items_deleted == 1 {
        "directory"
    } else {
        "directories"
    };
    let verb = if report.dry_run { "Would free" } else { "Freed" };
    println!(
        "\n{verb} {} across {} {dirs} in {:.1}s.",
        format_bytes(report.bytes_freed).bold(),
        report.items_deleted,
        report.duration.as_secs_f64()
    );
    if report.items_skipped > 0 {
        println!("  {} skipped (already gone or changed).", report.items_skipped);
    }
    if report.items_failed > 0 {
        println!(
            "  {}",
            format!("{} failed.", report.items_failed).red()
        );
    }
}

fn scan_json(
    root: &Path,
    registry: &ArtifactPatternRegistry,
    records: &[ArtifactRecord],
    elapsed: Duration,
) -> Value {
    let artifacts: Vec<Value> = records
        .iter()
        .map(|record| artifact_json(record, registry))
        .collect();
    json!({
        "command": "scan",
        "root": root.display().to_string(),
        "count": records.len(),
        "total_bytes": total_size(records),
        "elapsed_seconds": elapsed.as_secs_f64(),
        "artifacts": artifacts,
    })
}

fn artifact_json(record: &ArtifactRecord, registry: &ArtifactPatternRegistry) -> Value {
    json!({
        "path": record.absolute_path.display().to_string(),
        "relative_path": record.relative_path.display().to_string(),
        "basename": record.basename,
        "description": record.description,
        "categories": registry.categories_of(&record.basename),
        "size_bytes": record.size_bytes,
        "size_human": format_bytes(record.size_bytes),
        "file_count": record.file_count,
        "files_human": format_file_count(record.file_count),
        "last_modified": record.last_modified.map(|t| {
            chrono::DateTime::<chrono::Utc>::from(t)
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        }),
    })
}

fn total_size(records: &[ArtifactRecord]) -> u64 {
    records
        .iter()
        .fold(0, |acc, r| acc.saturating_add(r.size_bytes))
}

fn error_code(err: &CliError) -> &'static str {
    match err {
        CliError::User(_) => "ASW-CLI-USER",
        CliError::Runtime(_) => "ASW-CLI-RUNTIME",
        CliError::Partial(_) => "ASW-CLI-PARTIAL",
        CliError::Interrupted => "ASW-CLI-INTERRUPTED",
        CliError::Json(_) => "ASW-CLI-JSON",
        CliError::Io(_) => "ASW-CLI-IO",
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}
