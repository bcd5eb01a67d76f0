//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use lessonmap_core::{
    IssueLevel, ScanIssue, ScanReporter, ScanResult, SidecarOptions, normalize_sidecars, run_scan,
};
use lessonmap_shared::{
    AppConfig, ExportFormat, ScanSettings, init_config, load_config, parse_endpoint,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// lessonmap: catalog a curriculum tree.
#[derive(Parser)]
#[command(
    name = "lessonmap",
    version,
    about = "Scan a curriculum tree and export lesson metadata as CSV, JSON or YAML.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `scan` with configured settings.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scan the tree, write exports and push the collection.
    Scan(ScanArgs),

    /// Rewrite every `_CONFIG.json` sidecar as clean, pretty JSON.
    Normalize {
        /// Root of the curriculum tree.
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `scan`. Each one overrides the config file.
#[derive(Args, Default)]
pub(crate) struct ScanArgs {
    /// Root of the curriculum tree.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Directory for the export files.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Export formats (comma-separated): csv, json, yaml.
    #[arg(short, long, value_delimiter = ',')]
    pub format: Vec<ExportFormat>,

    /// Ingestion endpoint to push the collection to.
    #[arg(long, conflicts_with = "no_push")]
    pub endpoint: Option<String>,

    /// Skip the remote push.
    #[arg(long)]
    pub no_push: bool,

    /// Normalize sidecars before scanning.
    #[arg(long)]
    pub normalize_sidecars: bool,

    /// Exit non-zero if any file or sink failed.
    #[arg(long)]
    pub strict: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

const LOG_TARGETS: [&str; 5] = [
    "lessonmap_cli",
    "lessonmap_core",
    "lessonmap_export",
    "lessonmap_markdown",
    "lessonmap_shared",
];

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or_else(|| Command::Scan(ScanArgs::default())) {
        Command::Scan(args) => cmd_scan(args).await,
        Command::Normalize { root } => cmd_normalize(root),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_scan(args: ScanArgs) -> Result<()> {
    let config = load_config()?;
    let strict = args.strict;
    let settings = resolve_settings(&config, args)?;

    info!(
        root = %settings.root.display(),
        out = %settings.output_dir.display(),
        push = settings.endpoint.is_some(),
        "scanning curriculum"
    );

    let reporter = CliProgress::new();
    let result = run_scan(&settings, &reporter).await;
    reporter.finish();
    let result = result?;

    print_summary(&result);

    if strict && result.errors > 0 {
        return Err(eyre!("{} error(s) during scan", result.errors));
    }
    Ok(())
}

/// Merge CLI flags over the config file.
fn resolve_settings(config: &AppConfig, args: ScanArgs) -> Result<ScanSettings> {
    let mut settings = ScanSettings::try_from(config)?;

    if let Some(root) = args.root {
        settings.root = root;
    }
    if let Some(out) = args.out {
        settings.output_dir = out;
    }
    if !args.format.is_empty() {
        let mut formats: Vec<ExportFormat> = Vec::with_capacity(args.format.len());
        for format in args.format {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        settings.formats = formats;
    }
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = Some(parse_endpoint(&endpoint)?);
    }
    if args.no_push {
        settings.endpoint = None;
    }
    settings.normalize_sidecars = args.normalize_sidecars;

    Ok(settings)
}

fn print_summary(result: &ScanResult) {
    println!();
    println!("  Records:  {}", result.record_count);
    for (subset, count) in &result.subset_counts {
        println!("    {:<11} {count}", format!("{subset}:"));
    }
    if let Some(normalized) = &result.normalized {
        println!(
            "  Sidecars: {} scanned, {} rewritten",
            normalized.scanned, normalized.rewritten
        );
    }
    println!("  Files:    {}", result.exports.len());
    for meta in &result.exports {
        println!("    {:<24} {:>8} B  {}", meta.filename, meta.size_bytes, &meta.sha256[..12]);
    }
    match &result.push {
        Some(outcome) => println!("  Push:     {outcome}"),
        None => println!("  Push:     skipped"),
    }
    println!("  Issues:   {} warning(s), {} error(s)", result.warnings, result.errors);
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();
}

fn cmd_normalize(root: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let root = root.unwrap_or_else(|| PathBuf::from(&config.defaults.root));
    let opts = SidecarOptions {
        sanitize: config.defaults.sanitize_sidecars,
    };

    let reporter = CliProgress::new();
    let summary = normalize_sidecars(&root, opts, &reporter);
    reporter.finish();
    let summary = summary?;

    println!(
        "Normalized {}: {} scanned, {} rewritten, {} failed",
        root.display(),
        summary.scanned,
        summary.rewritten,
        summary.failed
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Scan reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ScanReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_processed(&self, path: &str, current: usize) {
        self.spinner.set_message(format!("[{current}] {path}"));
    }

    fn issue(&self, issue: &ScanIssue) {
        let tag = match issue.level {
            IssueLevel::Warning => "warning",
            IssueLevel::Error => "error",
        };
        let line = match &issue.path {
            Some(path) => format!("{tag}: {}: {}", path.display(), issue.message),
            None => format!("{tag}: {}", issue.message),
        };
        self.spinner.suspend(|| eprintln!("{line}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn scan_args(cli: Cli) -> ScanArgs {
        match cli.command {
            Some(Command::Scan(args)) => args,
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn no_arguments_means_default_scan() {
        let cli = parse(&["lessonmap"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn formats_are_comma_separated() {
        let args = scan_args(parse(&["lessonmap", "scan", "--format", "csv,yaml"]));
        assert_eq!(args.format, vec![ExportFormat::Csv, ExportFormat::Yaml]);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["lessonmap", "scan", "--format", "xml"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = scan_args(parse(&[
            "lessonmap",
            "scan",
            "--root",
            "content",
            "--out",
            "exports",
            "--format",
            "json,json,yaml",
            "--endpoint",
            "http://localhost:9000/ingest",
            "--normalize-sidecars",
        ]));
        let settings = resolve_settings(&AppConfig::default(), args).unwrap();

        assert_eq!(settings.root, PathBuf::from("content"));
        assert_eq!(settings.output_dir, PathBuf::from("exports"));
        assert_eq!(settings.formats, vec![ExportFormat::Json, ExportFormat::Yaml]);
        assert_eq!(
            settings.endpoint.map(|u| u.to_string()).as_deref(),
            Some("http://localhost:9000/ingest")
        );
        assert!(settings.normalize_sidecars);
    }

    #[test]
    fn no_push_clears_endpoint() {
        let args = scan_args(parse(&["lessonmap", "scan", "--no-push"]));
        let settings = resolve_settings(&AppConfig::default(), args).unwrap();
        assert!(settings.endpoint.is_none());
        assert_eq!(settings.formats, vec![ExportFormat::Csv, ExportFormat::Json]);
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let args = scan_args(parse(&["lessonmap", "scan", "--endpoint", "ftp://example.com"]));
        assert!(resolve_settings(&AppConfig::default(), args).is_err());
    }

    #[test]
    fn endpoint_and_no_push_conflict() {
        assert!(
            Cli::try_parse_from(["lessonmap", "scan", "--endpoint", "http://x", "--no-push"])
                .is_err()
        );
    }
}
