// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{error, warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use elantime::app_config::{self, Config};
use elantime::document::{AnnotationId, MarkerId};
use elantime::file_utils::{FileManager, DOCUMENT_EXTENSION};
use elantime::timing::{parse_timestamp, TimeFormat};
use elantime::transcript::{self, Transcript};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for TimeFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTimeFormat {
    MinSec,
    Timestamp,
    Ms,
}

impl From<CliTimeFormat> for TimeFormat {
    fn from(cli_format: CliTimeFormat) -> Self {
        match cli_format {
            CliTimeFormat::MinSec => TimeFormat::MinSec,
            CliTimeFormat::Timestamp => TimeFormat::Timestamp,
            CliTimeFormat::Ms => TimeFormat::Milliseconds,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List tiers in hierarchy order with annotation start times
    Show(ShowArgs),

    /// Resolve every annotation of one document or a directory of documents
    Check(CheckArgs),

    /// Write a copy of a document, optionally with edited annotation texts
    Export(ExportArgs),

    /// Generate shell completions for elantime
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Document to list
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Time format for annotation start times
    #[arg(short, long, value_enum)]
    time_format: Option<CliTimeFormat>,

    /// Do not print tier header lines
    #[arg(long)]
    no_headers: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Document file or directory of documents
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Document to export
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Replace an annotation's text before exporting (repeatable)
    #[arg(long = "set-text", value_name = "ID=TEXT")]
    set_text: Vec<String>,

    /// Set a time marker's value before exporting (repeatable)
    #[arg(long = "set-time", value_name = "MARKER=HH:MM:SS,mmm")]
    set_time: Vec<String>,

    /// Output path (defaults to a copy next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,
}

/// elantime - time resolution for tiered transcription documents
#[derive(Parser, Debug)]
#[command(name = "elantime")]
#[command(version = "0.1.0")]
#[command(about = "Resolve annotation times and tier order in transcription documents")]
#[command(long_about = "elantime loads a parsed transcription document (JSON), resolves a start and end
time for every annotation and lists tiers parents-first.

EXAMPLES:
    elantime show session.json                   # Ordered listing with m:ss times
    elantime show -t timestamp session.json      # HH:MM:SS,mmm times
    elantime check corpus/                        # Check every document in a directory
    elantime export session.json --set-text a12=hello
    elantime export session.json --set-time ts3=00:00:04,250
    elantime completions bash > elantime.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
// Filtering follows `log::max_level()` so the level can change after init
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "elantime", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Show(args) => run_show(args, &config),
        Commands::Check(args) => run_check(args, &config),
        Commands::Export(args) => run_export(args, &config),
        Commands::Completions { .. } => Ok(()),
    }
}

// Load or create configuration, then apply command line overrides
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn load_transcript(path: &Path, config: &Config) -> Result<Transcript> {
    let tree = FileManager::load_document(path)?;
    Transcript::load_with(tree, &config.resolution)
        .with_context(|| format!("Failed to load document: {:?}", path))
}

fn run_show(args: ShowArgs, config: &Config) -> Result<()> {
    let mut display = config.display.clone();
    if let Some(format) = args.time_format {
        display.time_format = format.into();
    }
    if args.no_headers {
        display.show_tier_headers = false;
    }

    let transcript = load_transcript(&args.document, config)?;
    let listing = transcript::build_listing(&transcript);

    print!("{}", transcript::render_listing(&listing, &display));
    info!("Total duration: {}", display.time_format.format(transcript.max_time()));
    Ok(())
}

fn run_check(args: CheckArgs, config: &Config) -> Result<()> {
    let documents = if FileManager::dir_exists(&args.path) {
        FileManager::find_files(&args.path, DOCUMENT_EXTENSION)?
    } else if FileManager::file_exists(&args.path) {
        vec![args.path.clone()]
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", args.path));
    };

    let mut load_failures = 0;
    for document in &documents {
        let transcript = match load_transcript(document, config) {
            Ok(transcript) => transcript,
            Err(e) => {
                error!("{:#}", e);
                load_failures += 1;
                continue;
            }
        };

        let report = transcript::run_check(&transcript);
        if args.json {
            println!("{}", serde_json::to_string(&report).context("Failed to serialize report")?);
            continue;
        }

        println!(
            "{}: {}/{} annotations resolved",
            document.display(),
            report.resolved,
            report.annotations
        );
        if let Some(hierarchy) = &report.hierarchy {
            println!("  {}", hierarchy);
        }
        for (id, failure) in &report.failures {
            println!("  {}: {}", id, failure);
        }
    }

    info!("Checked {} document(s)", documents.len());

    if load_failures > 0 {
        return Err(anyhow!("{} of {} document(s) failed to load", load_failures, documents.len()));
    }
    Ok(())
}

fn run_export(args: ExportArgs, config: &Config) -> Result<()> {
    let transcript = load_transcript(&args.document, config)?;

    for edit in &args.set_text {
        let (id, text) = edit
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected ID=TEXT, got '{}'", edit))?;
        transcript
            .update_annotation_text(&AnnotationId::from(id), text)
            .with_context(|| format!("Failed to apply edit '{}'", edit))?;
    }

    for edit in &args.set_time {
        let (id, time) = edit
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected MARKER=HH:MM:SS,mmm, got '{}'", edit))?;
        let value_ms = parse_timestamp(time)?;
        transcript
            .set_marker_value(&MarkerId::from(id), Some(value_ms))
            .with_context(|| format!("Failed to apply edit '{}'", edit))?;
    }

    let output = args
        .output
        .unwrap_or_else(|| FileManager::generate_copy_path(&args.document, &config.export.copy_suffix));

    if output.exists() && !args.force_overwrite {
        warn!("Output file already exists: {:?}. Use -f to force overwrite.", output);
        return Ok(());
    }

    FileManager::save_document(&output, &transcript.to_tree(), config.export.pretty)?;
    info!("Exported {:?}", output);
    Ok(())
}
