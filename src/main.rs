// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;

use novelwai::app_config::{Config, LogLevel};
use novelwai::app_controller::{Controller, RunOutcome, RunRequest};
use novelwai::chapters::ChapterSource;
use novelwai::translation::concurrency::parse_delay_ms;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for novelwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// novelwai - Chinese web novel translation with Gemini
///
/// Translates a range of chapters with Gemini, falling back to Google
/// Translate whenever Gemini fails.
#[derive(Parser, Debug)]
#[command(name = "novelwai")]
#[command(version)]
#[command(about = "Batch translation of Chinese novel chapters into English")]
#[command(long_about = "novelwai translates a JSON array of {\"title\", \"content\"} chapters into English
using Gemini, with Google Translate as an automatic fallback.

EXAMPLES:
    novelwai -i chapters.json                        # Translate every chapter
    novelwai -i chapters.json -r 3-7                 # Translate chapters 3 to 7
    novelwai -i https://example.com/novel.json -r 10 # Chapter 10 to the end
    novelwai -i chapters.json --delay 2000 -f        # Shorter pause, overwrite output
    novelwai completions bash > novelwai.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. The API key is best passed through GEMINI_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Chapter list: a local JSON file or an http(s) URL
    #[arg(short, long, value_name = "FILE_OR_URL")]
    input: Option<String>,

    /// Chapter range such as 3-7; empty selects every chapter
    #[arg(short, long, default_value = "")]
    range: String,

    /// Gemini API key
    #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model used for chapter bodies
    #[arg(short, long)]
    model: Option<String>,

    /// Model used for the title batch
    #[arg(long)]
    title_model: Option<String>,

    /// Pause after each chapter in milliseconds (0 or invalid means 4000)
    #[arg(short, long)]
    delay: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Directory for the output document
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Keep going when a chapter fails on both backends
    #[arg(long)]
    continue_on_error: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level), now, Self::get_emoji_for_level(level), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "novelwai", &mut std::io::stdout());
        return Ok(());
    }

    if let Err(e) = run_translate(cli).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(api_key) = &options.api_key {
        config.primary.api_key = api_key.clone();
    }
    if let Some(model) = &options.model {
        config.primary.model = model.clone();
    }
    if let Some(title_model) = &options.title_model {
        config.primary.title_model = title_model.clone();
    }
    if let Some(delay) = &options.delay {
        config.batch.delay_ms = parse_delay_ms(delay);
    }
    if options.continue_on_error {
        config.batch.continue_on_error = true;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: CommandLineOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let log_level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(log_level.to_level_filter());
    }

    let input = options.input.clone()
        .context("--input is required when no subcommand is specified")?;

    // Load or create configuration
    let mut config = Config::load_or_create(&options.config)?;
    apply_overrides(&mut config, &options);

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)
        .context("Configuration validation failed")?;

    // Ctrl-C stops the batch after the chapter in progress
    let cancellation = controller.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current chapter…");
            cancellation.cancel();
        }
    });

    let request = RunRequest {
        source: ChapterSource::from_location(&input),
        range_spec: options.range.clone(),
        output_dir: options.output_dir.clone(),
        force_overwrite: options.force_overwrite,
    };

    match controller.run(request).await? {
        RunOutcome::Written(path) => info!("Output written to {}", path.display()),
        RunOutcome::Skipped(path) => info!("Nothing to do, {} already exists", path.display()),
    }

    Ok(())
}
