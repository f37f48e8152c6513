// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Result, anyhow, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::{Config, SynthesisProvider};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod extraction;
mod file_utils;
mod providers;
mod script_parser;
mod synthesis;

/// CLI Wrapper for SynthesisProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSynthesisProvider {
    Chatterbox,
    Tortoise,
}

impl From<CliSynthesisProvider> for SynthesisProvider {
    fn from(cli_provider: CliSynthesisProvider) -> Self {
        match cli_provider {
            CliSynthesisProvider::Chatterbox => SynthesisProvider::Chatterbox,
            CliSynthesisProvider::Tortoise => SynthesisProvider::Tortoise,
        }
    }
}

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a script and report dialogue per character (default command)
    #[command(alias = "analyse")]
    Analyze(AnalyzeArgs),

    /// Voice script dialogue using TTS providers
    Voice(VoiceArgs),

    /// Generate shell completions for scriptcast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Input script file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Print the analysis as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the per-character dialogue to this file (or directory in folder mode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct VoiceArgs {
    /// Input script file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Synthesis provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliSynthesisProvider>,

    /// Quality preset to use (Tortoise only)
    #[arg(long)]
    preset: Option<String>,

    /// Only voice these characters (repeatable)
    #[arg(long = "character", value_name = "NAME")]
    character: Vec<String>,

    /// Assign a reference clip to a character (repeatable)
    #[arg(long = "voice", value_name = "NAME=PATH")]
    voice: Vec<String>,

    /// Directory for generated audio (defaults to a sibling of the script)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// ScriptCast - Read film scripts aloud with AI voices
///
/// A screenplay processing tool that extracts dialogue from script files
/// and voices each character using local TTS servers.
#[derive(Parser, Debug)]
#[command(name = "scriptcast")]
#[command(author = "ScriptCast Team")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered script reading tool")]
#[command(long_about = "ScriptCast extracts dialogue from screenplay files and voices each character using TTS providers.

EXAMPLES:
    scriptcast screenplay.pdf                            # Analyze using default config
    scriptcast --json screenplay.pdf                     # Print the analysis as JSON
    scriptcast -o dialogue.json screenplay.pdf           # Write per-character dialogue to a file
    scriptcast voice screenplay.pdf                      # Voice every character
    scriptcast voice --character JOHN screenplay.pdf     # Voice a single character
    scriptcast voice --voice \"JOHN=clips/john.wav\" screenplay.pdf  # Assign a reference clip
    scriptcast voice -p tortoise --preset fast screenplay.pdf       # Pick provider and preset
    scriptcast --log-level debug /scripts/               # Process entire directory with debug logging
    scriptcast completions bash > scriptcast.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    chatterbox - Local Chatterbox TTS server (default: http://localhost:7860)
    tortoise   - Local Tortoise TTS server (default: http://localhost:7862)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input script file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Print the analysis as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the per-character dialogue to this file (or directory in folder mode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
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
        let logger = Box::new(CustomLogger::new(level));
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
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");

            let mut stderr = std::io::stderr();
            let _ = match record.level() {
                Level::Error => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;31m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
                Level::Warn => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;33m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
                Level::Info => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;32m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
                Level::Debug => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;36m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
                Level::Trace => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;35m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
            };
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

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "scriptcast", &mut std::io::stdout());
            return Ok(());
        }
        Some(Commands::Analyze(args)) => {
            // Use the explicit analyze subcommand args
            return run_analyze(args).await;
        }
        Some(Commands::Voice(args)) => {
            return run_voice(args).await;
        }
        None => {
            // Default behavior - use top-level args for backwards compat with plain invocations
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let analyze_args = AnalyzeArgs {
                input_path,
                force_overwrite: cli.force_overwrite,
                json: cli.json,
                output: cli.output,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            return run_analyze(analyze_args).await;
        }
    }
}

/// Map a config log level onto the log crate filter
fn to_level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Load the configuration file, creating a default one when missing
fn load_or_create_config(config_path: &str, log_level: &Option<CliLogLevel>) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        // Update log level in config if specified via command line
        if let Some(level) = log_level {
            config.log_level = level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();

        // Apply command line log level to default config if specified
        if let Some(level) = log_level {
            config.log_level = level.clone().into();
        }

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    Ok(config)
}

/// Parse a NAME=PATH voice assignment from the command line
fn parse_voice_assignment(assignment: &str) -> Result<(String, String)> {
    match assignment.split_once('=') {
        Some((character, path)) if !character.trim().is_empty() && !path.trim().is_empty() => {
            Ok((character.trim().to_string(), path.trim().to_string()))
        }
        _ => Err(anyhow!("Invalid voice assignment '{}', expected NAME=PATH", assignment)),
    }
}

async fn run_analyze(options: AnalyzeArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(to_level_filter(&cmd_log_level.clone().into()));
    }

    // Load or create configuration
    let config = load_or_create_config(&options.config_path, &options.log_level)?;

    // Validate the configuration after loading
    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        // Just update the max level without reinitializing the logger
        log::set_max_level(to_level_filter(&config.log_level));
    }

    // Create controller
    let controller = Controller::with_config(config.clone())?;

    // Run the controller with the input file(s)
    if options.input_path.is_file() {
        // Process a single file
        controller.run_analyze(
            options.input_path.clone(),
            options.output.clone(),
            options.json,
            options.force_overwrite
        ).await?;
    } else if options.input_path.is_dir() {
        // Process a directory
        controller.run_analyze_folder(
            options.input_path.clone(),
            options.output.clone(),
            options.json,
            options.force_overwrite
        ).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

async fn run_voice(options: VoiceArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(to_level_filter(&cmd_log_level.clone().into()));
    }

    // Load or create configuration
    let mut config = load_or_create_config(&options.config_path, &options.log_level)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.synthesis.provider = provider.clone().into();
    }

    if let Some(preset) = &options.preset {
        // Find the provider config and update the preset
        let provider_str = config.synthesis.provider.to_lowercase_string();
        if let Some(provider_config) = config.synthesis.available_providers.iter_mut()
            .find(|p| p.provider_type == provider_str) {
            provider_config.preset = preset.clone();
        }
    }

    // Merge voice assignments from the command line
    for assignment in &options.voice {
        let (character, path) = parse_voice_assignment(assignment)?;
        config.voices.insert(character, path);
    }

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        // Just update the max level without reinitializing the logger
        log::set_max_level(to_level_filter(&config.log_level));
    }

    // Create controller
    let controller = Controller::with_config(config.clone())?;

    // Run the controller with the input file(s) and output directory
    if options.input_path.is_file() {
        // Audio lands next to the script unless an output directory was given
        let output_dir = match &options.output_dir {
            Some(dir) => dir.clone(),
            None => default_voice_output_dir(&options.input_path),
        };

        // Process a single file
        controller.run_voice(
            options.input_path.clone(),
            output_dir,
            &options.character,
            options.force_overwrite
        ).await?;
    } else if options.input_path.is_dir() {
        // Process a directory
        controller.run_voice_folder(
            options.input_path.clone(),
            &options.character,
            options.force_overwrite
        ).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

/// Default audio output directory for a single script file
fn default_voice_output_dir(input_file: &Path) -> PathBuf {
    let stem = input_file.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());

    input_file.parent()
        .unwrap_or(Path::new("."))
        .join(format!("{}_audio", stem))
}
