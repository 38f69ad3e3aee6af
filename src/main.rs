// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use subass::app_config::{self, Config};
use subass::app_controller::Controller;

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

/// Options shared by every subcommand that reads the configuration
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Subtitle files or directories to convert
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (defaults to the configured one, else next to each source)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Name of a configured caption block to inject (repeatable)
    #[arg(short, long = "insert", value_name = "NAME")]
    insert: Vec<String>,

    /// Convert traditional Chinese to simplified
    #[arg(long)]
    variant: bool,

    /// Try the offline table before the online service
    #[arg(long)]
    local_first: bool,

    /// Delete each source file after its output is written
    #[arg(long)]
    delete_original: bool,

    /// Font family of the Default style
    #[arg(long)]
    font: Option<String>,

    /// Font size of the Default style
    #[arg(long)]
    font_size: Option<f32>,

    /// Primary colour, e.g. H00FFFFFF or #FFFFFF
    #[arg(long)]
    subtitle_color: Option<String>,

    /// Outline colour
    #[arg(long)]
    outline_color: Option<String>,

    /// Number of files converted at once
    #[arg(short, long)]
    jobs: Option<usize>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert subtitle files to styled ASS
    Convert(ConvertArgs),

    /// List the configured caption blocks
    Configs(CommonArgs),

    /// Generate shell completions for subass
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subass - batch subtitle to ASS converter
///
/// Converts SRT, WebVTT and ASS files to styled ASS, optionally simplifying
/// traditional Chinese text and injecting configured caption blocks.
#[derive(Parser, Debug)]
#[command(name = "subass")]
#[command(version)]
#[command(about = "Batch subtitle to ASS converter")]
#[command(long_about = "subass converts SRT, WebVTT and ASS subtitles to styled ASS files.

EXAMPLES:
    subass convert movie.srt                     # Convert next to the source
    subass convert -o out/ season1/              # Convert a whole directory
    subass convert --variant movie.srt           # Also simplify traditional Chinese
    subass convert -i intro -i credits a.vtt     # Inject configured caption blocks
    subass configs                               # List configured caption blocks
    subass completions bash > subass.bash        # Generate bash completions

CONFIGURATION:
    Settings are stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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

    // @returns: ANSI colour for log level
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
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Load the configuration and apply the log level from the CLI or the file
fn load_config(common: &CommonArgs) -> Result<Config> {
    if let Some(cli_level) = &common.log_level {
        let level: app_config::LogLevel = cli_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&common.config)?;

    match &common.log_level {
        Some(cli_level) => config.log_level = cli_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subass", &mut std::io::stdout());
            Ok(())
        }
        Commands::Configs(common) => list_configs(&common),
        Commands::Convert(args) => {
            let all_succeeded = run_convert(args).await?;
            if !all_succeeded {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn list_configs(common: &CommonArgs) -> Result<()> {
    let config = load_config(common)?;
    if config.subtitle_configs.is_empty() {
        info!("No caption blocks configured in {}", common.config.display());
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    for block in &config.subtitle_configs {
        writeln!(
            stdout,
            "{}\t{} --> {}\t{}",
            block.name, block.start_time, block.end_time, block.ass_statement
        )?;
    }
    Ok(())
}

async fn run_convert(args: ConvertArgs) -> Result<bool> {
    let mut config = load_config(&args.common)?;

    // Override config with CLI options if provided
    if let Some(dir) = &args.output_dir {
        config.output_directory = dir.to_string_lossy().into_owned();
    }
    if args.variant {
        config.convert_variant = true;
    }
    if args.local_first {
        config.remote_priority = false;
    }
    if args.delete_original {
        config.delete_original = true;
    }
    if let Some(font) = args.font {
        config.font_family = font;
    }
    if let Some(size) = args.font_size {
        config.font_size = size;
    }
    if let Some(color) = args.subtitle_color {
        config.subtitle_color = color;
    }
    if let Some(color) = args.outline_color {
        config.outline_color = color;
    }
    if let Some(jobs) = args.jobs {
        config.max_concurrent_jobs = Some(jobs);
    }

    let controller = Controller::with_config(config).context("Failed to initialize controller")?;

    for input in &args.inputs {
        if !Path::new(input).exists() {
            anyhow::bail!("Input path does not exist: {:?}", input);
        }
    }

    let summary = controller.run(&args.inputs, &args.insert).await?;
    Ok(summary.all_succeeded())
}
