//! Command-line surface for the `nfesel` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use nfesel_telemetry::{
    DEFAULT_LOG_LEVEL, GlobalContextGuard, LogFormat, LoggingConfig, init_logging,
};

use crate::bootstrap::{
    DEFAULT_CONFIG_PATH, check_configuration, run_once, run_service, shutdown_signal,
};
use crate::error::{AppError, AppResult};
use crate::scheduler::SchedulerExit;

/// Exit status for a clean finish or a requested stop.
pub const EXIT_OK: u8 = 0;
/// Exit status for any failure, including a fatal stop of the service.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser)]
#[command(
    name = "nfesel",
    version,
    about = "Copies NF-e documents for one carrier into a date-partitioned folder"
)]
struct Cli {
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "NFESEL_CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        help = "Path to the TOML configuration file"
    )]
    config: PathBuf,
    #[arg(
        long,
        global = true,
        env = "NFESEL_LOG_FORMAT",
        value_parser = parse_log_format,
        help = "Log output format (json or pretty); defaults by build profile"
    )]
    log_format: Option<LogFormat>,
    #[arg(
        long,
        global = true,
        env = "NFESEL_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter used when RUST_LOG is not set"
    )]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run passes on the configured interval until interrupted.
    Start,
    /// Run a single pass and print its report.
    RunOnce(RunOnceArgs),
    /// Validate the configuration and exit.
    Check,
}

impl Command {
    const fn mode(&self) -> &'static str {
        match self {
            Self::Start => "service",
            Self::RunOnce(_) => "once",
            Self::Check => "check",
        }
    }
}

#[derive(Args)]
struct RunOnceArgs {
    #[arg(
        long = "output",
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Report format"
    )]
    output: OutputFormat,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse::<LogFormat>().map_err(|err| err.to_string())
}

/// Parse arguments, install logging, execute the command and return the exit status.
pub async fn run() -> u8 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!(
            "error: {}",
            AppError::telemetry("telemetry.init", err).display_message()
        );
        return EXIT_FAILURE;
    }
    let _context = GlobalContextGuard::new(cli.command.mode());

    match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            EXIT_FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> AppResult<u8> {
    match cli.command {
        Command::Start => match run_service(&cli.config, shutdown_signal()).await? {
            SchedulerExit::Stopped => Ok(EXIT_OK),
            SchedulerExit::Fatal(err) => Err(AppError::from(err)),
        },
        Command::RunOnce(args) => {
            let report = run_once(&cli.config)?;
            match args.output {
                OutputFormat::Text => println!("{report}"),
                OutputFormat::Json => {
                    let rendered = serde_json::to_string_pretty(&report).map_err(|source| {
                        AppError::Render {
                            operation: "report.json",
                            source,
                        }
                    })?;
                    println!("{rendered}");
                }
            }
            Ok(EXIT_OK)
        }
        Command::Check => {
            let config = check_configuration(&cli.config)?;
            info!(
                sources = config.source_directories.len(),
                "configuration is valid"
            );
            println!(
                "configuration OK: {} source directories, target {}, watermark {}",
                config.source_directories.len(),
                config.target_identifier,
                config.watermark
            );
            Ok(EXIT_OK)
        }
    }
}
