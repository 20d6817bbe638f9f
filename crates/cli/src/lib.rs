pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use lapak_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "lapak",
    about = "Lapak operator CLI",
    long_about = "Operate the lapak retail catalog: migrations, seed data, config inspection, and readiness checks.",
    after_help = "Examples:\n  lapak doctor --json\n  lapak migrate\n  lapak seed"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending sqlite migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the sample catalog into the configured store backend")]
    Seed,
    #[command(about = "Inspect effective configuration values with secrets redacted")]
    Config,
    #[command(about = "Validate config, store readiness, and the admin authorization gate")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn init_logging(config: &AppConfig) {
    use lapak_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let result = match config.logging.format {
        Compact => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .compact()
            .try_init(),
        Pretty => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .pretty()
            .try_init(),
        Json => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .json()
            .try_init(),
    };
    // A second init (tests, embedding) is harmless.
    let _ = result;
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Commands load and report config issues themselves; logging just takes
    // whatever configuration is currently loadable.
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
