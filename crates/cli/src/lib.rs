pub mod commands;

use crate::commands::CommandResult;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use storefront_core::config::{AppConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront recommendation CLI",
    long_about = "Drive a demo storefront session: rank recommendations, replay shopper events, browse the catalog and inspect configuration.",
    after_help = "Examples:\n  storefront recommend\n  storefront simulate --event view:8 --event cart_add:9 --checkout\n  storefront catalog --search wireless --category electronics\n  storefront config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Rank recommendations for the demo shopper and print them as JSON")]
    Recommend,
    #[command(about = "Apply shopper events in order, then print profile and recommendations")]
    Simulate {
        #[arg(
            long = "event",
            value_name = "ACTION:ID",
            help = "Interaction to apply, e.g. view:8, purchase:5, cart_add:9 (repeatable)"
        )]
        events: Vec<String>,
        #[arg(long, help = "Check out the cart after all events are applied")]
        checkout: bool,
    },
    #[command(about = "List demo catalog products, optionally filtered")]
    Catalog {
        #[arg(long, help = "Case-insensitive match on name or description")]
        search: Option<String>,
        #[arg(long, help = "Category filter; `all` disables filtering")]
        category: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Recommend => "recommend",
            Self::Simulate { .. } => "simulate",
            Self::Catalog { .. } => "catalog",
            Self::Config => "config",
        }
    }
}

/// Install the fmt subscriber on stderr so command payloads keep stdout to themselves.
pub fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed when embedded in tests.
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let result = execute(cli.command);

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Load config once, install logging from it, then dispatch. A config failure is
/// reported as the command's payload before any logging is set up.
fn execute(command: Command) -> CommandResult {
    let config = match commands::load_config(command.name()) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    init_logging(&config);

    match command {
        Command::Recommend => commands::recommend::run(&config),
        Command::Simulate { events, checkout } => {
            commands::simulate::run(&config, &events, checkout)
        }
        Command::Catalog { search, category } => {
            commands::catalog::run(search.as_deref(), category.as_deref())
        }
        Command::Config => commands::config::run(&config),
    }
}
