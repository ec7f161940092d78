#![forbid(unsafe_code)]

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use stagehand_cli::{
    commands::{
        config::{self, ConfigAction},
        open,
    },
    init_tracing, GlobalOpts,
};
use stagehand_config::Config;
use stagehand_logger as logger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Open a stagehand session",
    long_about = "Open a stagehand session from a profile and report its loading progress."
)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the session profile (TOML)
    #[arg(required = true)]
    profile: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the stagehand configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn main() {
    let cli = Cli::parse();

    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let log_dir = config.log_dir().ok();
    if let Err(e) = logger::init_with_verbosity(
        cli.global.verbosity_level(),
        cli.global.quiet,
        log_dir.as_deref(),
    ) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(logger::tracing_level());

    let result = match cli.command {
        Some(Commands::Config { action }) => {
            config::handle_config(action.unwrap_or(ConfigAction::Show), &cli.global).map(|()| 0)
        }
        None => {
            if let Some(e) = &load_error {
                logger::warn(&format!("Failed to load config: {}", e));
            }
            let Some(profile) = cli.profile else {
                Cli::command()
                    .error(ErrorKind::MissingRequiredArgument, "a profile is required")
                    .exit();
            };
            open::handle_open(&profile, config.app_id())
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            logger::error(&e.to_string());
            if cli.global.verbosity_level() > 0 {
                logger::show_log_path();
            }
            std::process::exit(e.exit_code());
        }
    }
}
