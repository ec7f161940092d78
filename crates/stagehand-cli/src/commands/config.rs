use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use stagehand_config::{Config, CONFIG_ENV};
use stagehand_logger as logger;
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print every configured value
    Show,
    /// Print one value
    Get { key: String },
    /// Set a value and save the config file
    Set { key: String, value: String },
    /// Print the config file path, or redirect it when `new_path` is given
    Path {
        /// Config file to use from now on
        new_path: Option<PathBuf>,
    },
}

pub fn handle_config(action: ConfigAction, opts: &GlobalOpts) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Get { key } => match Config::load()?.get(&key)? {
            Some(value) => println!("{}", value),
            None => logger::warn(&format!("{} is not set", key)),
        },
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, value.clone())?;
            config.save()?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path { new_path: None } => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Path {
            new_path: Some(path),
        } => {
            let pointer = Config::set_pointer(&path)?;
            logger::debug(&format!("Wrote {}", pointer.display()));
            if std::env::var_os(CONFIG_ENV).is_some_and(|value| !value.is_empty()) {
                logger::warn(&format!("{} is set and takes precedence", CONFIG_ENV));
            }
            logger::success(&format!("Config path set to {}", path.display()));
        }
    }
    Ok(())
}
