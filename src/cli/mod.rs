//! CLI command implementations

use anyhow::Result;
use clap::{ArgMatches, Command};

pub mod commands;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Create the CLI application
    pub fn app() -> Command {
        Command::new("blueprint-compiler")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Compile a YAML blueprint DSL document into a normalized deployment plan")
            .subcommand_negates_reqs(true)
            .subcommand(commands::compile::command())
            .subcommand(commands::validate::command())
            .subcommand(commands::check_imports::command())
            .subcommand(commands::info::command())
    }

    /// Run the CLI application
    pub async fn run(matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("compile", sub_matches)) => commands::compile::run(sub_matches).await,
            Some(("validate", sub_matches)) => commands::validate::run(sub_matches).await,
            Some(("check-imports", sub_matches)) => commands::check_imports::run(sub_matches).await,
            Some(("info", sub_matches)) => commands::info::run(sub_matches).await,
            _ => {
                let _ = Self::app().print_help();
                Ok(())
            }
        }
    }
}

/// Common CLI utilities
pub mod utils {
    use crate::config::Config;
    use anyhow::Result;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Get configuration file path from arguments, if one was specified or a
    /// default config file is present in the working directory.
    pub fn get_config_path(matches: &clap::ArgMatches) -> Option<PathBuf> {
        if let Some(config_path) = matches.get_one::<String>("config") {
            return Some(PathBuf::from(config_path));
        }

        let default_paths = [
            PathBuf::from(".blueprint-compiler.yaml"),
            PathBuf::from(".blueprint-compiler.yml"),
            PathBuf::from("blueprint-compiler.yaml"),
            PathBuf::from("blueprint-compiler.yml"),
        ];

        default_paths.into_iter().find(|p| p.exists())
    }

    /// Load configuration from a file named on the command line or found in
    /// the working directory, falling back to defaults if neither exists.
    pub fn load_config(matches: &clap::ArgMatches) -> Result<Config> {
        match get_config_path(matches) {
            Some(path) => Config::from_file(&path),
            None => Ok(Config::default()),
        }
    }

    /// Parse repeated `name=url` alias arguments into a lookup table.
    pub fn parse_alias_args(values: Option<clap::parser::ValuesRef<'_, String>>) -> Result<HashMap<String, String>> {
        let mut map = HashMap::new();
        if let Some(values) = values {
            for value in values {
                let (name, url) = value.split_once('=').ok_or_else(|| {
                    anyhow::anyhow!("invalid --alias value \"{value}\", expected name=url")
                })?;
                map.insert(name.to_string(), url.to_string());
            }
        }
        Ok(map)
    }
}
