//! `compile` command: parse a blueprint and print the resulting plan.

use crate::cli::utils;
use crate::config::OutputFormat;
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

pub fn command() -> Command {
    Command::new("compile")
        .about("Compile a blueprint DSL document into a normalized deployment plan")
        .arg(
            Arg::new("dsl")
                .help("Path or URL to the blueprint DSL document")
                .required(true)
                .value_name("DSL"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file path")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("alias")
                .long("alias")
                .help("Inline alias mapping entry, name=url (repeatable)")
                .value_name("NAME=URL")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("alias-mapping-url")
                .long("alias-mapping-url")
                .help("URL of an alias mapping document")
                .value_name("URL"),
        )
        .arg(
            Arg::new("resources-base-url")
                .long("resources-base-url")
                .help("Fallback base URL for unresolvable resources")
                .value_name("URL"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the plan to a file instead of stdout")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Output format: yaml or json")
                .value_name("FORMAT"),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;
    let dsl = matches.get_one::<String>("dsl").expect("required");
    let alias_mapping = merged_alias_mapping(matches, &config)?;
    let alias_mapping_url = matches
        .get_one::<String>("alias-mapping-url")
        .cloned()
        .or_else(|| config.resolution.alias_mapping_url.clone());
    let resources_base_url = matches
        .get_one::<String>("resources-base-url")
        .cloned()
        .or_else(|| config.resolution.resources_base_url.clone());

    info!("Compiling blueprint DSL document: {dsl}");

    let plan = if is_url(dsl) {
        blueprint_dsl_compiler::parse_from_url(
            dsl,
            Some(alias_mapping),
            alias_mapping_url.as_deref(),
            resources_base_url.as_deref(),
        )
    } else {
        blueprint_dsl_compiler::parse_from_path(
            &PathBuf::from(dsl),
            Some(alias_mapping),
            alias_mapping_url.as_deref(),
            resources_base_url.as_deref(),
        )
    }
    .map_err(|e| anyhow::anyhow!("compile failed [{}]: {}", e.err_code(), e))?;

    let format = resolve_format(matches, &config);
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&plan).context("failed to serialize plan as YAML")?,
        OutputFormat::Json if config.output.pretty => {
            serde_json::to_string_pretty(&plan).context("failed to serialize plan as JSON")?
        }
        OutputFormat::Json => serde_json::to_string(&plan).context("failed to serialize plan as JSON")?,
    };

    match matches.get_one::<String>("output") {
        Some(path) => {
            std::fs::write(path, &rendered).with_context(|| format!("failed to write {path}"))?;
            info!("Wrote plan to {path}");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn merged_alias_mapping(
    matches: &ArgMatches,
    config: &crate::config::Config,
) -> Result<std::collections::HashMap<String, String>> {
    let mut mapping = config.resolution.alias_mapping.clone();
    mapping.extend(utils::parse_alias_args(matches.get_many::<String>("alias"))?);
    Ok(mapping)
}

fn resolve_format(matches: &ArgMatches, config: &crate::config::Config) -> OutputFormat {
    match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => OutputFormat::Json,
        Some("yaml") => OutputFormat::Yaml,
        _ => config.output.format,
    }
}

fn is_url(s: &str) -> bool {
    s.contains("://")
}
