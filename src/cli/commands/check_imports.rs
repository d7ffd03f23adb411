//! `check-imports` command: print the transitive import graph a blueprint
//! document would pull in without running a full compile.

use crate::cli::utils;
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

pub fn command() -> Command {
    Command::new("check-imports")
        .about("List the import graph a blueprint DSL document would pull in")
        .arg(
            Arg::new("dsl")
                .help("Path to the blueprint DSL document")
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
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;
    let dsl = matches.get_one::<String>("dsl").expect("required");

    let mut alias_mapping = config.resolution.alias_mapping.clone();
    alias_mapping.extend(utils::parse_alias_args(matches.get_many::<String>("alias"))?);
    let alias_mapping_url = matches
        .get_one::<String>("alias-mapping-url")
        .cloned()
        .or_else(|| config.resolution.alias_mapping_url.clone());
    let resources_base_url = matches
        .get_one::<String>("resources-base-url")
        .cloned()
        .or_else(|| config.resolution.resources_base_url.clone());

    info!("Discovering import graph for {dsl}");

    let imports = blueprint_dsl_compiler::list_imports_from_path(
        &PathBuf::from(dsl),
        Some(alias_mapping),
        alias_mapping_url.as_deref(),
        resources_base_url.as_deref(),
    )
    .map_err(|e| anyhow::anyhow!("failed to discover imports [{}]: {}", e.err_code(), e))?;

    if imports.is_empty() {
        println!("{dsl} has no imports.");
    } else {
        println!("{dsl} imports {} document(s), in resolution order:", imports.len());
        for (i, url) in imports.iter().enumerate() {
            println!("  {}. {url}", i + 1);
        }
    }

    Ok(())
}
