//! `info` command: tool banner.

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

pub fn command() -> Command {
    Command::new("info").about("Show tool information").arg(
        Arg::new("detailed")
            .short('d')
            .long("detailed")
            .help("Show detailed information")
            .action(ArgAction::SetTrue),
    )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let detailed = matches.get_flag("detailed");

    println!("blueprint-compiler - YAML blueprint DSL compiler");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));

    if detailed {
        println!("\nDetailed information:");
        println!("  - Import graph resolution and merging across YAML documents");
        println!("  - Multi-level type and relationship inheritance with per-field merge semantics");
        println!("  - Plugin and agent autowiring");
        println!("  - Host containment computation");
        println!("  - JSON Schema validation of the top-level document and imports section");
        println!("  - file:, http(s): and context-relative resource resolution");
    }

    Ok(())
}
