//! blueprint-compiler: a CLI and thin re-export layer over the blueprint
//! DSL compiler's workspace crates.
//!
//! The actual compiler lives in `blueprint-dsl-compiler` and its supporting
//! crates (`blueprint-dsl-types`, `blueprint-dsl-schema`,
//! `blueprint-dsl-resolver`); this crate wires them into a `clap` CLI and
//! carries the on-disk configuration format.

pub mod cli;
pub mod config;

pub use blueprint_dsl_compiler::{list_imports_from_path, parse, parse_from_path, parse_from_url};
pub use blueprint_dsl_types::{DslParsingError, DslResult, Plan};
pub use config::Config;
