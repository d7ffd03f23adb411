//! Configuration management for the blueprint compiler CLI.

pub mod config;

pub use config::{Config, OutputConfig, OutputFormat, ResolutionConfig};
