//! Command implementations for the Vigil CLI
//!
//! `audit` runs the full model-backed pipeline on a contract file, `parse`
//! re-reads a saved transcript offline, `health` reports whether a credential
//! is available, and `config` prints a starter configuration.

pub mod audit;
pub mod config;
pub mod health;
pub mod parse;
pub mod report_output;

use anyhow::Result;
use std::path::Path;
use vigil_auditor::AuditorConfig;

/// Loads the config file if given, otherwise defaults, then applies `VIGIL_*`
/// environment overrides and the provider credential variable.
pub fn load_config(path: Option<&Path>) -> Result<AuditorConfig> {
    match path {
        Some(path) => {
            let mut config = AuditorConfig::from_file(path)?;
            config.apply_env_overrides()?;
            Ok(config)
        }
        None => AuditorConfig::from_env(),
    }
}

pub fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, output)?;
            Ok(())
        }
        None => {
            println!("{}", output);
            Ok(())
        }
    }
}
