use anyhow::Result;
use chrono::Utc;
use clap::Args;
use colored::*;
use serde::Serialize;
use std::path::PathBuf;

use super::load_config;
use super::report_output::OutputFormat;

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    provider: &'static str,
    model: String,
    credential_configured: bool,
}

/// Always exits successfully; a missing credential is reported, not raised.
pub fn execute(args: HealthArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    let status = HealthStatus {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: vigil_auditor::VERSION,
        provider: config.provider.name(),
        model: config.provider.model().to_string(),
        credential_configured: config.credential_configured(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text | OutputFormat::Markdown => {
            println!("{} vigil {}", "●".green(), status.version);
            println!("  Provider: {} ({})", status.provider, status.model);
            if status.credential_configured {
                println!("  Credential: {}", "configured".green());
            } else {
                println!(
                    "  Credential: {} (set {})",
                    "missing".yellow(),
                    config.provider.credential_env_var()
                );
            }
        }
    }

    Ok(())
}
