//! Full audit of a contract file against the configured model.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use vigil_auditor::{AuditEngine, AuditRequest, ContextMode};

use super::report_output::{render, OutputFormat};
use super::{load_config, write_output};

#[derive(Args, Debug)]
pub struct AuditArgs {
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Contract name shown in the report (defaults to the file stem)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Source language (defaults from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,

    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// YAML or JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    /// `chained` feeds earlier stage output forward, `isolated` does not
    #[arg(long)]
    pub context_mode: Option<ContextMode>,

    /// Print every prompt to stderr before it is sent
    #[arg(long)]
    pub dump_prompts: bool,

    /// Write the raw concatenated stage output to this file
    #[arg(long)]
    pub save_transcript: Option<PathBuf>,

    /// Append the raw transcript to text and markdown output
    #[arg(long)]
    pub detailed_report: bool,
}

pub fn default_contract_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("Contract")
        .to_string()
}

pub fn detect_language(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("vy") => "Vyper",
        _ => "Solidity",
    }
}

pub async fn execute(args: AuditArgs) -> Result<()> {
    let start = Instant::now();

    let source_code = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read file: {:?}", args.input))?;

    let mut config = load_config(args.config.as_deref())?;
    if let Some(model) = &args.model {
        config.provider.set_model(model.clone());
    }
    if let Some(key) = &args.api_key {
        config.provider.set_api_key(key.clone());
    }
    if let Some(mode) = args.context_mode {
        config.pipeline.context_mode = mode;
    }
    if args.dump_prompts {
        config.pipeline.dump_prompts = true;
    }

    let contract_name = args
        .name
        .clone()
        .unwrap_or_else(|| default_contract_name(&args.input));
    let language = args
        .language
        .clone()
        .unwrap_or_else(|| detect_language(&args.input).to_string());

    let request = AuditRequest::new(contract_name, language, source_code)?;
    let engine = AuditEngine::from_config(&config)?;

    eprintln!(
        "{} {} ({}) with {}",
        "🔍 Auditing".bright_blue(),
        request.contract_name().bright_white().bold(),
        request.language(),
        engine.model_name()
    );

    let report = engine.audit(&request).await?;

    if let Some(path) = &args.save_transcript {
        std::fs::write(path, &report.detailed_report)
            .with_context(|| format!("Failed to write transcript: {:?}", path))?;
        info!("Transcript saved to {}", path.display());
    }

    let output = render(&report, args.format, args.detailed_report)?;
    write_output(&output, args.output.as_deref())?;

    eprintln!(
        "{} in {:.2}s",
        "✅ Audit complete".green().bold(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_contract_name() {
        assert_eq!(default_contract_name(Path::new("contracts/Vault.sol")), "Vault");
        assert_eq!(default_contract_name(Path::new("")), "Contract");
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Path::new("token.vy")), "Vyper");
        assert_eq!(detect_language(Path::new("Token.sol")), "Solidity");
        assert_eq!(detect_language(Path::new("README")), "Solidity");
    }
}
