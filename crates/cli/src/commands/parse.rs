//! Offline parsing of a saved transcript.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use vigil_auditor::{parse, ReportAssembler};

use super::audit::default_contract_name;
use super::report_output::{render, OutputFormat};
use super::write_output;

#[derive(Args, Debug)]
pub struct ParseArgs {
    #[arg(value_name = "TRANSCRIPT")]
    pub input: PathBuf,

    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: ParseArgs) -> Result<()> {
    let transcript = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read transcript: {:?}", args.input))?;

    let contract_name = args
        .name
        .clone()
        .unwrap_or_else(|| default_contract_name(&args.input));

    let report = ReportAssembler::assemble(contract_name, parse(&transcript), transcript);
    let output = render(&report, args.format, false)?;
    write_output(&output, args.output.as_deref())
}
