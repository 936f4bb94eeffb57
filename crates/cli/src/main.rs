use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
use commands::{
    audit::AuditArgs, config::ConfigCommand, health::HealthArgs, parse::ParseArgs,
};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Multi-stage smart contract audits backed by a generative model")]
#[command(version)]
#[command(author = "Vigil Team")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the four-stage audit against a contract file
    Audit(AuditArgs),

    /// Parse a saved transcript into a report without calling the model
    Parse(ParseArgs),

    /// Report version and whether a model credential is configured
    Health(HealthArgs),

    Config {
        #[command(subcommand)]
        subcommand: ConfigCommand,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vigil_auditor={level},vigil={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Audit(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::audit::execute(args))
        }
        Commands::Parse(args) => commands::parse::execute(args),
        Commands::Health(args) => commands::health::execute(args),
        Commands::Config { subcommand } => subcommand.execute(),
    }
}
