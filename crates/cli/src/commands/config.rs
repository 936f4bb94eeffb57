use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use vigil_auditor::llm::EXAMPLE_CONFIG;

use super::load_config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print a commented example configuration
    Example {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration with the credential masked
    Show {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write to a file instead; `.json` selects JSON, anything else YAML
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Example { output } => match output {
                Some(path) => {
                    std::fs::write(&path, EXAMPLE_CONFIG.trim_start())?;
                    println!("Example configuration written to {}", path.display());
                    Ok(())
                }
                None => {
                    print!("{}", EXAMPLE_CONFIG.trim_start());
                    Ok(())
                }
            },
            ConfigCommand::Show { config, output } => {
                let config = load_config(config.as_deref())?.redacted();
                match output {
                    Some(path) => {
                        let is_json = path
                            .extension()
                            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
                        if is_json {
                            config.save_json(&path)?;
                        } else {
                            config.save_yaml(&path)?;
                        }
                        println!("Configuration written to {}", path.display());
                    }
                    None => print!("{}", serde_yaml::to_string(&config)?),
                }
                Ok(())
            }
        }
    }
}
