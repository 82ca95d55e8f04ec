use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;

use skiff::config::{self, JobConfig, DEFAULT_CONFIG_FILE};

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the resolved job configuration
    Show {
        /// Path to the job config (defaults to skiff.json)
        #[arg(long)]
        config: Option<String>,
    },
    /// Write a starter skiff.json
    Init {
        /// Destination path (defaults to ./skiff.json)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ConfigOutput {
    #[serde(rename = "config.show")]
    Show { config: JobConfig },
    #[serde(rename = "config.init")]
    Init { path: String },
}

pub fn run(args: ConfigArgs, _global: &super::GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { config: path } => {
            let config = config::load(path.as_deref())?;
            Ok((ConfigOutput::Show { config }, 0))
        }
        ConfigCommand::Init { path, force } => {
            let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            config::write_template(&path, force)?;
            Ok((
                ConfigOutput::Init {
                    path: path.display().to_string(),
                },
                0,
            ))
        }
    }
}
