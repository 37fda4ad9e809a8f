//! Build parameter commands

use super::load_config;
use anyhow::Result;
use cairn_build::BuildParameterStore;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ParamsCommands {
    /// Print the stored build parameters
    Show,

    /// Update stored build parameters
    Set {
        /// Base remote path; `{0}` is replaced by the target environment
        #[arg(long)]
        base_remote_path: Option<String>,

        /// Remote target environment
        #[arg(long)]
        target_env: Option<String>,

        /// Version code
        #[arg(long)]
        version_code: Option<String>,
    },
}

pub fn run(config_path: &Path, cmd: ParamsCommands) -> Result<()> {
    let config = load_config(config_path)?;
    let mut store = BuildParameterStore::new(config.build_parameters_path());

    match cmd {
        ParamsCommands::Show => {
            let params = store.get()?;
            println!("{}", serde_json::to_string_pretty(params)?);
            println!("Remote path: {}", params.remote_path());
        }
        ParamsCommands::Set {
            base_remote_path,
            target_env,
            version_code,
        } => {
            let mut changed = false;
            if let Some(value) = base_remote_path {
                changed |= store.set_base_remote_path(&value)?;
            }
            if let Some(value) = target_env {
                changed |= store.set_remote_target_env(&value)?;
            }
            if let Some(value) = version_code {
                changed |= store.set_version_code(&value)?;
            }

            if changed {
                println!("Updated {}", store.path().display());
            } else {
                println!("Nothing changed");
            }
        }
    }
    Ok(())
}
