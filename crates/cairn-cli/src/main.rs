//! Cairn CLI - Distribution settings and catalog builds from the command line

mod commands;

use anyhow::{Context, Result};
use cairn_asset::AssetType;
use clap::{Parser, Subcommand};
use commands::{build, configure, fetch, params};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "cairn")]
#[command(about = "Path-driven asset distribution settings and remote catalog builds", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the project config file
    #[arg(long, global = true, default_value = "cairn.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prune stale entries and re-run every configurator over its directory
    Reload,

    /// Configure imported or moved assets
    Configure {
        /// Asset paths relative to the project root
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Configure every asset below a directory
    ConfigureDir {
        /// Directory relative to the project root
        root: String,

        /// Skip files whose path contains this string (repeatable)
        #[arg(long)]
        ignore: Vec<String>,

        /// Skip assets of this type (repeatable)
        #[arg(long, value_parser = parse_asset_type)]
        ignore_type: Vec<AssetType>,
    },

    /// Build the remote catalog for a resource type
    Build {
        /// Resource type, e.g. ClientMaster
        asset_type: String,

        /// Version code, e.g. 0.0.1
        version_code: String,

        /// Remote target environment, e.g. dev01
        target_env: Option<String>,

        /// Skip the reload that runs before building
        #[arg(long)]
        no_reload: bool,
    },

    /// Apply the local profile for game builds
    GameSettings,

    /// List the buildable resource types
    Types,

    /// Persisted build parameters
    #[command(subcommand)]
    Params(params::ParamsCommands),

    /// Load addresses through a built catalog
    Fetch {
        /// Catalog file written by `cairn build`
        catalog: String,

        /// Addresses to load
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

fn parse_asset_type(s: &str) -> Result<AssetType, String> {
    match s.to_lowercase().as_str() {
        "mesh" => Ok(AssetType::Mesh),
        "texture" => Ok(AssetType::Texture),
        "material" => Ok(AssetType::Material),
        "audio" => Ok(AssetType::Audio),
        "script" => Ok(AssetType::Script),
        "scene" => Ok(AssetType::Scene),
        "prefab" => Ok(AssetType::Prefab),
        "data" => Ok(AssetType::Data),
        _ => Err(format!(
            "unknown asset type '{}'; valid values: mesh, texture, material, audio, script, scene, prefab, data",
            s
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Reload => configure::run_reload(&cli.config),
        Commands::Configure { paths } => configure::run_configure(&cli.config, &paths),
        Commands::ConfigureDir {
            root,
            ignore,
            ignore_type,
        } => configure::run_configure_dir(&cli.config, &root, ignore, ignore_type),
        Commands::Build {
            asset_type,
            version_code,
            target_env,
            no_reload,
        } => build::run(build::BuildArgs {
            config: cli.config,
            asset_type,
            version_code,
            target_env,
            reload: !no_reload,
        }),
        Commands::GameSettings => build::run_game_settings(&cli.config),
        Commands::Types => build::run_types(&cli.config),
        Commands::Params(cmd) => params::run(&cli.config, cmd),
        Commands::Fetch { catalog, addresses } => fetch::run(&catalog, &addresses).await,
    }
}
