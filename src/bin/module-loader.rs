//! Module loader command line tool
//!
//! Loads the modules declared in a TOML configuration from a module
//! directory and prints the resolved modules as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use module_loader::utils::init_logging_from_config;
use module_loader::LoaderConfig;

#[derive(Parser, Debug)]
#[command(name = "module-loader")]
#[command(about = "Resolve, fetch and validate categorized modules")]
struct Args {
    /// Loader configuration (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding module documents (overrides the config)
    #[arg(short = 'd', long, value_name = "DIR")]
    modules_dir: Option<PathBuf>,

    /// Fetch bundles before modules
    #[arg(short = 'b', long)]
    load_bundles: bool,

    /// Print only this category
    #[arg(long, value_name = "NAME")]
    category: Option<String>,

    /// Log filter (e.g. "debug"); RUST_LOG takes precedence
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LoaderConfig::from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => LoaderConfig::default(),
    };
    if let Some(dir) = &args.modules_dir {
        config.modules_dir = dir.to_string_lossy().into_owned();
    }
    if args.load_bundles {
        config.load_bundles = true;
    }

    init_logging_from_config(config.logging.as_ref(), args.log.as_deref());

    info!(
        "Loading {} declared modules from {}",
        config.modules.len(),
        config.modules_dir
    );

    let mut loader = config.build_loader().context("Invalid loader configuration")?;
    loader
        .load(config.load_bundles)
        .await
        .context("Module load failed")?;

    let output = match &args.category {
        Some(category) => serde_json::to_string_pretty(loader.modules_of(category))?,
        None => {
            let by_category: IndexMap<&str, &[Value]> = loader
                .categories()
                .into_iter()
                .map(|category| (category, loader.modules_of(category)))
                .collect();
            serde_json::to_string_pretty(&by_category)?
        }
    };
    println!("{}", output);

    Ok(())
}
