//! itemdex - deduplicating, anchor-ordered and rule-filtered item catalog
//!
//! Loads entry packs, reloads the catalog and prints the requested list.

mod config;
mod content_packs;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::CatalogConfig;
use itemdex_core::EntryStack;
use itemdex_registry::{CatalogContext, PluginSet, SearchFilter};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ShowList {
    /// Entries left after filtering
    Visible,
    /// Every deduplicated entry
    Canonical,
    /// Entries removed by filtering
    Hidden,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Build and query the item catalog", long_about = None)]
struct Args {
    /// Catalog configuration (TOML)
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory containing content packs
    #[arg(long, default_value = content_packs::CONTENT_PACKS_DIR)]
    packs: PathBuf,

    /// Which list to print
    #[arg(long, value_enum, default_value_t = ShowList::Visible)]
    show: ShowList,

    /// Only print entries matching this search query
    #[arg(long)]
    search: Option<String>,

    /// Print JSON instead of one entry per line
    #[arg(long)]
    json: bool,

    /// Write the effective configuration back to --config (creates it if missing)
    #[arg(long)]
    save_config: bool,

    /// Log at info level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting itemdex v{}", env!("CARGO_PKG_VERSION"));

    let config = CatalogConfig::load_from_path(&args.config);
    if args.save_config {
        config.save_to_path(&args.config)?;
        info!("Wrote catalog config to {}", args.config.display());
    }
    let pipeline = config
        .filtering
        .build_pipeline()
        .with_context(|| format!("Invalid filtering rules in {}", args.config.display()))?;

    let mut plugins = PluginSet::new();
    for plugin in content_packs::load_pack_plugins(&args.packs) {
        plugins.register_entry_plugin(Arc::new(plugin));
    }

    let context = CatalogContext::new(plugins, pipeline);
    let report = context.reload();
    info!(
        canonical = report.distinct.canonical_count,
        visible = report.refilter.visible_count,
        hidden = report.refilter.hidden_count,
        "catalog ready"
    );

    let stacks = select(&context, args.show);
    let stacks = match &args.search {
        Some(query) => {
            let filter = SearchFilter::parse(query)
                .with_context(|| format!("Invalid search query `{query}`"))?;
            if filter.is_empty() {
                stacks
            } else {
                stacks.into_iter().filter(|s| filter.matches(s)).collect()
            }
        }
        None => stacks,
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stacks).context("Failed to serialize entries")?
        );
    } else {
        for stack in &stacks {
            println!("{stack}");
        }
    }
    Ok(())
}

fn select(context: &CatalogContext, show: ShowList) -> Vec<EntryStack> {
    let entries = context.entries();
    match show {
        ShowList::Visible => entries.visible().to_vec(),
        ShowList::Canonical => entries.canonical().to_vec(),
        ShowList::Hidden => {
            let visible = entries.visible();
            let shown: HashSet<&EntryStack> = visible.iter().collect();
            entries
                .canonical()
                .iter()
                .filter(|s| !shown.contains(s))
                .cloned()
                .collect()
        }
    }
}
