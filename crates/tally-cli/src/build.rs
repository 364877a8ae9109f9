//! # `tally build`
//!
//! Load a catalog config file, run the two-phase build, and report the
//! result. A failed build prints EVERY aggregate cause — the point of the
//! fail-slow pipeline is fixing all authoring defects in one iteration.

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use tracing::info;

use tally_catalog::{BuiltCatalog, CatalogCompiler, EntryKind};

use crate::config::CatalogConfig;

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the catalog config file (.yaml, .yml, or .json).
    pub config: PathBuf,
}

/// Run the `build` subcommand.
pub fn run_build(args: &BuildArgs) -> anyhow::Result<()> {
    let built = build_config(&args.config)?;
    print_summary(&built);
    Ok(())
}

/// Load, register, and build one config file. Shared with `inspect`.
pub(crate) fn build_config(path: &std::path::Path) -> anyhow::Result<BuiltCatalog> {
    let config = CatalogConfig::load(path)?;
    let mut compiler = CatalogCompiler::new();
    config.register_into(&mut compiler)?;
    info!(
        entries = compiler.entry_count(),
        tags = compiler.tag_count(),
        "registered catalog config"
    );

    match compiler.build() {
        Ok(built) => Ok(built),
        Err(error) => {
            eprintln!("{error}:");
            for cause in error.causes() {
                eprintln!("  - {cause}");
            }
            bail!("catalog build failed");
        }
    }
}

fn print_summary(built: &BuiltCatalog) {
    let count = |kind| built.catalog.get_all(kind).len();
    println!("catalog built: {} entries, {} tags", built.catalog.len(), built.tags.len());
    println!("  currencies:           {}", count(EntryKind::Currency));
    println!("  items:                {}", count(EntryKind::Item));
    println!("  virtual transactions: {}", count(EntryKind::VirtualTransaction));
    println!("  store transactions:   {}", count(EntryKind::StoreTransaction));
}
