//! # `tally inspect`
//!
//! Build a config file, then query the resulting stores through their
//! public surface and print the matching entries.

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;

use tally_catalog::{CatalogEntry, EntryKind};

use crate::build::build_config;

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the catalog config file (.yaml, .yml, or .json).
    pub config: PathBuf,

    /// Only show entries of this kind.
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<EntryKind>,

    /// Only show entries carrying this tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// Show the single entry under this key.
    #[arg(long)]
    pub key: Option<String>,
}

fn parse_kind(text: &str) -> Result<EntryKind, String> {
    match text {
        "currency" => Ok(EntryKind::Currency),
        "item" => Ok(EntryKind::Item),
        "virtual-transaction" => Ok(EntryKind::VirtualTransaction),
        "store-transaction" => Ok(EntryKind::StoreTransaction),
        other => Err(format!(
            "unknown kind '{other}' (expected currency, item, virtual-transaction, or store-transaction)"
        )),
    }
}

/// Run the `inspect` subcommand.
pub fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let built = build_config(&args.config)?;

    if let Some(key) = &args.key {
        let Some(entry) = built.catalog.find_any(key) else {
            bail!("no entry under key '{key}'");
        };
        print_entry(entry);
        return Ok(());
    }

    let tag = match &args.tag {
        Some(text) => match built.tags.find(text) {
            Some(tag) => Some(tag.clone()),
            None => bail!("no tag under key '{text}'"),
        },
        None => None,
    };

    let mut shown = 0;
    for entry in built.catalog.iter() {
        if let Some(kind) = args.kind {
            if entry.kind() != kind {
                continue;
            }
        }
        if let Some(tag) = &tag {
            if !entry.has_tag(tag) {
                continue;
            }
        }
        print_entry(entry);
        shown += 1;
    }
    println!("{shown} entries");
    Ok(())
}

fn print_entry(entry: &CatalogEntry) {
    let tags: Vec<&str> = entry.tags().iter().map(|t| t.key().as_str()).collect();
    println!(
        "{:<24} {:<20} \"{}\" [{}]",
        entry.key(),
        entry.kind().to_string(),
        entry.display_name(),
        tags.join(", ")
    );
}
