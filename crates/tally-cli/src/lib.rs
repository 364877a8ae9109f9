//! # tally-cli — Catalog Tooling
//!
//! Subcommand handlers for the `tally` binary:
//!
//! - **build** ([`build`]): load a catalog config file, run the two-phase
//!   build, and report either a per-kind summary or every aggregate cause.
//! - **inspect** ([`inspect`]): build a config file and query the
//!   resulting stores through their public surface.
//!
//! The config file model ([`config`]) registers its content through the
//! same public [`CatalogCompiler`](tally_catalog::CatalogCompiler) API the
//! client application uses — the CLI has no privileged path.

pub mod build;
pub mod config;
pub mod inspect;

pub use build::{run_build, BuildArgs};
pub use config::CatalogConfig;
pub use inspect::{run_inspect, InspectArgs};
