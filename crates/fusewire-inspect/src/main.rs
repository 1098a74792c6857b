// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! fusewire-inspect: show the READDIR replies a directory would produce
//!
//! Lists a host directory, plays the server side of the FUSE protocol for it
//! and prints the resulting reply pages, either as raw hex or decoded back
//! into entries.

mod config;
mod pack;
mod render;
mod scan;

use anyhow::Result;
use clap::Parser;
use config::{env_flag_enabled, load_config, InspectConfig, READDIR_PLUS_ENV};
use fusewire_core::{AbiFlavor, Clock, SystemClock};
use render::OutputFormat;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fusewire-inspect", version, about)]
struct Args {
    /// Directory to list
    dir: PathBuf,

    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit READDIRPLUS pages (entry record before every dirent)
    #[arg(long)]
    plus: bool,

    /// Reply page size in bytes
    #[arg(long)]
    page_size: Option<usize>,

    /// Attribute record layout (linux or darwin)
    #[arg(long)]
    flavor: Option<AbiFlavor>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Hex)]
    format: OutputFormat,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Command-line flags and the environment win over the config file
fn apply_overrides(config: &mut InspectConfig, args: &Args, plus_env: Option<&str>) {
    if args.plus || env_flag_enabled(plus_env) {
        config.readdir_plus = true;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if let Some(flavor) = args.flavor {
        config.flavor = flavor;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = load_config(args.config.as_deref())?;
    let plus_env = std::env::var(READDIR_PLUS_ENV).ok();
    apply_overrides(&mut config, &args, plus_env.as_deref());
    info!("Configuration loaded: {:?}", config);

    let entries = scan::scan_dir(&args.dir)?;
    let now = SystemClock.now();
    let pages = pack::pack_pages(&entries, &config, now)?;
    info!(
        dir = %args.dir.display(),
        entries = entries.len(),
        pages = pages.len(),
        flavor = %config.flavor,
        readdir_plus = config.readdir_plus,
        "encoded listing"
    );

    let mut out = io::stdout().lock();
    match args.format {
        OutputFormat::Hex => render::render_hex(&pages, &mut out)?,
        OutputFormat::Json => {
            let plus = config.readdir_plus.then_some(config.flavor);
            render::render_json(&pages, plus, &mut out)?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_config() {
        let args = Args::parse_from([
            "fusewire-inspect",
            "/tmp",
            "--page-size",
            "256",
            "--flavor",
            "darwin",
            "--format",
            "json",
        ]);
        assert_eq!(args.format, OutputFormat::Json);

        let mut config = InspectConfig {
            page_size: 4096,
            flavor: AbiFlavor::Linux,
            ..Default::default()
        };
        apply_overrides(&mut config, &args, None);
        assert_eq!(config.page_size, 256);
        assert_eq!(config.flavor, AbiFlavor::Darwin);
        assert!(!config.readdir_plus);
    }

    #[test]
    fn test_plus_from_flag_or_env() {
        let mut config = InspectConfig::default();
        let args = Args::parse_from(["fusewire-inspect", "/tmp"]);
        apply_overrides(&mut config, &args, Some("true"));
        assert!(config.readdir_plus);

        let mut config = InspectConfig::default();
        let args = Args::parse_from(["fusewire-inspect", "/tmp", "--plus"]);
        apply_overrides(&mut config, &args, None);
        assert!(config.readdir_plus);
    }

    #[test]
    fn test_unset_flags_keep_config_values() {
        let mut config = InspectConfig {
            page_size: 512,
            readdir_plus: true,
            ..Default::default()
        };
        let args = Args::parse_from(["fusewire-inspect", "/tmp"]);
        apply_overrides(&mut config, &args, Some("0"));
        assert_eq!(config.page_size, 512);
        assert!(config.readdir_plus);
    }

    #[test]
    fn test_rejects_unknown_flavor() {
        let parsed = Args::try_parse_from(["fusewire-inspect", "/tmp", "--flavor", "plan9"]);
        assert!(parsed.is_err());
    }
}
