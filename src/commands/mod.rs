//! CLI command implementations.

pub mod asn;
pub mod collapse;
pub mod hosts;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::ccd::{CcdWriter, WriteMode};
use crate::config::{Config, ENV_CCD_PATH};
use crate::fs_abstraction::real_fs;
use crate::model::NetworkBlock;
use crate::route::{render, to_entries};

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// YAML config file
    pub config_path: Option<PathBuf>,
    /// CCD destination given on the command line
    pub ccd_path: Option<PathBuf>,
    /// Print directives instead of writing them
    pub dry_run: bool,
}

impl RunOptions {
    /// Print a run summary line.
    ///
    /// Goes to stderr in dry-run mode so stdout holds only directives.
    pub fn report(&self, line: &str) {
        if self.dry_run {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    /// Verb for the closing summary: nothing is written in dry-run mode
    pub fn emitted(&self) -> &'static str {
        if self.dry_run {
            "Printed"
        } else {
            "Written"
        }
    }
}

/// Build the configuration: file, then environment, then `--ccd-path`.
///
/// Command-specific flags are applied by the caller, which validates.
pub fn load_config(opts: &RunOptions) -> Result<Config> {
    let mut config = Config::load_or_default(opts.config_path.as_deref())?;
    config
        .apply_env()
        .context("Invalid environment configuration")?;
    if let Some(ref path) = opts.ccd_path {
        config.ccd_path = Some(path.clone());
    }
    Ok(config)
}

/// Render `blocks` and write them to the configured CCD file.
///
/// Returns the number of directives emitted, or `None` when no destination
/// is configured and nothing was written.
pub fn emit(config: &Config, opts: &RunOptions, blocks: &[NetworkBlock]) -> Result<Option<usize>> {
    let entries = to_entries(blocks);

    if opts.dry_run {
        print!("{}", render(&entries));
        return Ok(Some(entries.len()));
    }

    let Some(dest) = config.ccd_path.as_deref() else {
        opts.report(&format!(
            "\"{}\" is not set and no --ccd-path given; nothing written.",
            ENV_CCD_PATH
        ));
        return Ok(None);
    };

    write_ccd(dest, &entries)?;
    Ok(Some(entries.len()))
}

fn write_ccd(dest: &Path, entries: &[crate::route::RouteEntry]) -> Result<()> {
    let mode = CcdWriter::new(real_fs())
        .write(dest, entries)
        .with_context(|| format!("Failed to write CCD file {:?}", dest))?;

    match mode {
        WriteMode::Atomic => info!("Replaced {}", dest.display()),
        WriteMode::Copied => warn!("Replaced {} by copy (not atomic)", dest.display()),
    }
    Ok(())
}
