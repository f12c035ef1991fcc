//! Collapse command: minimise a file of addresses and CIDR blocks.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::collapse::{collapse_by_family, count_addresses};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::model::NetworkBlock;
use crate::utils::format_addresses;
use crate::validation::validate_ip_or_cidr;

use super::{emit, load_config, RunOptions};

/// Run the collapse command
pub async fn run(input: &Path, opts: &RunOptions) -> Result<()> {
    let config = load_config(opts)?;
    config.validate().context("Invalid configuration")?;

    let content = real_fs()
        .read_to_string(input)
        .with_context(|| format!("Failed to read {:?}", input))?;

    let (blocks, skipped) = parse_blocks(&content);
    if skipped > 0 {
        warn!("{} malformed lines skipped", skipped);
    }
    if blocks.is_empty() {
        anyhow::bail!("No address or CIDR block in {:?}", input);
    }

    let collapsed = collapse_by_family(&blocks);
    info!(
        "{} blocks -> {} routes ({} addresses)",
        blocks.len(),
        collapsed.len(),
        format_addresses(count_addresses(&collapsed))
    );

    opts.report(&format!("Received {} blocks.", blocks.len()));
    if let Some(written) = emit(&config, opts, &collapsed)? {
        opts.report(&format!("{} {} collapsed routes.", opts.emitted(), written));
    }

    Ok(())
}

/// Parse one address or CIDR block per line.
///
/// Blank lines, `#` comments and trailing comments are ignored. Returns the
/// blocks and the number of lines that did not parse.
pub fn parse_blocks(content: &str) -> (Vec<NetworkBlock>, usize) {
    let mut blocks = Vec::new();
    let mut skipped = 0;

    for (idx, line) in content.lines().enumerate() {
        let entry = line.split('#').next().unwrap_or("").trim();
        if entry.is_empty() {
            continue;
        }
        match validate_ip_or_cidr(entry) {
            Ok(block) => blocks.push(block),
            Err(e) => {
                warn!("Skipping line {}: {}", idx + 1, e);
                skipped += 1;
            }
        }
    }

    (blocks, skipped)
}
