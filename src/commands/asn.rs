//! ASN command: fetch announced prefixes and write collapsed routes.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::collapse::{collapse_by_family, count_addresses};
use crate::error::RouteError;
use crate::fetcher::{FetchResult, Fetcher};
use crate::model::NetworkBlock;
use crate::utils::{format_addresses, format_count};

use super::{emit, load_config, RunOptions};

/// Run the asn command
pub async fn run(asns: Vec<String>, retries: u32, opts: &RunOptions) -> Result<()> {
    let mut config = load_config(opts)?;
    if !asns.is_empty() {
        config.asns = asns;
    }
    config.validate().context("Invalid configuration")?;

    let numbers = config.asn_numbers()?;
    if numbers.is_empty() {
        anyhow::bail!("No ASN given (pass ASNs or set \"{}\")", crate::config::ENV_ASNS);
    }

    let fetcher = Fetcher::new(retries)?;
    let results = fetcher.fetch_asns(&numbers).await;
    let (prefixes, failed) = gather(results);

    if prefixes.is_empty() {
        return Err(RouteError::Lookup(format!(
            "no prefixes fetched from any of {} ASNs",
            numbers.len()
        ))
        .into());
    }
    if failed > 0 {
        warn!("{} of {} ASNs could not be fetched", failed, numbers.len());
    }

    let blocks = collapse_by_family(&prefixes);
    info!(
        "Collapsed {} prefixes -> {} routes ({} addresses)",
        format_count(prefixes.len()),
        format_count(blocks.len()),
        format_addresses(count_addresses(&blocks))
    );

    opts.report(&format!("Received {} prefixes.", prefixes.len()));
    if let Some(written) = emit(&config, opts, &blocks)? {
        opts.report(&format!("{} {} collapsed routes.", opts.emitted(), written));
    }

    Ok(())
}

/// Merge fetch results, returning all prefixes and the number of failed ASNs
fn gather(results: Vec<Result<FetchResult>>) -> (Vec<NetworkBlock>, usize) {
    let mut prefixes = Vec::new();
    let mut failed = 0;

    for result in results {
        match result {
            Ok(fetched) => {
                if fetched.skipped > 0 {
                    warn!(
                        "AS{}: {} malformed prefixes skipped",
                        fetched.asn, fetched.skipped
                    );
                }
                prefixes.extend(fetched.prefixes);
            }
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
            }
        }
    }

    (prefixes, failed)
}
