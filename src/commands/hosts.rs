//! Hosts command: resolve a host list and write squashed routes.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::net::IpAddr;
use tracing::{info, warn};

use crate::cli::HostsArgs;
use crate::collapse::collapse;
use crate::config::{Config, ENV_HOSTS_PATH};
use crate::dns::{resolve_all, HostResolver, NameserverResolver, SystemResolver};
use crate::error::RouteError;
use crate::fs_abstraction::real_fs;
use crate::hosts::HostList;
use crate::model::{Family, NetworkBlock};
use crate::squash::squash_with;
use crate::utils::format_count;

use super::{emit, load_config, RunOptions};

/// Run the hosts command
pub async fn run(args: HostsArgs, opts: &RunOptions) -> Result<()> {
    let mut config = load_config(opts)?;
    apply_args(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    let hosts_path = config.hosts_path.clone().with_context(|| {
        format!(
            "No host list given (use --hosts or set \"{}\")",
            ENV_HOSTS_PATH
        )
    })?;

    let list = HostList::load(real_fs(), &hosts_path)
        .with_context(|| format!("Failed to read host list {:?}", hosts_path))?;
    if list.is_empty() {
        anyhow::bail!("Host list {:?} has no hosts", hosts_path);
    }
    if !list.rejected.is_empty() {
        warn!("{} host list entries skipped", list.rejected.len());
    }

    let names = list.lookup_names(config.www);
    opts.report(&format!("Start to resolve {} hostnames...", names.len()));

    let resolver: Box<dyn HostResolver> = if config.system_resolver {
        Box::new(SystemResolver::new(config.resolver_settings()))
    } else {
        Box::new(NameserverResolver::new(
            &config.nameservers,
            config.resolver_settings(),
        ))
    };

    let report = resolve_all(resolver.as_ref(), &names, config.concurrency).await;
    info!(
        "Resolved {} of {} hostnames",
        format_count(report.resolved),
        format_count(names.len())
    );
    if report.addresses.is_empty() {
        return Err(RouteError::Resolution(format!(
            "none of {} hostnames resolved",
            names.len()
        ))
        .into());
    }

    let blocks = build_routes(&report.addresses, &config)?;

    opts.report(&format!("Received {} IP addresses.", report.addresses.len()));
    if emit(&config, opts, &blocks)?.is_some() {
        for line in summary(&blocks, opts.emitted()) {
            opts.report(&line);
        }
    }

    Ok(())
}

/// Layer command-line flags over the loaded configuration
pub fn apply_args(config: &mut Config, args: &HostsArgs) {
    if let Some(ref path) = args.hosts_path {
        config.hosts_path = Some(path.clone());
    }
    if !args.nameservers.is_empty() {
        config.nameservers = args.nameservers.clone();
        config.system_resolver = false;
    }
    if args.system_resolver {
        config.system_resolver = true;
    }
    if let Some(tries) = args.tries {
        config.tries = tries;
    }
    if args.no_www {
        config.www = false;
    }
    if args.ipv6 {
        config.ipv6 = true;
    }
    if let Some(threshold) = args.threshold {
        config.squash.threshold = threshold;
    }
    if let Some(prefix) = args.bucket_prefix {
        config.squash.bucket_prefix = prefix;
    }
}

/// Turn resolved addresses into route blocks.
///
/// IPv4 addresses are squashed per bucket. IPv6 addresses are kept only
/// when `config.ipv6` is set, and collapsed exactly.
pub fn build_routes(
    addresses: &BTreeSet<IpAddr>,
    config: &Config,
) -> Result<Vec<NetworkBlock>, RouteError> {
    let mut v4 = Vec::new();
    let mut v6 = Vec::new();
    for addr in addresses {
        match addr {
            IpAddr::V4(a) => v4.push(*a),
            IpAddr::V6(_) => v6.push(NetworkBlock::host(*addr)),
        }
    }

    let mut blocks = squash_with(&v4, &config.squash);
    if config.ipv6 {
        blocks.extend(collapse(&v6)?);
    }
    Ok(blocks)
}

/// Closing summary lines, counting squashed IPv4 routes apart from IPv6 ones
fn summary(blocks: &[NetworkBlock], verb: &str) -> Vec<String> {
    let v4 = blocks.iter().filter(|b| b.family() == Family::V4).count();
    let v6 = blocks.len() - v4;

    let mut lines = vec![format!("{} {} squashed IP addresses.", verb, v4)];
    if v6 > 0 {
        lines.push(format!("{} {} collapsed IPv6 routes.", verb, v6));
    }
    lines
}
