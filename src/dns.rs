//! DNS resolution of hostnames to addresses.
//!
//! Two backends implement [`HostResolver`]:
//! - [`SystemResolver`] asks the libc resolver (`getaddrinfo`), off the async
//!   runtime, with a timeout per attempt. A lookup that outlives its attempt
//!   is awaited again by the next one, so each hostname holds at most one
//!   blocking thread.
//! - [`NameserverResolver`] queries an explicit list of nameservers.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use hickory_resolver::config::{
    LookupIpStrategy, NameServerConfigGroup, ResolverConfig, ResolverOpts,
};
use hickory_resolver::TokioAsyncResolver;
use std::collections::BTreeSet;
use std::io;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::RouteError;

/// Default DNS resolution timeout per attempt, in seconds
pub const DNS_TIMEOUT_SECS: u64 = 5;

/// Default number of attempts per hostname
pub const DEFAULT_TRIES: u32 = 12;

/// Maximum number of lookups in flight
pub const DEFAULT_CONCURRENCY: usize = 32;

/// Public resolvers used when no nameservers are configured.
pub const DEFAULT_NAMESERVERS: [&str; 4] = ["8.8.8.8", "8.8.4.4", "84.200.69.80", "84.200.70.40"];

/// Settings shared by all resolver backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Attempts per hostname before giving up
    pub tries: u32,
    /// Timeout of a single attempt
    pub timeout: Duration,
    /// Also return IPv6 addresses
    pub ipv6: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            tries: DEFAULT_TRIES,
            timeout: Duration::from_secs(DNS_TIMEOUT_SECS),
            ipv6: false,
        }
    }
}

/// Trait for hostname resolvers
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve a hostname to its addresses.
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, RouteError>;
}

/// Resolver backed by the system's `getaddrinfo`.
pub struct SystemResolver {
    settings: ResolverSettings,
    lookup: fn(&str) -> io::Result<Vec<IpAddr>>,
}

impl SystemResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self {
            settings,
            lookup: system_lookup,
        }
    }
}

fn system_lookup(host: &str) -> io::Result<Vec<IpAddr>> {
    dns_lookup::lookup_host(host).map(|ips| ips.into_iter().collect())
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, RouteError> {
        let mut last_error = String::from("no attempts made");
        // Lookup still running from a timed-out attempt
        let mut pending: Option<tokio::task::JoinHandle<io::Result<Vec<IpAddr>>>> = None;

        for attempt in 0..self.settings.tries.max(1) {
            if attempt > 0 {
                debug!("Retry {} for {}", attempt, host);
            }

            let mut lookup = pending.take().unwrap_or_else(|| {
                let name = host.to_string();
                let lookup = self.lookup;
                tokio::task::spawn_blocking(move || lookup(&name))
            });

            match tokio::time::timeout(self.settings.timeout, &mut lookup).await {
                Ok(Ok(Ok(ips))) => {
                    let mut ips: Vec<IpAddr> = ips
                        .into_iter()
                        .filter(|ip| self.settings.ipv6 || ip.is_ipv4())
                        .collect();
                    // getaddrinfo repeats addresses once per socket type
                    ips.sort_unstable();
                    ips.dedup();
                    if !ips.is_empty() {
                        return Ok(ips);
                    }
                    last_error = "no matching address records".to_string();
                }
                Ok(Ok(Err(e))) => last_error = e.to_string(),
                Ok(Err(e)) => last_error = format!("lookup task failed: {}", e),
                Err(_) => {
                    last_error = format!("timed out after {:?}", self.settings.timeout);
                    pending = Some(lookup);
                }
            }
        }

        Err(RouteError::Resolution(format!("{}: {}", host, last_error)))
    }
}

/// Resolver that queries the given nameservers directly.
pub struct NameserverResolver {
    inner: TokioAsyncResolver,
}

impl NameserverResolver {
    pub fn new(nameservers: &[IpAddr], settings: ResolverSettings) -> Self {
        let group = NameServerConfigGroup::from_ips_clear(nameservers, 53, true);
        let config = ResolverConfig::from_parts(None, Vec::new(), group);

        let mut opts = ResolverOpts::default();
        opts.attempts = settings.tries.max(1) as usize;
        opts.timeout = settings.timeout;
        opts.ip_strategy = if settings.ipv6 {
            LookupIpStrategy::Ipv4AndIpv6
        } else {
            LookupIpStrategy::Ipv4Only
        };

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl HostResolver for NameserverResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, RouteError> {
        let lookup = self
            .inner
            .lookup_ip(host)
            .await
            .map_err(|e| RouteError::Resolution(format!("{}: {}", host, e)))?;
        Ok(lookup.iter().collect())
    }
}

/// Outcome of resolving a batch of hostnames.
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Every address any hostname resolved to.
    pub addresses: BTreeSet<IpAddr>,
    /// Number of hostnames that resolved.
    pub resolved: usize,
    /// `(hostname, error)` for hostnames that failed all attempts.
    pub failures: Vec<(String, String)>,
}

/// Resolve many hostnames concurrently, at most `concurrency` at a time.
///
/// A failure for one hostname never aborts the batch.
pub async fn resolve_all<R: HostResolver + ?Sized>(
    resolver: &R,
    hosts: &BTreeSet<String>,
    concurrency: usize,
) -> ResolveReport {
    let results: Vec<(String, Result<Vec<IpAddr>, RouteError>)> =
        stream::iter(hosts.iter().map(|host| async move {
            (host.clone(), resolver.resolve(host).await)
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = ResolveReport::default();
    for (host, result) in results {
        match result {
            Ok(ips) => {
                debug!("{} -> {} address(es)", host, ips.len());
                report.resolved += 1;
                report.addresses.extend(ips);
            }
            Err(e) => {
                warn!("{}", e);
                report.failures.push((host, e.to_string()));
            }
        }
    }
    report.failures.sort();
    report
}
