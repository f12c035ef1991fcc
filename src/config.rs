//! Configuration management for ccdroutes.
//!
//! A [`Config`] is assembled once at startup from, in increasing order of
//! precedence: built-in defaults, an optional YAML file, `HOSTSUPDATE_*`
//! environment variables, and command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dns::{
    ResolverSettings, DEFAULT_CONCURRENCY, DEFAULT_NAMESERVERS, DEFAULT_TRIES, DNS_TIMEOUT_SECS,
};
use crate::error::RouteError;
use crate::squash::SquashPolicy;
use crate::validation::{parse_asn, validate_ip};

/// Host list file
pub const ENV_HOSTS_PATH: &str = "HOSTSUPDATE_HOSTS_PATH";
/// Destination CCD file
pub const ENV_CCD_PATH: &str = "HOSTSUPDATE_CCD_FILEPATH";
/// Comma or space separated nameserver addresses
pub const ENV_NAMESERVERS: &str = "HOSTSUPDATE_NAMESERVERS";
/// Comma or space separated ASNs
pub const ENV_ASNS: &str = "HOSTSUPDATE_ASNS";
/// Attempts per lookup
pub const ENV_TRIES: &str = "HOSTSUPDATE_TRIES";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host list to resolve
    pub hosts_path: Option<PathBuf>,

    /// CCD file to replace; nothing is written when unset
    pub ccd_path: Option<PathBuf>,

    /// Nameservers queried for host lookups
    pub nameservers: Vec<IpAddr>,

    /// Use the system resolver instead of `nameservers`
    pub system_resolver: bool,

    /// Attempts per hostname
    pub tries: u32,

    /// Timeout of a single DNS attempt, in seconds
    pub timeout_secs: u64,

    /// Lookups in flight at once
    pub concurrency: usize,

    /// Also resolve the `www.` variant of every host
    pub www: bool,

    /// Keep IPv6 addresses of resolved hosts
    pub ipv6: bool,

    /// ASNs whose announced prefixes are routed
    pub asns: Vec<String>,

    /// Heuristic squashing of resolved IPv4 addresses
    pub squash: SquashPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts_path: None,
            ccd_path: None,
            nameservers: default_nameservers(),
            system_resolver: false,
            tries: DEFAULT_TRIES,
            timeout_secs: DNS_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            www: true,
            ipv6: false,
            asns: Vec::new(),
            squash: SquashPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    ///
    /// The result is not validated: overrides may still fix it up.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply `HOSTSUPDATE_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), RouteError> {
        self.apply_env_from(|name| env::var(name).ok())
    }

    /// Apply `HOSTSUPDATE_*` overrides read through `lookup`
    ///
    /// Empty values are ignored.
    pub fn apply_env_from<L>(&mut self, lookup: L) -> Result<(), RouteError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_HOSTS_PATH) {
            self.hosts_path = Some(PathBuf::from(path));
        }
        if let Some(path) = get(ENV_CCD_PATH) {
            self.ccd_path = Some(PathBuf::from(path));
        }
        if let Some(list) = get(ENV_NAMESERVERS) {
            self.nameservers = split_list(&list)
                .map(|ns| {
                    validate_ip(ns).map_err(|_| {
                        RouteError::Config(format!("{}: invalid nameserver {:?}", ENV_NAMESERVERS, ns))
                    })
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(list) = get(ENV_ASNS) {
            self.asns = split_list(&list).map(str::to_string).collect();
        }
        if let Some(tries) = get(ENV_TRIES) {
            self.tries = tries.trim().parse().map_err(|_| {
                RouteError::Config(format!("{}: not a number: {:?}", ENV_TRIES, tries))
            })?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), RouteError> {
        if self.tries == 0 {
            return Err(RouteError::Config("tries must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(RouteError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(RouteError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if !self.system_resolver && self.nameservers.is_empty() {
            return Err(RouteError::Config(
                "no nameservers configured (set nameservers or use the system resolver)"
                    .to_string(),
            ));
        }
        self.squash
            .validate()
            .map_err(|e| RouteError::Config(format!("squash: {}", e)))?;
        self.asn_numbers()?;
        Ok(())
    }

    /// Settings handed to the DNS resolvers
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            tries: self.tries,
            timeout: Duration::from_secs(self.timeout_secs),
            ipv6: self.ipv6,
        }
    }

    /// Configured ASNs as numbers, duplicates removed, order kept
    pub fn asn_numbers(&self) -> Result<Vec<u32>, RouteError> {
        let mut numbers = Vec::with_capacity(self.asns.len());
        for asn in &self.asns {
            let n = parse_asn(asn)?;
            if !numbers.contains(&n) {
                numbers.push(n);
            }
        }
        Ok(numbers)
    }
}

fn default_nameservers() -> Vec<IpAddr> {
    DEFAULT_NAMESERVERS
        .iter()
        .filter_map(|ns| ns.parse().ok())
        .collect()
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}
