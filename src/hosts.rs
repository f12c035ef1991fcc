//! Host list parsing.
//!
//! A host list has one entry per line: a bare hostname or a URL. Blank lines
//! and `#` comments are ignored. Entries that yield no hostname are
//! collected as rejects so the caller can report them.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

use crate::error::RouteError;
use crate::fs_abstraction::FileSystem;
use crate::validation::prepare_host;

/// Hostnames parsed from a host list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HostList {
    /// Unique hostnames, sorted.
    pub hosts: BTreeSet<String>,
    /// `(line number, entry)` pairs that could not be turned into a hostname.
    pub rejected: Vec<(usize, String)>,
}

impl HostList {
    /// Parse host list content.
    pub fn parse(content: &str) -> Self {
        let mut list = HostList::default();

        for (idx, line) in content.lines().enumerate() {
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }

            match prepare_host(entry) {
                Ok(host) => {
                    list.hosts.insert(host);
                }
                Err(e) => {
                    warn!("Skipping line {}: {}", idx + 1, e);
                    list.rejected.push((idx + 1, entry.to_string()));
                }
            }
        }

        list
    }

    /// Read and parse a host list file.
    pub fn load<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<Self, RouteError> {
        let content = fs.read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Hostnames to resolve: every host plus, when `www` is set, its
    /// `www.` variant. IP literals never get a variant.
    pub fn lookup_names(&self, www: bool) -> BTreeSet<String> {
        let mut names = self.hosts.clone();
        if www {
            for host in &self.hosts {
                if !host.starts_with("www.") && host.parse::<std::net::IpAddr>().is_err() {
                    names.insert(format!("www.{}", host));
                }
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
