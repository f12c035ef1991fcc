//! # ccdroutes - OpenVPN CCD Route Generator
//!
//! Turns network endpoints into a minimal set of OpenVPN client-config
//! routing directives:
//!
//! - hostnames, resolved through DNS, become host routes that are
//!   **squashed** into one /24 route when a /24 holds more than five of them;
//! - prefixes announced by an ASN, or any list of CIDR blocks, are
//!   **collapsed** into the smallest exact CIDR cover of their union.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ccdroutes                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap) + Config (serde_yaml, HOSTSUPDATE_* env)        │
//! │    └── Commands: hosts, asn, collapse                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Sources                                                    │
//! │    ├── hosts + dns (dns-lookup, hickory-resolver)           │
//! │    └── fetcher: RIPEstat announced prefixes (reqwest)       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregation (pure, synchronous)                            │
//! │    ├── squash: heuristic IPv4 bucket squashing              │
//! │    └── collapse: exact CIDR minimisation, both families     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Output                                                     │
//! │    ├── route: push "route ..." directives                   │
//! │    └── ccd: atomic replacement of the CCD file              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use ccdroutes::collapse::collapse;
//! use ccdroutes::route::{render, to_entries};
//! use ccdroutes::squash::squash;
//!
//! let addrs: Vec<std::net::Ipv4Addr> = (1..=6)
//!     .map(|i| format!("10.0.0.{}", i).parse().unwrap())
//!     .collect();
//! let squashed = squash(&addrs);
//! assert_eq!(render(&to_entries(&squashed)), "push \"route 10.0.0.0 255.255.255.0\"\n");
//!
//! let blocks: Vec<ccdroutes::NetworkBlock> =
//!     vec!["10.1.0.0/25".parse().unwrap(), "10.1.0.128/25".parse().unwrap()];
//! let collapsed = collapse(&blocks).unwrap();
//! assert_eq!(collapsed[0].to_string(), "10.1.0.0/24");
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Address families and validated CIDR blocks
//! - [`squash`] - Heuristic IPv4 squashing
//! - [`collapse`] - Exact CIDR collapsing
//! - [`route`] - Route directive formatting
//! - [`ccd`] - Atomic CCD file writer
//! - [`hosts`] - Host list parsing
//! - [`dns`] - Concurrent DNS resolution with retries and timeouts
//! - [`fetcher`] - HTTP client for ASN prefix lookups
//! - [`config`] - Configuration loading and validation
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`validation`] - Parsing of user-supplied values
//! - [`error`] - Library error type
//! - [`utils`] - Formatting helpers

pub mod ccd;
pub mod cli;
pub mod collapse;
pub mod commands;
pub mod config;
pub mod dns;
pub mod error;
pub mod fetcher;
pub mod fs_abstraction;
pub mod hosts;
pub mod model;
pub mod route;
pub mod squash;
pub mod utils;
pub mod validation;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::RouteError;
pub use model::{Family, NetworkBlock};
pub use route::RouteEntry;
