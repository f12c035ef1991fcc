//! Robustness tests for edge cases and error conditions.
//!
//! These tests verify that ccdroutes handles extreme and malformed inputs
//! gracefully, and that the full pipeline produces the expected file.

use std::net::{IpAddr, Ipv4Addr};

use ccdroutes::ccd::{CcdWriter, WriteMode};
use ccdroutes::collapse::{collapse, collapse_by_family, count_addresses};
use ccdroutes::fs_abstraction::RealFileSystem;
use ccdroutes::hosts::HostList;
use ccdroutes::route::{render, to_entries};
use ccdroutes::squash::squash;
use ccdroutes::{Config, NetworkBlock, RouteError};

fn blocks(list: &[&str]) -> Vec<NetworkBlock> {
    list.iter().map(|s| s.parse().unwrap()).collect()
}

/// Test the whole path from resolved addresses to the written CCD file
#[test]
fn test_pipeline_writes_squashed_routes() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let dest = temp_dir.path().join("client");

    let mut addrs: Vec<Ipv4Addr> = (1..=6).map(|i| Ipv4Addr::new(10, 0, 0, i)).collect();
    addrs.push(Ipv4Addr::new(10, 0, 1, 1));

    let routes = squash(&addrs);
    let mode = CcdWriter::new(&RealFileSystem)
        .write(&dest, &to_entries(&routes))
        .unwrap();

    assert_eq!(mode, WriteMode::Atomic);
    assert_eq!(
        std::fs::read_to_string(&dest).unwrap(),
        "push \"route 10.0.0.0 255.255.255.0\"\npush \"route 10.0.1.1 255.255.255.255\"\n"
    );
}

/// Test host list parsing never fails on hostile content
#[test]
fn test_host_list_garbage() {
    let content = "\u{FEFF}example.com\n\0\0\0\nhttp://[::1\n\u{200B}\n:::::\n#\n";
    let list = HostList::parse(content);
    // Nothing panics; the unparseable URLs are rejected
    assert!(list.len() + list.rejected.len() <= 5);
    assert!(list.rejected.len() >= 2);
}

/// Test CIDR parsing edge cases
#[test]
fn test_cidr_parsing_edge_cases() {
    // Valid edge cases
    assert!("0.0.0.0/0".parse::<NetworkBlock>().is_ok());
    assert!("0.0.0.0/32".parse::<NetworkBlock>().is_ok());
    assert!("::/0".parse::<NetworkBlock>().is_ok());
    assert!("::/128".parse::<NetworkBlock>().is_ok());

    // Invalid cases - should fail gracefully
    assert!("192.168.1.0/33".parse::<NetworkBlock>().is_err());
    assert!("192.168.1.0/-1".parse::<NetworkBlock>().is_err());
    assert!("192.168.1.0/".parse::<NetworkBlock>().is_err());
    assert!("/24".parse::<NetworkBlock>().is_err());
    assert!(matches!(
        "192.168.1.1/24".parse::<NetworkBlock>(),
        Err(RouteError::InvalidInput(_))
    ));
}

/// Test Unicode handling in inputs
#[test]
fn test_unicode_handling() {
    assert!("１２３.０.０.１".parse::<NetworkBlock>().is_err()); // Full-width digits
    assert!("192．168．1．1".parse::<NetworkBlock>().is_err()); // Full-width periods
    assert!("192.168.1.1\u{200B}".parse::<NetworkBlock>().is_err()); // Zero-width space
    assert!("192.168.1.0/24\u{FEFF}".parse::<NetworkBlock>().is_err()); // BOM
}

/// Test whole address spaces collapse without overflow
#[test]
fn test_full_address_space() {
    let v4 = collapse(&blocks(&["0.0.0.0/1", "128.0.0.0/1", "10.0.0.0/8"])).unwrap();
    assert_eq!(v4, blocks(&["0.0.0.0/0"]));
    assert_eq!(count_addresses(&v4), 1u128 << 32);

    let v6 = collapse(&blocks(&["::/1", "8000::/1", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"]))
        .unwrap();
    assert_eq!(v6, blocks(&["::/0"]));
    assert_eq!(count_addresses(&v6), u128::MAX);
}

/// Test the top of each address space
#[test]
fn test_top_of_address_space() {
    let v4 = collapse(&blocks(&["255.255.255.254", "255.255.255.255"])).unwrap();
    assert_eq!(v4, blocks(&["255.255.255.254/31"]));

    let routes = render(&to_entries(&v4));
    assert_eq!(routes, "push \"route 255.255.255.254 255.255.255.254\"\n");
}

/// Test mixed families are rejected by collapse but split by collapse_by_family
#[test]
fn test_mixed_families() {
    let mixed = blocks(&["10.0.0.0/8", "2001:db8::/32"]);
    assert!(matches!(collapse(&mixed), Err(RouteError::InvalidInput(_))));
    assert_eq!(collapse_by_family(&mixed), mixed);
}

/// Test large input handling
#[test]
fn test_large_input_handling() {
    // Every address of 10.0.0.0/16, in reverse order
    let addrs: Vec<Ipv4Addr> = (0..65_536u32)
        .rev()
        .map(|i| Ipv4Addr::from(0x0A00_0000 | i))
        .collect();

    let squashed = squash(&addrs);
    assert_eq!(squashed.len(), 256);
    assert!(squashed.iter().all(|b| b.prefix() == 24));

    let collapsed = collapse(&squashed).unwrap();
    assert_eq!(collapsed, blocks(&["10.0.0.0/16"]));
}

/// Test that config parsing handles malformed input
#[test]
fn test_yaml_malformed_input() {
    let result: Result<Config, _> = serde_yaml::from_str("{{{{not valid yaml");
    assert!(result.is_err());

    let result: Result<Config, _> = serde_yaml::from_str("nameservers: [\"not-an-ip\"]");
    assert!(result.is_err());

    let result: Result<Config, _> = serde_yaml::from_str("squash:\n  threshold: -1\n");
    assert!(result.is_err());
}

/// Test that ASN responses with the wrong shape fail gracefully
#[test]
fn test_json_malformed_input() {
    use ccdroutes::fetcher::parse_announced_prefixes;

    assert!(parse_announced_prefixes("{not valid json}").is_err());
    assert!(parse_announced_prefixes("{\"data\": {\"prefixes\": [{}]}}").is_err());

    let (prefixes, skipped) =
        parse_announced_prefixes("{\"data\": {\"prefixes\": [{\"prefix\": \"10.0.0.1/8\"}]}}")
            .unwrap();
    assert!(prefixes.is_empty());
    assert_eq!(skipped, 1);
}

/// Test squashing ignores duplicates regardless of order
#[test]
fn test_duplicate_addresses() {
    let addr = Ipv4Addr::new(192, 0, 2, 1);
    let squashed = squash(&[addr; 10]);
    assert_eq!(squashed, vec![NetworkBlock::host(IpAddr::V4(addr))]);
}
