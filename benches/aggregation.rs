//! Benchmarks for squashing and collapsing performance.

use ccdroutes::collapse::{collapse, collapse_by_family};
use ccdroutes::commands::collapse::parse_blocks;
use ccdroutes::squash::squash;
use ccdroutes::NetworkBlock;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::net::Ipv4Addr;

/// Generate random-ish IPv4 addresses, some /24s dense and some sparse
fn generate_ips(count: usize) -> Vec<Ipv4Addr> {
    (0..count)
        .map(|i| {
            let a = (i % 7) as u8 + 10;
            let b = ((i / 7) % 256) as u8;
            let c = ((i * 31) % 64) as u8;
            let d = ((i * 17) % 256) as u8;
            Ipv4Addr::new(a, b, c, d)
        })
        .collect()
}

/// Generate CIDRs of varying sizes
fn generate_cidrs(count: usize) -> Vec<NetworkBlock> {
    (0..count)
        .map(|i| {
            let a = (i % 256) as u8;
            let b = ((i / 256) % 256) as u8;
            let prefix = 16 + (i % 17) as u8; // Prefix lengths 16-32
            format!("{}.{}.0.0/{}", a, b, prefix).parse().unwrap()
        })
        .collect()
}

fn bench_squash(c: &mut Criterion) {
    let mut group = c.benchmark_group("squash");

    for size in [100, 1000, 10000, 50000] {
        let ips = generate_ips(size);
        group.bench_with_input(BenchmarkId::new("host_addresses", size), &ips, |b, ips| {
            b.iter(|| black_box(squash(ips)));
        });
    }

    group.finish();
}

fn bench_collapse(c: &mut Criterion) {
    let mut group = c.benchmark_group("collapse");

    for size in [100, 1000, 10000, 50000] {
        let cidrs = generate_cidrs(size);
        group.bench_with_input(BenchmarkId::new("mixed_cidrs", size), &cidrs, |b, cidrs| {
            b.iter(|| black_box(collapse(cidrs)));
        });

        let mut both = cidrs.clone();
        both.extend((0..size).map(|i| {
            format!("2001:db8:{:x}::/{}", i % 65536, 48 + (i % 17))
                .parse::<NetworkBlock>()
                .unwrap()
        }));
        group.bench_with_input(BenchmarkId::new("by_family", size * 2), &both, |b, both| {
            b.iter(|| black_box(collapse_by_family(both)));
        });
    }

    group.finish();
}

fn bench_parse_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_blocks");

    let small_content = (0..100)
        .map(|i| format!("192.168.{}.0/24\n", i % 256))
        .collect::<String>();

    let large_content = (0..10000)
        .map(|i| format!("{}.{}.0.0/16\n", i % 256, (i / 256) % 256))
        .collect::<String>();

    group.bench_function("small_100", |b| {
        b.iter(|| black_box(parse_blocks(&small_content)));
    });

    group.bench_function("large_10000", |b| {
        b.iter(|| black_box(parse_blocks(&large_content)));
    });

    group.finish();
}

criterion_group!(benches, bench_squash, bench_collapse, bench_parse_blocks);
criterion_main!(benches);
