//! Heuristic squashing of IPv4 host addresses.
//!
//! Addresses are grouped into buckets (by default the enclosing /24). A
//! bucket holding more than `threshold` addresses is replaced by a single
//! route for the whole bucket, otherwise each address keeps its own /32.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::error::RouteError;
use crate::model::{Family, NetworkBlock};

/// Buckets with more than this many addresses collapse into one route.
pub const DEFAULT_THRESHOLD: usize = 5;

/// Bucket granularity.
pub const DEFAULT_BUCKET_PREFIX: u8 = 24;

/// Squashing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquashPolicy {
    /// A bucket is squashed when it holds strictly more addresses than this.
    pub threshold: usize,
    /// Prefix length of the bucket a squashed route covers.
    pub bucket_prefix: u8,
}

impl Default for SquashPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            bucket_prefix: DEFAULT_BUCKET_PREFIX,
        }
    }
}

impl SquashPolicy {
    pub fn new(threshold: usize, bucket_prefix: u8) -> Result<Self, RouteError> {
        let policy = Self {
            threshold,
            bucket_prefix,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), RouteError> {
        if self.bucket_prefix > 32 {
            return Err(RouteError::InvalidInput(format!(
                "bucket prefix /{} is wider than an IPv4 address",
                self.bucket_prefix
            )));
        }
        Ok(())
    }

    fn bucket_mask(&self) -> u32 {
        match self.bucket_prefix {
            0 => 0,
            p => u32::MAX << (32 - u32::from(p.min(32))),
        }
    }
}

/// A run of sorted addresses sharing one bucket.
#[derive(Debug)]
struct Bucket<'a> {
    base: u32,
    members: &'a [u32],
}

/// Split sorted addresses into contiguous runs with the same masked base.
fn partition(sorted: &[u32], mask: u32) -> Vec<Bucket<'_>> {
    let mut buckets = Vec::new();
    let mut start = 0;

    for i in 1..=sorted.len() {
        let boundary = i == sorted.len() || sorted[i] & mask != sorted[start] & mask;
        if boundary {
            buckets.push(Bucket {
                base: sorted[start] & mask,
                members: &sorted[start..i],
            });
            start = i;
        }
    }

    buckets
}

/// Squash addresses with the default policy (> 5 addresses per /24).
///
/// # Examples
/// ```
/// use ccdroutes::squash::squash;
/// use std::net::Ipv4Addr;
///
/// let addrs: Vec<Ipv4Addr> = (1..=6).map(|d| Ipv4Addr::new(10, 0, 0, d)).collect();
/// let routes = squash(&addrs);
/// assert_eq!(routes.len(), 1);
/// assert_eq!(routes[0].to_string(), "10.0.0.0/24");
/// ```
pub fn squash(addrs: &[Ipv4Addr]) -> Vec<NetworkBlock> {
    squash_with(addrs, &SquashPolicy::default())
}

/// Squash addresses under an explicit policy.
///
/// Output is ordered by ascending bucket, and inside an unsquashed bucket by
/// ascending address. Duplicate inputs are ignored.
pub fn squash_with(addrs: &[Ipv4Addr], policy: &SquashPolicy) -> Vec<NetworkBlock> {
    let mut sorted: Vec<u32> = addrs.iter().map(|a| u32::from(*a)).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let prefix = policy.bucket_prefix.min(32);
    let mut routes = Vec::with_capacity(sorted.len());

    for bucket in partition(&sorted, policy.bucket_mask()) {
        if bucket.members.len() > policy.threshold {
            routes.push(NetworkBlock::from_bits(
                Family::V4,
                u128::from(bucket.base),
                prefix,
            ));
        } else {
            routes.extend(
                bucket
                    .members
                    .iter()
                    .map(|&addr| NetworkBlock::from_bits(Family::V4, u128::from(addr), 32)),
            );
        }
    }

    routes
}
