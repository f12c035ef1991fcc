//! Exact CIDR collapsing.
//!
//! Blocks are turned into inclusive integer ranges, overlapping and adjacent
//! ranges are merged, and each merged range is split back into the fewest
//! CIDR-aligned blocks. The result covers exactly the input's address space.

use crate::error::RouteError;
use crate::model::{low_bits, Family, NetworkBlock};

/// Collapse blocks of a single family into the minimal CIDR cover.
///
/// For example: [10.0.0.0/25, 10.0.0.128/25] -> [10.0.0.0/24].
///
/// Returns `InvalidInput` when IPv4 and IPv6 blocks are mixed.
///
/// # Examples
/// ```
/// use ccdroutes::collapse::collapse;
/// use ccdroutes::model::NetworkBlock;
///
/// let blocks: Vec<NetworkBlock> = vec![
///     "10.0.0.0/25".parse().unwrap(),
///     "10.0.0.128/25".parse().unwrap(),
/// ];
/// let collapsed = collapse(&blocks).unwrap();
/// assert_eq!(collapsed, vec!["10.0.0.0/24".parse().unwrap()]);
/// ```
pub fn collapse(blocks: &[NetworkBlock]) -> Result<Vec<NetworkBlock>, RouteError> {
    let Some(first) = blocks.first() else {
        return Ok(Vec::new());
    };

    let family = first.family();
    if let Some(stray) = blocks.iter().find(|b| b.family() != family) {
        return Err(RouteError::InvalidInput(format!(
            "cannot collapse {} block {} together with {} blocks",
            stray.family(),
            stray,
            family
        )));
    }

    Ok(collapse_family(family, blocks))
}

/// Collapse a mixed list, IPv4 and IPv6 separately.
///
/// IPv4 blocks come first, then IPv6 blocks, each ascending by base.
pub fn collapse_by_family(blocks: &[NetworkBlock]) -> Vec<NetworkBlock> {
    let (v4, v6): (Vec<NetworkBlock>, Vec<NetworkBlock>) =
        blocks.iter().partition(|b| b.family() == Family::V4);

    let mut collapsed = collapse_family(Family::V4, &v4);
    collapsed.extend(collapse_family(Family::V6, &v6));
    collapsed
}

/// Number of addresses covered by a list of blocks.
///
/// Uses saturating arithmetic so `::/0` does not overflow. Overlapping
/// blocks are counted twice; collapse first for an exact figure.
pub fn count_addresses(blocks: &[NetworkBlock]) -> u128 {
    blocks
        .iter()
        .map(NetworkBlock::size)
        .fold(0u128, |acc, size| acc.saturating_add(size))
}

fn collapse_family(family: Family, blocks: &[NetworkBlock]) -> Vec<NetworkBlock> {
    let ranges = blocks.iter().map(|b| (b.first(), b.last())).collect();
    merge_ranges(ranges)
        .into_iter()
        .flat_map(|(start, end)| cover_range(family, start, end))
        .collect()
}

/// Sort inclusive ranges and merge those that overlap or touch.
fn merge_ranges(mut ranges: Vec<(u128, u128)>) -> Vec<(u128, u128)> {
    ranges.sort_unstable();

    let mut merged: Vec<(u128, u128)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1.saturating_add(1) => {
                last.1 = last.1.max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Split the inclusive range `start..=end` into the fewest aligned blocks.
///
/// Greedy: at each step take the largest block that starts at the cursor,
/// is aligned to it, and does not run past `end`.
fn cover_range(family: Family, start: u128, end: u128) -> Vec<NetworkBlock> {
    let width = u32::from(family.max_prefix());
    let mut blocks = Vec::new();
    let mut cursor = start;

    loop {
        let mut host_bits = if cursor == 0 {
            width
        } else {
            cursor.trailing_zeros().min(width)
        };
        while host_bits > 0 && cursor | low_bits(host_bits) > end {
            host_bits -= 1;
        }

        let last = cursor | low_bits(host_bits);
        blocks.push(NetworkBlock::from_bits(
            family,
            cursor,
            (width - host_bits) as u8,
        ));

        match last.checked_add(1) {
            Some(next) if next <= end => cursor = next,
            _ => break,
        }
    }

    blocks
}
