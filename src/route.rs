//! Route entries and their OpenVPN `push` directives.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::model::NetworkBlock;

/// One `push "route ..."` line worth of routing information.
///
/// IPv4 routes carry a dotted-decimal netmask, IPv6 routes a prefix length.
/// Entries are built from [`NetworkBlock`]s and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteEntry {
    kind: RouteKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RouteKind {
    V4 { network: Ipv4Addr, netmask: Ipv4Addr },
    V6 { network: Ipv6Addr, prefix: u8 },
}

impl RouteEntry {
    pub fn network(&self) -> IpAddr {
        match self.kind {
            RouteKind::V4 { network, .. } => IpAddr::V4(network),
            RouteKind::V6 { network, .. } => IpAddr::V6(network),
        }
    }

    /// Netmask of an IPv4 route, `None` for IPv6.
    pub fn netmask(&self) -> Option<Ipv4Addr> {
        match self.kind {
            RouteKind::V4 { netmask, .. } => Some(netmask),
            RouteKind::V6 { .. } => None,
        }
    }

    /// Prefix length of an IPv6 route, `None` for IPv4.
    pub fn prefix(&self) -> Option<u8> {
        match self.kind {
            RouteKind::V4 { .. } => None,
            RouteKind::V6 { prefix, .. } => Some(prefix),
        }
    }

    /// The directive line, newline included.
    ///
    /// # Examples
    /// ```
    /// use ccdroutes::model::NetworkBlock;
    /// use ccdroutes::route::RouteEntry;
    ///
    /// let block: NetworkBlock = "10.0.0.0/24".parse().unwrap();
    /// assert_eq!(
    ///     RouteEntry::from(&block).directive(),
    ///     "push \"route 10.0.0.0 255.255.255.0\"\n"
    /// );
    /// ```
    pub fn directive(&self) -> String {
        format!("{}\n", self)
    }
}

impl From<&NetworkBlock> for RouteEntry {
    fn from(block: &NetworkBlock) -> Self {
        let kind = match block.base() {
            IpAddr::V4(network) => RouteKind::V4 {
                network,
                netmask: block.netmask().unwrap_or(Ipv4Addr::BROADCAST),
            },
            IpAddr::V6(network) => RouteKind::V6 {
                network,
                prefix: block.prefix(),
            },
        };
        Self { kind }
    }
}

impl From<NetworkBlock> for RouteEntry {
    fn from(block: NetworkBlock) -> Self {
        RouteEntry::from(&block)
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RouteKind::V4 { network, netmask } => {
                write!(f, "push \"route {} {}\"", network, netmask)
            }
            RouteKind::V6 { network, prefix } => {
                write!(f, "push \"route-ipv6 {}/{}\"", network, prefix)
            }
        }
    }
}

/// Turn blocks into route entries, keeping their order.
pub fn to_entries(blocks: &[NetworkBlock]) -> Vec<RouteEntry> {
    blocks.iter().map(RouteEntry::from).collect()
}

/// Render entries as the body of a CCD file, one directive per line.
pub fn render(entries: &[RouteEntry]) -> String {
    entries.iter().map(RouteEntry::directive).collect()
}
