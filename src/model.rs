//! Address model shared by the squasher, the collapser and the route formatter.
//!
//! Both families are handled as fixed-width unsigned integers: an IPv4
//! address is its 32-bit value widened to `u128`, an IPv6 address is its
//! 128-bit value. Range and mask arithmetic is written once against `u128`.

use ipnet::IpNet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::RouteError;

/// IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// Address width in bits (32 or 128).
    pub fn max_prefix(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => f.write_str("IPv4"),
            Family::V6 => f.write_str("IPv6"),
        }
    }
}

/// Mask with the lowest `bits` bits set. `bits` is clamped to 128.
pub(crate) fn low_bits(bits: u32) -> u128 {
    if bits == 0 {
        0
    } else if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

pub(crate) fn addr_to_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

/// Inverse of [`addr_to_bits`]. For IPv4 only the low 32 bits are used.
pub(crate) fn bits_to_addr(family: Family, bits: u128) -> IpAddr {
    match family {
        Family::V4 => IpAddr::V4(Ipv4Addr::from((bits & low_bits(32)) as u32)),
        Family::V6 => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

/// A CIDR block in canonical form: host bits beyond the prefix are zero.
///
/// Blocks order by base address, then prefix length. IPv4 blocks sort
/// before IPv6 blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkBlock {
    base: IpAddr,
    prefix: u8,
}

impl NetworkBlock {
    /// Create a block, rejecting prefixes wider than the family and
    /// bases with host bits set.
    ///
    /// # Examples
    /// ```
    /// use ccdroutes::model::NetworkBlock;
    /// assert!(NetworkBlock::new("10.0.0.0".parse().unwrap(), 24).is_ok());
    /// assert!(NetworkBlock::new("10.0.0.1".parse().unwrap(), 24).is_err());
    /// ```
    pub fn new(base: IpAddr, prefix: u8) -> Result<Self, RouteError> {
        let family = Family::of(&base);
        if prefix > family.max_prefix() {
            return Err(RouteError::InvalidInput(format!(
                "prefix /{} exceeds {} width of {} bits",
                prefix,
                family,
                family.max_prefix()
            )));
        }

        let host_mask = low_bits(u32::from(family.max_prefix() - prefix));
        if addr_to_bits(base) & host_mask != 0 {
            return Err(RouteError::InvalidInput(format!(
                "{}/{} has host bits set",
                base, prefix
            )));
        }

        Ok(Self { base, prefix })
    }

    /// Single-address block (/32 or /128).
    pub fn host(addr: IpAddr) -> Self {
        Self {
            base: addr,
            prefix: Family::of(&addr).max_prefix(),
        }
    }

    /// Build a block from a numeric base. The caller guarantees the base
    /// is aligned to `prefix`.
    pub(crate) fn from_bits(family: Family, bits: u128, prefix: u8) -> Self {
        debug_assert!(prefix <= family.max_prefix());
        debug_assert_eq!(
            bits & low_bits(u32::from(family.max_prefix() - prefix)),
            0
        );
        Self {
            base: bits_to_addr(family, bits),
            prefix,
        }
    }

    pub fn base(&self) -> IpAddr {
        self.base
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn family(&self) -> Family {
        Family::of(&self.base)
    }

    fn host_bits(&self) -> u32 {
        u32::from(self.family().max_prefix() - self.prefix)
    }

    /// First covered address as an integer.
    pub fn first(&self) -> u128 {
        addr_to_bits(self.base)
    }

    /// Last covered address as an integer (inclusive).
    pub fn last(&self) -> u128 {
        self.first() | low_bits(self.host_bits())
    }

    /// Number of covered addresses, saturating at `u128::MAX` for `::/0`.
    pub fn size(&self) -> u128 {
        let bits = self.host_bits();
        if bits >= 128 {
            u128::MAX
        } else {
            1u128 << bits
        }
    }

    /// Dotted-decimal netmask for IPv4 blocks, `None` for IPv6.
    pub fn netmask(&self) -> Option<Ipv4Addr> {
        match self.family() {
            Family::V4 => {
                let mask = !(low_bits(self.host_bits()) as u32);
                Some(Ipv4Addr::from(mask))
            }
            Family::V6 => None,
        }
    }

    /// Whether `other` lies entirely inside this block.
    pub fn contains(&self, other: &NetworkBlock) -> bool {
        self.family() == other.family()
            && self.first() <= other.first()
            && other.last() <= self.last()
    }

    /// Whether the single address `addr` is covered by this block.
    pub fn contains_addr(&self, addr: IpAddr) -> bool {
        self.contains(&NetworkBlock::host(addr))
    }
}

impl fmt::Display for NetworkBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix)
    }
}

impl FromStr for NetworkBlock {
    type Err = RouteError;

    /// Parse `a.b.c.d/n`, `x::/n`, or a bare address (host block).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('/') {
            let net: IpNet = s
                .parse()
                .map_err(|_| RouteError::InvalidAddress(format!("invalid CIDR: {}", s)))?;
            NetworkBlock::try_from(net)
        } else {
            let addr: IpAddr = s
                .parse()
                .map_err(|_| RouteError::InvalidAddress(format!("invalid IP address: {}", s)))?;
            Ok(NetworkBlock::host(addr))
        }
    }
}

impl TryFrom<IpNet> for NetworkBlock {
    type Error = RouteError;

    fn try_from(net: IpNet) -> Result<Self, Self::Error> {
        NetworkBlock::new(net.addr(), net.prefix_len())
    }
}
