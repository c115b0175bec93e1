//! IP network math utilities
//!
//! A network pairs an address with a prefix length. Typed values live in
//! [v4] and [v6], while [Network] erases the family for code that handles
//! both. Values are immutable; every operation returns a new value.
//!
//! ## Features
//!
//! - `serde` - serialization to and from CIDR strings

#![no_std]
#![warn(missing_docs)]
#![allow(clippy::style)]

mod parser;
pub use parser::{Mask, ParseError, Source};
pub mod base;
pub mod v4;
pub mod v6;

use core::{cmp, fmt, net};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
///Address family tag
pub enum Family {
    ///4 byte addresses
    V4,
    ///16 byte addresses
    V6,
}

impl Family {
    #[inline(always)]
    ///Returns family of the provided address
    pub const fn of(addr: net::IpAddr) -> Self {
        match addr {
            net::IpAddr::V4(_) => Self::V4,
            net::IpAddr::V6(_) => Self::V6,
        }
    }

    #[inline(always)]
    ///Returns number of bits within addresses of the family
    pub const fn bits(&self) -> u8 {
        match self {
            Self::V4 => v4::BITS,
            Self::V6 => v6::BITS,
        }
    }
}

impl fmt::Display for Family {
    #[inline(always)]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => fmt.write_str("IPv4"),
            Self::V6 => fmt.write_str("IPv6"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
///Families of the two sides of a refused cross family operation
pub struct FamilyMismatch {
    ///Family of the value the operation was invoked on
    pub expected: Family,
    ///Family of the other value
    pub found: Family,
}

impl fmt::Display for FamilyMismatch {
    #[inline]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { expected, found } = self;
        fmt.write_fmt(format_args!("Expected {expected} address but got {found}"))
    }
}

impl core::error::Error for FamilyMismatch {}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
///Network of either address family
///
///The derived ordering groups all IPv4 values before IPv6 ones and orders
///within a family by address first and prefix second; [compare](Self::compare)
///is the checked alternative that refuses to cross families
pub enum Network {
    ///IPv4 block
    V4(v4::Network),
    ///IPv6 block
    V6(v6::Network),
}

impl Network {
    #[inline(always)]
    ///Constructs new network verifying that `prefix` fits provided `addr`
    ///
    ///Returns `None` if `prefix` is greater than address length
    pub const fn new(addr: net::IpAddr, prefix: u8) -> Option<Self> {
        match addr {
            net::IpAddr::V4(addr) => Self::new_v4(addr, prefix),
            net::IpAddr::V6(addr) => Self::new_v6(addr, prefix),
        }
    }

    #[inline]
    ///Constructs new IPv4 network verifying that `prefix` fits provided `addr`
    ///
    ///Returns `None` if `prefix` is greater than address length
    pub const fn new_v4(addr: net::Ipv4Addr, prefix: u8) -> Option<Self> {
        match v4::Network::new(addr, prefix) {
            Some(network) => Some(Self::V4(network)),
            None => None,
        }
    }

    #[inline]
    ///Constructs new IPv6 network verifying that `prefix` fits provided `addr`
    ///
    ///Returns `None` if `prefix` is greater than address length
    pub const fn new_v6(addr: net::Ipv6Addr, prefix: u8) -> Option<Self> {
        match v6::Network::new(addr, prefix) {
            Some(network) => Some(Self::V6(network)),
            None => None,
        }
    }

    #[inline(always)]
    ///Constructs host network, whose prefix spans the whole address
    pub const fn host(addr: net::IpAddr) -> Self {
        match addr {
            net::IpAddr::V4(addr) => Self::V4(v4::Network::host(addr)),
            net::IpAddr::V6(addr) => Self::V6(v6::Network::host(addr)),
        }
    }

    #[inline]
    ///Builds a network from any accepted [Source], the single validating entry point
    ///
    ///`Source::Text` accepts a plain address, `addr/prefix` or `addr/mask`;
    ///see [Mask] for the shapes an explicit mask argument can take
    pub fn from_source(source: Source<'_>) -> Result<Self, ParseError> {
        parser::build(source)
    }

    #[inline(always)]
    ///Returns family of the network
    pub const fn family(&self) -> Family {
        match self {
            Self::V4(_) => Family::V4,
            Self::V6(_) => Family::V6,
        }
    }

    #[inline(always)]
    ///Returns address exactly as stored
    pub const fn addr(&self) -> net::IpAddr {
        match self {
            Self::V4(network) => net::IpAddr::V4(network.addr()),
            Self::V6(network) => net::IpAddr::V6(network.addr()),
        }
    }

    #[inline(always)]
    ///Returns prefix
    pub const fn prefix(&self) -> u8 {
        match self {
            Self::V4(network) => network.prefix(),
            Self::V6(network) => network.prefix(),
        }
    }

    #[inline(always)]
    ///Returns raw bits of the address exactly as stored, widened to `u128`
    pub const fn to_bits(&self) -> u128 {
        match self {
            Self::V4(network) => network.to_bits() as u128,
            Self::V6(network) => network.to_bits(),
        }
    }

    #[inline(always)]
    ///Returns whether prefix spans the whole address, leaving no host bits
    pub const fn is_host(&self) -> bool {
        match self {
            Self::V4(network) => network.is_host(),
            Self::V6(network) => network.is_host(),
        }
    }

    #[inline(always)]
    ///Returns whether the block is wider than a single address
    pub const fn is_network(&self) -> bool {
        match self {
            Self::V4(network) => network.is_network(),
            Self::V6(network) => network.is_network(),
        }
    }

    #[inline(always)]
    ///Computes network address, which is lowest possible address within the block
    pub const fn network_addr(&self) -> net::IpAddr {
        match self {
            Self::V4(network) => net::IpAddr::V4(network.network_addr()),
            Self::V6(network) => net::IpAddr::V6(network.network_addr()),
        }
    }

    #[inline(always)]
    ///Computes broadcast address, which is highest possible address within the block
    pub const fn broadcast_addr(&self) -> net::IpAddr {
        match self {
            Self::V4(network) => net::IpAddr::V4(network.broadcast_addr()),
            Self::V6(network) => net::IpAddr::V6(network.broadcast_addr()),
        }
    }

    #[inline(always)]
    ///Returns broadcast address as a host network
    pub const fn broadcast(&self) -> Self {
        match self {
            Self::V4(network) => Self::V4(network.broadcast()),
            Self::V6(network) => Self::V6(network.broadcast()),
        }
    }

    #[inline(always)]
    ///Returns netmask of the block as an address
    pub const fn netmask(&self) -> net::IpAddr {
        match self {
            Self::V4(network) => net::IpAddr::V4(network.netmask()),
            Self::V6(network) => net::IpAddr::V6(network.netmask()),
        }
    }

    #[inline(always)]
    ///Returns netmask of the block as raw bits, widened to `u128`
    pub const fn mask_bits(&self) -> u128 {
        match self {
            Self::V4(network) => network.mask_bits() as u128,
            Self::V6(network) => network.mask_bits(),
        }
    }

    #[inline(always)]
    ///Returns wildcard mask, the netmask complement that isolates host bits, as an address
    pub const fn wildcard(&self) -> net::IpAddr {
        match self {
            Self::V4(network) => net::IpAddr::V4(network.wildcard()),
            Self::V6(network) => net::IpAddr::V6(network.wildcard()),
        }
    }

    #[inline(always)]
    ///Returns number of addresses within the block
    ///
    ///Saturates for IPv6 `/0`, whose count does not fit `u128`
    pub const fn size(&self) -> u128 {
        match self {
            Self::V4(network) => network.size() as u128,
            Self::V6(network) => network.size(),
        }
    }

    #[inline(always)]
    ///Returns network moved `count` addresses up, wrapping around the address space
    pub const fn add(&self, count: u128) -> Self {
        match self {
            Self::V4(network) => Self::V4(network.add(count as u32)),
            Self::V6(network) => Self::V6(network.add(count)),
        }
    }

    #[inline(always)]
    ///Returns network moved `count` addresses down, wrapping around the address space
    pub const fn sub(&self, count: u128) -> Self {
        match self {
            Self::V4(network) => Self::V4(network.sub(count as u32)),
            Self::V6(network) => Self::V6(network.sub(count)),
        }
    }

    #[inline(always)]
    ///Checks if a given `addr` is contained within `self`
    ///
    ///Address of the other family is never contained
    pub const fn contains(&self, addr: net::IpAddr) -> bool {
        match (self, addr) {
            (Self::V4(network), net::IpAddr::V4(addr)) => network.contains(addr),
            (Self::V6(network), net::IpAddr::V6(addr)) => network.contains(addr),
            _ => false,
        }
    }

    #[inline]
    ///Checks whether `other` occupies a part of `self`
    ///
    ///Refuses to compare blocks of different families
    pub const fn covers(&self, other: &Self) -> Result<bool, FamilyMismatch> {
        match (self, other) {
            (Self::V4(network), Self::V4(other)) => Ok(network.covers(other)),
            (Self::V6(network), Self::V6(other)) => Ok(network.covers(other)),
            _ => Err(FamilyMismatch {
                expected: self.family(),
                found: other.family(),
            }),
        }
    }

    #[inline]
    ///Returns the containing network `count` prefix bits up, aligned to the shorter prefix
    ///
    ///Returns `None` when fewer than `count` prefix bits are available
    pub const fn grow(&self, count: u8) -> Option<Self> {
        match self {
            Self::V4(network) => match network.grow(count) {
                Some(grown) => Some(Self::V4(grown)),
                None => None,
            },
            Self::V6(network) => match network.grow(count) {
                Some(grown) => Some(Self::V6(grown)),
                None => None,
            },
        }
    }

    #[inline]
    ///Attempts to merge `self` with its buddy into the containing network one prefix bit up
    ///
    ///`Ok(None)` means the blocks are of the same family but not a buddy pair
    ///of equal prefix with `self` the lower addressed of the two
    pub const fn summarize_with(&self, other: &Self) -> Result<Option<Self>, FamilyMismatch> {
        match (self, other) {
            (Self::V4(network), Self::V4(other)) => match network.summarize_with(other) {
                Some(merged) => Ok(Some(Self::V4(merged))),
                None => Ok(None),
            },
            (Self::V6(network), Self::V6(other)) => match network.summarize_with(other) {
                Some(merged) => Ok(Some(Self::V6(merged))),
                None => Ok(None),
            },
            _ => Err(FamilyMismatch {
                expected: self.family(),
                found: other.family(),
            }),
        }
    }

    #[inline]
    ///Compares two networks of the same family
    ///
    ///Refuses to compare across families, unlike the derived `Ord`
    pub fn compare(&self, other: &Self) -> Result<cmp::Ordering, FamilyMismatch> {
        match (self, other) {
            (Self::V4(network), Self::V4(other)) => Ok(network.cmp(other)),
            (Self::V6(network), Self::V6(other)) => Ok(network.cmp(other)),
            _ => Err(FamilyMismatch {
                expected: self.family(),
                found: other.family(),
            }),
        }
    }

    #[inline(always)]
    ///Attempts to fetch address by `idx` within the block `self`
    pub const fn get(&self, idx: u128) -> Option<net::IpAddr> {
        match self {
            Self::V4(network) => if idx > u32::MAX as u128 {
                None
            } else {
                match network.get(idx as u64) {
                    Some(ip) => Some(net::IpAddr::V4(ip)),
                    None => None,
                }
            },
            Self::V6(network) => match network.get(idx) {
                Some(ip) => Some(net::IpAddr::V6(ip)),
                None => None,
            },
        }
    }

    #[inline(always)]
    ///Returns address corresponding `idx` without checking size according to the prefix
    ///
    ///This is safe in a sense as it is only wrapping math operation, but it should be only used
    ///when you know need to iterate over possible addresses by pre-computing size
    pub const fn get_unchecked(&self, idx: u128) -> net::IpAddr {
        match self {
            Self::V4(network) => net::IpAddr::V4(network.get_unchecked(idx as u64)),
            Self::V6(network) => net::IpAddr::V6(network.get_unchecked(idx)),
        }
    }

    #[inline]
    ///Returns the block as an inclusive range of host networks
    pub const fn to_range(&self) -> core::ops::RangeInclusive<Self> {
        Self::host(self.network_addr())..=Self::host(self.broadcast_addr())
    }

    #[inline]
    ///Returns the block as an inclusive range of raw address bits, widened to `u128`
    pub const fn to_bits_range(&self) -> core::ops::RangeInclusive<u128> {
        match self {
            Self::V4(network) => (network.network_addr().to_bits() as u128)..=(network.broadcast_addr().to_bits() as u128),
            Self::V6(network) => network.network_addr().to_bits()..=network.broadcast_addr().to_bits(),
        }
    }

    #[inline]
    ///Returns iterator over every address of the block, network to broadcast
    pub const fn hosts(&self) -> Hosts {
        match self {
            Self::V4(network) => Hosts::V4(network.hosts()),
            Self::V6(network) => Hosts::V6(network.hosts()),
        }
    }
}

impl fmt::Display for Network {
    #[inline(always)]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(network) => fmt::Display::fmt(network, fmt),
            Self::V6(network) => fmt::Display::fmt(network, fmt),
        }
    }
}

impl core::str::FromStr for Network {
    type Err = ParseError;

    #[inline]
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parser::build(Source::Text(text))
    }
}

impl From<v4::Network> for Network {
    #[inline(always)]
    fn from(network: v4::Network) -> Self {
        Self::V4(network)
    }
}

impl From<v6::Network> for Network {
    #[inline(always)]
    fn from(network: v6::Network) -> Self {
        Self::V6(network)
    }
}

#[derive(Clone, Debug)]
///Iterator over every address of a [Network], network to broadcast
pub enum Hosts {
    ///IPv4 block iterator
    V4(v4::Hosts),
    ///IPv6 block iterator
    V6(v6::Hosts),
}

impl Iterator for Hosts {
    type Item = Network;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::V4(hosts) => match hosts.next() {
                Some(host) => Some(Network::V4(host)),
                None => None,
            },
            Self::V6(hosts) => match hosts.next() {
                Some(host) => Some(Network::V6(host)),
                None => None,
            },
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::V4(hosts) => hosts.size_hint(),
            Self::V6(hosts) => hosts.size_hint(),
        }
    }
}

impl core::iter::FusedIterator for Hosts {}

#[cfg(feature = "serde")]
impl serde::Serialize for Network {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
struct NetworkVisitor;

#[cfg(feature = "serde")]
impl serde::de::Visitor<'_> for NetworkVisitor {
    type Value = Network;

    #[inline]
    fn expecting(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("CIDR string")
    }

    #[inline]
    fn visit_str<E: serde::de::Error>(self, text: &str) -> Result<Self::Value, E> {
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Network {
    #[inline]
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(NetworkVisitor)
    }
}
