//!Construction of [Network](crate::Network) values from the accepted notations

use core::{fmt, net};

use crate::{v4, v6, Family, FamilyMismatch, Network};

#[derive(Copy, Clone, Debug)]
///Accepted inputs of the network factory
///
///The set is closed; there is no way to construct a network from anything
///else, so every value in existence went through the same validation
pub enum Source<'a> {
    ///Plain address, resulting in a host network
    Addr(net::IpAddr),
    ///Textual notation, either a plain address, `addr/prefix` or `addr/mask`
    Text(&'a str),
    ///Address paired with an explicit mask argument
    AddrMask(net::IpAddr, Mask<'a>),
}

#[derive(Copy, Clone, Debug)]
///Accepted shapes of the mask argument
pub enum Mask<'a> {
    ///Prefix length
    Prefix(u8),
    ///Textual notation, either a decimal prefix length or an address form netmask
    Text(&'a str),
    ///Raw bits of a netmask
    Bits(u128),
    ///Network whose address bits are taken as the netmask
    Net(Network),
}

#[derive(Debug, Clone, PartialEq, Eq)]
///Possible errors constructing a network
pub enum ParseError {
    ///Address notation is not valid
    Addr(net::AddrParseError),
    ///Prefix is not specified
    MissingPrefix,
    ///Prefix is not a valid decimal number
    InvalidPrefix,
    ///Prefix is greater than the family address length
    PrefixOverflow {
        ///Family the prefix was checked against
        family: Family,
        ///Rejected prefix
        prefix: u8,
    },
    ///Mask bits are not a contiguous run of leading ones
    NonContiguousMask {
        ///Family the mask was checked against
        family: Family,
        ///Rejected bits
        bits: u128,
    },
    ///Mask notation belongs to the other address family
    FamilyMismatch(FamilyMismatch),
}

impl From<net::AddrParseError> for ParseError {
    #[inline(always)]
    fn from(error: net::AddrParseError) -> Self {
        Self::Addr(error)
    }
}

impl From<FamilyMismatch> for ParseError {
    #[inline(always)]
    fn from(error: FamilyMismatch) -> Self {
        Self::FamilyMismatch(error)
    }
}

impl fmt::Display for ParseError {
    #[inline]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(error) => fmt.write_fmt(format_args!("Invalid address: {error}")),
            Self::MissingPrefix => fmt.write_str("Prefix is not specified"),
            Self::InvalidPrefix => fmt.write_str("Prefix is not a valid decimal number"),
            Self::PrefixOverflow { family, prefix } => fmt.write_fmt(format_args!("Prefix '{prefix}' is greater than {}", family.bits())),
            Self::NonContiguousMask { family, bits } => fmt.write_fmt(format_args!("Mask '{bits:#x}' is not a contiguous {family} netmask")),
            Self::FamilyMismatch(error) => fmt::Display::fmt(error, fmt),
        }
    }
}

impl core::error::Error for ParseError {
    #[inline]
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Addr(error) => Some(error),
            Self::FamilyMismatch(error) => Some(error),
            _ => None,
        }
    }
}

pub(crate) fn build(source: Source<'_>) -> Result<Network, ParseError> {
    match source {
        Source::Addr(addr) => Ok(Network::host(addr)),
        Source::Text(text) => parse_text(text),
        Source::AddrMask(addr, mask) => {
            let family = Family::of(addr);
            let prefix = resolve_mask(family, mask)?;
            Network::new(addr, prefix).ok_or(ParseError::PrefixOverflow { family, prefix })
        }
    }
}

fn parse_text(text: &str) -> Result<Network, ParseError> {
    match text.split_once('/') {
        None => Ok(Network::host(text.parse::<net::IpAddr>()?)),
        Some((addr, suffix)) => {
            let addr = addr.parse::<net::IpAddr>()?;
            let family = Family::of(addr);
            let prefix = resolve_suffix(family, suffix)?;
            Network::new(addr, prefix).ok_or(ParseError::PrefixOverflow { family, prefix })
        }
    }
}

fn resolve_mask(family: Family, mask: Mask<'_>) -> Result<u8, ParseError> {
    match mask {
        Mask::Prefix(prefix) => if prefix > family.bits() {
            Err(ParseError::PrefixOverflow { family, prefix })
        } else {
            Ok(prefix)
        },
        Mask::Text(text) => resolve_suffix(family, text),
        Mask::Bits(bits) => bits_to_prefix(family, bits),
        Mask::Net(network) => if network.family() == family {
            bits_to_prefix(family, network.to_bits())
        } else {
            Err(ParseError::FamilyMismatch(FamilyMismatch {
                expected: family,
                found: network.family(),
            }))
        },
    }
}

//Suffix of `addr/suffix` is a decimal prefix when it is all digits, otherwise
//an address form netmask of the same family
fn resolve_suffix(family: Family, suffix: &str) -> Result<u8, ParseError> {
    if suffix.is_empty() {
        Err(ParseError::MissingPrefix)
    } else if suffix.bytes().all(|byte| byte.is_ascii_digit()) {
        let prefix = suffix.parse::<u8>().map_err(|_| ParseError::InvalidPrefix)?;
        if prefix > family.bits() {
            Err(ParseError::PrefixOverflow { family, prefix })
        } else {
            Ok(prefix)
        }
    } else {
        let mask = suffix.parse::<net::IpAddr>()?;
        mask_to_prefix(family, mask)
    }
}

fn mask_to_prefix(family: Family, mask: net::IpAddr) -> Result<u8, ParseError> {
    match (family, mask) {
        (Family::V4, net::IpAddr::V4(mask)) => v4::mask_to_prefix(mask).ok_or(ParseError::NonContiguousMask {
            family,
            bits: mask.to_bits() as u128,
        }),
        (Family::V6, net::IpAddr::V6(mask)) => v6::mask_to_prefix(mask).ok_or(ParseError::NonContiguousMask {
            family,
            bits: mask.to_bits(),
        }),
        (expected, found) => Err(FamilyMismatch {
            expected,
            found: Family::of(found),
        }.into()),
    }
}

fn bits_to_prefix(family: Family, bits: u128) -> Result<u8, ParseError> {
    let prefix = match family {
        Family::V4 => match u32::try_from(bits) {
            Ok(bits) => v4::mask_to_prefix(net::Ipv4Addr::from_bits(bits)),
            Err(_) => None,
        },
        Family::V6 => v6::mask_to_prefix(net::Ipv6Addr::from_bits(bits)),
    };
    prefix.ok_or(ParseError::NonContiguousMask { family, bits })
}
