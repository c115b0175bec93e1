//! Base module

use core::fmt;

///Address family trait
pub trait Address: Clone + Copy + fmt::Debug + fmt::Display + PartialEq + Eq + PartialOrd + Ord {
    ///Max possible length of the address in bits
    const BITS: u8;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
///Network block represented as pair of address and prefix length
///
///The address is kept exactly as supplied; host bits are never cleared.
///`Display` always renders the network aligned address, while equality,
///ordering and `to_bits` use the stored address, so `1.0.0.1/24` renders as
///`1.0.0.0/24` yet is a distinct value.
///
///Field order matters here: the derived ordering compares addresses first and
///prefix lengths second, so at the same address a block sorts before its
///subnets.
pub struct Network<A> {
    addr: A,
    prefix: u8,
}

impl<A: Address> Network<A> {
    #[inline]
    ///Constructs new network verifying that `prefix` fits provided `addr`
    ///
    ///Returns `None` if `prefix` is greater than address length
    pub const fn new(addr: A, prefix: u8) -> Option<Self> {
        if prefix > A::BITS {
            None
        } else {
            Some(Self {
                addr,
                prefix,
            })
        }
    }

    #[inline(always)]
    ///Constructs host network, whose prefix spans the whole address
    pub const fn host(addr: A) -> Self {
        Self {
            addr,
            prefix: A::BITS,
        }
    }

    //`prefix` must be already verified against the address length
    #[inline(always)]
    pub(crate) const fn new_unchecked(addr: A, prefix: u8) -> Self {
        Self {
            addr,
            prefix,
        }
    }

    #[inline(always)]
    ///Returns address exactly as stored
    pub const fn addr(&self) -> A {
        self.addr
    }

    #[inline(always)]
    ///Returns prefix
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }

    #[inline(always)]
    ///Returns whether prefix spans the whole address, leaving no host bits
    pub const fn is_host(&self) -> bool {
        self.prefix == A::BITS
    }

    #[inline(always)]
    ///Returns whether the block is wider than a single address
    pub const fn is_network(&self) -> bool {
        self.prefix < A::BITS
    }
}

#[derive(Clone, Debug)]
///Iterator over every address of a block, network to broadcast, in ascending order
///
///Yields addresses as host networks and never materializes the block, hence
///it is usable even with blocks whose size overflows `usize`
pub struct Hosts<A> {
    pub(crate) next: Option<A>,
    pub(crate) last: A,
}

impl<A: Address> Hosts<A> {
    #[inline(always)]
    pub(crate) const fn new(first: A, last: A) -> Self {
        Self {
            next: Some(first),
            last,
        }
    }
}

macro_rules! impl_family_methods {
    ($typ:ty where REPR=$repr:ident, SIZE=$size:ident, FAMILY=$family:ident) => {
        ///Every netmask of the family, indexed by prefix length
        ///
        ///Entry `n` is the integer with top `n` bits set, going from all zeroes
        ///at index 0 to all ones at index `BITS`
        pub const NETMASKS: [$repr; BITS as usize + 1] = {
            let mut table = [0; BITS as usize + 1];
            let mut prefix = 1;
            while prefix <= BITS as usize {
                table[prefix] = $repr::MAX << (BITS as usize - prefix);
                prefix += 1;
            }
            table
        };

        #[inline]
        ///Returns netmask of provided `prefix`, clamping `prefix` to the address length
        pub const fn mask(prefix: u8) -> $typ {
            let prefix = if prefix > BITS {
                BITS
            } else {
                prefix
            };
            <$typ>::from_bits(NETMASKS[prefix as usize])
        }

        #[inline]
        ///Finds the prefix length whose netmask is exactly `mask`
        ///
        ///Returns `None` when the bit pattern is not a contiguous run of leading ones
        pub const fn mask_to_prefix(mask: $typ) -> Option<u8> {
            let bits = mask.to_bits();
            let prefix = bits.leading_ones() as u8;
            if NETMASKS[prefix as usize] == bits {
                Some(prefix)
            } else {
                None
            }
        }

        #[inline]
        ///Computes network address from provided `addr` and `prefix`, which is lowest possible address within the block
        pub const fn network_addr(addr: $typ, prefix: u8) -> $typ {
            let mask = mask(prefix).to_bits();
            let addr = addr.to_bits() & mask;
            <$typ>::from_bits(addr)
        }

        #[inline]
        ///Computes broadcast address from provided `addr` and `prefix`, which is highest possible address within the block
        pub const fn broadcast_addr(addr: $typ, prefix: u8) -> $typ {
            let mask = mask(prefix).to_bits();
            let broadcast = addr.to_bits() | !mask;
            <$typ>::from_bits(broadcast)
        }

        #[inline]
        ///Returns number of addresses within a block of provided `prefix`
        ///
        ///Saturates when the count does not fit the integer, which only
        ///happens for `/0` of the 16 byte family
        pub const fn size(prefix: u8) -> $size {
            let host_bits = BITS.saturating_sub(prefix) as u32;
            if host_bits >= <$size>::BITS {
                <$size>::MAX
            } else {
                1 << host_bits
            }
        }

        impl $crate::base::Network<$typ> {
            #[inline(always)]
            ///Constructs host network from raw address bits
            pub const fn from_bits(bits: $repr) -> Self {
                Self::host(<$typ>::from_bits(bits))
            }

            #[inline(always)]
            ///Returns raw bits of the address exactly as stored
            pub const fn to_bits(&self) -> $repr {
                self.addr().to_bits()
            }

            #[inline(always)]
            ///Computes network address, which is lowest possible address within the block
            pub const fn network_addr(&self) -> $typ {
                network_addr(self.addr(), self.prefix())
            }

            #[inline(always)]
            ///Computes broadcast address, which is highest possible address within the block
            pub const fn broadcast_addr(&self) -> $typ {
                broadcast_addr(self.addr(), self.prefix())
            }

            #[inline(always)]
            ///Returns broadcast address as a host network
            pub const fn broadcast(&self) -> Self {
                Self::host(self.broadcast_addr())
            }

            #[inline(always)]
            ///Returns netmask of the block as an address
            pub const fn netmask(&self) -> $typ {
                mask(self.prefix())
            }

            #[inline(always)]
            ///Returns netmask of the block as raw bits
            pub const fn mask_bits(&self) -> $repr {
                self.netmask().to_bits()
            }

            #[inline(always)]
            ///Returns wildcard mask, the netmask complement that isolates host bits, as an address
            pub const fn wildcard(&self) -> $typ {
                <$typ>::from_bits(!self.mask_bits())
            }

            #[inline(always)]
            ///Returns number of addresses within the block
            pub const fn size(&self) -> $size {
                size(self.prefix())
            }

            #[inline(always)]
            ///Returns network moved `count` addresses up, wrapping around the address space
            pub const fn add(&self, count: $repr) -> Self {
                let addr = <$typ>::from_bits(self.to_bits().wrapping_add(count));
                Self::new_unchecked(addr, self.prefix())
            }

            #[inline(always)]
            ///Returns network moved `count` addresses down, wrapping around the address space
            pub const fn sub(&self, count: $repr) -> Self {
                let addr = <$typ>::from_bits(self.to_bits().wrapping_sub(count));
                Self::new_unchecked(addr, self.prefix())
            }

            #[inline(always)]
            ///Checks if a given `addr` is contained within `self`
            pub const fn contains(&self, addr: $typ) -> bool {
                (addr.to_bits() & self.mask_bits()) == self.network_addr().to_bits()
            }

            #[inline]
            ///Checks whether `other` occupies a part of `self`
            ///
            ///True only when `other` is at least as specific as `self` and its
            ///aligned address falls within this block; a block covers itself
            ///but never a larger block
            pub const fn covers(&self, other: &Self) -> bool {
                other.prefix() >= self.prefix()
                    && (other.to_bits() & self.mask_bits()) == self.network_addr().to_bits()
            }

            #[inline]
            ///Returns the containing network `count` prefix bits up, aligned to the shorter prefix
            ///
            ///Returns `None` when fewer than `count` prefix bits are available
            pub const fn grow(&self, count: u8) -> Option<Self> {
                match self.prefix().checked_sub(count) {
                    Some(prefix) => Some(Self::new_unchecked(network_addr(self.addr(), prefix), prefix)),
                    None => None,
                }
            }

            #[inline]
            ///Attempts to merge `self` with its buddy into the containing network one prefix bit up
            ///
            ///Succeeds only for a pair of blocks of equal prefix whose aligned
            ///addresses differ in exactly the bit above the shared prefix,
            ///with `self` the lower addressed of the two. Overlap, plain
            ///adjacency and unequal sizes all yield `None`.
            pub const fn summarize_with(&self, other: &Self) -> Option<Self> {
                let prefix = self.prefix();
                if prefix == 0 || prefix != other.prefix() {
                    return None;
                }

                let buddy_bit = (1 as $repr) << (BITS - prefix);
                let low = self.network_addr().to_bits();
                let high = other.network_addr().to_bits();
                if (low ^ high) == buddy_bit && (low & buddy_bit) == 0 {
                    Some(Self::new_unchecked(<$typ>::from_bits(low), prefix - 1))
                } else {
                    None
                }
            }

            #[inline(always)]
            ///Attempts to fetch address by `idx` within the block `self`
            pub const fn get(&self, idx: $size) -> Option<$typ> {
                if idx >= self.size() {
                    return None;
                }

                Some(self.get_unchecked(idx))
            }

            #[inline]
            ///Returns address corresponding `idx` without checking size according to the prefix
            ///
            ///This is safe in a sense as it is only wrapping math operation, but it should be only used
            ///when you know need to iterate over possible addresses by pre-computing size
            pub const fn get_unchecked(&self, idx: $size) -> $typ {
                let net = self.network_addr().to_bits();
                <$typ>::from_bits(net.wrapping_add(idx as $repr))
            }

            #[inline]
            ///Returns the block as an inclusive range of host networks
            pub const fn to_range(&self) -> core::ops::RangeInclusive<Self> {
                Self::host(self.network_addr())..=Self::host(self.broadcast_addr())
            }

            #[inline]
            ///Returns the block as an inclusive range of raw address bits
            pub const fn to_bits_range(&self) -> core::ops::RangeInclusive<$repr> {
                self.network_addr().to_bits()..=self.broadcast_addr().to_bits()
            }

            #[inline]
            ///Returns iterator over every address of the block, network to broadcast
            pub const fn hosts(&self) -> $crate::base::Hosts<$typ> {
                $crate::base::Hosts::new(self.network_addr(), self.broadcast_addr())
            }
        }

        impl core::fmt::Display for $crate::base::Network<$typ> {
            #[inline(always)]
            fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                fmt.write_fmt(format_args!("{}/{}", self.network_addr(), self.prefix()))
            }
        }

        impl core::str::FromStr for $crate::base::Network<$typ> {
            type Err = $crate::ParseError;

            #[inline]
            fn from_str(text: &str) -> Result<Self, Self::Err> {
                match text.parse::<$crate::Network>()? {
                    $crate::Network::$family(network) => Ok(network),
                    other => Err($crate::ParseError::FamilyMismatch($crate::FamilyMismatch {
                        expected: $crate::Family::$family,
                        found: other.family(),
                    })),
                }
            }
        }

        impl Iterator for $crate::base::Hosts<$typ> {
            type Item = $crate::base::Network<$typ>;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                let addr = self.next?;
                self.next = if addr == self.last {
                    None
                } else {
                    Some(<$typ>::from_bits(addr.to_bits().wrapping_add(1)))
                };
                Some($crate::base::Network::host(addr))
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                let span = match self.next {
                    Some(next) => self.last.to_bits().wrapping_sub(next.to_bits()),
                    None => return (0, Some(0)),
                };
                //count needs one bit more than the repr for the widest block
                match u128::from(span).checked_add(1).map(usize::try_from) {
                    Some(Ok(len)) => (len, Some(len)),
                    //span + 1 addresses do not fit usize
                    _ => (usize::MAX, None),
                }
            }
        }

        impl core::iter::FusedIterator for $crate::base::Hosts<$typ> {}
    }
}

pub(super) use impl_family_methods;

#[cfg(feature = "serde")]
impl<A: Address> serde::Serialize for Network<A>
where
    Network<A>: fmt::Display,
{
    #[inline]
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
struct NetworkVisitor<A>(core::marker::PhantomData<A>);

#[cfg(feature = "serde")]
impl<'de, A: Address> serde::de::Visitor<'de> for NetworkVisitor<A>
where
    Network<A>: core::str::FromStr<Err = crate::ParseError>,
{
    type Value = Network<A>;

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
impl<'de, A: Address> serde::Deserialize<'de> for Network<A>
where
    Network<A>: core::str::FromStr<Err = crate::ParseError>,
{
    #[inline]
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(NetworkVisitor(core::marker::PhantomData))
    }
}
