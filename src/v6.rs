//!IPv6 module

use core::net;

use crate::base;

///Number of bits within an IPv6 address
pub const BITS: u8 = net::Ipv6Addr::BITS as u8;

///IPv6 network
pub type Network = base::Network<net::Ipv6Addr>;

///Iterator over addresses of an IPv6 block
pub type Hosts = base::Hosts<net::Ipv6Addr>;

impl base::Address for net::Ipv6Addr {
    const BITS: u8 = BITS;
}

crate::base::impl_family_methods!(net::Ipv6Addr where REPR=u128, SIZE=u128, FAMILY=V6);
