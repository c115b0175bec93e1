//!IPv4 module

use core::net;

use crate::base;

///Number of bits within an IPv4 address
pub const BITS: u8 = net::Ipv4Addr::BITS as u8;

///IPv4 network
pub type Network = base::Network<net::Ipv4Addr>;

///Iterator over addresses of an IPv4 block
pub type Hosts = base::Hosts<net::Ipv4Addr>;

impl base::Address for net::Ipv4Addr {
    const BITS: u8 = BITS;
}

crate::base::impl_family_methods!(net::Ipv4Addr where REPR=u32, SIZE=u64, FAMILY=V4);
