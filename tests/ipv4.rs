use core::cmp::Ordering;
use core::net;

use netblock::{v4, Family, FamilyMismatch, Mask, Network, ParseError, Source};

fn block(text: &str) -> Network {
    match text.parse() {
        Ok(network) => network,
        Err(error) => panic!("Should parse '{text}' but got error={error}"),
    }
}

#[cfg_attr(miri, ignore)]
#[test]
fn should_verify_v4_prefix_size() {
    let addr = net::Ipv4Addr::UNSPECIFIED;

    let mut network = Network::new_v4(addr, 0).expect("to create");
    assert_eq!(network.size(), 1u128 << 32, "/0 has invalid size");
    assert_eq!(network.get(u32::MAX as _), Some(net::Ipv4Addr::new(255, 255, 255, 255).into()));
    assert_eq!(network.get(1u128 << 32), None);

    for prefix in 1..=32 {
        network = Network::new_v4(addr, prefix).expect("to create");
        let expected_size = 2u128.pow((32 - prefix) as _);
        assert_eq!(network.size(), expected_size, "/{} has invalid size", prefix);
        for addr in 0..expected_size as u32 {
            let addr = net::IpAddr::V4(net::Ipv4Addr::from_bits(addr));
            assert!(network.contains(addr), "{} is not contained in network={}", addr, network);
        }
    }

    //check math never panics
    network = Network::new_v4(net::Ipv4Addr::new(255, 255, 255, 30), 31).expect("to create");
    assert_eq!(network.size(), 2);
    assert_eq!(network.get_unchecked(0), net::IpAddr::V4(net::Ipv4Addr::new(255, 255, 255, 30)));
    assert_eq!(network.get_unchecked(1), net::IpAddr::V4(net::Ipv4Addr::new(255, 255, 255, 31)));
    assert_eq!(network.get_unchecked(2), net::IpAddr::V4(net::Ipv4Addr::new(255, 255, 255, 32)));

    //wrap
    assert_eq!(network.get_unchecked(225), net::IpAddr::V4(net::Ipv4Addr::new(255, 255, 255, 255)));
    assert_eq!(network.get_unchecked(226), net::IpAddr::V4(net::Ipv4Addr::new(0, 0, 0, 0)));
}

#[test]
fn should_map_prefix_to_netmask() {
    assert_eq!(v4::NETMASKS.len(), 33);
    assert_eq!(v4::NETMASKS[0], 0);
    assert_eq!(v4::NETMASKS[32], u32::MAX);

    let mut prev = None;
    for (prefix, mask) in v4::NETMASKS.iter().enumerate() {
        assert_eq!(mask.leading_ones() as usize, prefix);
        assert_eq!(mask.count_ones() as usize, prefix);
        if let Some(prev) = prev {
            assert!(*mask > prev, "NETMASKS must be strictly increasing");
        }
        prev = Some(*mask);
        assert_eq!(v4::mask_to_prefix(net::Ipv4Addr::from_bits(*mask)), Some(prefix as u8));
    }

    assert_eq!(v4::mask(0), net::Ipv4Addr::new(0, 0, 0, 0));
    assert_eq!(v4::mask(1), net::Ipv4Addr::new(128, 0, 0, 0));
    assert_eq!(v4::mask(8), net::Ipv4Addr::new(255, 0, 0, 0));
    assert_eq!(v4::mask(24), net::Ipv4Addr::new(255, 255, 255, 0));
    assert_eq!(v4::mask(25), net::Ipv4Addr::new(255, 255, 255, 128));
    assert_eq!(v4::mask(31), net::Ipv4Addr::new(255, 255, 255, 254));
    assert_eq!(v4::mask(32), net::Ipv4Addr::new(255, 255, 255, 255));
    //prefix beyond the address length clamps to the full mask
    assert_eq!(v4::mask(40), net::Ipv4Addr::new(255, 255, 255, 255));

    assert_eq!(v4::mask_to_prefix(net::Ipv4Addr::new(255, 0, 255, 0)), None);
    assert_eq!(v4::mask_to_prefix(net::Ipv4Addr::new(0, 0, 0, 255)), None);
}

#[test]
fn should_construct_from_any_source() {
    let expected = block("1.0.0.0/24");
    let addr: net::IpAddr = "1.0.0.0".parse().expect("valid address");

    let sources = [
        Source::Text("1.0.0.0/24"),
        Source::Text("1.0.0.0/255.255.255.0"),
        Source::AddrMask(addr, Mask::Prefix(24)),
        Source::AddrMask(addr, Mask::Text("24")),
        Source::AddrMask(addr, Mask::Text("255.255.255.0")),
        Source::AddrMask(addr, Mask::Bits(0xffff_ff00)),
        Source::AddrMask(addr, Mask::Net(block("255.255.255.0"))),
    ];

    for source in sources {
        let network = Network::from_source(source).expect("to create");
        assert_eq!(network, expected, "source={:?}", source);
    }

    let host = Network::from_source(Source::Addr(addr)).expect("to create");
    assert_eq!(host, block("1.0.0.0/32"));
    assert_eq!(host, Network::host(addr));
    assert!(host.is_host());

    //an integer mask is never read as a prefix length
    let error = Network::from_source(Source::AddrMask(addr, Mask::Bits(24))).expect_err("should fail");
    assert_eq!(error, ParseError::NonContiguousMask { family: Family::V4, bits: 24 });
}

#[test]
fn should_parse_notations() {
    let inputs = [
        ("127.0.0.1", "127.0.0.1/32"),
        ("0.0.0.0/0", "0.0.0.0/0"),
        ("255.255.255.255", "255.255.255.255/32"),
        ("10.20.30.40/255.255.0.0", "10.20.0.0/16"),
        ("192.168.1.77/26", "192.168.1.64/26"),
    ];

    for (text, expected) in inputs.iter() {
        println!("Parse '{text}'");
        let network = text.parse::<Network>().expect("to parse");
        assert_eq!(network.to_string(), *expected);
        assert_eq!(network.family(), Family::V4);
    }
}

#[test]
fn should_not_parse_invalid_notations() {
    let inputs = [
        ("1.0.0.0/", ParseError::MissingPrefix),
        ("1.0.0.0/33", ParseError::PrefixOverflow { family: Family::V4, prefix: 33 }),
        ("1.0.0.0/300", ParseError::InvalidPrefix),
        ("1.0.0.0/255.0.255.0", ParseError::NonContiguousMask { family: Family::V4, bits: 0xff00_ff00 }),
        ("1.0.0.0/ffff::", ParseError::FamilyMismatch(FamilyMismatch { expected: Family::V4, found: Family::V6 })),
    ];

    for (text, expected_error) in inputs.iter() {
        println!("Parse '{text}'");
        let error = text.parse::<Network>().expect_err("should fail");
        assert_eq!(error, *expected_error);
    }

    //broken addresses are rejected by the address parser itself
    assert!(matches!("256.0.0.1/24".parse::<Network>(), Err(ParseError::Addr(_))));
    assert!(matches!("1.0.0/24".parse::<Network>(), Err(ParseError::Addr(_))));
    assert!(matches!("hello".parse::<Network>(), Err(ParseError::Addr(_))));
    assert!(matches!("1.0.0.0/24abc".parse::<Network>(), Err(ParseError::Addr(_))));
}

#[test]
fn should_render_aligned_cidr() {
    let network = block("1.0.0.1/24");
    assert_eq!(network.to_string(), "1.0.0.0/24");
    //the stored address survives rendering
    assert_eq!(network.addr(), "1.0.0.1".parse::<net::IpAddr>().expect("valid address"));
    assert_ne!(network, block("1.0.0.0/24"));

    assert_eq!(block("1.0.0.1").to_string(), "1.0.0.1/32");
}

#[test]
fn should_round_trip_bits() {
    let network = block("1.0.0.1");
    assert_eq!(network.to_bits(), 16777217);

    let typed: v4::Network = "1.0.0.1/32".parse().expect("to parse");
    assert_eq!(v4::Network::from_bits(16777217), typed);
    assert_eq!(typed.to_bits(), 16777217);
}

#[test]
fn should_offset_networks() {
    let network = block("1.0.0.1");
    assert_eq!(network.add(1), block("1.0.0.2"));
    assert_eq!(network.sub(1), block("1.0.0.0"));

    //offset keeps the prefix
    assert_eq!(block("1.0.0.0/24").add(256), block("1.0.1.0/24"));

    //wrap around zero
    assert_eq!(block("0.0.0.0").sub(1), block("255.255.255.255"));
    assert_eq!(block("255.255.255.255").add(1), block("0.0.0.0"));
}

#[test]
fn should_measure_size() {
    assert_eq!(block("1.0.0.1").size(), 1);
    assert_eq!(block("1.0.0.0/31").size(), 2);
    assert_eq!(block("1.0.0.0/24").size(), 256);
    assert_eq!(block("0.0.0.0/0").size(), 1u128 << 32);
}

#[test]
fn should_expose_masks() {
    let network = block("1.0.0.0/24");
    assert_eq!(network.netmask(), "255.255.255.0".parse::<net::IpAddr>().expect("valid address"));
    assert_eq!(network.mask_bits(), 0xffff_ff00);
    assert_eq!(network.wildcard(), "0.0.0.255".parse::<net::IpAddr>().expect("valid address"));
    assert_eq!(network.network_addr(), "1.0.0.0".parse::<net::IpAddr>().expect("valid address"));
    assert_eq!(network.broadcast_addr(), "1.0.0.255".parse::<net::IpAddr>().expect("valid address"));
    assert_eq!(network.broadcast(), block("1.0.0.255"));
}

#[test]
fn should_tell_host_from_network() {
    assert!(block("1.0.0.1").is_host());
    assert!(!block("1.0.0.1").is_network());

    assert!(block("1.0.0.0/24").is_network());
    assert!(!block("1.0.0.0/24").is_host());

    //a /31 pair is already a network
    assert!(block("1.0.0.1/31").is_network());
    assert!(!block("1.0.0.1/31").is_host());
}

#[test]
fn should_order_networks() {
    assert_eq!(block("1.0.0.1"), block("1.0.0.1/32"));
    assert_ne!(block("1.0.0.0/32"), block("1.0.0.0/31"));
    assert_ne!(block("1.0.0.0/31"), block("1.0.0.1/31"));

    //address decides first, prefix second
    assert!(block("1.0.0.1") < block("1.0.0.2/31"));
    assert!(block("1.0.0.1/31") < block("1.0.0.1"));
    assert!(block("1.0.0.1/31") < block("1.0.0.2/8"));

    assert_eq!(block("1.0.0.1/31").compare(&block("1.0.0.1")), Ok(Ordering::Less));
    assert_eq!(block("1.0.0.1").compare(&block("1.0.0.1")), Ok(Ordering::Equal));
    assert_eq!(block("1.0.0.2").compare(&block("1.0.0.1")), Ok(Ordering::Greater));
}

#[test]
fn should_cover_subnets() {
    let network = block("1.0.0.0/24");

    assert_eq!(network.covers(&block("1.0.1.0/24")), Ok(false));
    assert_eq!(network.covers(&block("1.0.0.0/23")), Ok(false));
    assert_eq!(network.covers(&network), Ok(true));
    assert_eq!(network.covers(&block("1.0.0.0/25")), Ok(true));
    assert_eq!(network.covers(&block("1.0.0.64/26")), Ok(true));
    assert_eq!(network.covers(&block("1.0.0.128/25")), Ok(true));

    //misaligned subnet is judged by its aligned address
    assert_eq!(network.covers(&block("1.0.0.77/26")), Ok(true));

    assert!(network.contains("1.0.0.77".parse().expect("valid address")));
    assert!(!network.contains("1.0.1.0".parse().expect("valid address")));
}

#[test]
fn should_grow_to_containing_network() {
    assert_eq!(block("1.0.0.0/25").grow(1), Some(block("1.0.0.0/24")));
    //address is re-aligned to the shorter prefix
    assert_eq!(block("1.0.1.0/24").grow(8), Some(block("1.0.0.0/16")));
    assert_eq!(block("1.0.0.0/24").grow(0), Some(block("1.0.0.0/24")));

    assert_eq!(block("1.0.0.0/24").grow(25), None);
    assert_eq!(block("0.0.0.0/0").grow(1), None);
}

#[test]
fn should_summarize_buddy_pairs() {
    let low = block("1.0.0.0/24");
    let high = block("1.0.1.0/24");

    assert_eq!(low.summarize_with(&high), Ok(Some(block("1.0.0.0/23"))));
    //the lower addressed block must come first
    assert_eq!(high.summarize_with(&low), Ok(None));

    //adjacent but not buddies
    assert_eq!(block("1.0.1.0/24").summarize_with(&block("1.0.2.0/24")), Ok(None));
    //not adjacent at all
    assert_eq!(block("1.0.2.0/24").summarize_with(&block("1.0.0.0/24")), Ok(None));
    //covering a subnet is not a merge
    assert_eq!(block("1.0.0.0/24").summarize_with(&block("1.0.0.0/25")), Ok(None));
    //unequal sizes never merge
    assert_eq!(block("1.0.0.0/25").summarize_with(&block("1.0.0.128/26")), Ok(None));
    //whole space has no buddy
    assert_eq!(block("0.0.0.0/0").summarize_with(&block("0.0.0.0/0")), Ok(None));

    //misaligned pair merges by aligned addresses
    assert_eq!(block("1.0.0.7/24").summarize_with(&block("1.0.1.9/24")), Ok(Some(block("1.0.0.0/23"))));
}

#[test]
fn should_convert_to_range() {
    let network = block("0.0.0.0/24");
    assert_eq!(network.to_bits_range(), 0..=255);
    assert_eq!(network.to_range(), block("0.0.0.0")..=block("0.0.0.255"));

    //misaligned block converts to the aligned range
    assert_eq!(block("0.0.0.77/24").to_range(), network.to_range());
    assert_eq!(block("1.0.0.1").to_bits_range(), 16777217..=16777217);
}

#[test]
fn should_enumerate_hosts() {
    let network = block("1.0.0.0/30");
    let hosts: Vec<Network> = network.hosts().collect();
    assert_eq!(hosts, [block("1.0.0.0"), block("1.0.0.1"), block("1.0.0.2"), block("1.0.0.3")]);

    assert_eq!(network.hosts().size_hint(), (4, Some(4)));
    assert_eq!(network.hosts().count(), 4);

    //misaligned address enumerates the aligned block
    let same: Vec<Network> = block("1.0.0.2/30").hosts().collect();
    assert_eq!(same, hosts);

    //cloning restarts from the current position
    let mut iter = network.hosts();
    assert_eq!(iter.next(), Some(block("1.0.0.0")));
    assert_eq!(iter.clone().collect::<Vec<_>>(), iter.collect::<Vec<_>>());

    //the whole address space fits usize so its count is reported exactly
    assert_eq!(block("0.0.0.0/0").hosts().size_hint(), (1usize << 32, Some(1usize << 32)));

    //typed iterator yields typed host networks
    let typed: v4::Network = "1.0.0.0/31".parse().expect("to parse");
    let mut typed_hosts = typed.hosts();
    assert_eq!(typed_hosts.size_hint(), (2, Some(2)));
    assert_eq!(typed_hosts.next(), Some(v4::Network::host(net::Ipv4Addr::new(1, 0, 0, 0))));
    assert_eq!(typed_hosts.next(), Some(v4::Network::host(net::Ipv4Addr::new(1, 0, 0, 1))));
    assert_eq!(typed_hosts.next(), None);

    //host block yields itself alone
    assert_eq!(block("1.0.0.7").hosts().collect::<Vec<_>>(), [block("1.0.0.7")]);
}

#[test]
fn should_expose_typed_networks() {
    let network = v4::Network::new(net::Ipv4Addr::new(10, 1, 2, 3), 8).expect("to create");
    assert_eq!(network.network_addr(), net::Ipv4Addr::new(10, 0, 0, 0));
    assert_eq!(network.broadcast_addr(), net::Ipv4Addr::new(10, 255, 255, 255));
    assert_eq!(network.netmask(), net::Ipv4Addr::new(255, 0, 0, 0));
    assert_eq!(network.wildcard(), net::Ipv4Addr::new(0, 255, 255, 255));
    assert_eq!(network.size(), 1 << 24);
    assert!(network.contains(net::Ipv4Addr::new(10, 200, 30, 40)));
    assert!(!network.contains(net::Ipv4Addr::new(11, 0, 0, 0)));

    assert_eq!(v4::Network::new(net::Ipv4Addr::UNSPECIFIED, 33), None);

    //family erasure round trip
    let erased = Network::from(network);
    assert_eq!(erased.family(), Family::V4);
    assert_eq!(erased, block("10.1.2.3/8"));
    assert_eq!(erased.to_string(), "10.0.0.0/8");

    //typed parse rejects the other family
    let error = "::1/64".parse::<v4::Network>().expect_err("should fail");
    assert_eq!(error, ParseError::FamilyMismatch(FamilyMismatch { expected: Family::V4, found: Family::V6 }));
}

#[test]
fn should_evaluate_in_const_context() {
    const NETWORK: Network = match Network::new_v4(net::Ipv4Addr::new(192, 168, 0, 0), 16) {
        Some(network) => network,
        None => panic!("prefix fits"),
    };
    const SIZE: u128 = NETWORK.size();

    assert_eq!(SIZE, 65536);
    assert!(NETWORK.contains(net::IpAddr::V4(net::Ipv4Addr::new(192, 168, 44, 55))));
    assert!(!NETWORK.contains(net::IpAddr::V4(net::Ipv4Addr::new(192, 169, 0, 0))));
}
