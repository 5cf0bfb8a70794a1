//! Address classification and advertised address parsing.
//!
//! Nodes advertise their p2p and rpc listeners as `tcp://<host>:<port>` strings.
//! Only hosts that are reachable from the public internet are worth recording,
//! so every advertised host runs through [`is_private`] first.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// IPv4 blocks never reachable from the public internet: loopback plus the
/// three RFC 1918 private networks.
const PRIVATE_V4_BLOCKS: [(Ipv4Addr, u32); 4] = [
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
];

/// Errors that can occur while reading an advertised address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The host is not an IP literal.
    InvalidIp(String),
    /// The address has no `:port` suffix.
    MissingPort(String),
    /// The port is not a number in `0..=65535`.
    InvalidPort(String),
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::InvalidIp(host) => write!(f, "Not an IP address: '{host}'"),
            AddressError::MissingPort(addr) => write!(f, "Address '{addr}' has no port"),
            AddressError::InvalidPort(port) => write!(f, "Invalid port: '{port}'"),
        }
    }
}

impl std::error::Error for AddressError {}

fn in_block(ip: Ipv4Addr, network: Ipv4Addr, prefix: u32) -> bool {
    let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
    u32::from(ip) & mask == u32::from(network) & mask
}

/// Checks whether an address belongs to a loopback or private network.
///
/// Containment is tested numerically against the network blocks, so
/// `172.32.0.1` is public while `172.16.0.0` and `172.31.255.255` are private.
/// IPv4-mapped IPv6 addresses are classified by their IPv4 part, and `::1` is
/// treated as loopback. Every other IPv6 address is public.
pub fn is_private(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => PRIVATE_V4_BLOCKS
            .iter()
            .any(|(network, prefix)| in_block(ipv4, *network, *prefix)),
        IpAddr::V6(ipv6) => match ipv6.to_ipv4_mapped() {
            Some(ipv4) => is_private(IpAddr::V4(ipv4)),
            None => ipv6.is_loopback(),
        },
    }
}

/// Parses an IP literal, accepting bracketed IPv6 (`[::1]`).
pub fn parse_ip(literal: &str) -> Result<IpAddr, AddressError> {
    let trimmed = literal
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(literal);
    trimmed
        .parse::<IpAddr>()
        .map_err(|_| AddressError::InvalidIp(literal.to_string()))
}

/// Classifies an IP literal.
///
/// # Returns
///
/// * `Ok(true)` - The address is loopback or private.
/// * `Ok(false)` - The address is public.
/// * `Err(AddressError)` - The literal is not an IP address. Malformed input is never
///   assumed to be public.
pub fn is_private_literal(literal: &str) -> Result<bool, AddressError> {
    parse_ip(literal).map(is_private)
}

/// A host and port advertised by a node, e.g. its p2p `listen_addr` or its
/// `rpc_address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenAddress {
    pub host: IpAddr,
    pub port: u16,
}

impl ListenAddress {
    /// Parse an advertised address of the form `tcp://<host>:<port>`.
    ///
    /// The scheme prefix is optional. IPv6 hosts must be bracketed.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let without_scheme = match input.split_once("://") {
            Some((_, rest)) => rest,
            None => input,
        };

        let (host, port) = without_scheme
            .rsplit_once(':')
            .ok_or_else(|| AddressError::MissingPort(input.to_string()))?;

        let port = port
            .parse::<u16>()
            .map_err(|_| AddressError::InvalidPort(port.to_string()))?;

        Ok(ListenAddress {
            host: parse_ip(host)?,
            port,
        })
    }

    /// Whether the node binds every interface (`0.0.0.0` or `::`), in which case the
    /// advertised host says nothing about where the node can be reached.
    pub fn is_wildcard(&self) -> bool {
        self.host.is_unspecified()
    }
}

impl FromStr for ListenAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListenAddress::parse(s)
    }
}

impl fmt::Display for ListenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", std::net::SocketAddr::new(self.host, self.port))
    }
}
