//! Peer list interpretation.
//!
//! Turns a node's raw `net_info` peer list into public p2p peer descriptors and
//! candidate RPC endpoints worth probing.

use crate::crawler::ChainId;
use crate::state::CrawlState;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use tendermint_peers_connection::address::{is_private, parse_ip};
use tendermint_peers_connection::{AddressError, Endpoint, ListenAddress, NetInfo};

/// A public p2p peer, as recorded in the node index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerDescriptor {
    /// The peer's node identifier.
    pub id: String,
    /// Host to dial for p2p connections.
    pub host: IpAddr,
    /// Port to dial for p2p connections.
    pub port: u16,
}

impl PeerDescriptor {
    /// Connection string in the `id@host:port` form node configs expect for
    /// persistent peers and seeds.
    pub fn connection_string(&self) -> String {
        format!("{}@{}", self.id, SocketAddr::new(self.host, self.port))
    }
}

impl fmt::Display for PeerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.connection_string())
    }
}

/// Why a peer entry was dropped.
#[derive(Debug)]
pub enum SkipReason {
    /// The entry is missing required fields.
    Malformed(serde_json::Error),
    /// The remote IP or listen address could not be read.
    InvalidAddress(AddressError),
    /// The effective p2p host is loopback or private.
    PrivateAddress(IpAddr),
    /// The peer reports itself on another network.
    WrongNetwork(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Malformed(err) => write!(f, "malformed entry: {err}"),
            SkipReason::InvalidAddress(err) => write!(f, "invalid address: {err}"),
            SkipReason::PrivateAddress(ip) => write!(f, "private address {ip}"),
            SkipReason::WrongNetwork(network) => write!(f, "on network {network}"),
        }
    }
}

/// A peer entry the parser dropped, by position in the peer list.
#[derive(Debug)]
pub struct SkippedPeer {
    pub index: usize,
    pub reason: SkipReason,
}

/// Result of interpreting one peer list.
#[derive(Debug, Default)]
pub struct ParsedPeers {
    /// Public peers in list order, keyed by the remote IP they were seen from.
    pub peers: Vec<(IpAddr, PeerDescriptor)>,
    /// New RPC endpoints to probe, in list order and without duplicates.
    pub candidates: Vec<Endpoint>,
    /// Entries that were dropped entirely.
    pub skipped: Vec<SkippedPeer>,
}

/// Interpret a node's peer list.
///
/// For every entry the effective p2p host is the advertised listen host, or the
/// remote IP when the node listens on the wildcard address. Entries whose
/// effective host is private are dropped. Entries that also advertise an RPC
/// listener on a non-private host yield the candidate `http://<remote_ip>:<rpc_port>`,
/// unless the crawl state already knows that endpoint.
///
/// A bad entry never fails the whole list, it lands in [`ParsedPeers::skipped`].
///
/// # Arguments
///
/// * `chain_id` - Network being crawled. Entries reporting a different network are skipped.
/// * `net_info` - The node's peer list.
/// * `state` - Crawl state used to filter out endpoints already seen.
pub fn parse_peers(chain_id: &ChainId, net_info: &NetInfo, state: &CrawlState) -> ParsedPeers {
    let mut parsed = ParsedPeers::default();

    for (index, raw) in net_info.peers().iter().enumerate() {
        let entry = match NetInfo::decode_peer(raw) {
            Ok(entry) => entry,
            Err(err) => {
                parsed.skipped.push(SkippedPeer {
                    index,
                    reason: SkipReason::Malformed(err),
                });
                continue;
            }
        };

        if let Some(network) = raw
            .pointer("/node_info/network")
            .and_then(|network| network.as_str())
        {
            if network != chain_id.as_str() {
                parsed.skipped.push(SkippedPeer {
                    index,
                    reason: SkipReason::WrongNetwork(network.to_string()),
                });
                continue;
            }
        }

        let addresses = parse_ip(&entry.remote_ip).and_then(|remote_ip| {
            ListenAddress::parse(&entry.node_info.listen_addr).map(|listen| (remote_ip, listen))
        });
        let (remote_ip, listen) = match addresses {
            Ok(addresses) => addresses,
            Err(err) => {
                parsed.skipped.push(SkippedPeer {
                    index,
                    reason: SkipReason::InvalidAddress(err),
                });
                continue;
            }
        };

        let host = if listen.is_wildcard() {
            remote_ip
        } else {
            listen.host
        };
        if is_private(host) {
            parsed.skipped.push(SkippedPeer {
                index,
                reason: SkipReason::PrivateAddress(host),
            });
            continue;
        }

        parsed.peers.push((
            remote_ip,
            PeerDescriptor {
                id: entry.node_info.id.clone(),
                host,
                port: listen.port,
            },
        ));

        let Some(rpc_address) = entry.rpc_address() else {
            continue;
        };
        let rpc = match ListenAddress::parse(rpc_address) {
            Ok(rpc) => rpc,
            Err(err) => {
                log::debug!("Ignoring rpc address of {}: {err}", entry.node_info.id);
                continue;
            }
        };

        // A private rpc host means the API is only bound locally. The candidate is
        // dialed on the remote IP, so that has to be public too.
        if is_private(rpc.host) || is_private(remote_ip) {
            continue;
        }

        let candidate = Endpoint::from_socket(remote_ip, rpc.port);
        if !state.is_known(&candidate) && !parsed.candidates.contains(&candidate) {
            parsed.candidates.push(candidate);
        }
    }

    parsed
}
