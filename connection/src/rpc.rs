//! Response shapes of the node RPC queries.
//!
//! Only the fields the crawler reads are modelled, everything else in the
//! payloads is ignored.

use serde::Deserialize;

/// Response of `GET /status`.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeStatus {
    result: StatusResult,
}

#[derive(Debug, Clone, Deserialize)]
struct StatusResult {
    node_info: StatusNodeInfo,
}

#[derive(Debug, Clone, Deserialize)]
struct StatusNodeInfo {
    network: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    moniker: Option<String>,
}

impl NodeStatus {
    /// The chain identifier the node is running, e.g. `cosmoshub-4`.
    pub fn network(&self) -> &str {
        &self.result.node_info.network
    }

    /// The node's own p2p identifier, if reported.
    pub fn node_id(&self) -> Option<&str> {
        self.result.node_info.id.as_deref()
    }

    /// The node's human readable name, if reported.
    pub fn moniker(&self) -> Option<&str> {
        self.result.node_info.moniker.as_deref()
    }
}

/// Response of `GET /net_info`.
///
/// Peer entries are kept as raw JSON so one malformed entry does not make the
/// whole peer list unreadable. Decode them one at a time with
/// [`NetInfo::decode_peer`].
#[derive(Debug, Clone, Deserialize)]
pub struct NetInfo {
    result: NetInfoResult,
}

#[derive(Debug, Clone, Deserialize)]
struct NetInfoResult {
    #[serde(default)]
    peers: Option<Vec<serde_json::Value>>,
}

impl NetInfo {
    /// Raw peer entries, empty if the node reported none.
    pub fn peers(&self) -> &[serde_json::Value] {
        self.result.peers.as_deref().unwrap_or(&[])
    }

    /// Decode a single raw peer entry.
    pub fn decode_peer(raw: &serde_json::Value) -> Result<PeerEntry, serde_json::Error> {
        PeerEntry::deserialize(raw)
    }
}

/// One entry of the `net_info` peer list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerEntry {
    /// Address the reporting node sees this peer connecting from.
    pub remote_ip: String,
    pub node_info: PeerNodeInfo,
}

/// What the peer told the reporting node about itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerNodeInfo {
    pub id: String,
    /// Advertised p2p listener, `tcp://<host>:<port>`.
    pub listen_addr: String,
    #[serde(default)]
    pub other: Option<PeerOther>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerOther {
    /// Advertised RPC listener, `tcp://<host>:<port>`.
    #[serde(default)]
    pub rpc_address: Option<String>,
}

impl PeerEntry {
    /// The advertised RPC listener, if any.
    pub fn rpc_address(&self) -> Option<&str> {
        self.node_info
            .other
            .as_ref()
            .and_then(|other| other.rpc_address.as_deref())
            .filter(|addr| !addr.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_decode() {
        let status: NodeStatus = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": -1,
            "result": {
                "node_info": {
                    "id": "abc123",
                    "network": "cosmoshub-4",
                    "moniker": "seed-1",
                    "version": "0.37.2"
                },
                "sync_info": { "latest_block_height": "1" }
            }
        }))
        .unwrap();

        assert_eq!(status.network(), "cosmoshub-4");
        assert_eq!(status.node_id(), Some("abc123"));
        assert_eq!(status.moniker(), Some("seed-1"));
    }

    #[test]
    fn test_status_missing_network() {
        let result = serde_json::from_value::<NodeStatus>(json!({
            "result": { "node_info": { "id": "abc123" } }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_net_info_decode() {
        let net_info: NetInfo = serde_json::from_value(json!({
            "result": {
                "listening": true,
                "n_peers": "2",
                "peers": [
                    {
                        "remote_ip": "203.0.113.5",
                        "node_info": {
                            "id": "peer1",
                            "listen_addr": "tcp://0.0.0.0:26656",
                            "other": { "tx_index": "on", "rpc_address": "tcp://0.0.0.0:26657" }
                        }
                    },
                    { "remote_ip": "203.0.113.6" }
                ]
            }
        }))
        .unwrap();

        assert_eq!(net_info.peers().len(), 2);

        let first = NetInfo::decode_peer(&net_info.peers()[0]).unwrap();
        assert_eq!(first.remote_ip, "203.0.113.5");
        assert_eq!(first.node_info.id, "peer1");
        assert_eq!(first.rpc_address(), Some("tcp://0.0.0.0:26657"));

        // Second entry lacks node_info and fails on its own.
        assert!(NetInfo::decode_peer(&net_info.peers()[1]).is_err());
    }

    #[test]
    fn test_net_info_without_peers() {
        let net_info: NetInfo =
            serde_json::from_value(json!({ "result": { "peers": null } })).unwrap();
        assert!(net_info.peers().is_empty());

        let net_info: NetInfo = serde_json::from_value(json!({ "result": {} })).unwrap();
        assert!(net_info.peers().is_empty());
    }

    #[test]
    fn test_rpc_address_absent_or_empty() {
        let entry: PeerEntry = serde_json::from_value(json!({
            "remote_ip": "203.0.113.5",
            "node_info": { "id": "peer1", "listen_addr": "tcp://0.0.0.0:26656" }
        }))
        .unwrap();
        assert_eq!(entry.rpc_address(), None);

        let entry: PeerEntry = serde_json::from_value(json!({
            "remote_ip": "203.0.113.5",
            "node_info": {
                "id": "peer1",
                "listen_addr": "tcp://0.0.0.0:26656",
                "other": { "rpc_address": "" }
            }
        }))
        .unwrap();
        assert_eq!(entry.rpc_address(), None);
    }
}
