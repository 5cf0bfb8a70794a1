//! Internal node client abstraction for testing and mocking.
//!
//! This module provides the [`NodeClient`] trait that abstracts the three node
//! queries the crawl needs, so the orchestration logic can be driven against a
//! synthetic network in tests.

use std::future::Future;
use tendermint_peers_connection::{ClientError, Endpoint, NetInfo, NodeStatus, RpcClient};

/// Internal trait for querying nodes.
///
/// Clones are handed to probe tasks, so implementations should be cheap to clone
/// and share their underlying resources.
pub trait NodeClient: Clone + Send + Sync + 'static {
    /// Read the node's status.
    fn status(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<NodeStatus, ClientError>> + Send;

    /// Read the node's peer list.
    fn net_info(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<NetInfo, ClientError>> + Send;

    /// Check that the endpoint answers at all.
    fn probe(&self, endpoint: &Endpoint) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Implementation of NodeClient for the HTTP client from tendermint-peers-connection.
impl NodeClient for RpcClient {
    fn status(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<NodeStatus, ClientError>> + Send {
        RpcClient::status(self, endpoint)
    }

    fn net_info(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<NetInfo, ClientError>> + Send {
        RpcClient::net_info(self, endpoint)
    }

    fn probe(&self, endpoint: &Endpoint) -> impl Future<Output = Result<(), ClientError>> + Send {
        RpcClient::probe(self, endpoint)
    }
}

#[cfg(test)]
pub mod test_utils {
    //! Test utilities for driving a crawl against a synthetic network.

    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// A node in the synthetic network.
    #[derive(Debug, Clone)]
    pub struct MockNode {
        /// Network reported by `status`.
        pub network: String,
        /// Raw `net_info` peer entries.
        pub peers: Vec<Value>,
        /// Whether probes and queries succeed.
        pub reachable: bool,
        /// Return garbage from `net_info` instead of the peer list.
        pub malformed_net_info: bool,
        /// Time out `status` while still answering probes.
        pub failing_status: bool,
    }

    #[derive(Debug, Default)]
    struct MockNetwork {
        nodes: HashMap<Endpoint, MockNode>,
        probes: HashMap<Endpoint, usize>,
        status_queries: HashMap<Endpoint, usize>,
        net_info_queries: HashMap<Endpoint, usize>,
        probe_delay: Option<Duration>,
        probes_in_flight: usize,
        peak_probes_in_flight: usize,
    }

    /// Mock client answering from a synthetic network graph.
    ///
    /// Endpoints that were never added behave like firewalled hosts and time out.
    #[derive(Debug, Clone, Default)]
    pub struct MockNodeClient {
        network: Arc<Mutex<MockNetwork>>,
    }

    /// Build a raw `net_info` peer entry.
    pub fn peer_entry(
        id: &str,
        remote_ip: &str,
        listen_addr: &str,
        rpc_address: Option<&str>,
    ) -> Value {
        let mut entry = json!({
            "remote_ip": remote_ip,
            "node_info": {
                "id": id,
                "listen_addr": listen_addr,
                "other": { "tx_index": "on" }
            }
        });
        if let Some(rpc_address) = rpc_address {
            entry["node_info"]["other"]["rpc_address"] = json!(rpc_address);
        }
        entry
    }

    /// Endpoint for a public test address, `http://<ip>:26657`.
    pub fn endpoint(ip: &str) -> Endpoint {
        Endpoint::from_socket(ip.parse().unwrap(), 26657)
    }

    impl MockNodeClient {
        /// Create an empty network.
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a reachable node.
        pub fn add_node(&self, endpoint: &Endpoint, network: &str, peers: Vec<Value>) {
            self.insert(
                endpoint,
                MockNode {
                    network: network.to_string(),
                    peers,
                    reachable: true,
                    malformed_net_info: false,
                    failing_status: false,
                },
            );
        }

        /// Make every probe take this long before answering.
        pub fn set_probe_delay(&self, delay: Duration) {
            self.network.lock().unwrap().probe_delay = Some(delay);
        }

        /// Highest number of probes that were in flight at the same time.
        pub fn peak_probes_in_flight(&self) -> usize {
            self.network.lock().unwrap().peak_probes_in_flight
        }

        /// Add or replace a node with full control over its behaviour.
        pub fn insert(&self, endpoint: &Endpoint, node: MockNode) {
            self.network
                .lock()
                .unwrap()
                .nodes
                .insert(endpoint.clone(), node);
        }

        /// Number of probes sent to an endpoint.
        pub fn probe_count(&self, endpoint: &Endpoint) -> usize {
            let network = self.network.lock().unwrap();
            network.probes.get(endpoint).copied().unwrap_or(0)
        }

        /// Number of status queries sent to an endpoint.
        pub fn status_count(&self, endpoint: &Endpoint) -> usize {
            let network = self.network.lock().unwrap();
            network.status_queries.get(endpoint).copied().unwrap_or(0)
        }

        /// Number of peer list queries sent to an endpoint.
        pub fn net_info_count(&self, endpoint: &Endpoint) -> usize {
            let network = self.network.lock().unwrap();
            network.net_info_queries.get(endpoint).copied().unwrap_or(0)
        }

        fn reachable_node(&self, endpoint: &Endpoint) -> Result<MockNode, ClientError> {
            let network = self.network.lock().unwrap();
            match network.nodes.get(endpoint) {
                Some(node) if node.reachable => Ok(node.clone()),
                _ => Err(ClientError::Timeout),
            }
        }
    }

    impl NodeClient for MockNodeClient {
        async fn status(&self, endpoint: &Endpoint) -> Result<NodeStatus, ClientError> {
            *self
                .network
                .lock()
                .unwrap()
                .status_queries
                .entry(endpoint.clone())
                .or_default() += 1;

            let node = self.reachable_node(endpoint)?;
            if node.failing_status {
                return Err(ClientError::Timeout);
            }
            Ok(serde_json::from_value(json!({
                "result": { "node_info": { "network": node.network } }
            }))?)
        }

        async fn net_info(&self, endpoint: &Endpoint) -> Result<NetInfo, ClientError> {
            *self
                .network
                .lock()
                .unwrap()
                .net_info_queries
                .entry(endpoint.clone())
                .or_default() += 1;

            let node = self.reachable_node(endpoint)?;
            if node.malformed_net_info {
                return Ok(serde_json::from_value(json!({ "result": "garbage" }))?);
            }
            Ok(serde_json::from_value(json!({
                "result": { "n_peers": node.peers.len().to_string(), "peers": node.peers }
            }))?)
        }

        async fn probe(&self, endpoint: &Endpoint) -> Result<(), ClientError> {
            let delay = {
                let mut network = self.network.lock().unwrap();
                *network.probes.entry(endpoint.clone()).or_default() += 1;
                network.probes_in_flight += 1;
                network.peak_probes_in_flight =
                    network.peak_probes_in_flight.max(network.probes_in_flight);
                network.probe_delay
            };

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.network.lock().unwrap().probes_in_flight -= 1;

            self.reachable_node(endpoint).map(|_| ())
        }
    }
}
