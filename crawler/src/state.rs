//! Crawl bookkeeping.
//!
//! Every endpoint the crawl learns about moves through the same lifecycle:
//!
//! ```text
//! unseen -> frontier -> in-flight probe -> scanned -> confirmed
//!                                                  \-> blacklisted (wrong chain)
//! confirmed -> scanned only (chain check failed)
//! ```
//!
//! [`CrawlState`] owns the sets for each stage and only exposes transitions that
//! keep them consistent. Confirmed and blacklisted endpoints are always scanned,
//! and never both at once. A confirmed endpoint whose chain cannot be checked is
//! dropped back to plain scanned.

use crate::crawler::ChainId;
use crate::peers::PeerDescriptor;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::net::IpAddr;
use tendermint_peers_connection::Endpoint;

/// Result of probing a single candidate endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Reachable,
    Unreachable,
}

/// Mutable state of a single crawl.
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Candidates discovered but not yet probed.
    frontier: Vec<Endpoint>,
    /// Membership index for `frontier`.
    queued: HashSet<Endpoint>,
    /// Every endpoint ever probed or expanded, successful or not.
    scanned: HashSet<Endpoint>,
    /// Endpoints that answered, in confirmation order.
    confirmed: Vec<Endpoint>,
    /// Membership index for `confirmed`.
    confirmed_index: HashSet<Endpoint>,
    /// Endpoints found on another chain.
    blacklist: BTreeSet<Endpoint>,
    /// Public p2p peers, first sighting per remote IP wins.
    nodes: BTreeMap<IpAddr, PeerDescriptor>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the endpoint has been seen in any stage of the lifecycle.
    pub fn is_known(&self, endpoint: &Endpoint) -> bool {
        self.scanned.contains(endpoint)
            || self.blacklist.contains(endpoint)
            || self.queued.contains(endpoint)
            || self.is_confirmed(endpoint)
    }

    pub fn is_confirmed(&self, endpoint: &Endpoint) -> bool {
        self.confirmed_index.contains(endpoint)
    }

    pub fn is_blacklisted(&self, endpoint: &Endpoint) -> bool {
        self.blacklist.contains(endpoint)
    }

    /// Record an endpoint as scanned without probing it, e.g. the seed.
    pub fn mark_scanned(&mut self, endpoint: &Endpoint) {
        self.scanned.insert(endpoint.clone());
    }

    /// Confirm an endpoint that answered.
    ///
    /// # Returns
    ///
    /// `true` if the endpoint is newly confirmed, `false` if it was already
    /// confirmed or is blacklisted.
    pub fn confirm(&mut self, endpoint: &Endpoint) -> bool {
        if self.is_blacklisted(endpoint) || self.is_confirmed(endpoint) {
            return false;
        }
        self.scanned.insert(endpoint.clone());
        self.confirmed_index.insert(endpoint.clone());
        self.confirmed.push(endpoint.clone());
        true
    }

    /// Drop an endpoint whose chain could not be checked. It stays scanned, so it
    /// is never probed again.
    ///
    /// # Returns
    ///
    /// `true` if the endpoint was confirmed before.
    pub fn fail(&mut self, endpoint: &Endpoint) -> bool {
        self.scanned.insert(endpoint.clone());
        self.unconfirm(endpoint)
    }

    fn unconfirm(&mut self, endpoint: &Endpoint) -> bool {
        if !self.confirmed_index.remove(endpoint) {
            return false;
        }
        self.confirmed.retain(|e| e != endpoint);
        true
    }

    /// Move an endpoint found on another chain to the blacklist, pulling it out of
    /// the confirmed set and the frontier.
    pub fn blacklist(&mut self, endpoint: &Endpoint) {
        self.unconfirm(endpoint);
        if self.queued.remove(endpoint) {
            self.frontier.retain(|e| e != endpoint);
        }
        self.scanned.insert(endpoint.clone());
        self.blacklist.insert(endpoint.clone());
    }

    /// Record a public peer unless its remote IP was already seen.
    ///
    /// # Returns
    ///
    /// `true` if the peer was recorded.
    pub fn record_peer(&mut self, remote_ip: IpAddr, peer: PeerDescriptor) -> bool {
        if self.nodes.contains_key(&remote_ip) {
            return false;
        }
        self.nodes.insert(remote_ip, peer);
        true
    }

    /// Queue a candidate endpoint for the next probe batch.
    ///
    /// # Returns
    ///
    /// `true` if the endpoint was queued, `false` if it is already known.
    pub fn queue(&mut self, endpoint: Endpoint) -> bool {
        if self.is_known(&endpoint) {
            return false;
        }
        self.queued.insert(endpoint.clone());
        self.frontier.push(endpoint);
        true
    }

    /// Take every queued candidate for probing, leaving the frontier empty.
    pub fn take_frontier(&mut self) -> Vec<Endpoint> {
        self.queued.clear();
        std::mem::take(&mut self.frontier)
    }

    /// Merge the outcome of a probe batch.
    ///
    /// All probed endpoints become scanned, reachable ones become confirmed. The
    /// whole batch is merged before the caller expands any of them, so an endpoint
    /// discovered twice in one batch is still probed once.
    ///
    /// # Returns
    ///
    /// Newly confirmed endpoints, in batch order.
    pub fn complete_probe_batch(&mut self, outcomes: &[(Endpoint, ProbeResult)]) -> Vec<Endpoint> {
        for (endpoint, _) in outcomes {
            self.scanned.insert(endpoint.clone());
        }

        outcomes
            .iter()
            .filter(|(_, result)| *result == ProbeResult::Reachable)
            .filter_map(|(endpoint, _)| self.confirm(endpoint).then(|| endpoint.clone()))
            .collect()
    }

    pub fn confirmed(&self) -> &[Endpoint] {
        &self.confirmed
    }

    pub fn scanned_count(&self) -> usize {
        self.scanned.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Settle the crawl into its final report.
    pub fn into_report(self, chain_id: ChainId) -> CrawlReport {
        CrawlReport {
            chain_id,
            confirmed: self.confirmed,
            nodes: self.nodes,
            blacklist: self.blacklist.into_iter().collect(),
            scanned: self.scanned.len(),
        }
    }
}

/// Final result of a crawl, handed to a [`ResultSink`](crate::ResultSink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Network the crawl validated nodes against.
    pub chain_id: ChainId,
    /// Reachable RPC endpoints on the network, in discovery order.
    pub confirmed: Vec<Endpoint>,
    /// Public p2p peers keyed by the remote IP they were first seen from.
    pub nodes: BTreeMap<IpAddr, PeerDescriptor>,
    /// Endpoints found on another network.
    pub blacklist: Vec<Endpoint>,
    /// Number of distinct endpoints probed or expanded.
    pub scanned: usize,
}

impl CrawlReport {
    /// `id@host:port` strings for every recorded peer.
    pub fn connection_strings(&self) -> Vec<String> {
        self.nodes
            .values()
            .map(PeerDescriptor::connection_string)
            .collect()
    }
}
