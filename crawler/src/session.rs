//! Internal session coordination for crawling operations.
//!
//! This module contains the [`CrawlSession`] which drives the crawl: it walks the
//! network one node at a time, and for each node fans out a bounded batch of
//! probes over the RPC endpoints that node revealed.
//!
//! # Architecture
//!
//! * **Driver** (`coordinate()`) - Owns the [`CrawlState`] and a stack of confirmed
//!   endpoints still to expand. It is the only code that mutates crawl state.
//! * **Probe tasks** (`probe_batch()`) - Spawned per candidate, limited by a
//!   semaphore. They only return outcomes, which the driver merges as one batch
//!   once every probe in it has finished.

use crate::connection::NodeClient;
use crate::crawler::{ChainId, CrawlerMessage};
use crate::peers::parse_peers;
use crate::state::{CrawlReport, CrawlState, ProbeResult};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tendermint_peers_connection::{ClientError, Endpoint};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Configuration for a crawl session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub chain_id: ChainId,
    pub max_concurrent_probes: usize,
    pub max_depth: usize,
    pub max_nodes: usize,
}

/// What happened when a node was expanded.
#[derive(Debug)]
enum NodeOutcome {
    /// Peer list read, these endpoints were newly confirmed by the probe batch.
    Expanded(Vec<Endpoint>),
    /// On the right chain, but too deep to expand.
    DepthLimited,
    /// Reported another network and was blacklisted.
    WrongChain,
    /// Already blacklisted.
    Blacklisted,
    /// The status query failed, the chain is unknown and the node was dropped.
    Unverified(ClientError),
    /// The peer list query failed after a successful chain check.
    Failed(ClientError),
    /// Caller dropped the message receiver.
    ChannelClosed,
}

/// Outcome of one probe task.
#[derive(Debug)]
enum ProbeOutcome {
    Reachable,
    Unreachable(ClientError),
    /// The task panicked or was cancelled.
    Aborted,
}

/// Internal coordinator for a crawling session.
pub struct CrawlSession<C: NodeClient> {
    /// Session configuration.
    config: SessionConfig,
    /// Client used for every node query.
    client: C,
    /// Channel for sending discovery results back to the caller.
    crawl_tx: mpsc::Sender<CrawlerMessage>,
    /// Crawl bookkeeping, owned by the driver.
    state: CrawlState,
}

impl<C: NodeClient> CrawlSession<C> {
    /// Create a new crawl session.
    pub fn new(config: SessionConfig, client: C, crawl_tx: mpsc::Sender<CrawlerMessage>) -> Self {
        Self {
            config,
            client,
            crawl_tx,
            state: CrawlState::new(),
        }
    }

    /// Send a message to the caller.
    ///
    /// # Returns
    ///
    /// `false` if the receiver was dropped.
    async fn notify(&self, message: CrawlerMessage) -> bool {
        self.crawl_tx.send(message).await.is_ok()
    }

    /// Expand a single node: check its chain, read its peers and probe the new
    /// RPC endpoints they reveal.
    async fn process(&mut self, endpoint: &Endpoint, depth: usize) -> NodeOutcome {
        let status = match self.client.status(endpoint).await {
            Ok(status) => status,
            Err(e) => {
                if self.state.fail(endpoint)
                    && !self
                        .notify(CrawlerMessage::Dropped(endpoint.clone()))
                        .await
                {
                    return NodeOutcome::ChannelClosed;
                }
                return NodeOutcome::Unverified(e);
            }
        };

        if status.network() != self.config.chain_id.as_str() {
            info!(
                "Node {endpoint} is on the wrong network ({})",
                status.network()
            );
            self.state.blacklist(endpoint);
            let message = CrawlerMessage::WrongChain {
                endpoint: endpoint.clone(),
                network: status.network().to_string(),
            };
            if !self.notify(message).await {
                return NodeOutcome::ChannelClosed;
            }
            return NodeOutcome::WrongChain;
        }

        if self.state.is_blacklisted(endpoint) {
            return NodeOutcome::Blacklisted;
        }

        // Only the seed gets here unconfirmed, every other node was confirmed by a probe.
        if self.state.confirm(endpoint)
            && !self
                .notify(CrawlerMessage::Confirmed(endpoint.clone()))
                .await
        {
            return NodeOutcome::ChannelClosed;
        }

        if depth >= self.config.max_depth {
            info!("Not expanding {endpoint}, depth limit {} reached", self.config.max_depth);
            return NodeOutcome::DepthLimited;
        }

        let net_info = match self.client.net_info(endpoint).await {
            Ok(net_info) => net_info,
            Err(e) => return NodeOutcome::Failed(e),
        };

        let parsed = parse_peers(&self.config.chain_id, &net_info, &self.state);
        for skipped in &parsed.skipped {
            debug!(
                "Skipping peer #{} from {endpoint}: {}",
                skipped.index, skipped.reason
            );
        }
        for (remote_ip, peer) in parsed.peers {
            if self.state.record_peer(remote_ip, peer) {
                debug!("Current node list length {}", self.state.node_count());
            }
        }
        for candidate in parsed.candidates {
            if self.state.queue(candidate.clone()) {
                debug!("Adding {candidate} to the checks");
            }
        }

        let batch = self.state.take_frontier();
        if batch.is_empty() {
            return NodeOutcome::Expanded(Vec::new());
        }

        info!("Probing {} endpoints found via {endpoint}", batch.len());
        let outcomes = self.probe_batch(batch).await;

        let mut results = Vec::with_capacity(outcomes.len());
        for (candidate, outcome) in outcomes {
            let result = match outcome {
                ProbeOutcome::Reachable => ProbeResult::Reachable,
                ProbeOutcome::Unreachable(e) => {
                    debug!("Probe of {candidate} failed [{}]: {e}", e.kind());
                    if !self
                        .notify(CrawlerMessage::Unreachable(candidate.clone()))
                        .await
                    {
                        return NodeOutcome::ChannelClosed;
                    }
                    ProbeResult::Unreachable
                }
                ProbeOutcome::Aborted => {
                    warn!("Probe task for {candidate} aborted");
                    ProbeResult::Unreachable
                }
            };
            results.push((candidate, result));
        }

        let confirmed = self.state.complete_probe_batch(&results);
        for endpoint in &confirmed {
            if !self
                .notify(CrawlerMessage::Confirmed(endpoint.clone()))
                .await
            {
                return NodeOutcome::ChannelClosed;
            }
        }

        NodeOutcome::Expanded(confirmed)
    }

    /// Probe every endpoint of a batch concurrently.
    ///
    /// # Returns
    ///
    /// One outcome per endpoint, in batch order.
    async fn probe_batch(&self, batch: Vec<Endpoint>) -> Vec<(Endpoint, ProbeOutcome)> {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_probes.max(1)));
        let mut tasks = JoinSet::new();

        for (index, endpoint) in batch.iter().cloned().enumerate() {
            let client = self.client.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                // The semaphore is never closed, holding the result holds the permit.
                let _permit = permits.acquire_owned().await;
                let outcome = match client.probe(&endpoint).await {
                    Ok(()) => ProbeOutcome::Reachable,
                    Err(e) => ProbeOutcome::Unreachable(e),
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<ProbeOutcome> =
            batch.iter().map(|_| ProbeOutcome::Aborted).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = outcome,
                Err(e) => debug!("Probe task failed to complete: {e}"),
            }
        }

        batch.into_iter().zip(outcomes).collect()
    }

    /// Coordinates the crawl from the seed until no confirmed endpoint is left to expand.
    ///
    /// Confirmed endpoints are expanded depth first, in the order their batch
    /// confirmed them. Every endpoint is expanded at most once.
    ///
    /// # Termination Conditions
    ///
    /// 1. **Natural Completion** - Every confirmed endpoint has been expanded.
    /// 2. **Node Limit** - `max_nodes` nodes have been expanded.
    /// 3. **Channel Closure** - Receiver dropped, indicating caller no longer interested.
    ///
    /// # Returns
    ///
    /// The settled crawl report.
    pub async fn coordinate(mut self, seed: Endpoint) -> CrawlReport {
        self.state.mark_scanned(&seed);
        let mut pending = vec![(seed, 0usize)];
        let mut expanded = 0usize;

        let mut last_log_time = Instant::now();
        let log_interval = Duration::from_secs(60);

        while let Some((endpoint, depth)) = pending.pop() {
            if self.crawl_tx.is_closed() {
                debug!("Receiver disconnected, stopping crawler");
                break;
            }

            if expanded >= self.config.max_nodes {
                warn!(
                    "Node limit of {} reached, {} confirmed endpoints left unexpanded",
                    self.config.max_nodes,
                    pending.len() + 1
                );
                break;
            }
            expanded += 1;

            if last_log_time.elapsed() >= log_interval {
                info!(
                    "{} nodes expanded, {} endpoints scanned, {} confirmed, {} peers",
                    expanded,
                    self.state.scanned_count(),
                    self.state.confirmed().len(),
                    self.state.node_count()
                );
                last_log_time = Instant::now();
            }

            info!("Starting lookup for {endpoint}");
            match self.process(&endpoint, depth).await {
                NodeOutcome::Expanded(confirmed) => {
                    // Reversed so the first confirmed endpoint is expanded next.
                    for next in confirmed.into_iter().rev() {
                        pending.push((next, depth + 1));
                    }
                }
                NodeOutcome::Unverified(e) => {
                    warn!(
                        "Dropping {endpoint}, chain check failed [{}]: {e}",
                        e.kind()
                    );
                }
                NodeOutcome::Failed(e) => {
                    warn!("Peer lookup of {endpoint} failed [{}]: {e}", e.kind());
                }
                NodeOutcome::ChannelClosed => {
                    debug!("Receiver disconnected, stopping crawler");
                    break;
                }
                NodeOutcome::DepthLimited
                | NodeOutcome::WrongChain
                | NodeOutcome::Blacklisted => {}
            }
        }

        info!(
            "Crawler exhausted - {} peers from {} rpcs, {} endpoints scanned",
            self.state.node_count(),
            self.state.confirmed().len(),
            self.state.scanned_count()
        );

        self.state.into_report(self.config.chain_id)
    }
}
