use crate::builder::CrawlerBuilderError;
use crate::connection::NodeClient;
use crate::session::{CrawlSession, SessionConfig};
use crate::state::CrawlReport;
use log::{debug, info};
use std::fmt;
use tendermint_peers_connection::{ClientConfiguration, ClientError, Endpoint, RpcClient};
use tokio::sync::mpsc::{self, Receiver};

/// Identifier of the chain being crawled, e.g. `cosmoshub-4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(chain_id: impl Into<String>) -> Self {
        ChainId(chain_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can stop a crawl from starting or finishing.
#[derive(Debug)]
pub enum CrawlerError {
    /// The seed could not be asked for the chain identifier.
    ChainResolution {
        seed: Endpoint,
        source: ClientError,
    },
    /// The crawl ended without delivering its report.
    Incomplete,
}

impl fmt::Display for CrawlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlerError::ChainResolution { seed, source } => {
                write!(f, "Failed to resolve chain id from seed {seed}: {source}")
            }
            CrawlerError::Incomplete => write!(f, "Crawl ended without a report"),
        }
    }
}

impl std::error::Error for CrawlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrawlerError::ChainResolution { source, .. } => Some(source),
            CrawlerError::Incomplete => None,
        }
    }
}

/// Messages sent from the [`Crawler`] to the caller about discovery progress.
#[derive(Debug, Clone)]
pub enum CrawlerMessage {
    /// An RPC endpoint answered and will be expanded.
    Confirmed(Endpoint),
    /// A candidate RPC endpoint did not answer its probe.
    Unreachable(Endpoint),
    /// An endpoint reported another network and was blacklisted.
    WrongChain { endpoint: Endpoint, network: String },
    /// A confirmed endpoint whose chain could not be checked was dropped again.
    Dropped(Endpoint),
    /// The crawl finished. Always the last message.
    Complete(CrawlReport),
}

impl fmt::Display for CrawlerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlerMessage::Confirmed(endpoint) => write!(f, "Confirmed RPC: {endpoint}"),
            CrawlerMessage::Unreachable(endpoint) => write!(f, "Unreachable RPC: {endpoint}"),
            CrawlerMessage::WrongChain { endpoint, network } => {
                write!(f, "Wrong chain RPC: {endpoint} (network: {network})")
            }
            CrawlerMessage::Dropped(endpoint) => write!(f, "Dropped unverified RPC: {endpoint}"),
            CrawlerMessage::Complete(report) => write!(
                f,
                "Crawl complete: {} peers, {} rpcs, {} blacklisted",
                report.nodes.len(),
                report.confirmed.len(),
                report.blacklist.len()
            ),
        }
    }
}

/// A crawler for the p2p network of a Tendermint based chain.
///
/// Starting from a seed RPC endpoint, the crawler reads each node's peer list,
/// records the public peers and follows every advertised RPC endpoint that
/// answers, until no new endpoints turn up.
#[derive(Debug, Clone)]
pub struct Crawler {
    /// Client for node queries.
    client: RpcClient,
    /// Chain identifier, resolved from the seed if not configured.
    chain_id: Option<ChainId>,
    /// Maximum number of probes in flight at once.
    max_concurrent_probes: usize,
    /// Maximum hops from the seed before nodes stop being expanded.
    max_depth: usize,
    /// Maximum number of nodes expanded per crawl.
    max_nodes: usize,
}

impl Crawler {
    pub(crate) fn new(
        client_configuration: ClientConfiguration,
        chain_id: Option<ChainId>,
        max_concurrent_probes: usize,
        max_depth: usize,
        max_nodes: usize,
    ) -> Result<Self, CrawlerBuilderError> {
        let client =
            RpcClient::new(client_configuration).map_err(CrawlerBuilderError::HttpClient)?;

        Ok(Crawler {
            client,
            chain_id,
            max_concurrent_probes,
            max_depth,
            max_nodes,
        })
    }

    /// Ask a node which chain it is on.
    ///
    /// # Returns
    ///
    /// * `Ok(ChainId)` - The network the node reports.
    /// * `Err(CrawlerError)` - If the node could not be queried.
    pub async fn resolve_chain_id(&self, seed: &Endpoint) -> Result<ChainId, CrawlerError> {
        resolve_chain_id(&self.client, seed).await
    }

    /// Crawl the network starting from a seed RPC endpoint.
    ///
    /// The chain identifier is resolved from the seed first, unless one was
    /// configured on the builder. Every node accepted into the results must report
    /// that same identifier.
    ///
    /// The returned channel receives progress messages as endpoints are checked,
    /// and a final [`CrawlerMessage::Complete`] with the settled report.
    ///
    /// # Termination
    ///
    /// * **Natural completion** - No confirmed endpoint is left to expand.
    /// * **Node limit** - The configured maximum number of nodes was expanded.
    /// * **Early termination** - The returned receiver is dropped.
    ///
    /// # Returns
    ///
    /// * `Ok(Receiver<CrawlerMessage>)` - A channel that will receive crawl messages.
    /// * `Err(CrawlerError)` - If the chain identifier could not be resolved.
    pub async fn crawl(&self, seed: Endpoint) -> Result<Receiver<CrawlerMessage>, CrawlerError> {
        self.crawl_with(self.client.clone(), seed).await
    }

    /// Crawl the network and wait for the final report.
    pub async fn run(&self, seed: Endpoint) -> Result<CrawlReport, CrawlerError> {
        self.run_with(self.client.clone(), seed).await
    }

    pub(crate) async fn crawl_with<C: NodeClient>(
        &self,
        client: C,
        seed: Endpoint,
    ) -> Result<Receiver<CrawlerMessage>, CrawlerError> {
        let chain_id = match &self.chain_id {
            Some(chain_id) => chain_id.clone(),
            None => resolve_chain_id(&client, &seed).await?,
        };
        info!("Crawling network {chain_id} from {seed}");

        let (crawl_tx, crawl_rx) = mpsc::channel(1000);
        let done_tx = crawl_tx.clone();

        let session = CrawlSession::new(
            SessionConfig {
                chain_id,
                max_concurrent_probes: self.max_concurrent_probes,
                max_depth: self.max_depth,
                max_nodes: self.max_nodes,
            },
            client,
            crawl_tx,
        );

        tokio::spawn(async move {
            let report = session.coordinate(seed).await;
            if done_tx.send(CrawlerMessage::Complete(report)).await.is_err() {
                debug!("Receiver dropped before the crawl report was delivered");
            }
        });

        Ok(crawl_rx)
    }

    pub(crate) async fn run_with<C: NodeClient>(
        &self,
        client: C,
        seed: Endpoint,
    ) -> Result<CrawlReport, CrawlerError> {
        let mut crawl_rx = self.crawl_with(client, seed).await?;
        while let Some(message) = crawl_rx.recv().await {
            match message {
                CrawlerMessage::Complete(report) => return Ok(report),
                other => debug!("{other}"),
            }
        }
        Err(CrawlerError::Incomplete)
    }
}

async fn resolve_chain_id<C: NodeClient>(
    client: &C,
    seed: &Endpoint,
) -> Result<ChainId, CrawlerError> {
    let status = client
        .status(seed)
        .await
        .map_err(|source| CrawlerError::ChainResolution {
            seed: seed.clone(),
            source,
        })?;
    Ok(ChainId::new(status.network()))
}
