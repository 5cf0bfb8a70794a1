//! Tendermint network crawler.
//!
//! Discovers the public p2p peers and reachable RPC endpoints of a Tendermint
//! based chain, starting from a single seed RPC endpoint. Each reachable node's
//! peer list is read, public peers are recorded and every RPC endpoint those peers
//! advertise is probed and, if it answers on the same chain, expanded in turn.
//!
//! # Examples
//!
//! ```no_run
//! use tendermint_peers_crawler::{CrawlerBuilder, CrawlerMessage, Endpoint};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let crawler = CrawlerBuilder::new()
//!     .with_max_concurrent_probes(16)
//!     .build()?;
//! let seed = Endpoint::parse("https://rpc.cosmos.network")?;
//!
//! let mut crawl_rx = crawler.crawl(seed).await?;
//! while let Some(message) = crawl_rx.recv().await {
//!     match message {
//!         CrawlerMessage::Complete(report) => {
//!             println!("{} peers from {} rpcs", report.nodes.len(), report.confirmed.len());
//!             break;
//!         }
//!         other => println!("{other}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod connection;
mod crawler;
mod peers;
mod session;
mod sink;
mod state;

pub use builder::{CrawlerBuilder, CrawlerBuilderError};
pub use crawler::{ChainId, Crawler, CrawlerError, CrawlerMessage};
pub use peers::PeerDescriptor;
pub use sink::{
    endpoints_message, peer_messages, LogSink, ResultSink, SinkError, WebhookSink,
    PEER_BATCH_SIZE,
};
pub use state::CrawlReport;

// Re-exports.
pub use tendermint_peers_connection::{
    ClientConfiguration, ClientError, Endpoint, EndpointError, ErrorKind, UserAgent,
    UserAgentError,
};
