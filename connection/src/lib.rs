//! Tendermint node RPC client.
//!
//! Talks to a single node's HTTP RPC server: reads its status and peer list,
//! and probes whether an advertised API endpoint answers at all. Also home to the
//! address helpers the crawler uses to decide which advertised addresses are
//! worth following.
//!
//! # Examples
//!
//! ```no_run
//! use tendermint_peers_connection::{ClientConfiguration, Endpoint, RpcClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RpcClient::new(ClientConfiguration::default())?;
//! let seed = Endpoint::parse("https://rpc.cosmos.network")?;
//!
//! let status = client.status(&seed).await?;
//! println!("Node is on network {}", status.network());
//!
//! let net_info = client.net_info(&seed).await?;
//! println!("Node reports {} peers", net_info.peers().len());
//! # Ok(())
//! # }
//! ```

pub mod address;
mod client;
mod endpoint;
mod rpc;
pub mod user_agent;

pub use address::{AddressError, ListenAddress};
pub use client::{
    ClientConfiguration, ClientError, ErrorKind, RpcClient, DEFAULT_PROBE_TIMEOUT,
    DEFAULT_QUERY_TIMEOUT,
};
pub use endpoint::{Endpoint, EndpointError};
pub use rpc::{NetInfo, NodeStatus, PeerEntry, PeerNodeInfo, PeerOther};
pub use user_agent::{UserAgent, UserAgentError};
