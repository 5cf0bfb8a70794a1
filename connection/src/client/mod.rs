//! HTTP client for a node's RPC server.
//!
//! Every operation is bounded by a timeout from the [`ClientConfiguration`]. A
//! timeout surfaces as [`ClientError::Timeout`], just another network failure.

mod configuration;
mod error;

pub use configuration::{ClientConfiguration, DEFAULT_PROBE_TIMEOUT, DEFAULT_QUERY_TIMEOUT};
pub use error::{ClientError, ErrorKind};

use crate::endpoint::Endpoint;
use crate::rpc::{NetInfo, NodeStatus};
use log::debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Client for node RPC queries.
///
/// Cheap to clone, clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    configuration: ClientConfiguration,
}

fn check_status(status: StatusCode) -> Result<(), ClientError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(ClientError::Status(status))
    }
}

async fn bounded<T, F>(limit: Duration, request: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout),
    }
}

impl RpcClient {
    /// Create a new client.
    ///
    /// # Returns
    ///
    /// * `Ok(RpcClient)` - The client.
    /// * `Err(ClientError)` - If the underlying HTTP client could not be initialized.
    pub fn new(configuration: ClientConfiguration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(configuration.user_agent.as_str())
            .build()?;

        Ok(RpcClient {
            http,
            configuration,
        })
    }

    pub fn configuration(&self) -> &ClientConfiguration {
        &self.configuration
    }

    /// Query `GET {endpoint}/status`.
    pub async fn status(&self, endpoint: &Endpoint) -> Result<NodeStatus, ClientError> {
        self.query(endpoint, "status").await
    }

    /// Query `GET {endpoint}/net_info`.
    pub async fn net_info(&self, endpoint: &Endpoint) -> Result<NetInfo, ClientError> {
        self.query(endpoint, "net_info").await
    }

    /// Check whether an endpoint answers `GET {endpoint}` with `200 OK`.
    ///
    /// The body is not read.
    pub async fn probe(&self, endpoint: &Endpoint) -> Result<(), ClientError> {
        bounded(self.configuration.probe_timeout, async {
            let response = self.http.get(endpoint.as_str()).send().await?;
            check_status(response.status())
        })
        .await
    }

    async fn query<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        path: &str,
    ) -> Result<T, ClientError> {
        let url = endpoint.join(path);
        debug!("GET {url}");

        bounded(self.configuration.query_timeout, async {
            let response = self.http.get(&url).send().await?;
            check_status(response.status())?;
            let body = response.bytes().await?;
            Ok::<T, ClientError>(serde_json::from_slice::<T>(&body)?)
        })
        .await
    }
}
