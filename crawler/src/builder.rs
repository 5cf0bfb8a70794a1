//! Builder pattern for configuring and creating crawler instances.

use crate::crawler::{ChainId, Crawler};
use std::fmt;
use std::time::Duration;
use tendermint_peers_connection::{ClientConfiguration, ClientError, UserAgent, UserAgentError};

/// Default maximum number of probes in flight at once.
const DEFAULT_MAX_CONCURRENT_PROBES: usize = 8;
/// Default maximum number of hops from the seed that are still expanded.
const DEFAULT_MAX_DEPTH: usize = 64;
/// Default maximum number of nodes expanded per crawl.
const DEFAULT_MAX_NODES: usize = 10_000;

/// Errors that can occur during crawler configuration.
#[derive(Debug)]
pub enum CrawlerBuilderError {
    /// User agent doesn't follow the required format.
    InvalidUserAgent(UserAgentError),
    /// The HTTP client could not be initialized.
    HttpClient(ClientError),
}

impl fmt::Display for CrawlerBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlerBuilderError::InvalidUserAgent(err) => {
                write!(f, "Invalid user agent: {err}")
            }
            CrawlerBuilderError::HttpClient(err) => {
                write!(f, "Failed to initialize HTTP client: {err}")
            }
        }
    }
}

impl std::error::Error for CrawlerBuilderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrawlerBuilderError::InvalidUserAgent(err) => Some(err),
            CrawlerBuilderError::HttpClient(err) => Some(err),
        }
    }
}

/// Builder for creating a customized [`Crawler`] instance.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), tendermint_peers_crawler::CrawlerBuilderError> {
/// use std::time::Duration;
/// use tendermint_peers_crawler::{ChainId, CrawlerBuilder};
///
/// // Create a basic crawler, the chain is resolved from the seed
/// let basic_crawler = CrawlerBuilder::new().build()?;
///
/// // Create a crawler with custom settings
/// let custom_crawler = CrawlerBuilder::new()
///     .with_user_agent("my-custom-crawler/1.0")?
///     .with_chain_id(ChainId::new("cosmoshub-4"))
///     .with_probe_timeout(Duration::from_secs(3))
///     .with_max_concurrent_probes(16)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CrawlerBuilder {
    /// User agent and timeouts for node queries.
    client_configuration: ClientConfiguration,
    /// Chain to validate nodes against, resolved from the seed when unset.
    chain_id: Option<ChainId>,
    /// Maximum number of probes in flight at once.
    max_concurrent_probes: usize,
    /// Maximum hops from the seed that are still expanded.
    max_depth: usize,
    /// Maximum number of nodes expanded per crawl.
    max_nodes: usize,
}

impl Default for CrawlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlerBuilder {
    /// Create a new crawler builder with default settings.
    ///
    /// # Returns
    ///
    /// A new `CrawlerBuilder` instance.
    pub fn new() -> Self {
        CrawlerBuilder {
            client_configuration: ClientConfiguration::default(),
            chain_id: None,
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    /// Set a custom user agent string for the crawler.
    ///
    /// The user agent is sent with every HTTP request. It must follow the
    /// `product/version` convention.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - The user agent string to use.
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - The builder for method chaining if validation succeeds.
    /// * `Err(CrawlerBuilderError)` - If the user agent format is invalid.
    pub fn with_user_agent<S: Into<String>>(
        mut self,
        user_agent: S,
    ) -> Result<Self, CrawlerBuilderError> {
        let user_agent =
            UserAgent::new(user_agent.into()).map_err(CrawlerBuilderError::InvalidUserAgent)?;
        self.client_configuration = self.client_configuration.with_user_agent(user_agent);
        Ok(self)
    }

    /// Pin the chain the crawl validates nodes against.
    ///
    /// Without this the chain is resolved from the seed before crawling starts.
    /// With it, a seed on another network is blacklisted like any other node.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The expected network identifier.
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Set the timeout for `status` and `net_info` queries.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Maximum time to wait for a query (defaults to 20 seconds).
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.client_configuration = self.client_configuration.with_query_timeout(timeout);
        self
    }

    /// Set the timeout for reachability probes.
    ///
    /// Most candidate endpoints are firewalled, so a short probe timeout speeds up
    /// crawling a lot. Endpoints slower than this are treated as unreachable.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Maximum time to wait for a probe (defaults to 5 seconds).
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.client_configuration = self.client_configuration.with_probe_timeout(timeout);
        self
    }

    /// Set the maximum number of probes in flight at once.
    ///
    /// Controls how many candidate endpoints are checked simultaneously. Higher
    /// values may speed up crawling, but increase resource usage and network load.
    ///
    /// # Recommendations
    ///
    /// * **Conservative (1-4)** - For slow networks or resource-constrained environments.
    /// * **Default (8)** - Good balance for most use cases.
    /// * **Aggressive (16-64)** - For fast crawling with ample resources.
    ///
    /// # Arguments
    ///
    /// * `max_probes` - Maximum concurrent probes (defaults to 8).
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn with_max_concurrent_probes(mut self, max_probes: usize) -> Self {
        self.max_concurrent_probes = max_probes;
        self
    }

    /// Set how many hops from the seed are still expanded.
    ///
    /// The seed is at depth 0. Nodes at the limit are still checked and
    /// confirmed, but their peer lists are not read.
    ///
    /// # Arguments
    ///
    /// * `max_depth` - Maximum depth (defaults to 64).
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum number of nodes expanded per crawl.
    ///
    /// Once reached, the crawl completes with whatever it has accumulated.
    ///
    /// # Arguments
    ///
    /// * `max_nodes` - Maximum number of expanded nodes (defaults to 10,000).
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Build the crawler with the configured options.
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - A configured `Crawler` instance.
    /// * `Err(CrawlerBuilderError)` - If the HTTP client could not be initialized.
    pub fn build(self) -> Result<Crawler, CrawlerBuilderError> {
        Crawler::new(
            self.client_configuration,
            self.chain_id,
            self.max_concurrent_probes,
            self.max_depth,
            self.max_nodes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let builder = CrawlerBuilder::new();
        assert_eq!(builder.max_concurrent_probes, DEFAULT_MAX_CONCURRENT_PROBES);
        assert_eq!(builder.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(builder.max_nodes, DEFAULT_MAX_NODES);
        assert!(builder.chain_id.is_none());
        assert_eq!(
            builder.client_configuration.probe_timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_invalid_user_agent() {
        let result = CrawlerBuilder::new().with_user_agent("no-version");
        assert!(matches!(
            result,
            Err(CrawlerBuilderError::InvalidUserAgent(_))
        ));
    }

    #[test]
    fn test_custom_settings() {
        let builder = CrawlerBuilder::new()
            .with_user_agent("scanner/2.1")
            .unwrap()
            .with_query_timeout(Duration::from_secs(7))
            .with_probe_timeout(Duration::from_millis(500))
            .with_max_concurrent_probes(32);

        assert_eq!(
            builder.client_configuration.user_agent.as_str(),
            "scanner/2.1"
        );
        assert_eq!(
            builder.client_configuration.query_timeout,
            Duration::from_secs(7)
        );
        assert_eq!(
            builder.client_configuration.probe_timeout,
            Duration::from_millis(500)
        );
        assert_eq!(builder.max_concurrent_probes, 32);
        assert!(builder.build().is_ok());
    }
}
