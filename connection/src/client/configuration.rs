//! Client configuration types and constants.

use crate::user_agent::UserAgent;
use std::fmt;
use std::time::Duration;

/// Default timeout for `status` and `net_info` queries.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(20);

/// Default timeout for reachability probes.
///
/// Probes fan out over many candidate endpoints at once, most of which are
/// firewalled, so they fail fast.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration used to build an [`RpcClient`](super::RpcClient).
#[derive(Debug, Clone)]
pub struct ClientConfiguration {
    /// User agent sent with every request.
    pub user_agent: UserAgent,
    /// Timeout for `status` and `net_info` queries, covering connect and body read.
    pub query_timeout: Duration,
    /// Timeout for reachability probes.
    pub probe_timeout: Duration,
}

impl Default for ClientConfiguration {
    fn default() -> Self {
        Self {
            user_agent: UserAgent::default(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl ClientConfiguration {
    /// Set the user agent sent with every request.
    pub fn with_user_agent(mut self, user_agent: UserAgent) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Set the timeout for `status` and `net_info` queries.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use tendermint_peers_connection::ClientConfiguration;
    ///
    /// let config = ClientConfiguration::default()
    ///     .with_query_timeout(Duration::from_secs(30))
    ///     .with_probe_timeout(Duration::from_secs(2));
    /// assert_eq!(config.query_timeout, Duration::from_secs(30));
    /// ```
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Set the timeout for reachability probes.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

impl fmt::Display for ClientConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClientConfiguration {{ user_agent: \"{}\", query_timeout: {:?}, \
             probe_timeout: {:?} }}",
            self.user_agent, self.query_timeout, self.probe_timeout
        )
    }
}
