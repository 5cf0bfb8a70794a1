//! Normalized node API endpoints.

use reqwest::Url;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Errors that can occur while normalizing an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// The input could not be parsed as a URL.
    InvalidUrl(String),
    /// Only `http` and `https` endpoints can be queried.
    UnsupportedScheme(String),
    /// The URL has no host component.
    MissingHost,
    /// Query strings and fragments cannot be part of a base URL.
    UnexpectedQuery(String),
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::InvalidUrl(err) => write!(f, "Invalid endpoint URL: {err}"),
            EndpointError::UnsupportedScheme(scheme) => {
                write!(f, "Unsupported endpoint scheme '{scheme}', expected http or https")
            }
            EndpointError::MissingHost => write!(f, "Endpoint URL has no host"),
            EndpointError::UnexpectedQuery(input) => {
                write!(f, "Endpoint URL '{input}' has a query or fragment")
            }
        }
    }
}

impl std::error::Error for EndpointError {}

/// Base URL of a node's RPC server.
///
/// Always normalized to `scheme://host:port[/prefix]` with an explicit port and
/// no trailing slash, so two spellings of the same server compare equal.
/// `http://1.2.3.4` and `http://1.2.3.4:80/` are the same endpoint. A path prefix,
/// as used by gateways serving several chains from one host, is kept and query
/// paths are appended after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    /// Parse and normalize an endpoint URL.
    ///
    /// A path on the input is kept as a prefix for query paths.
    ///
    /// # Arguments
    ///
    /// * `input` - The endpoint URL, e.g. `https://rpc.example.com:443`.
    ///
    /// # Returns
    ///
    /// * `Ok(Endpoint)` - The normalized endpoint.
    /// * `Err(EndpointError)` - If the input is not an http(s) URL with a host, or
    ///   carries a query or fragment.
    pub fn parse(input: &str) -> Result<Self, EndpointError> {
        let url =
            Url::parse(input.trim()).map_err(|e| EndpointError::InvalidUrl(e.to_string()))?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(EndpointError::UnsupportedScheme(scheme.to_string()));
        }

        let host = url.host_str().ok_or(EndpointError::MissingHost)?;
        if host.is_empty() {
            return Err(EndpointError::MissingHost);
        }
        // Both supported schemes have a known default.
        let port = url.port_or_known_default().ok_or(EndpointError::MissingHost)?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(EndpointError::UnexpectedQuery(input.trim().to_string()));
        }
        let prefix = url.path().trim_end_matches('/');

        Ok(Endpoint {
            base: format!("{scheme}://{host}:{port}{prefix}"),
        })
    }

    /// Plain http endpoint for an IP and port, the shape advertised peers get.
    pub fn from_socket(ip: IpAddr, port: u16) -> Self {
        Endpoint {
            base: format!("http://{}", SocketAddr::new(ip, port)),
        }
    }

    /// The normalized base URL.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Full URL for a query path on this endpoint.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

impl std::str::FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::parse(s)
    }
}
