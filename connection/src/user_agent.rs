//! HTTP user agent validation.
//!
//! Requests to node RPC servers identify the client with a `product/version`
//! token, e.g. `tendermint-peers/0.1.0`.

use std::fmt;

/// Errors that can occur during user agent validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgentError {
    /// The user agent format is invalid (must be `product/version`).
    InvalidFormat,
    /// The product component is missing or empty.
    MissingProduct,
    /// The version component is missing or empty.
    MissingVersion,
    /// The user agent contains whitespace, control or non-ASCII characters.
    InvalidCharacter,
}

impl fmt::Display for UserAgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserAgentError::InvalidFormat => {
                write!(f, "User agent must follow format 'product/version'")
            }
            UserAgentError::MissingProduct => {
                write!(f, "User agent product component cannot be empty")
            }
            UserAgentError::MissingVersion => {
                write!(f, "User agent version component cannot be empty")
            }
            UserAgentError::InvalidCharacter => {
                write!(f, "User agent may only contain visible ASCII characters")
            }
        }
    }
}

impl std::error::Error for UserAgentError {}

/// Validates a `product/version` user agent token.
///
/// # Example
///
/// ```
/// use tendermint_peers_connection::user_agent::validate_product_format;
///
/// assert!(validate_product_format("tendermint-peers/0.1.0").is_ok());
///
/// assert!(validate_product_format("tendermint-peers").is_err());
/// assert!(validate_product_format("/0.1.0").is_err());
/// assert!(validate_product_format("tendermint peers/0.1.0").is_err());
/// ```
pub fn validate_product_format(user_agent: &str) -> Result<(), UserAgentError> {
    if !user_agent.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(UserAgentError::InvalidCharacter);
    }

    let (product, version) = user_agent
        .split_once('/')
        .ok_or(UserAgentError::InvalidFormat)?;

    if version.contains('/') {
        return Err(UserAgentError::InvalidFormat);
    }

    if product.is_empty() {
        return Err(UserAgentError::MissingProduct);
    }

    if version.is_empty() {
        return Err(UserAgentError::MissingVersion);
    }

    Ok(())
}

/// A validated user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgent(String);

impl UserAgent {
    /// Create a user agent, validating the `product/version` format.
    pub fn new(user_agent: String) -> Result<Self, UserAgentError> {
        validate_product_format(&user_agent)?;
        Ok(UserAgent(user_agent))
    }

    /// Build a user agent from its components.
    pub fn from_product_version(product: &str, version: &str) -> Self {
        UserAgent(format!("{product}/{version}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserAgent {
    /// `tendermint-peers/<crate version>`.
    fn default() -> Self {
        UserAgent::from_product_version("tendermint-peers", env!("CARGO_PKG_VERSION"))
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
