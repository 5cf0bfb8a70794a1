//! Delivery of settled crawl results.
//!
//! A [`ResultSink`] consumes a finished [`CrawlReport`]. The crawl never calls a
//! sink itself, the caller hands the report over once [`Crawler::run`] returns or
//! [`CrawlerMessage::Complete`] arrives.
//!
//! [`Crawler::run`]: crate::Crawler::run
//! [`CrawlerMessage::Complete`]: crate::CrawlerMessage::Complete

use crate::state::CrawlReport;
use log::{debug, info};
use std::fmt;
use std::future::Future;

/// Maximum number of peer connection strings per webhook message.
pub const PEER_BATCH_SIZE: usize = 30;

/// Errors that can occur while delivering results.
#[derive(Debug)]
pub enum SinkError {
    /// The request could not be sent.
    Http(reqwest::Error),
    /// The receiver rejected the message.
    Status(reqwest::StatusCode),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Http(err) => write!(f, "Webhook request failed: {err}"),
            SinkError::Status(status) => write!(f, "Webhook rejected message: {status}"),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Http(err) => Some(err),
            SinkError::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        SinkError::Http(err)
    }
}

/// Consumer of a finished crawl.
pub trait ResultSink {
    /// Deliver the confirmed endpoints and the peer index of a settled report.
    fn deliver(
        &self,
        report: &CrawlReport,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Message listing every confirmed RPC endpoint, one per line.
pub fn endpoints_message(report: &CrawlReport) -> String {
    let endpoints: Vec<&str> = report.confirmed.iter().map(|e| e.as_str()).collect();
    format!("Discovered RPC endpoints:\n```{}```", endpoints.join("\n"))
}

/// Messages listing every peer connection string, [`PEER_BATCH_SIZE`] per message.
///
/// Batches are numbered from 1. No messages are produced for an empty index.
pub fn peer_messages(report: &CrawlReport) -> Vec<String> {
    report
        .connection_strings()
        .chunks(PEER_BATCH_SIZE)
        .enumerate()
        .map(|(i, batch)| {
            format!(
                "Discovered Peers - **Batch {}**\n```{}```",
                i + 1,
                batch.join(",")
            )
        })
        .collect()
}

/// Posts results to a chat webhook as form encoded `content` messages.
///
/// Peer batches are posted first, the endpoint list last.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    http: reqwest::Client,
    url: String,
}

impl WebhookSink {
    /// Create a sink posting to `url`.
    ///
    /// # Returns
    ///
    /// * `Ok(WebhookSink)` - The sink.
    /// * `Err(SinkError)` - If the HTTP client could not be initialized.
    pub fn new(url: impl Into<String>) -> Result<Self, SinkError> {
        let http = reqwest::Client::builder().build()?;
        Ok(WebhookSink {
            http,
            url: url.into(),
        })
    }

    async fn post(&self, content: &str) -> Result<(), SinkError> {
        let response = self
            .http
            .post(&self.url)
            .form(&[("content", content)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status(status));
        }
        debug!("Webhook accepted message ({status})");
        Ok(())
    }
}

impl ResultSink for WebhookSink {
    async fn deliver(&self, report: &CrawlReport) -> Result<(), SinkError> {
        let messages = peer_messages(report);
        info!("Posting {} peer batches to webhook", messages.len());
        for message in &messages {
            self.post(message).await?;
        }
        self.post(&endpoints_message(report)).await
    }
}

/// Writes results to the log, for runs without a webhook.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ResultSink for LogSink {
    async fn deliver(&self, report: &CrawlReport) -> Result<(), SinkError> {
        for message in peer_messages(report) {
            info!("{message}");
        }
        info!("{}", endpoints_message(report));
        Ok(())
    }
}
