//! Example of using the tendermint-peers crawler.
//!
//! Settings can come from flags, the environment or a `.env` file in the working
//! directory.

use clap::Parser;
use log::LevelFilter;
use std::time::Duration;
use tendermint_peers_crawler::{
    CrawlerBuilder, CrawlerMessage, Endpoint, LogSink, ResultSink, WebhookSink,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RPC endpoint of the seed node, e.g. https://rpc.cosmos.network.
    #[arg(short, long, env = "BASE_RPC")]
    seed: String,

    /// Webhook to post the results to. Results are logged when unset.
    #[arg(short, long, env = "WEBHOOK")]
    webhook: Option<String>,

    /// Custom user agent (optional).
    #[arg(short, long)]
    user_agent: Option<String>,

    /// Maximum number of concurrent probes.
    #[arg(short, long, default_value = "8")]
    concurrent_probes: usize,

    /// Probe timeout in seconds.
    #[arg(long, default_value = "5")]
    probe_timeout: u64,

    /// Maximum hops from the seed that are still expanded.
    #[arg(long, default_value = "64")]
    max_depth: usize,

    /// Maximum number of nodes expanded.
    #[arg(long, default_value = "10000")]
    max_nodes: usize,

    /// Log level.
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Before parsing, so the file can provide BASE_RPC and WEBHOOK.
    let env_file = dotenvy::dotenv();
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    // Configure fern logger
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {} - {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log_level)
        .chain(std::io::stderr())
        .apply()?;

    match env_file {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No .env file found"),
        Err(e) => return Err(format!("Failed to load .env file: {e}").into()),
    }

    log::info!("CRAWLING THE TENDERMINT NETWORK");

    let seed = Endpoint::parse(&args.seed)
        .map_err(|e| format!("Invalid seed endpoint {}: {e}", args.seed))?;

    let mut builder = CrawlerBuilder::new();
    if let Some(user_agent) = args.user_agent.clone() {
        log::debug!("Using custom user agent: {user_agent}");
        builder = builder.with_user_agent(user_agent)?;
    }

    log::debug!("Using {} concurrent probes", args.concurrent_probes);
    builder = builder
        .with_max_concurrent_probes(args.concurrent_probes)
        .with_probe_timeout(Duration::from_secs(args.probe_timeout))
        .with_max_depth(args.max_depth)
        .with_max_nodes(args.max_nodes);

    let crawler = builder.build()?;

    let mut crawl_rx = crawler
        .crawl(seed)
        .await
        .map_err(|e| format!("Crawler error: {e}"))?;

    let mut report = None;
    while let Some(crawl_msg) = crawl_rx.recv().await {
        log::info!("{crawl_msg}");
        if let CrawlerMessage::Complete(settled) = crawl_msg {
            report = Some(settled);
            break;
        }
    }
    let report = report.ok_or("Crawler stopped without a report")?;

    match args.webhook {
        Some(url) => WebhookSink::new(url)?.deliver(&report).await?,
        None => LogSink.deliver(&report).await?,
    }

    log::info!(
        "Synced all {} nodes from {} rpcs",
        report.nodes.len(),
        report.confirmed.len()
    );

    Ok(())
}
