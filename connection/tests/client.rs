//! Integration tests for the RPC client against fake node servers.
//!
//! Each test serves a small axum router on an ephemeral localhost port that
//! mimics the parts of a node's RPC server the client reads.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::time::Duration;
use tendermint_peers_connection::{ClientConfiguration, ClientError, Endpoint, ErrorKind, RpcClient};
use tokio::net::TcpListener;

/// Serve a router in the background and return its endpoint.
async fn serve(router: Router) -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Endpoint::from_socket(addr.ip(), addr.port())
}

fn fake_node() -> Router {
    Router::new()
        .route("/", get(|| async { "Available endpoints: /status /net_info" }))
        .route(
            "/status",
            get(|| async {
                Json(json!({
                    "jsonrpc": "2.0",
                    "id": -1,
                    "result": {
                        "node_info": {
                            "id": "0123abcd",
                            "network": "testchain-1",
                            "moniker": "fake"
                        }
                    }
                }))
            }),
        )
        .route(
            "/net_info",
            get(|| async {
                Json(json!({
                    "jsonrpc": "2.0",
                    "id": -1,
                    "result": {
                        "n_peers": "1",
                        "peers": [{
                            "remote_ip": "203.0.113.5",
                            "node_info": {
                                "id": "peer1",
                                "listen_addr": "tcp://0.0.0.0:26656",
                                "other": { "rpc_address": "tcp://0.0.0.0:26657" }
                            }
                        }]
                    }
                }))
            }),
        )
}

fn client() -> RpcClient {
    RpcClient::new(
        ClientConfiguration::default()
            .with_query_timeout(Duration::from_secs(5))
            .with_probe_timeout(Duration::from_millis(200)),
    )
    .expect("Failed to build client")
}

#[tokio::test]
async fn test_status() {
    let endpoint = serve(fake_node()).await;

    let status = client().status(&endpoint).await.expect("Status failed");
    assert_eq!(status.network(), "testchain-1");
    assert_eq!(status.node_id(), Some("0123abcd"));
}

#[tokio::test]
async fn test_net_info() {
    let endpoint = serve(fake_node()).await;

    let net_info = client().net_info(&endpoint).await.expect("Net info failed");
    assert_eq!(net_info.peers().len(), 1);

    let peer = tendermint_peers_connection::NetInfo::decode_peer(&net_info.peers()[0]).unwrap();
    assert_eq!(peer.remote_ip, "203.0.113.5");
    assert_eq!(peer.rpc_address(), Some("tcp://0.0.0.0:26657"));
}

#[tokio::test]
async fn test_path_prefixed_endpoint() {
    let gateway = Router::new().nest("/testchain", fake_node());
    let root = serve(gateway).await;
    let endpoint = Endpoint::parse(&format!("{root}/testchain")).unwrap();

    let status = client().status(&endpoint).await.expect("Status failed");
    assert_eq!(status.network(), "testchain-1");
    assert!(client().status(&root).await.is_err());
}

#[tokio::test]
async fn test_probe_success() {
    let endpoint = serve(fake_node()).await;
    assert!(client().probe(&endpoint).await.is_ok());
}

#[tokio::test]
async fn test_non_200_is_network_error() {
    let router = Router::new()
        .route("/", get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }))
        .route("/status", get(|| async { (axum::http::StatusCode::NOT_FOUND, "missing") }));
    let endpoint = serve(router).await;
    let client = client();

    let err = client.probe(&endpoint).await.unwrap_err();
    assert!(matches!(err, ClientError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)));
    assert_eq!(err.kind(), ErrorKind::Network);

    let err = client.status(&endpoint).await.unwrap_err();
    assert!(matches!(err, ClientError::Status(reqwest::StatusCode::NOT_FOUND)));
}

#[tokio::test]
async fn test_malformed_status() {
    let router = Router::new()
        .route("/status", get(|| async { "definitely not json" }))
        .route(
            "/net_info",
            get(|| async { Json(json!({ "result": { "peers": "nope" } })) }),
        );
    let endpoint = serve(router).await;
    let client = client();

    let err = client.status(&endpoint).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);

    let err = client.net_info(&endpoint).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn test_probe_timeout() {
    let router = Router::new().route(
        "/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "too late"
        }),
    );
    let endpoint = serve(router).await;

    let err = client().probe(&endpoint).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout));
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind and immediately drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let endpoint = Endpoint::from_socket(addr.ip(), addr.port());

    let err = client().status(&endpoint).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}
