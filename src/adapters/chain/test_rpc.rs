//! In-process JSON-RPC node for exercising the chain adapters over HTTP.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy::primitives::Address;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::config::ChainConfig;

/// How the node answers `eth_call`.
#[derive(Debug, Clone)]
pub enum CallReply {
    /// Return this 0x-prefixed payload.
    Data(String),
    /// JSON-RPC error response, as a node does on revert.
    Revert,
    /// Accept the request and never answer in time.
    Hang,
}

pub struct StubNode {
    chain_id: u64,
    deployed: Vec<Address>,
    call: CallReply,
    eth_calls: AtomicUsize,
}

impl StubNode {
    pub fn new(chain_id: u64, call: CallReply) -> Self {
        Self {
            chain_id,
            deployed: Vec::new(),
            call,
            eth_calls: AtomicUsize::new(0),
        }
    }

    /// Report non-empty code at `address`.
    pub fn with_code_at(mut self, address: Address) -> Self {
        self.deployed.push(address);
        self
    }

    /// Bind to an ephemeral port and serve until the runtime stops.
    pub async fn start(self) -> (Arc<Self>, String) {
        let node = Arc::new(self);
        let app = Router::new()
            .route("/", post(handle))
            .with_state(Arc::clone(&node));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        (node, url)
    }

    /// `eth_call` requests received so far.
    pub fn eth_calls(&self) -> usize {
        self.eth_calls.load(Ordering::SeqCst)
    }
}

async fn handle(State(node): State<Arc<StubNode>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();

    let outcome = match method {
        "eth_chainId" => Ok(json!(format!("{:#x}", node.chain_id))),
        "eth_blockNumber" => Ok(json!("0x10")),
        "eth_getCode" => {
            let deployed = request["params"][0]
                .as_str()
                .and_then(|a| a.parse::<Address>().ok())
                .is_some_and(|a| node.deployed.contains(&a));
            Ok(json!(if deployed { "0x6080604052" } else { "0x" }))
        }
        "eth_call" => {
            node.eth_calls.fetch_add(1, Ordering::SeqCst);
            match &node.call {
                CallReply::Data(payload) => Ok(json!(payload)),
                CallReply::Revert => Err(json!({ "code": 3, "message": "execution reverted" })),
                CallReply::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(json!("0x"))
                }
            }
        }
        _ => Err(json!({ "code": -32601, "message": "method not found" })),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(error) => json!({ "jsonrpc": "2.0", "id": id, "error": error }),
    })
}

/// Chain config pointed at a stub node: 100ms timeout, 2 retries, 10ms base delay.
pub fn chain_config(rpc_url: &str, chain_id: u64) -> ChainConfig {
    ChainConfig {
        rpc_url: rpc_url.to_string(),
        price_fetcher: Address::repeat_byte(0xfe),
        chain_id,
        timeout_ms: 100,
        max_retries: 2,
        retry_base_delay_ms: 10,
        verify_onchain_best_price: false,
    }
}
