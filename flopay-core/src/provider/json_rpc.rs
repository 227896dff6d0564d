//! JSON-RPC 2.0 wallet provider over HTTP.
//!
//! The Rust counterpart of a browser-injected provider: the same four
//! request methods, spoken to a node endpoint. `eth_sendTransaction`
//! requires the node to manage the payer's key (an unlocked or wallet-run
//! node); signing is out of scope here.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{ProviderError, TransactionRequest, WalletProvider};
use crate::abi::CallData;

pub struct JsonRpcProvider {
    endpoint: Url,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            next_id: AtomicU64::new(1),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, ProviderError> {
        #[derive(Debug, Deserialize)]
        struct JsonRpcError {
            code: i64,
            message: String,
        }

        #[derive(Debug, Deserialize)]
        struct JsonRpcResponse<T> {
            result: Option<T>,
            error: Option<JsonRpcError>,
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method = method, id = id, "Dispatching JSON-RPC request");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;
        let response: JsonRpcResponse<T> = response.json().await?;

        if let Some(error) = response.error {
            return Err(ProviderError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or_else(|| {
            ProviderError::InvalidReply(format!("{method} reply carried neither result nor error"))
        })
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request_access(&self) -> Result<Vec<Address>, ProviderError> {
        let accounts: Vec<Address> = self.request("eth_requestAccounts", json!([])).await?;
        if accounts.is_empty() {
            return Err(ProviderError::NoAccounts);
        }
        Ok(accounts)
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        self.request("eth_chainId", json!([])).await
    }

    async fn call(&self, to: Address, data: &CallData) -> Result<String, ProviderError> {
        self.request(
            "eth_call",
            json!([{ "to": to, "data": data.as_str() }, "latest"]),
        )
        .await
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<String, ProviderError> {
        self.request(
            "eth_sendTransaction",
            json!([{ "from": tx.from, "to": tx.to, "data": tx.data.as_str() }]),
        )
        .await
    }
}
