//! The wallet-provider capability the settlement flow depends on.
//!
//! The provider is injected at construction so the settlement engine can
//! run against a real node ([`json_rpc::JsonRpcProvider`]) or a scripted
//! double in tests. All four methods are suspension points; calls are
//! awaited sequentially and never dispatched in parallel.
//!
//! Absence of a provider is not an error of this trait: components hold an
//! `Option` of it and report `ProviderUnavailable` before attempting any
//! call. No settlement-level timeout is enforced on in-flight calls; an
//! abandoned call's result is simply discarded when the session is dropped.

pub mod json_rpc;

use alloy_primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

use crate::abi::CallData;

/// Errors from a wallet-provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the request (user denial, revert, bad params).
    #[error("wallet provider rejected the request ({code}): {message}")]
    Rpc { code: i64, message: String },

    /// HTTP transport error
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider returned something that does not fit the expected shape.
    #[error("malformed provider reply: {0}")]
    InvalidReply(String),

    /// The provider granted access but reported no accounts.
    #[error("no account authorized by the wallet provider")]
    NoAccounts,
}

/// A state-changing transaction submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: CallData,
}

/// The injected wallet capability.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request account access. Must succeed before any other call.
    async fn request_access(&self) -> Result<Vec<Address>, ProviderError>;

    /// The connected chain identifier, informational only.
    async fn chain_id(&self) -> Result<String, ProviderError>;

    /// Read-only contract call; returns the hex-encoded result.
    async fn call(&self, to: Address, data: &CallData) -> Result<String, ProviderError>;

    /// Submit a state-changing transaction; returns the transaction hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<String, ProviderError>;
}
