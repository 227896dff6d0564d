//! Allowance queries against the token contract.
//!
//! Builds the `allowance(owner, spender)` call, dispatches it through the
//! wallet provider as a read-only call, and compares the decoded value
//! against the required amount. Callers must not proceed to settlement
//! decisions on a failed check: the decision surface treats any failure as
//! "approval required" (fail-safe, not fail-open).

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use thiserror::Error;
use tracing::debug;

use crate::abi::{self, AbiError};
use crate::entities::payment_request::AllowanceRecord;
use crate::provider::{ProviderError, WalletProvider};

/// Errors that can occur while checking an allowance.
#[derive(Debug, Error)]
pub enum AllowanceError {
    /// No wallet provider is available; detected before any call attempt.
    #[error("no wallet provider is available")]
    ProviderUnavailable,

    /// The read-only call failed or returned unparsable data.
    #[error("allowance query failed: {0}")]
    QueryFailed(String),
}

impl From<ProviderError> for AllowanceError {
    fn from(error: ProviderError) -> Self {
        AllowanceError::QueryFailed(error.to_string())
    }
}

impl From<AbiError> for AllowanceError {
    fn from(error: AbiError) -> Self {
        AllowanceError::QueryFailed(error.to_string())
    }
}

/// Queries the current spending allowance on a token contract.
pub struct AllowanceChecker {
    provider: Arc<dyn WalletProvider>,
}

impl AllowanceChecker {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self { provider }
    }

    /// Read the allowance `payer` has granted `spender` on
    /// `token_contract` and compare it to `required`.
    pub async fn check(
        &self,
        payer: Address,
        token_contract: Address,
        spender: Address,
        required: U256,
    ) -> Result<AllowanceRecord, AllowanceError> {
        self.provider.request_access().await?;
        let chain_id = self.provider.chain_id().await?;
        debug!(chain_id = %chain_id, "Connected to chain");

        let data = abi::allowance_call(payer, spender);
        let reply = self.provider.call(token_contract, &data).await?;
        let allowance = abi::decode_uint_reply(&reply)?;

        debug!(
            payer = %payer,
            spender = %spender,
            allowance = %allowance,
            required = %required,
            "Allowance checked"
        );

        Ok(AllowanceRecord {
            payer,
            spender,
            allowance,
            required,
        })
    }
}
