//! The payment settlement engine.
//!
//! Owns the per-request state machine:
//!
//! - `Idle → Approving → Idle` on a successful unlimited approval (sets
//!   `is_approved`), or `Idle → Approving → Failed` on an approval error;
//! - `Idle → Sending → Completed` on a successful transfer, or
//!   `Idle → Sending → Failed` on a transfer error;
//! - `Failed → Approving | Sending` on retry.
//!
//! Exactly one transition path is active at a time; re-entering
//! `Approving` or `Sending` while busy is rejected. Every chain
//! interaction is awaited sequentially through the shared wallet provider:
//! an approval, if performed, always completes before the transfer is
//! submitted. The engine never auto-retries.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use flopay_sdk::config::MerchantConfig;

use crate::abi;
use crate::entities::payment_request::{AllowanceRecord, PaymentRequest};
use crate::events::{PaymentEvent, PaymentEventSender};
use crate::processors::allowance_checker::{AllowanceChecker, AllowanceError};
use crate::provider::{ProviderError, TransactionRequest, WalletProvider};
use crate::utils::token_amount::{self, AmountError};

/// Settlement state for one payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettlementStatus {
    Idle,
    Approving,
    Sending,
    Completed,
    Failed,
}

/// Errors that can occur during settlement.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// No wallet provider is available; nothing was submitted.
    #[error("no wallet provider is available")]
    ProviderUnavailable,

    /// The payment request carries no payer wallet address.
    #[error("wallet is not connected")]
    WalletNotConnected,

    /// An approval or transfer is already in flight for this request.
    #[error("a settlement operation is already in flight")]
    OperationInFlight,

    /// The request has already settled; a new attempt needs a new request.
    #[error("payment has already completed")]
    AlreadyCompleted,

    /// The approve transaction was rejected or errored.
    #[error("token approval failed: {0}")]
    ApprovalFailed(ProviderError),

    /// The transfer transaction was rejected or errored.
    #[error("token transfer failed: {0}")]
    TransferFailed(ProviderError),

    /// The fiat total could not be converted into a token amount.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Sequences approval and transfer submission for one [`PaymentRequest`].
pub struct PaymentSettlementEngine {
    request: PaymentRequest,
    merchant: MerchantConfig,
    provider: Option<Arc<dyn WalletProvider>>,
    events_tx: PaymentEventSender,
    status: SettlementStatus,
    is_approved: bool,
}

impl PaymentSettlementEngine {
    pub fn new(
        request: PaymentRequest,
        merchant: MerchantConfig,
        provider: Option<Arc<dyn WalletProvider>>,
        events_tx: PaymentEventSender,
    ) -> Self {
        Self {
            request,
            merchant,
            provider,
            events_tx,
            status: SettlementStatus::Idle,
            is_approved: false,
        }
    }

    pub fn status(&self) -> SettlementStatus {
        self.status
    }

    /// Whether an unlimited approval has been confirmed for this request.
    pub fn is_approved(&self) -> bool {
        self.is_approved
    }

    pub fn request(&self) -> &PaymentRequest {
        &self.request
    }

    fn provider(&self) -> Result<Arc<dyn WalletProvider>, SettlementError> {
        self.provider
            .clone()
            .ok_or(SettlementError::ProviderUnavailable)
    }

    fn payer(&self) -> Result<alloy_primitives::Address, SettlementError> {
        self.request.payer.ok_or(SettlementError::WalletNotConnected)
    }

    fn ensure_can_start(&self) -> Result<(), SettlementError> {
        match self.status {
            SettlementStatus::Approving | SettlementStatus::Sending => {
                Err(SettlementError::OperationInFlight)
            }
            SettlementStatus::Completed => Err(SettlementError::AlreadyCompleted),
            SettlementStatus::Idle | SettlementStatus::Failed => Ok(()),
        }
    }

    /// The smallest-unit amount this settlement must move.
    fn required_amount(&self) -> Result<alloy_primitives::U256, AmountError> {
        token_amount::smallest_unit_amount(
            self.request.amount,
            self.request.currency,
            self.merchant.project_token_rate_usd,
        )
    }

    /// The token amount formatted for the payment view.
    pub fn display_amount(&self) -> Result<String, AmountError> {
        let tokens = token_amount::token_amount(
            self.request.amount,
            self.request.currency,
            self.merchant.project_token_rate_usd,
        )?;
        Ok(token_amount::format_token_amount(tokens))
    }

    /// Query the current allowance against the required amount.
    pub async fn check_allowance(&self) -> Result<AllowanceRecord, AllowanceError> {
        let provider = self
            .provider
            .clone()
            .ok_or(AllowanceError::ProviderUnavailable)?;
        let payer = self
            .request
            .payer
            .ok_or_else(|| AllowanceError::QueryFailed("wallet is not connected".to_string()))?;
        let required = self
            .required_amount()
            .map_err(|e| AllowanceError::QueryFailed(e.to_string()))?;

        AllowanceChecker::new(provider)
            .check(payer, self.request.token_contract, self.request.recipient, required)
            .await
    }

    /// Whether an approval step is needed before the transfer.
    ///
    /// Fail-safe: any failure of the allowance check answers `true`, so
    /// the flow defaults to requiring approval rather than skipping it.
    pub async fn requires_approval(&self) -> bool {
        match self.check_allowance().await {
            Ok(record) => !record.is_sufficient(),
            Err(error) => {
                warn!(
                    order_number = %self.request.order_number,
                    error = %error,
                    "Allowance check failed, assuming approval is required"
                );
                true
            }
        }
    }

    /// Submit an unlimited approval for the recipient on the token
    /// contract.
    ///
    /// On success the engine returns to `Idle` with `is_approved` set; the
    /// order itself does not advance. On failure the engine transitions to
    /// `Failed` and emits the failure event.
    pub async fn approve(&mut self) -> Result<(), SettlementError> {
        self.ensure_can_start()?;
        let provider = self.provider()?;
        let payer = self.payer()?;

        self.status = SettlementStatus::Approving;
        info!(
            order_number = %self.request.order_number,
            token = %self.request.token_contract,
            spender = %self.request.recipient,
            "Submitting unlimited token approval"
        );

        match self.submit_approval(provider, payer).await {
            Ok(tx_hash) => {
                self.status = SettlementStatus::Idle;
                self.is_approved = true;
                debug!(
                    order_number = %self.request.order_number,
                    tx_hash = %tx_hash,
                    "Approval transaction accepted"
                );
                Ok(())
            }
            Err(error) => {
                self.status = SettlementStatus::Failed;
                warn!(
                    order_number = %self.request.order_number,
                    error = %error,
                    "Approval failed"
                );
                self.emit(PaymentEvent::Failed {
                    order_number: self.request.order_number.clone(),
                    reason: error.to_string(),
                })
                .await;
                Err(SettlementError::ApprovalFailed(error))
            }
        }
    }

    async fn submit_approval(
        &self,
        provider: Arc<dyn WalletProvider>,
        payer: alloy_primitives::Address,
    ) -> Result<String, ProviderError> {
        provider.request_access().await?;
        let data = abi::approve_call(self.request.recipient);
        provider
            .send_transaction(TransactionRequest {
                from: payer,
                to: self.request.token_contract,
                data,
            })
            .await
    }

    /// Submit the transfer that settles the order.
    ///
    /// Emits [`PaymentEvent::Processing`] before the provider responds so
    /// the caller can disable duplicate submissions. On success the engine
    /// transitions to `Completed` and returns the transaction hash; the
    /// caller is responsible for finalizing the order. On failure the
    /// engine transitions to `Failed`; the caller may retry.
    pub async fn send_payment(&mut self) -> Result<String, SettlementError> {
        self.ensure_can_start()?;
        let provider = self.provider()?;
        let payer = self.payer()?;
        let amount = self.required_amount()?;

        self.status = SettlementStatus::Sending;
        self.emit(PaymentEvent::Processing {
            order_number: self.request.order_number.clone(),
        })
        .await;
        info!(
            order_number = %self.request.order_number,
            currency = %self.request.currency,
            amount = %amount,
            "Submitting settlement transfer"
        );

        match self.submit_transfer(provider, payer, amount).await {
            Ok(tx_hash) => {
                self.status = SettlementStatus::Completed;
                info!(
                    order_number = %self.request.order_number,
                    tx_hash = %tx_hash,
                    "Settlement transfer accepted"
                );
                self.emit(PaymentEvent::Completed {
                    order_number: self.request.order_number.clone(),
                    tx_hash: tx_hash.clone(),
                })
                .await;
                Ok(tx_hash)
            }
            Err(error) => {
                self.status = SettlementStatus::Failed;
                warn!(
                    order_number = %self.request.order_number,
                    error = %error,
                    "Settlement transfer failed"
                );
                self.emit(PaymentEvent::Failed {
                    order_number: self.request.order_number.clone(),
                    reason: error.to_string(),
                })
                .await;
                Err(SettlementError::TransferFailed(error))
            }
        }
    }

    async fn submit_transfer(
        &self,
        provider: Arc<dyn WalletProvider>,
        payer: alloy_primitives::Address,
        amount: alloy_primitives::U256,
    ) -> Result<String, ProviderError> {
        provider.request_access().await?;
        let data = abi::transfer_call(self.request.recipient, amount);
        provider
            .send_transaction(TransactionRequest {
                from: payer,
                to: self.request.token_contract,
                data,
            })
            .await
    }

    async fn emit(&self, event: PaymentEvent) {
        if let Err(error) = self.events_tx.send(event).await {
            warn!(error = %error, "Failed to emit payment event");
        }
    }
}
