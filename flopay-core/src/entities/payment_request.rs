//! The chain-facing payment request for one settlement attempt.

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;

use flopay_sdk::config::MerchantConfig;
use flopay_sdk::objects::{Order, OrderNumber, SettlementCurrency};

/// Everything the settlement engine needs to pay one order.
///
/// Immutable once constructed; a new settlement attempt for a different
/// order requires a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Fiat amount in USD.
    pub amount: Decimal,
    pub currency: SettlementCurrency,
    /// The merchant wallet receiving the transfer.
    pub recipient: Address,
    /// The token contract to settle through, resolved for the currency.
    pub token_contract: Address,
    /// The buyer wallet submitting the transactions, if known.
    pub payer: Option<Address>,
    pub order_number: OrderNumber,
}

impl PaymentRequest {
    /// Build the request for an order using the merchant configuration.
    pub fn for_order(order: &Order, merchant: &MerchantConfig) -> Self {
        Self {
            amount: order.total,
            currency: order.currency,
            recipient: merchant.recipient_address,
            token_contract: merchant.token_address(order.currency),
            payer: order.customer.wallet_address,
            order_number: order.order_number.clone(),
        }
    }
}

/// The allowance the payer has granted the recipient on the token
/// contract, against the amount this settlement needs.
///
/// Derived from a read-only chain call, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceRecord {
    pub payer: Address,
    pub spender: Address,
    /// Current allowance in smallest units.
    pub allowance: U256,
    /// Required amount in smallest units.
    pub required: U256,
}

impl AllowanceRecord {
    /// Settlement may skip approval only if the allowance covers the
    /// required amount.
    pub fn is_sufficient(&self) -> bool {
        self.allowance >= self.required
    }
}
