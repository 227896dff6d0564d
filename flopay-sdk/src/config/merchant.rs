//! Merchant configuration.

use alloy_primitives::{Address, address};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::objects::SettlementCurrency;

/// USDC token contract, well known and chain-specific.
pub const USDC_TOKEN_ADDRESS: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// Current USD rate of the $FLOCKA token (USD per token).
///
/// A single global rate, not live-fetched.
pub fn default_flocka_usd_rate() -> Decimal {
    // 0.00019856045123770627
    Decimal::from_i128_with_scale(19_856_045_123_770_627, 20)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The USD-per-token rate must be strictly positive.
    #[error("project token rate must be positive, got {0}")]
    NonPositiveRate(Decimal),
}

/// Merchant configuration for receiving payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantConfig {
    /// The merchant wallet that receives settlement transfers.
    pub recipient_address: Address,
    /// The stablecoin token contract.
    pub stable_token_address: Address,
    /// The $FLOCKA token contract.
    pub project_token_address: Address,
    /// USD-per-token rate used to convert fiat totals into $FLOCKA.
    pub project_token_rate_usd: Decimal,
}

impl MerchantConfig {
    /// Create a new MerchantConfig.
    pub fn new(
        recipient_address: Address,
        stable_token_address: Address,
        project_token_address: Address,
        project_token_rate_usd: Decimal,
    ) -> Result<Self, ConfigError> {
        if project_token_rate_usd <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveRate(project_token_rate_usd));
        }
        Ok(Self {
            recipient_address,
            stable_token_address,
            project_token_address,
            project_token_rate_usd,
        })
    }

    /// Create a config with the well-known USDC contract and the fixed
    /// $FLOCKA rate.
    pub fn with_defaults(
        recipient_address: Address,
        project_token_address: Address,
    ) -> Self {
        Self {
            recipient_address,
            stable_token_address: USDC_TOKEN_ADDRESS,
            project_token_address,
            project_token_rate_usd: default_flocka_usd_rate(),
        }
    }

    /// The token contract used to settle in the given currency.
    pub fn token_address(&self, currency: SettlementCurrency) -> Address {
        match currency {
            SettlementCurrency::Usdc => self.stable_token_address,
            SettlementCurrency::Flocka => self.project_token_address,
        }
    }
}
