//! Order objects and order-number generation.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::currencies::SettlementCurrency;
use super::customer::CustomerInfo;

/// Human-facing order identifier, `WF-<6 digits>-<0..999>`.
///
/// The digits are the last six decimal digits of the creation time in unix
/// milliseconds, the suffix a random integer below 1000. There is no
/// uniqueness guarantee beyond that; collisions are possible and accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

#[derive(Debug, Error)]
#[error("invalid order number: {0}")]
pub struct InvalidOrderNumber(String);

impl OrderNumber {
    /// Generate an order number for the given instant (unix milliseconds).
    pub fn generate(unix_ms: i128) -> Self {
        let suffix: u16 = rand::rng().random_range(0..1000);
        Self::from_parts(unix_ms, suffix)
    }

    /// Deterministic constructor used by [`generate`](Self::generate).
    pub fn from_parts(unix_ms: i128, suffix: u16) -> Self {
        let stamp = unix_ms.rem_euclid(1_000_000);
        OrderNumber(format!("WF-{stamp:06}-{}", suffix % 1000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = InvalidOrderNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("WF-")
            .ok_or_else(|| InvalidOrderNumber(s.to_string()))?;
        let Some((stamp, suffix)) = rest.split_once('-') else {
            return Err(InvalidOrderNumber(s.to_string()));
        };
        let stamp_ok = stamp.len() == 6 && stamp.chars().all(|c| c.is_ascii_digit());
        let suffix_ok = (1..=3).contains(&suffix.len())
            && suffix.chars().all(|c| c.is_ascii_digit());
        if stamp_ok && suffix_ok {
            Ok(OrderNumber(s.to_string()))
        } else {
            Err(InvalidOrderNumber(s.to_string()))
        }
    }
}

/// Order status over the settlement lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created at the payment step, waiting for on-chain settlement.
    Pending,
    /// Settlement transaction confirmed by the wallet provider.
    Paid,
}

/// An order as created when checkout reaches the payment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Internal order ID.
    pub order_id: Uuid,
    /// Human-facing order number shown to the buyer.
    pub order_number: OrderNumber,
    pub customer: CustomerInfo,
    /// Fiat total in USD, two-decimal precision.
    pub total: Decimal,
    pub currency: SettlementCurrency,
    /// Settlement transaction hash, set exactly once on completion.
    pub tx_hash: Option<String>,
    pub created_at: time::OffsetDateTime,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(
        order_number: OrderNumber,
        customer: CustomerInfo,
        total: Decimal,
        currency: SettlementCurrency,
        created_at: time::OffsetDateTime,
    ) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            order_number,
            customer,
            total: total.round_dp(2),
            currency,
            tx_hash: None,
            created_at,
            status: OrderStatus::Pending,
        }
    }

    /// Attach the settlement transaction hash and mark the order paid.
    ///
    /// A second call is ignored; the first hash wins.
    pub fn finalize(&mut self, tx_hash: String) {
        if self.tx_hash.is_none() {
            self.tx_hash = Some(tx_hash);
            self.status = OrderStatus::Paid;
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }
}
