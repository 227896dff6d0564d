pub mod cart;
pub mod payment_request;

use serde::{Deserialize, Serialize};

/// Checkout-level payment status, as surfaced to the enclosing UI.
///
/// This is the coarse banner state of the payment step; the fine-grained
/// settlement state lives in
/// [`SettlementStatus`](crate::processors::settlement::SettlementStatus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// No settlement attempt submitted yet.
    Pending,
    /// A settlement transaction has been handed to the wallet provider.
    Processing,
    /// Settlement confirmed; the order is finalized.
    Completed,
    /// The last settlement attempt failed; the buyer may retry.
    Failed,
}
