//! Event type definitions for the checkout flow.
//!
//! Events are ephemeral notifications for the enclosing UI; the
//! authoritative state lives in the checkout session and the settlement
//! engine.

use flopay_sdk::objects::{OrderNumber, SettlementCurrency};

/// Settlement progress for one order, emitted by the settlement engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// A settlement transaction was handed to the wallet provider. Emitted
    /// before the provider responds so the UI can disable duplicate
    /// submissions.
    Processing { order_number: OrderNumber },
    /// The transfer succeeded; the order can be finalized with this hash.
    Completed {
        order_number: OrderNumber,
        tx_hash: String,
    },
    /// An approval or transfer failed; the buyer may retry.
    Failed {
        order_number: OrderNumber,
        reason: String,
    },
}

impl PaymentEvent {
    /// The order this event belongs to.
    pub fn order_number(&self) -> &OrderNumber {
        match self {
            PaymentEvent::Processing { order_number }
            | PaymentEvent::Completed { order_number, .. }
            | PaymentEvent::Failed { order_number, .. } => order_number,
        }
    }
}

/// Signal from the fiat onramp collaborator.
///
/// The onramp runs its own UI; the checkout only needs to know a purchase
/// finished so it can dismiss the onramp panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnrampEvent {
    Succeeded { currency: SettlementCurrency },
}
