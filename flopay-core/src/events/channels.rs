//! Event channel factories and handles.

use tokio::sync::mpsc;

use super::types::{OnrampEvent, PaymentEvent};

/// Default buffer size for event channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for PaymentEvent events.
pub type PaymentEventSender = mpsc::Sender<PaymentEvent>;
/// Receiver handle for PaymentEvent events.
pub type PaymentEventReceiver = mpsc::Receiver<PaymentEvent>;

/// Sender handle for OnrampEvent events.
pub type OnrampEventSender = mpsc::Sender<OnrampEvent>;
/// Receiver handle for OnrampEvent events.
pub type OnrampEventReceiver = mpsc::Receiver<OnrampEvent>;

/// Create a new PaymentEvent channel.
///
/// Returns a (sender, receiver) pair; the receiver side belongs to the
/// enclosing UI.
pub fn payment_event_channel() -> (PaymentEventSender, PaymentEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new OnrampEvent channel.
///
/// The onramp collaborator holds the sender; the checkout session consumes
/// the events.
pub fn onramp_event_channel() -> (OnrampEventSender, OnrampEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
