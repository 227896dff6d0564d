pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, OnrampEventReceiver, OnrampEventSender, PaymentEventReceiver,
    PaymentEventSender, onramp_event_channel, payment_event_channel,
};
pub use types::{OnrampEvent, PaymentEvent};
