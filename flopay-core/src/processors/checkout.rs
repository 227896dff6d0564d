//! The three-step checkout flow.
//!
//! `ReviewingCart → EnteringInfo → AwaitingPayment → Confirmed`, with an
//! explicit transition table: moving to the info step requires a non-empty
//! cart, moving to payment requires customer-info validation (all field
//! errors collected), and the terminal step is reached only through a
//! completed settlement. Validation errors never reach the payment layer.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use flopay_sdk::config::MerchantConfig;
use flopay_sdk::objects::{
    CustomerInfoDraft, Order, OrderNumber, SettlementCurrency, ValidationErrors,
};

use crate::entities::PaymentStatus;
use crate::entities::cart::Cart;
use crate::entities::payment_request::PaymentRequest;
use crate::events::{OnrampEvent, PaymentEventSender};
use crate::processors::settlement::{PaymentSettlementEngine, SettlementError};
use crate::provider::WalletProvider;

/// The checkout steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutStep {
    ReviewingCart,
    EnteringInfo,
    AwaitingPayment,
    /// Terminal: the order is finalized and the cart cleared.
    Confirmed,
}

/// Errors that can occur while driving the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout cannot start with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Customer information failed validation; nothing advanced.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A settlement attempt is currently processing; navigation and
    /// re-submission are blocked until it resolves.
    #[error("a payment is currently processing")]
    PaymentInProgress,

    /// The operation is not in the transition table for the current step.
    #[error("operation not allowed while {0:?}")]
    WrongStep(CheckoutStep),

    /// The settlement currency is locked once the payment step is reached.
    #[error("payment method cannot change during payment")]
    CurrencyLocked,

    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

/// One buyer's checkout session, from cart review to confirmation.
pub struct CheckoutSession {
    step: CheckoutStep,
    cart: Cart,
    currency: SettlementCurrency,
    draft: CustomerInfoDraft,
    wallet_connected: bool,
    order: Option<Order>,
    payment_status: PaymentStatus,
    settlement: Option<PaymentSettlementEngine>,
    onramp_visible: bool,
    merchant: MerchantConfig,
    provider: Option<Arc<dyn WalletProvider>>,
    events_tx: PaymentEventSender,
}

impl CheckoutSession {
    pub fn new(
        cart: Cart,
        merchant: MerchantConfig,
        provider: Option<Arc<dyn WalletProvider>>,
        events_tx: PaymentEventSender,
    ) -> Self {
        Self {
            step: CheckoutStep::ReviewingCart,
            cart,
            currency: SettlementCurrency::Usdc,
            draft: CustomerInfoDraft::default(),
            wallet_connected: false,
            order: None,
            payment_status: PaymentStatus::Pending,
            settlement: None,
            onramp_visible: false,
            merchant,
            provider,
            events_tx,
        }
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Mutable cart access for quantity edits and removals during review.
    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn currency(&self) -> SettlementCurrency {
        self.currency
    }

    pub fn draft_mut(&mut self) -> &mut CustomerInfoDraft {
        &mut self.draft
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn onramp_visible(&self) -> bool {
        self.onramp_visible
    }

    /// Choose the settlement currency. Locked once the payment step is
    /// reached, since the order total and token amounts are fixed there.
    pub fn set_currency(&mut self, currency: SettlementCurrency) -> Result<(), CheckoutError> {
        if matches!(self.step, CheckoutStep::AwaitingPayment | CheckoutStep::Confirmed) {
            return Err(CheckoutError::CurrencyLocked);
        }
        self.currency = currency;
        Ok(())
    }

    /// Record a connected wallet; fills the payer address in the draft.
    pub fn connect_wallet(&mut self, address: alloy_primitives::Address) {
        self.wallet_connected = true;
        self.draft.wallet_address = address.to_string();
        debug!(address = %address, "Wallet connected");
    }

    /// Step 1 → 2. Permitted whenever the cart is non-empty.
    pub fn proceed_to_info(&mut self) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::ReviewingCart {
            return Err(CheckoutError::WrongStep(self.step));
        }
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.step = CheckoutStep::EnteringInfo;
        Ok(())
    }

    /// Step 2 → 3. Validates the customer information (collecting every
    /// field error), generates the order, and builds the settlement engine
    /// for it.
    pub fn submit_customer_info(&mut self) -> Result<&Order, CheckoutError> {
        if self.step != CheckoutStep::EnteringInfo {
            return Err(CheckoutError::WrongStep(self.step));
        }
        let customer = self.draft.validate(self.wallet_connected)?;

        let now = time::OffsetDateTime::now_utc();
        let unix_ms = now.unix_timestamp_nanos() / 1_000_000;
        let order_number = OrderNumber::generate(unix_ms);
        let order = Order::new(
            order_number,
            customer,
            self.cart.total(self.currency),
            self.currency,
            now,
        );
        info!(
            order_number = %order.order_number,
            total = %order.total,
            currency = %order.currency,
            "Order created, entering payment step"
        );

        let request = PaymentRequest::for_order(&order, &self.merchant);
        self.settlement = Some(PaymentSettlementEngine::new(
            request,
            self.merchant.clone(),
            self.provider.clone(),
            self.events_tx.clone(),
        ));
        self.payment_status = PaymentStatus::Pending;
        self.step = CheckoutStep::AwaitingPayment;

        Ok(self.order.insert(order))
    }

    /// Step back one step. From the payment step this is rejected while a
    /// settlement attempt is processing.
    pub fn back(&mut self) -> Result<(), CheckoutError> {
        match self.step {
            CheckoutStep::EnteringInfo => {
                self.step = CheckoutStep::ReviewingCart;
                Ok(())
            }
            CheckoutStep::AwaitingPayment => {
                if self.payment_status == PaymentStatus::Processing {
                    return Err(CheckoutError::PaymentInProgress);
                }
                // The unpaid order is dropped; re-entering the payment step
                // generates a fresh one.
                self.order = None;
                self.settlement = None;
                self.payment_status = PaymentStatus::Pending;
                self.onramp_visible = false;
                self.step = CheckoutStep::EnteringInfo;
                Ok(())
            }
            step => Err(CheckoutError::WrongStep(step)),
        }
    }

    fn ensure_payment_step(&self) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::AwaitingPayment {
            return Err(CheckoutError::WrongStep(self.step));
        }
        Ok(())
    }

    /// Whether the buyer must approve token spending before paying.
    /// Fail-safe: answers `true` when the allowance cannot be determined.
    pub async fn requires_approval(&self) -> bool {
        match &self.settlement {
            Some(engine) => engine.requires_approval().await,
            None => true,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.settlement
            .as_ref()
            .is_some_and(PaymentSettlementEngine::is_approved)
    }

    /// Submit the unlimited approval transaction for the chosen token.
    pub async fn approve(&mut self) -> Result<(), CheckoutError> {
        self.ensure_payment_step()?;
        let engine = self
            .settlement
            .as_mut()
            .ok_or(CheckoutError::WrongStep(CheckoutStep::AwaitingPayment))?;
        let result = engine.approve().await;
        if result.is_err() {
            self.payment_status = PaymentStatus::Failed;
        }
        Ok(result?)
    }

    /// Submit the settlement transfer. On success the order is finalized
    /// with the transaction hash, the cart is cleared, and the session
    /// reaches its terminal step.
    pub async fn send_payment(&mut self) -> Result<String, CheckoutError> {
        self.ensure_payment_step()?;
        let engine = self
            .settlement
            .as_mut()
            .ok_or(CheckoutError::WrongStep(CheckoutStep::AwaitingPayment))?;
        self.payment_status = PaymentStatus::Processing;
        let result = engine.send_payment().await;
        match result {
            Ok(tx_hash) => {
                self.payment_status = PaymentStatus::Completed;
                if let Some(order) = self.order.as_mut() {
                    order.finalize(tx_hash.clone());
                }
                self.cart.clear();
                self.onramp_visible = false;
                self.step = CheckoutStep::Confirmed;
                info!(tx_hash = %tx_hash, "Order confirmed");
                Ok(tx_hash)
            }
            Err(error) => {
                self.payment_status = PaymentStatus::Failed;
                Err(error.into())
            }
        }
    }

    /// Show the fiat onramp panel for the chosen settlement currency.
    pub fn show_onramp(&mut self) -> Result<SettlementCurrency, CheckoutError> {
        if self.step != CheckoutStep::AwaitingPayment {
            return Err(CheckoutError::WrongStep(self.step));
        }
        self.onramp_visible = true;
        Ok(self.currency)
    }

    /// Consume an onramp signal; success dismisses the panel and returns
    /// the buyer to the payment view.
    pub fn handle_onramp_event(&mut self, event: OnrampEvent) {
        match event {
            OnrampEvent::Succeeded { currency } => {
                debug!(currency = %currency, "Onramp purchase completed");
                self.onramp_visible = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use rust_decimal::Decimal;

    use flopay_sdk::objects::CustomerField;

    use crate::abi;
    use crate::entities::cart::Product;
    use crate::events::{PaymentEvent, PaymentEventReceiver, payment_event_channel};
    use crate::test_util::ScriptedProvider;

    const PAYER: Address = Address::repeat_byte(0x0a);
    const RECIPIENT: Address = Address::repeat_byte(0x0b);
    const FLOCKA: Address = Address::repeat_byte(0x0c);

    fn cart_with_total(usd: Decimal) -> Cart {
        let mut cart = Cart::new();
        cart.add(
            Product {
                id: "hoodie".to_string(),
                name: "Hoodie".to_string(),
                unit_price: usd,
            },
            1,
        );
        cart
    }

    fn session(
        provider: Option<ScriptedProvider>,
        cart: Cart,
    ) -> (CheckoutSession, PaymentEventReceiver) {
        let (events_tx, events_rx) = payment_event_channel();
        let provider = provider.map(|p| Arc::new(p) as Arc<dyn WalletProvider>);
        let merchant = MerchantConfig::with_defaults(RECIPIENT, FLOCKA);
        (
            CheckoutSession::new(cart, merchant, provider, events_tx),
            events_rx,
        )
    }

    fn fill_valid_draft(session: &mut CheckoutSession) {
        let draft = session.draft_mut();
        draft.name = "Bob".to_string();
        draft.email = "bob@x.io".to_string();
        draft.wallet_address = PAYER.to_string();
        draft.telegram = "bob_tg".to_string();
    }

    #[test]
    fn test_empty_cart_cannot_start_checkout() {
        let (mut session, _rx) = session(None, Cart::new());
        assert!(matches!(
            session.proceed_to_info().unwrap_err(),
            CheckoutError::EmptyCart
        ));
        assert_eq!(session.step(), CheckoutStep::ReviewingCart);
    }

    #[test]
    fn test_validation_gates_payment_step() {
        let (mut session, _rx) = session(None, cart_with_total(Decimal::new(10000, 2)));
        session.proceed_to_info().unwrap();

        let error = session.submit_customer_info().unwrap_err();
        let CheckoutError::Validation(errors) = error else {
            panic!("expected validation errors");
        };
        assert!(errors.field(CustomerField::Name).is_some());
        assert!(errors.field(CustomerField::Email).is_some());
        assert!(errors.field(CustomerField::Wallet).is_some());
        assert!(errors.field(CustomerField::Social).is_some());
        assert_eq!(session.step(), CheckoutStep::EnteringInfo);
        assert!(session.order().is_none());
    }

    #[test]
    fn test_order_is_created_on_entering_payment() {
        let (mut session, _rx) = session(None, cart_with_total(Decimal::new(10000, 2)));
        session.proceed_to_info().unwrap();
        fill_valid_draft(&mut session);

        let order = session.submit_customer_info().unwrap();
        assert_eq!(order.total, Decimal::new(10000, 2));
        assert!(order.order_number.as_str().starts_with("WF-"));
        assert_eq!(session.step(), CheckoutStep::AwaitingPayment);
    }

    #[test]
    fn test_connected_wallet_fills_payer() {
        let (mut session, _rx) = session(None, cart_with_total(Decimal::new(10000, 2)));
        session.proceed_to_info().unwrap();
        session.connect_wallet(PAYER);
        let draft = session.draft_mut();
        draft.name = "Bob".to_string();
        draft.email = "bob@x.io".to_string();
        draft.telegram = "bob_tg".to_string();

        let order = session.submit_customer_info().unwrap();
        assert_eq!(order.customer.wallet_address, Some(PAYER));
    }

    #[test]
    fn test_currency_locks_at_payment_step() {
        let (mut session, _rx) = session(None, cart_with_total(Decimal::new(10000, 2)));
        session.set_currency(SettlementCurrency::Flocka).unwrap();
        session.proceed_to_info().unwrap();
        fill_valid_draft(&mut session);
        session.submit_customer_info().unwrap();

        assert!(matches!(
            session.set_currency(SettlementCurrency::Usdc).unwrap_err(),
            CheckoutError::CurrencyLocked
        ));
    }

    #[test]
    fn test_back_from_payment_drops_unpaid_order() {
        let (mut session, _rx) = session(None, cart_with_total(Decimal::new(10000, 2)));
        session.proceed_to_info().unwrap();
        fill_valid_draft(&mut session);
        session.submit_customer_info().unwrap();

        session.back().unwrap();
        assert_eq!(session.step(), CheckoutStep::EnteringInfo);
        assert!(session.order().is_none());
        assert!(!session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_stable_checkout_end_to_end_with_approval() {
        // Allowance starts at zero, so approval is required; after the
        // unlimited approval the allowance covers the order and the
        // transfer settles it.
        let provider = Arc::new(
            ScriptedProvider::with_payer(PAYER)
                .call_reply(U256::ZERO)
                .tx_hash("0xaaa")
                .call_reply(U256::MAX)
                .tx_hash("0xabc123"),
        );
        let (events_tx, mut rx) = payment_event_channel();
        let merchant = MerchantConfig::with_defaults(RECIPIENT, FLOCKA);
        let mut session = CheckoutSession::new(
            cart_with_total(Decimal::new(10000, 2)),
            merchant,
            Some(provider.clone() as Arc<dyn WalletProvider>),
            events_tx,
        );

        session.proceed_to_info().unwrap();
        fill_valid_draft(&mut session);
        session.submit_customer_info().unwrap();

        assert!(session.requires_approval().await);
        session.approve().await.unwrap();
        assert!(session.is_approved());
        assert!(!session.requires_approval().await);

        let hash = session.send_payment().await.unwrap();
        assert_eq!(hash, "0xabc123");
        assert_eq!(session.step(), CheckoutStep::Confirmed);
        assert_eq!(session.payment_status(), PaymentStatus::Completed);
        assert!(session.cart().is_empty());

        let order = session.order().unwrap();
        assert!(order.is_paid());
        assert_eq!(order.tx_hash.as_deref(), Some("0xabc123"));

        // $100.00 of USDC: approval first, then a 100_000000-unit transfer.
        let sent = provider.sent_transactions();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].data, abi::approve_call(RECIPIENT));
        assert_eq!(
            sent[1].data,
            abi::transfer_call(RECIPIENT, U256::from(100_000_000u64))
        );

        assert!(matches!(rx.try_recv(), Ok(PaymentEvent::Processing { .. })));
        assert!(matches!(rx.try_recv(), Ok(PaymentEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn test_failed_transfer_allows_retry_without_new_order() {
        let provider = ScriptedProvider::with_payer(PAYER)
            .failing_tx("user rejected")
            .tx_hash("0xabc");
        let (mut session, _rx) = session(Some(provider), cart_with_total(Decimal::new(10000, 2)));

        session.proceed_to_info().unwrap();
        fill_valid_draft(&mut session);
        let first_number = session.submit_customer_info().unwrap().order_number.clone();

        assert!(session.send_payment().await.is_err());
        assert_eq!(session.payment_status(), PaymentStatus::Failed);
        assert_eq!(session.step(), CheckoutStep::AwaitingPayment);

        let hash = session.send_payment().await.unwrap();
        assert_eq!(hash, "0xabc");
        // The retry settles the same order; no duplicate is created.
        assert_eq!(session.order().unwrap().order_number, first_number);
        assert_eq!(session.step(), CheckoutStep::Confirmed);
    }

    #[tokio::test]
    async fn test_payment_without_provider_fails_safe() {
        let (mut session, _rx) = session(None, cart_with_total(Decimal::new(10000, 2)));
        session.proceed_to_info().unwrap();
        fill_valid_draft(&mut session);
        session.submit_customer_info().unwrap();

        assert!(session.requires_approval().await);
        let error = session.send_payment().await.unwrap_err();
        assert!(matches!(
            error,
            CheckoutError::Settlement(SettlementError::ProviderUnavailable)
        ));
        assert_eq!(session.payment_status(), PaymentStatus::Failed);
    }

    #[test]
    fn test_onramp_panel_round_trip() {
        let (mut session, _rx) = session(None, cart_with_total(Decimal::new(10000, 2)));
        assert!(session.show_onramp().is_err());

        session.proceed_to_info().unwrap();
        fill_valid_draft(&mut session);
        session.submit_customer_info().unwrap();

        let currency = session.show_onramp().unwrap();
        assert_eq!(currency, SettlementCurrency::Usdc);
        assert!(session.onramp_visible());

        session.handle_onramp_event(OnrampEvent::Succeeded { currency });
        assert!(!session.onramp_visible());
    }
}
