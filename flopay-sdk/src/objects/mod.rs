pub mod currencies;
pub mod customer;
pub mod order;

pub use currencies::SettlementCurrency;
pub use customer::{CustomerField, CustomerInfo, CustomerInfoDraft, FieldError, ValidationErrors};
pub use order::{InvalidOrderNumber, Order, OrderNumber, OrderStatus};
