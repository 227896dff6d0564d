pub mod allowance_checker;
pub mod checkout;
pub mod settlement;
