pub mod token_amount;
