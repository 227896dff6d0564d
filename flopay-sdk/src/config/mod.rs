//! Configuration types for the token checkout.
//!
//! These types represent the validated runtime configuration constructed by
//! the host application; the settlement core only reads them.

mod merchant;

pub use merchant::{ConfigError, MerchantConfig, USDC_TOKEN_ADDRESS, default_flocka_usd_rate};
