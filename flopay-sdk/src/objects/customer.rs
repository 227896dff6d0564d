//! Customer information captured during checkout.
//!
//! The checkout frontend fills a [`CustomerInfoDraft`] field by field;
//! [`CustomerInfoDraft::validate`] turns it into a [`CustomerInfo`] or
//! reports every failing field at once so the form can highlight them
//! together.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A field of the customer-information form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerField {
    Name,
    Email,
    Wallet,
    Social,
}

impl CustomerField {
    pub fn as_str(self) -> &'static str {
        match self {
            CustomerField::Name => "name",
            CustomerField::Email => "email",
            CustomerField::Wallet => "wallet",
            CustomerField::Social => "social",
        }
    }
}

impl std::fmt::Display for CustomerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: CustomerField,
    pub message: String,
}

/// All validation failures for a draft, collected rather than
/// short-circuited.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("customer information is invalid ({} field error(s))", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Look up the message for a specific field, if it failed.
    pub fn field(&self, field: CustomerField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Raw form input, exactly as typed by the buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfoDraft {
    pub name: String,
    pub email: String,
    /// The buyer's wallet address. May be left empty when a wallet is
    /// already connected.
    pub wallet_address: String,
    pub telegram: String,
    pub x_handle: String,
    pub discord: String,
}

/// Validated customer information attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub wallet_address: Option<Address>,
    pub telegram: Option<String>,
    pub x_handle: Option<String>,
    pub discord: Option<String>,
}

impl CustomerInfoDraft {
    /// Validate the draft, collecting every failing field.
    ///
    /// `wallet_connected` relaxes the wallet-address requirement: a
    /// connected wallet already supplies the payer address.
    pub fn validate(&self, wallet_connected: bool) -> Result<CustomerInfo, ValidationErrors> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError {
                field: CustomerField::Name,
                message: "Name is required".to_string(),
            });
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError {
                field: CustomerField::Email,
                message: "Email is required".to_string(),
            });
        } else if !is_valid_email(email) {
            errors.push(FieldError {
                field: CustomerField::Email,
                message: "Email is invalid".to_string(),
            });
        }

        let wallet = self.wallet_address.trim();
        let mut wallet_address = None;
        if wallet.is_empty() {
            if !wallet_connected {
                errors.push(FieldError {
                    field: CustomerField::Wallet,
                    message: "Wallet address is required".to_string(),
                });
            }
        } else {
            match parse_wallet_address(wallet) {
                Some(address) => wallet_address = Some(address),
                None => errors.push(FieldError {
                    field: CustomerField::Wallet,
                    message: "Wallet address is invalid".to_string(),
                }),
            }
        }

        let telegram = non_empty(&self.telegram);
        let x_handle = non_empty(&self.x_handle);
        let discord = non_empty(&self.discord);
        if telegram.is_none() && x_handle.is_none() && discord.is_none() {
            errors.push(FieldError {
                field: CustomerField::Social,
                message: "At least one social media contact is required".to_string(),
            });
        }

        if !errors.is_empty() {
            return Err(ValidationErrors { errors });
        }

        Ok(CustomerInfo {
            name: name.to_string(),
            email: email.to_string(),
            wallet_address,
            telegram,
            x_handle,
            discord,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Minimal `local@domain.tld` shape check: a non-empty local part, an `@`,
/// and a dot inside the domain part.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.split_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Parse a `0x`-prefixed 40-hex-character address. Anything else is
/// rejected before it can reach the call encoder.
fn parse_wallet_address(value: &str) -> Option<Address> {
    let hex = value.strip_prefix("0x")?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    value.parse::<Address>().ok()
}
