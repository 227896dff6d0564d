//! Conversion of fiat order totals into token quantities.
//!
//! All math happens in `Decimal` and `U256`; the smallest-unit result is
//! exact up to `Decimal`'s 28-digit range, and anything beyond fails with
//! [`AmountError::Overflow`] instead of rounding.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

use flopay_sdk::objects::SettlementCurrency;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Fiat amounts are never negative.
    #[error("fiat amount must not be negative: {0}")]
    Negative(Decimal),

    /// The USD-per-token rate must be strictly positive.
    #[error("token rate must be positive: {0}")]
    InvalidRate(Decimal),

    /// The scaled amount does not fit the decimal range.
    #[error("amount exceeds the representable token range")]
    Overflow,
}

/// The token quantity a fiat amount buys.
///
/// USDC settles 1:1; $FLOCKA converts at the fixed USD-per-token rate.
pub fn token_amount(
    fiat: Decimal,
    currency: SettlementCurrency,
    usd_rate: Decimal,
) -> Result<Decimal, AmountError> {
    if fiat.is_sign_negative() && !fiat.is_zero() {
        return Err(AmountError::Negative(fiat));
    }
    match currency {
        SettlementCurrency::Usdc => Ok(fiat),
        SettlementCurrency::Flocka => {
            if usd_rate <= Decimal::ZERO {
                return Err(AmountError::InvalidRate(usd_rate));
            }
            Ok(fiat / usd_rate)
        }
    }
}

/// The token quantity in smallest units, floored to an integer.
///
/// `floor(token_amount × 10^decimals)` with 6 decimals for USDC and 18 for
/// $FLOCKA.
pub fn smallest_unit_amount(
    fiat: Decimal,
    currency: SettlementCurrency,
    usd_rate: Decimal,
) -> Result<U256, AmountError> {
    let tokens = token_amount(fiat, currency, usd_rate)?;
    let scale = Decimal::from(10u64.pow(currency.decimals()));
    let scaled = tokens.checked_mul(scale).ok_or(AmountError::Overflow)?;
    let units = scaled.trunc().to_u128().ok_or(AmountError::Overflow)?;
    Ok(U256::from(units))
}

/// Smallest-unit amount rendered for the wire, `0x`-prefixed.
pub fn smallest_unit_hex(amount: U256) -> String {
    format!("0x{amount:x}")
}

/// Token amount formatted for display: thousands grouping, at most two
/// fraction digits.
pub fn format_token_amount(tokens: Decimal) -> String {
    let rounded = tokens.round_dp(2).normalize();
    let text = rounded.to_string();
    let (number, fraction) = match text.split_once('.') {
        Some((n, f)) => (n, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(number.len() + number.len() / 3);
    for (i, c) in number.chars().enumerate() {
        if i > 0 && (number.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match fraction {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flopay_sdk::config::default_flocka_usd_rate;

    fn rate() -> Decimal {
        default_flocka_usd_rate()
    }

    #[test]
    fn test_usdc_settles_one_to_one() {
        let fiat = Decimal::new(10000, 2);
        assert_eq!(
            token_amount(fiat, SettlementCurrency::Usdc, rate()).unwrap(),
            fiat
        );
        assert_eq!(
            smallest_unit_amount(fiat, SettlementCurrency::Usdc, rate()).unwrap(),
            U256::from(100_000_000u64)
        );
    }

    #[test]
    fn test_flocka_converts_at_rate() {
        // $50 at 0.0002 USD/token buys exactly 250,000 tokens.
        let fiat = Decimal::new(50, 0);
        let rate = Decimal::new(2, 4);
        let tokens = token_amount(fiat, SettlementCurrency::Flocka, rate).unwrap();
        assert_eq!(tokens, Decimal::from(250_000u64));

        let units = smallest_unit_amount(fiat, SettlementCurrency::Flocka, rate).unwrap();
        let expected = U256::from(250_000u64) * U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(units, expected);
    }

    #[test]
    fn test_fractional_units_are_floored() {
        // $0.0000015 in USDC is 1.5 smallest units.
        let fiat = Decimal::new(15, 7);
        assert_eq!(
            smallest_unit_amount(fiat, SettlementCurrency::Usdc, rate()).unwrap(),
            U256::from(1u8)
        );
    }

    #[test]
    fn test_zero_amount() {
        let units = smallest_unit_amount(Decimal::ZERO, SettlementCurrency::Flocka, rate()).unwrap();
        assert_eq!(units, U256::ZERO);
        assert_eq!(smallest_unit_hex(units), "0x0");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = token_amount(Decimal::new(-1, 2), SettlementCurrency::Usdc, rate()).unwrap_err();
        assert!(matches!(err, AmountError::Negative(_)));
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let err =
            token_amount(Decimal::ONE, SettlementCurrency::Flocka, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, AmountError::InvalidRate(_)));
    }

    #[test]
    fn test_large_amounts_stay_exact() {
        // 10^12 smallest units of USDC ($1,000,000) survive the scaling
        // without loss.
        let fiat = Decimal::from(1_000_000u64);
        assert_eq!(
            smallest_unit_amount(fiat, SettlementCurrency::Usdc, rate()).unwrap(),
            U256::from(1_000_000_000_000u64)
        );
    }

    #[test]
    fn test_scaling_overflow_fails_loudly() {
        // 10^20 USD in FLOCKA overflows the 28-digit decimal range.
        let fiat = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
        let err =
            smallest_unit_amount(fiat, SettlementCurrency::Flocka, rate()).unwrap_err();
        assert_eq!(err, AmountError::Overflow);
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(format_token_amount(Decimal::from(250_000u64)), "250,000");
        assert_eq!(format_token_amount(Decimal::new(123456789, 3)), "123,456.79");
        assert_eq!(format_token_amount(Decimal::new(100, 0)), "100");
        assert_eq!(format_token_amount(Decimal::new(9995, 3)), "10");
    }
}
