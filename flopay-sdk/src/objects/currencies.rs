use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The currencies a buyer can settle an order in.
///
/// Both are ERC-20 contracts on the same chain; there is no native-asset
/// payment path.
#[serde(rename_all = "UPPERCASE")]
pub enum SettlementCurrency {
    /// USDC stablecoin, pegged 1:1 to USD.
    Usdc,
    /// The $FLOCKA project token, converted from USD at a fixed rate.
    Flocka,
}

impl SettlementCurrency {
    /// Decimal precision of the token contract.
    pub fn decimals(self) -> u32 {
        match self {
            SettlementCurrency::Usdc => 6,
            SettlementCurrency::Flocka => 18,
        }
    }

    /// Ticker symbol as shown to the buyer.
    pub fn symbol(self) -> &'static str {
        match self {
            SettlementCurrency::Usdc => "USDC",
            SettlementCurrency::Flocka => "FLOCKA",
        }
    }
}

impl std::fmt::Display for SettlementCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_decimals() {
        assert_eq!(SettlementCurrency::Usdc.decimals(), 6);
        assert_eq!(SettlementCurrency::Flocka.decimals(), 18);
    }
}
