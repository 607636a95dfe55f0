//! Static USD price table for well-known stablecoins.
//!
//! The last link of the price fallback chain. Matches on token symbol,
//! case-insensitively.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const STABLECOINS: [(&str, Decimal); 12] = [
    ("USDT", dec!(1)),
    ("USDC", dec!(1)),
    ("USDC.E", dec!(1)),
    ("DAI", dec!(1)),
    ("BUSD", dec!(1)),
    ("TUSD", dec!(1)),
    ("USDP", dec!(1)),
    ("GUSD", dec!(1)),
    ("FRAX", dec!(1)),
    ("LUSD", dec!(1)),
    ("USDD", dec!(1)),
    ("PYUSD", dec!(1)),
];

/// Flat stablecoin price lookup.
#[derive(Debug, Clone)]
pub struct StablecoinTable {
    entries: Vec<(String, Decimal)>,
}

impl StablecoinTable {
    /// The built-in table.
    pub fn new() -> Self {
        Self {
            entries: STABLECOINS
                .iter()
                .map(|(s, p)| (s.to_string(), *p))
                .collect(),
        }
    }

    pub fn price_for(&self, symbol: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol.trim()))
            .map(|(_, p)| *p)
    }
}

impl Default for StablecoinTable {
    fn default() -> Self {
        Self::new()
    }
}
