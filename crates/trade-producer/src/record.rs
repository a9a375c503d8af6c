//! Synthetic trade records.
//!
//! Each record draws every field independently from a fixed candidate set or
//! numeric range. Records are encoded as flat JSON objects before they are
//! handed to Kafka.

use rand::Rng;
use serde::Serialize;

/// Ticker symbols a record can carry.
pub const SYMBOLS: [&str; 7] = [
    "ZBZX", "ZJZZT", "ZTEST", "ZVV", "ZVZZT", "ZWZZT", "ZXZZT",
];

/// Accounts a record can be booked against.
pub const ACCOUNTS: [&str; 3] = ["ABC123", "LMN456", "XYZ789"];

/// Inclusive price range.
pub const PRICE_RANGE: std::ops::RangeInclusive<i64> = 5..=1004;

/// Inclusive quantity range.
pub const QUANTITY_RANGE: std::ops::RangeInclusive<i64> = 1..=5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// A simulated trade event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRecord {
    pub symbol: &'static str,
    pub price: i64,
    pub side: Side,
    pub quantity: i64,
    pub account: &'static str,
}

impl TradeRecord {
    /// Draw a random record from `rng`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let symbol = SYMBOLS[rng.random_range(0..SYMBOLS.len())];
        let price = rng.random_range(PRICE_RANGE);
        let side = if rng.random_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };
        let quantity = rng.random_range(QUANTITY_RANGE);
        let account = ACCOUNTS[rng.random_range(0..ACCOUNTS.len())];

        Self {
            symbol,
            price,
            side,
            quantity,
            account,
        }
    }

    /// Encode the record to its JSON wire form.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
