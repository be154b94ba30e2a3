//! Feed message and output record types.

use crate::decimal::{Price, Size};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Event type tag that triggers processing. Messages carrying any other
/// tag (subscribe acks, trades) are discarded silently.
pub const DEPTH_UPDATE_EVENT: &str = "depthUpdate";

/// Decimal places the notional value is rounded to before the threshold
/// comparison and on the emitted event. The source feed reports prices to
/// this quote-asset precision.
pub const VALUE_DECIMALS: u32 = 2;

/// Order-book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Ask,
    Bid,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ask => write!(f, "ask"),
            Self::Bid => write!(f, "bid"),
        }
    }
}

/// One (price, quantity) pair at a given order-book depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: Price,
    pub quantity: Size,
}

impl PriceLevel {
    pub fn new(price: Price, quantity: Size) -> Self {
        Self { price, quantity }
    }

    /// Notional value of the level: price * quantity. Derived, never stored.
    #[inline]
    pub fn value(&self) -> Decimal {
        self.quantity.notional(self.price)
    }
}

/// One decoded feed message: changed price levels on both sides.
///
/// Transient — constructed per frame, discarded after filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthUpdate {
    /// Event type tag; only [`DEPTH_UPDATE_EVENT`] is processed.
    pub event_type: String,
    pub asks: Vec<PriceLevel>,
    pub bids: Vec<PriceLevel>,
}

/// A threshold-crossing level, as computed at detection time.
///
/// Immutable once created. `value` is rounded to [`VALUE_DECIMALS`] places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterEvent {
    pub side: Side,
    pub price: Price,
    pub quantity: Size,
    pub value: Decimal,
    pub observed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_level_value() {
        let level = PriceLevel::new(Price::new(dec!(20000.00)), Size::new(dec!(1.5)));
        assert_eq!(level.value(), dec!(30000.000));
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Ask.to_string(), "ask");
        assert_eq!(Side::Bid.to_string(), "bid");
    }

    #[test]
    fn test_filter_event_serializes_side_lowercase() {
        let event = FilterEvent {
            side: Side::Bid,
            price: Price::new(dec!(100)),
            quantity: Size::new(dec!(2)),
            value: dec!(200.00),
            observed_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["side"], "bid");
    }
}
