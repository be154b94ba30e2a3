//! Per-session configuration.

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;

/// Parameters captured at session start, immutable for the lifetime of
/// one session. Thresholds never change mid-session. Only constructible
/// through [`SessionConfig::new`], which enforces the validation rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Lower-cased trading pair identifier, e.g. "btcusdt".
    symbol: String,
    /// Minimum notional value for an ask level to be surfaced.
    pub ask_threshold: Decimal,
    /// Minimum notional value for a bid level to be surfaced.
    pub bid_threshold: Decimal,
}

impl SessionConfig {
    /// Build a validated config. The symbol is lower-cased; it must be
    /// non-empty and both thresholds must be non-negative.
    pub fn new(
        symbol: impl Into<String>,
        ask_threshold: Decimal,
        bid_threshold: Decimal,
    ) -> CoreResult<Self> {
        let symbol = symbol.into().trim().to_lowercase();
        if symbol.is_empty() {
            return Err(CoreError::EmptySymbol);
        }
        for threshold in [ask_threshold, bid_threshold] {
            if threshold.is_sign_negative() {
                return Err(CoreError::NegativeThreshold(threshold));
            }
        }
        Ok(Self {
            symbol,
            ask_threshold,
            bid_threshold,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}
