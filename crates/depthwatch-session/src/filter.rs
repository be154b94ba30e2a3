//! Threshold filtering of decoded depth updates.

use chrono::Utc;
use depthwatch_core::{
    DepthUpdate, FilterEvent, PriceLevel, SessionConfig, Side, VALUE_DECIMALS,
};
use rust_decimal::Decimal;

/// Apply both side thresholds to one update.
///
/// A level crosses when its notional value, rounded to [`VALUE_DECIMALS`]
/// places, meets or exceeds the side's threshold. Events are emitted asks
/// first, then bids, each side in feed order; an update with no qualifying
/// level yields an empty vector.
pub fn filter_update(update: &DepthUpdate, config: &SessionConfig) -> Vec<FilterEvent> {
    let mut events = Vec::new();
    collect_side(&update.asks, Side::Ask, config.ask_threshold, &mut events);
    collect_side(&update.bids, Side::Bid, config.bid_threshold, &mut events);
    events
}

fn collect_side(
    levels: &[PriceLevel],
    side: Side,
    threshold: Decimal,
    out: &mut Vec<FilterEvent>,
) {
    for level in levels {
        let value = level.value().round_dp(VALUE_DECIMALS);
        if value >= threshold {
            out.push(FilterEvent {
                side,
                price: level.price,
                quantity: level.quantity,
                value,
                observed_at: Utc::now(),
            });
        }
    }
}
