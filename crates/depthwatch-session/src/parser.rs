//! Frame decoding for the depth stream.
//!
//! A frame is JSON with `e` (event type), `a` (ask levels) and `b` (bid
//! levels), each level an array of decimal strings `[price, quantity, ...]`.
//! Only `"depthUpdate"` frames are decoded into a [`DepthUpdate`]; frames
//! carrying any other event type, including the subscribe ack (which has no
//! `e` at all), are discarded silently. Malformed payloads are fatal to the
//! session — there is no partial recovery.

use crate::error::{SessionError, SessionResult};
use depthwatch_core::{DepthUpdate, Price, PriceLevel, Size, DEPTH_UPDATE_EVENT};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawDepthUpdate {
    #[serde(rename = "e")]
    event_type: String,
    #[serde(rename = "a", default)]
    asks: Vec<RawLevel>,
    #[serde(rename = "b", default)]
    bids: Vec<RawLevel>,
}

/// `[price, quantity]` as strings; trailing entries are ignored.
#[derive(Debug, Deserialize)]
struct RawLevel(Vec<String>);

/// Decode one raw frame.
///
/// Returns `Ok(None)` for valid JSON that is not a depth update, and
/// `Err` for anything that fails to decode as one.
pub fn decode_depth_update(text: &str) -> SessionResult<Option<DepthUpdate>> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| SessionError::Decode(format!("Malformed frame: {e}")))?;

    // Probe the event tag before committing to the depth schema, so that
    // ignored event types are never decode errors.
    match value.get("e").and_then(|v| v.as_str()) {
        Some(DEPTH_UPDATE_EVENT) => {}
        _ => return Ok(None),
    }

    let raw: RawDepthUpdate = serde_json::from_value(value)
        .map_err(|e| SessionError::Decode(format!("Invalid depth update: {e}")))?;

    Ok(Some(DepthUpdate {
        event_type: raw.event_type,
        asks: decode_levels(raw.asks)?,
        bids: decode_levels(raw.bids)?,
    }))
}

fn decode_levels(raw: Vec<RawLevel>) -> SessionResult<Vec<PriceLevel>> {
    raw.into_iter().map(decode_level).collect()
}

fn decode_level(level: RawLevel) -> SessionResult<PriceLevel> {
    let [price, quantity, ..] = level.0.as_slice() else {
        return Err(SessionError::Decode(format!(
            "Level too short: {:?}",
            level.0
        )));
    };

    let price: Price = price
        .parse()
        .map_err(|_| SessionError::Decode(format!("Invalid price: {price}")))?;
    let quantity: Size = quantity
        .parse()
        .map_err(|_| SessionError::Decode(format!("Invalid quantity: {quantity}")))?;

    Ok(PriceLevel::new(price, quantity))
}
