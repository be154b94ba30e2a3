//! Core domain types for the depthwatch market-depth monitor.
//!
//! This crate provides the fundamental types shared by the feed and session
//! layers:
//! - `Price`, `Size`: precision-safe numeric types
//! - `DepthUpdate`, `PriceLevel`: decoded feed messages
//! - `FilterEvent`, `Side`: threshold-crossing output records
//! - `SessionConfig`: validated per-session parameters

pub mod config;
pub mod decimal;
pub mod error;
pub mod types;

pub use config::SessionConfig;
pub use decimal::{Price, Size};
pub use error::{CoreError, CoreResult};
pub use types::{DepthUpdate, FilterEvent, PriceLevel, Side, DEPTH_UPDATE_EVENT, VALUE_DECIMALS};
