//! DivLab Core — market data domain types, Yahoo client, dividend analysis.
//!
//! This crate contains:
//! - Domain types (bars, dividend and split events, ticker metadata)
//! - The `MarketDataProvider` trait and its Yahoo Finance implementation
//! - Sequential multi-ticker batch fetch with a randomized politeness throttle
//! - Pure reshaping: dividend enrichment, combined tables, pivots,
//!   the dividend-impact calendar and its summary statistics

pub mod analysis;
pub mod data;
pub mod domain;
