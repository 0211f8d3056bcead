//! Domain types and determinism layer for trade-history analysis.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Symbol, Side, OptionType, InstrumentClass
//! - Instrument identity (cash symbol or exact option contract)
//! - Trade, open lot and matched holding types
//! - Stable trade ordering helper for deterministic matching
//! - The aggregate analysis result

pub mod decimal;
pub mod holding;
pub mod instrument;
pub mod ordering;
pub mod primitives;
pub mod report;
pub mod trade;

pub use decimal::Decimal;
pub use holding::{MatchedHolding, OpenLot, ResidualLot, UnmatchedClose};
pub use instrument::{InstrumentKey, OptionContract};
pub use ordering::TradeOrderingKey;
pub use primitives::{InstrumentClass, OptionType, Side, Symbol, TimeMs};
pub use report::{
    AnalysisResult, EquityPoint, MonthlyOptionPnl, MonthlyOptionTotal, OptionContractSpan,
};
pub use trade::Trade;
