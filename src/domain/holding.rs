//! Open lots and the holding records produced by matching them.

use crate::domain::{Decimal, InstrumentKey, Side, TimeMs, Trade};
use crate::error::AnalysisError;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};

const MS_PER_DAY: i64 = 86_400_000;

/// Average days per month used for month conversions.
pub fn days_per_month() -> Decimal {
    Decimal::new(RustDecimal::new(3044, 2))
}

/// Whole days to months, rounded to 2 dp.
pub fn days_to_months(days: i64) -> Decimal {
    (Decimal::from_i64(days) / days_per_month()).round_dp(2)
}

/// Whole days to years (365-day year), rounded to 2 dp.
pub fn days_to_years(days: i64) -> Decimal {
    (Decimal::from_i64(days) / Decimal::from_i64(365)).round_dp(2)
}

/// Whole elapsed days between two instants (truncated).
pub fn whole_days(ms: i64) -> i64 {
    ms / MS_PER_DAY
}

/// Opening quantity not yet consumed by closing trades.
///
/// Owned by the matcher that created it and dropped once `remaining_quantity` hits zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenLot {
    pub origin: Trade,
    pub remaining_quantity: Decimal,
}

impl OpenLot {
    pub fn new(origin: Trade) -> Self {
        let remaining_quantity = origin.quantity;
        Self {
            origin,
            remaining_quantity,
        }
    }

    /// Lot opened by the excess of a closing trade.
    pub fn from_excess(origin: Trade, quantity: Decimal) -> Self {
        Self {
            origin,
            remaining_quantity: quantity,
        }
    }

    /// Side that opened the lot: Buy = long, Sell = short.
    pub fn direction(&self) -> Side {
        self.origin.side
    }

    pub fn is_exhausted(&self) -> bool {
        !self.remaining_quantity.is_positive()
    }

    /// Unrealized P&L of the remaining quantity at `mark_price`; `None` on overflow.
    pub fn unrealized_pnl(&self, mark_price: Decimal) -> Option<Decimal> {
        signed_pnl(
            self.direction(),
            self.origin.price,
            mark_price,
            self.remaining_quantity,
        )
    }
}

fn signed_pnl(
    direction: Side,
    open_price: Decimal,
    close_price: Decimal,
    qty: Decimal,
) -> Option<Decimal> {
    close_price
        .checked_sub(open_price)?
        .checked_mul(qty)?
        .checked_mul(Decimal::from_i64(direction.sign().into()))
}

/// Result of pairing (part of) an open lot with a closing trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedHolding {
    pub instrument: InstrumentKey,
    pub direction: Side,
    pub open_trade_key: String,
    pub close_trade_key: String,
    pub open_row: usize,
    pub close_row: usize,
    pub open_time_ms: TimeMs,
    pub close_time_ms: TimeMs,
    pub open_price: Decimal,
    pub close_price: Decimal,
    pub matched_quantity: Decimal,
    pub realized_pnl: Decimal,
    pub holding_ms: i64,
    pub holding_days: i64,
    pub holding_months: Decimal,
}

impl MatchedHolding {
    pub fn new(
        lot: &OpenLot,
        close: &Trade,
        matched_quantity: Decimal,
    ) -> Result<Self, AnalysisError> {
        let open = &lot.origin;
        let realized_pnl = signed_pnl(lot.direction(), open.price, close.price, matched_quantity)
            .ok_or_else(|| {
                AnalysisError::overflow(format!(
                    "realized P&L of rows {} -> {}",
                    open.row_index, close.row_index
                ))
            })?;
        let holding_ms = close.time_ms.millis_since(open.time_ms);
        let holding_days = whole_days(holding_ms);
        Ok(Self {
            instrument: close.instrument.clone(),
            direction: lot.direction(),
            open_trade_key: open.trade_key.clone(),
            close_trade_key: close.trade_key.clone(),
            open_row: open.row_index,
            close_row: close.row_index,
            open_time_ms: open.time_ms,
            close_time_ms: close.time_ms,
            open_price: open.price,
            close_price: close.price,
            matched_quantity,
            realized_pnl,
            holding_ms,
            holding_days,
            holding_months: days_to_months(holding_days),
        })
    }
}

/// Residual open quantity at the end of an analysis, marked to the last observed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidualLot {
    pub instrument: InstrumentKey,
    pub direction: Side,
    pub open_trade_key: String,
    pub open_time_ms: TimeMs,
    pub open_price: Decimal,
    pub remaining_quantity: Decimal,
    pub mark_price: Decimal,
    pub unrealized_pnl: Decimal,
}

impl ResidualLot {
    pub fn from_lot(lot: &OpenLot, mark_price: Decimal) -> Result<Self, AnalysisError> {
        let unrealized_pnl = lot.unrealized_pnl(mark_price).ok_or_else(|| {
            AnalysisError::overflow(format!("unrealized P&L of row {}", lot.origin.row_index))
        })?;
        Ok(Self {
            instrument: lot.origin.instrument.clone(),
            direction: lot.direction(),
            open_trade_key: lot.origin.trade_key.clone(),
            open_time_ms: lot.origin.time_ms,
            open_price: lot.origin.price,
            remaining_quantity: lot.remaining_quantity,
            mark_price,
            unrealized_pnl,
        })
    }
}

/// Closing quantity that found nothing to close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedClose {
    pub instrument: InstrumentKey,
    pub trade_key: String,
    pub row_index: usize,
    pub time_ms: TimeMs,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl UnmatchedClose {
    pub fn new(trade: &Trade, quantity: Decimal) -> Self {
        Self {
            instrument: trade.instrument.clone(),
            trade_key: trade.trade_key.clone(),
            row_index: trade.row_index,
            time_ms: trade.time_ms,
            side: trade.side,
            quantity,
            price: trade.price,
        }
    }
}
