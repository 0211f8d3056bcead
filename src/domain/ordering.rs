//! Stable trade ordering for deterministic matching.

use crate::domain::Trade;

/// Stable ordering key for trades.
///
/// Ordering: time_ms -> row_index (file order breaks timestamp ties).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TradeOrderingKey {
    pub time_ms: i64,
    pub row_index: usize,
}

impl TradeOrderingKey {
    pub fn from_trade(trade: &Trade) -> Self {
        TradeOrderingKey {
            time_ms: trade.time_ms.as_ms(),
            row_index: trade.row_index,
        }
    }
}

/// Sort trades ascending by time, ties in file row order.
pub fn sort_trades_deterministic(trades: &mut [Trade]) {
    trades.sort_by_key(TradeOrderingKey::from_trade);
}
