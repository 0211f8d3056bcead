use crate::config::UnrealizedPolicy;
use crate::domain::holding::{days_to_months, days_to_years, whole_days};
use crate::domain::{
    AnalysisResult, Decimal, EquityPoint, InstrumentKey, MatchedHolding, ResidualLot, TimeMs,
    Trade,
};
use crate::error::AnalysisError;
use std::collections::BTreeMap;

use super::option_summary;
use super::LedgerMatches;

/// Folds a normalized ledger and its matches into the final `AnalysisResult`.
pub struct PerformanceAggregator {
    unrealized: UnrealizedPolicy,
}

impl PerformanceAggregator {
    pub fn new(unrealized: UnrealizedPolicy) -> Self {
        Self { unrealized }
    }

    /// Aggregate one run.
    ///
    /// # Errors
    /// `InvalidCapital` when `capital <= 0`; matching results are unaffected.
    pub fn aggregate(
        &self,
        trades: &[Trade],
        matches: &LedgerMatches,
        capital: Decimal,
    ) -> Result<AnalysisResult, AnalysisError> {
        if !capital.is_positive() {
            return Err(AnalysisError::InvalidCapital(capital));
        }

        let marks = last_prices(trades);
        let residual_lots = matches
            .options
            .residual_lots
            .iter()
            .chain(matches.cash.residual_lots.iter())
            .map(|lot| {
                let mark = marks
                    .get(&lot.origin.instrument)
                    .copied()
                    .unwrap_or(lot.origin.price);
                ResidualLot::from_lot(lot, mark)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let realized_pnl = checked_sum(
            matches
                .options
                .holdings
                .iter()
                .chain(matches.cash.holdings.iter())
                .map(|h| h.realized_pnl),
            "realized P&L",
        )?;
        let unrealized_pnl =
            checked_sum(residual_lots.iter().map(|r| r.unrealized_pnl), "unrealized P&L")?;

        let total_pnl = match self.unrealized {
            UnrealizedPolicy::MarkToLast => realized_pnl
                .checked_add(unrealized_pnl)
                .ok_or_else(|| AnalysisError::overflow("total P&L"))?,
            UnrealizedPolicy::Exclude => realized_pnl,
        };

        let overall_return_pct = total_pnl
            .checked_div(capital)
            .and_then(|ratio| ratio.checked_mul(Decimal::hundred()))
            .map(|pct| pct.round_dp(4))
            .ok_or_else(|| {
                AnalysisError::overflow(format!("return % of {} on capital {}", total_pnl, capital))
            })?;

        let start = trades.iter().map(|t| t.time_ms).min();
        let end = trades.iter().map(|t| t.time_ms).max();
        let duration_days = match (start, end) {
            (Some(start), Some(end)) => whole_days(end.millis_since(start)),
            _ => 0,
        };

        let monthly_option_pnl = option_summary::monthly_option_pnl(trades)?;
        let monthly_option_totals = option_summary::monthly_option_totals(&monthly_option_pnl)?;

        let result = AnalysisResult {
            trade_count: trades.len(),
            capital,
            total_pnl,
            realized_pnl,
            unrealized_pnl,
            overall_return_pct,
            start_date: start.and_then(|t| t.date()),
            end_date: end.and_then(|t| t.date()),
            start_time_ms: start,
            end_time_ms: end,
            duration_days,
            duration_months: days_to_months(duration_days),
            duration_years: days_to_years(duration_days),
            equity_curve: equity_curve(&matches.options.holdings, &matches.cash.holdings)?,
            option_holdings: matches.options.holdings.clone(),
            cash_holdings: matches.cash.holdings.clone(),
            residual_lots,
            unmatched_closes: matches
                .options
                .unmatched_closes
                .iter()
                .chain(matches.cash.unmatched_closes.iter())
                .cloned()
                .collect(),
            option_contract_spans: option_summary::contract_spans(trades),
            monthly_option_pnl,
            monthly_option_totals,
        };

        tracing::info!(
            trades = result.trade_count,
            option_holdings = result.option_holdings.len(),
            cash_holdings = result.cash_holdings.len(),
            residual_lots = result.residual_lots.len(),
            total_pnl = %result.total_pnl,
            return_pct = %result.overall_return_pct,
            "analysis aggregated"
        );

        Ok(result)
    }
}

impl Default for PerformanceAggregator {
    fn default() -> Self {
        Self::new(UnrealizedPolicy::default())
    }
}

/// Last observed trade price per instrument.
fn last_prices(trades: &[Trade]) -> BTreeMap<&InstrumentKey, Decimal> {
    let mut latest: BTreeMap<&InstrumentKey, (TimeMs, usize, Decimal)> = BTreeMap::new();
    for trade in trades {
        let candidate = (trade.time_ms, trade.row_index, trade.price);
        latest
            .entry(&trade.instrument)
            .and_modify(|current| {
                if (candidate.0, candidate.1) > (current.0, current.1) {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }
    latest
        .into_iter()
        .map(|(key, (_, _, price))| (key, price))
        .collect()
}

fn checked_sum(
    mut values: impl Iterator<Item = Decimal>,
    what: &str,
) -> Result<Decimal, AnalysisError> {
    values
        .try_fold(Decimal::zero(), |acc, value| acc.checked_add(value))
        .ok_or_else(|| AnalysisError::overflow(what))
}

/// Running realized P&L, one point per holding, merged across both classes by close.
fn equity_curve(
    options: &[MatchedHolding],
    cash: &[MatchedHolding],
) -> Result<Vec<EquityPoint>, AnalysisError> {
    let mut closes: Vec<&MatchedHolding> = options.iter().chain(cash.iter()).collect();
    closes.sort_by_key(|h| (h.close_time_ms, h.close_row));

    let mut cumulative = Decimal::zero();
    closes
        .into_iter()
        .map(|holding| {
            cumulative = cumulative
                .checked_add(holding.realized_pnl)
                .ok_or_else(|| AnalysisError::overflow("equity curve"))?;
            Ok(EquityPoint {
                time_ms: holding.close_time_ms,
                cumulative_pnl: cumulative,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisPolicy;
    use crate::domain::{Side, Symbol};
    use crate::engine::match_ledger;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn cash(row: usize, time_ms: i64, symbol: &str, side: Side, qty: &str, px: &str) -> Trade {
        Trade::new(
            row,
            TimeMs::new(time_ms),
            InstrumentKey::cash(Symbol::new(symbol.to_string())),
            side,
            d(qty),
            d(px),
        )
    }

    #[test]
    fn last_prices_follow_ledger_order() {
        let trades = vec![
            cash(0, 1000, "TCS", Side::Buy, "1", "100"),
            cash(1, 2000, "TCS", Side::Buy, "1", "105"),
            cash(2, 2000, "TCS", Side::Sell, "1", "104"),
            cash(3, 1500, "INFY", Side::Buy, "1", "50"),
        ];
        let marks = last_prices(&trades);
        let tcs = InstrumentKey::cash(Symbol::new("TCS".to_string()));
        let infy = InstrumentKey::cash(Symbol::new("INFY".to_string()));
        assert_eq!(marks.get(&tcs), Some(&d("104")));
        assert_eq!(marks.get(&infy), Some(&d("50")));
    }

    #[test]
    fn rejects_non_positive_capital() {
        let aggregator = PerformanceAggregator::default();
        let matches = LedgerMatches::default();
        assert_eq!(
            aggregator.aggregate(&[], &matches, Decimal::zero()),
            Err(AnalysisError::InvalidCapital(Decimal::zero()))
        );
        assert_eq!(
            aggregator.aggregate(&[], &matches, d("-5")),
            Err(AnalysisError::InvalidCapital(d("-5")))
        );
    }

    #[test]
    fn empty_ledger_yields_empty_result() {
        let result = PerformanceAggregator::default()
            .aggregate(&[], &LedgerMatches::default(), d("1000"))
            .unwrap();
        assert_eq!(result.trade_count, 0);
        assert_eq!(result.total_pnl, Decimal::zero());
        assert_eq!(result.start_date, None);
        assert_eq!(result.duration_days, 0);
        assert!(result.equity_curve.is_empty());
    }

    #[test]
    fn unrealized_policy_controls_total() {
        let trades = vec![
            cash(0, 0, "TCS", Side::Buy, "10", "100"),
            cash(1, 1000, "TCS", Side::Sell, "4", "110"),
            cash(2, 2000, "INFY", Side::Buy, "1", "50"),
            cash(3, 3000, "INFY", Side::Buy, "1", "60"),
        ];
        let matches = match_ledger(&trades, &AnalysisPolicy::default()).unwrap();

        let marked = PerformanceAggregator::new(UnrealizedPolicy::MarkToLast)
            .aggregate(&trades, &matches, d("1000"))
            .unwrap();
        // Realized 40; TCS 6 left marked at 110 (+60); INFY lots at 50 and 60 marked at 60 (+10).
        assert_eq!(marked.realized_pnl, d("40"));
        assert_eq!(marked.unrealized_pnl, d("70"));
        assert_eq!(marked.total_pnl, d("110"));
        assert_eq!(marked.overall_return_pct, d("11"));

        let excluded = PerformanceAggregator::new(UnrealizedPolicy::Exclude)
            .aggregate(&trades, &matches, d("1000"))
            .unwrap();
        assert_eq!(excluded.total_pnl, d("40"));
        assert_eq!(excluded.unrealized_pnl, d("70"));
        assert_eq!(excluded.residual_lots.len(), 3);
    }

    #[test]
    fn tiny_capital_return_is_out_of_range() {
        let trades = vec![
            cash(0, 0, "TCS", Side::Buy, "10", "100"),
            cash(1, 1000, "TCS", Side::Sell, "10", "200"),
        ];
        let matches = match_ledger(&trades, &AnalysisPolicy::default()).unwrap();
        let err = PerformanceAggregator::default()
            .aggregate(&trades, &matches, d("0.0000000000000000000000001"))
            .unwrap_err();
        assert_eq!(err.kind(), "overflow");
        assert!(err.to_string().starts_with("return %"));
    }

    #[test]
    fn realized_sum_overflow_is_an_error() {
        let trades = vec![
            cash(0, 0, "TCS", Side::Buy, "1", "0"),
            cash(1, 1000, "TCS", Side::Sell, "1", "79228162514264337593543950335"),
            cash(2, 2000, "INFY", Side::Buy, "1", "0"),
            cash(3, 3000, "INFY", Side::Sell, "1", "79228162514264337593543950335"),
        ];
        let matches = match_ledger(&trades, &AnalysisPolicy::default()).unwrap();
        assert_eq!(
            PerformanceAggregator::default().aggregate(&trades, &matches, d("1000")),
            Err(AnalysisError::overflow("realized P&L"))
        );
    }
}
