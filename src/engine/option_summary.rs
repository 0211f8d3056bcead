//! Per-contract spans and month-wise option P&L.
//!
//! Both work on raw option cash flows and are independent of lot matching.

use crate::domain::holding::{days_to_months, whole_days};
use crate::domain::{
    Decimal, MonthlyOptionPnl, MonthlyOptionTotal, OptionContract, OptionContractSpan, Side,
    TimeMs, Trade,
};
use crate::error::AnalysisError;
use std::collections::BTreeMap;

struct SpanAcc {
    entry: TimeMs,
    exit: TimeMs,
    trade_count: usize,
}

/// First and last trade per option contract, ordered by contract.
pub fn contract_spans(trades: &[Trade]) -> Vec<OptionContractSpan> {
    let mut spans: BTreeMap<&OptionContract, SpanAcc> = BTreeMap::new();

    for trade in trades {
        let Some(contract) = trade.instrument.as_option() else {
            continue;
        };
        spans
            .entry(contract)
            .and_modify(|acc| {
                acc.entry = acc.entry.min(trade.time_ms);
                acc.exit = acc.exit.max(trade.time_ms);
                acc.trade_count += 1;
            })
            .or_insert(SpanAcc {
                entry: trade.time_ms,
                exit: trade.time_ms,
                trade_count: 1,
            });
    }

    spans
        .into_iter()
        .map(|(contract, acc)| {
            let holding_days = whole_days(acc.exit.millis_since(acc.entry));
            OptionContractSpan {
                contract: contract.clone(),
                entry_time_ms: acc.entry,
                exit_time_ms: acc.exit,
                holding_days,
                holding_months: days_to_months(holding_days),
                trade_count: acc.trade_count,
            }
        })
        .collect()
}

struct MonthAcc {
    first_side: Side,
    contracts: Decimal,
    pnl: Decimal,
}

/// Cash-flow P&L per (month, contract). Trades must be in ledger order.
pub fn monthly_option_pnl(trades: &[Trade]) -> Result<Vec<MonthlyOptionPnl>, AnalysisError> {
    let mut months: BTreeMap<(String, &OptionContract), MonthAcc> = BTreeMap::new();

    for trade in trades {
        let Some(contract) = trade.instrument.as_option() else {
            continue;
        };
        let Some(month) = trade.time_ms.month_key() else {
            continue;
        };

        let acc = months.entry((month, contract)).or_insert(MonthAcc {
            first_side: trade.side,
            contracts: Decimal::zero(),
            pnl: Decimal::zero(),
        });
        let overflow = || {
            AnalysisError::overflow(format!("monthly option P&L at row {}", trade.row_index))
        };
        acc.contracts = acc
            .contracts
            .checked_add(trade.quantity)
            .ok_or_else(overflow)?;
        acc.pnl = trade
            .cashflow()
            .and_then(|flow| acc.pnl.checked_add(flow))
            .ok_or_else(overflow)?;
    }

    Ok(months
        .into_iter()
        .map(|((month, contract), acc)| MonthlyOptionPnl {
            month,
            contract: contract.clone(),
            first_side: acc.first_side,
            contracts: acc.contracts,
            pnl: acc.pnl,
        })
        .collect())
}

/// Month-wise totals of `monthly_option_pnl` output, ordered by month.
pub fn monthly_option_totals(
    rows: &[MonthlyOptionPnl],
) -> Result<Vec<MonthlyOptionTotal>, AnalysisError> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for row in rows {
        let total = totals.entry(row.month.as_str()).or_default();
        *total = total
            .checked_add(row.pnl)
            .ok_or_else(|| AnalysisError::overflow(format!("option P&L for {}", row.month)))?;
    }

    Ok(totals
        .into_iter()
        .map(|(month, pnl)| MonthlyOptionTotal {
            month: month.to_string(),
            pnl,
        })
        .collect())
}
