//! Aggregate output of one analysis run.

use crate::domain::{
    Decimal, MatchedHolding, OptionContract, ResidualLot, Side, TimeMs, UnmatchedClose,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cumulative realized P&L after one matched close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub time_ms: TimeMs,
    pub cumulative_pnl: Decimal,
}

/// First-to-last trade span of one option contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContractSpan {
    pub contract: OptionContract,
    pub entry_time_ms: TimeMs,
    pub exit_time_ms: TimeMs,
    pub holding_days: i64,
    pub holding_months: Decimal,
    pub trade_count: usize,
}

/// Option cash-flow P&L for one contract within one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyOptionPnl {
    /// `YYYY-MM`
    pub month: String,
    pub contract: OptionContract,
    /// Side of the first trade on this contract in the month.
    pub first_side: Side,
    /// Total quantity traded, both sides.
    pub contracts: Decimal,
    pub pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyOptionTotal {
    pub month: String,
    pub pnl: Decimal,
}

/// Everything the presentation layer renders. Built once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub trade_count: usize,
    pub capital: Decimal,
    /// Realized plus, when marking is enabled, unrealized P&L.
    pub total_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    /// total_pnl / capital * 100, rounded to 4 dp.
    pub overall_return_pct: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time_ms: Option<TimeMs>,
    pub end_time_ms: Option<TimeMs>,
    pub duration_days: i64,
    pub duration_months: Decimal,
    pub duration_years: Decimal,
    pub equity_curve: Vec<EquityPoint>,
    pub option_holdings: Vec<MatchedHolding>,
    pub cash_holdings: Vec<MatchedHolding>,
    pub residual_lots: Vec<ResidualLot>,
    pub unmatched_closes: Vec<UnmatchedClose>,
    pub option_contract_spans: Vec<OptionContractSpan>,
    pub monthly_option_pnl: Vec<MonthlyOptionPnl>,
    pub monthly_option_totals: Vec<MonthlyOptionTotal>,
}
