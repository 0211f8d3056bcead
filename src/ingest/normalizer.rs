//! Row normalization: raw export cells -> validated, time-ordered `Trade`s.

use crate::domain::ordering::sort_trades_deterministic;
use crate::domain::{
    Decimal, InstrumentClass, InstrumentKey, OptionContract, OptionType, Side, Symbol, TimeMs,
    Trade,
};
use crate::error::AnalysisError;
use crate::ingest::export::{
    RawExport, RawRow, COL_EXPIRY, COL_INSTRUMENT_TYPE, COL_OPTION_TYPE, COL_POSITION,
    COL_QUANTITY, COL_STRIKE, COL_TICKER, COL_TRADED_PRICE, COL_TRADED_TIME,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%b-%Y", "%d%b%Y", "%d-%m-%Y"];

pub struct TradeNormalizer;

impl TradeNormalizer {
    /// Normalize every row, halting on the first malformed one.
    ///
    /// Output is sorted by timestamp; ties keep file order.
    pub fn normalize(export: &RawExport) -> Result<Vec<Trade>, AnalysisError> {
        let mut trades = export
            .rows
            .iter()
            .map(Self::normalize_row)
            .collect::<Result<Vec<_>, _>>()?;

        sort_trades_deterministic(&mut trades);

        tracing::debug!(rows = trades.len(), "normalized export rows");
        Ok(trades)
    }

    pub fn normalize_row(row: &RawRow) -> Result<Trade, AnalysisError> {
        let symbol = Symbol::new(required(row, COL_TICKER)?.to_string());

        let side_raw = required(row, COL_POSITION)?;
        let side = parse_side(side_raw).ok_or_else(|| {
            AnalysisError::malformed(row.index, COL_POSITION, format!("invalid side: {}", side_raw))
        })?;

        let quantity = decimal_cell(row, COL_QUANTITY)?;
        if !quantity.is_positive() {
            return Err(AnalysisError::malformed(
                row.index,
                COL_QUANTITY,
                format!("quantity must be positive, got {}", quantity),
            ));
        }

        let price = decimal_cell(row, COL_TRADED_PRICE)?;
        if price.is_negative() {
            return Err(AnalysisError::malformed(
                row.index,
                COL_TRADED_PRICE,
                format!("price must not be negative, got {}", price),
            ));
        }
        if price.checked_mul(quantity).is_none() {
            return Err(AnalysisError::malformed(
                row.index,
                COL_TRADED_PRICE,
                format!("notional {} x {} is out of range", price, quantity),
            ));
        }

        let time_raw = required(row, COL_TRADED_TIME)?;
        let time_ms = parse_timestamp(time_raw).ok_or_else(|| {
            AnalysisError::malformed(
                row.index,
                COL_TRADED_TIME,
                format!("invalid timestamp: {}", time_raw),
            )
        })?;

        let instrument = match instrument_class(row)? {
            InstrumentClass::CashUnderlying => InstrumentKey::cash(symbol),
            InstrumentClass::Option => InstrumentKey::Option(option_contract(row, symbol)?),
        };

        Ok(Trade::new(row.index, time_ms, instrument, side, quantity, price))
    }
}

fn required<'a>(row: &'a RawRow, column: &str) -> Result<&'a str, AnalysisError> {
    row.cell(column).ok_or_else(|| {
        let reason = if row.has_column(column) {
            "missing value"
        } else {
            "missing field"
        };
        AnalysisError::malformed(row.index, column, reason)
    })
}

fn decimal_cell(row: &RawRow, column: &str) -> Result<Decimal, AnalysisError> {
    let raw = required(row, column)?;
    Decimal::from_str_canonical(raw)
        .map_err(|_| AnalysisError::malformed(row.index, column, format!("not a number: {}", raw)))
}

/// Explicit `InstrumentType` wins; otherwise a strike marks an option row.
fn instrument_class(row: &RawRow) -> Result<InstrumentClass, AnalysisError> {
    match row.cell(COL_INSTRUMENT_TYPE) {
        Some(raw) => parse_instrument_class(raw).ok_or_else(|| {
            AnalysisError::malformed(
                row.index,
                COL_INSTRUMENT_TYPE,
                format!("unsupported instrument type: {}", raw),
            )
        }),
        None if row.cell(COL_STRIKE).is_some() => Ok(InstrumentClass::Option),
        None => Ok(InstrumentClass::CashUnderlying),
    }
}

fn option_contract(row: &RawRow, symbol: Symbol) -> Result<OptionContract, AnalysisError> {
    let strike = decimal_cell(row, COL_STRIKE)?;
    if !strike.is_positive() {
        return Err(AnalysisError::malformed(
            row.index,
            COL_STRIKE,
            format!("strike must be positive, got {}", strike),
        ));
    }

    let expiry_raw = required(row, COL_EXPIRY)?;
    let expiry = parse_date(expiry_raw).ok_or_else(|| {
        AnalysisError::malformed(row.index, COL_EXPIRY, format!("invalid date: {}", expiry_raw))
    })?;

    let option_type = row
        .cell(COL_OPTION_TYPE)
        .map(|raw| {
            parse_option_type(raw).ok_or_else(|| {
                AnalysisError::malformed(
                    row.index,
                    COL_OPTION_TYPE,
                    format!("invalid option type: {}", raw),
                )
            })
        })
        .transpose()?;

    Ok(OptionContract {
        symbol,
        expiry,
        strike,
        option_type,
    })
}

/// `1`/`-1` as exported, or textual buy/sell.
pub fn parse_side(s: &str) -> Option<Side> {
    match s.trim().to_ascii_lowercase().as_str() {
        "buy" | "b" => return Some(Side::Buy),
        "sell" | "s" => return Some(Side::Sell),
        _ => {}
    }

    let value = Decimal::from_str_canonical(s).ok()?;
    if value == Decimal::one() {
        Some(Side::Buy)
    } else if value == -Decimal::one() {
        Some(Side::Sell)
    } else {
        None
    }
}

pub fn parse_option_type(s: &str) -> Option<OptionType> {
    match s.trim().to_ascii_uppercase().as_str() {
        "CE" | "CALL" | "C" => Some(OptionType::Call),
        "PE" | "PUT" | "P" => Some(OptionType::Put),
        _ => None,
    }
}

fn parse_instrument_class(s: &str) -> Option<InstrumentClass> {
    match s.trim().to_ascii_uppercase().as_str() {
        "OPTION" | "OPTIONS" | "OPT" | "OPTIDX" | "OPTSTK" => Some(InstrumentClass::Option),
        "CASH" | "EQ" | "EQUITY" | "UNDERLYING" | "STOCK" => Some(InstrumentClass::CashUnderlying),
        _ => None,
    }
}

/// Parse an execution time; naive values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<TimeMs> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(TimeMs::from_datetime(dt.with_timezone(&Utc)));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(TimeMs::from_datetime(naive.and_utc()));
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| TimeMs::from_datetime(naive.and_utc()))
}

/// Parse an expiry; full timestamps are truncated to their date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .or_else(|| parse_timestamp(s).and_then(|t| t.date()))
}
