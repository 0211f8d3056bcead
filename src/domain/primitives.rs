//! Domain primitives: TimeMs, Symbol, Side, OptionType, InstrumentClass.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    pub fn as_ms(&self) -> i64 {
        self.0
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        TimeMs(dt.timestamp_millis())
    }

    /// Convert to a UTC datetime; `None` if outside chrono's representable range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    /// Calendar date (UTC) of this instant.
    pub fn date(&self) -> Option<NaiveDate> {
        self.to_datetime().map(|dt| dt.date_naive())
    }

    /// Calendar month bucket as `YYYY-MM`.
    pub fn month_key(&self) -> Option<String> {
        self.date()
            .map(|date| format!("{:04}-{:02}", date.year(), date.month()))
    }

    /// Milliseconds elapsed from `earlier` to `self`, clamped at zero.
    pub fn millis_since(&self, earlier: TimeMs) -> i64 {
        self.0.saturating_sub(earlier.0).max(0)
    }
}

/// Instrument identifier as exported by the platform (e.g. "NIFTY", "RELIANCE").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(symbol: String) -> Self {
        Symbol(symbol)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trade side: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy side (long).
    Buy,
    /// Sell side (short).
    Sell,
}

impl Side {
    /// Signed multiplier for this side (+1 for Buy, -1 for Sell).
    pub fn sign(&self) -> i32 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "CE"),
            OptionType::Put => write!(f, "PE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentClass {
    Option,
    CashUnderlying,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_sign_and_opposite() {
        assert_eq!(Side::Buy.sign(), 1);
        assert_eq!(Side::Sell.sign(), -1);
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_side_serialization() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&Side::Sell).unwrap(), "\"sell\"");
    }

    #[test]
    fn test_instrument_class_serialization() {
        assert_eq!(
            serde_json::to_string(&InstrumentClass::CashUnderlying).unwrap(),
            "\"cash_underlying\""
        );
    }

    #[test]
    fn test_timems_calendar_helpers() {
        // 2024-03-15T10:30:00Z
        let t = TimeMs::new(1_710_498_600_000);
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(t.month_key().as_deref(), Some("2024-03"));
    }

    #[test]
    fn test_millis_since_clamps_at_zero() {
        let early = TimeMs::new(1000);
        let late = TimeMs::new(4000);
        assert_eq!(late.millis_since(early), 3000);
        assert_eq!(early.millis_since(late), 0);
    }

    #[test]
    fn test_option_type_display() {
        assert_eq!(OptionType::Call.to_string(), "CE");
        assert_eq!(OptionType::Put.to_string(), "PE");
    }
}
