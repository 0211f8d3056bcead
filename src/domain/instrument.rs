//! Instrument identity used to key open-lot books.

use crate::domain::{Decimal, InstrumentClass, OptionType, Symbol};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact identity of one option contract.
///
/// Two contracts differing only in expiry or strike are distinct books.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub symbol: Symbol,
    pub expiry: NaiveDate,
    pub strike: Decimal,
    /// Absent when the export carries no option-type column.
    pub option_type: Option<OptionType>,
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.symbol, self.expiry, self.strike)?;
        if let Some(option_type) = self.option_type {
            write!(f, " {}", option_type)?;
        }
        Ok(())
    }
}

/// What a trade was executed on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum InstrumentKey {
    Option(OptionContract),
    #[serde(rename = "cash_underlying")]
    Cash { symbol: Symbol },
}

impl InstrumentKey {
    pub fn cash(symbol: Symbol) -> Self {
        InstrumentKey::Cash { symbol }
    }

    pub fn class(&self) -> InstrumentClass {
        match self {
            InstrumentKey::Option(_) => InstrumentClass::Option,
            InstrumentKey::Cash { .. } => InstrumentClass::CashUnderlying,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        match self {
            InstrumentKey::Option(contract) => &contract.symbol,
            InstrumentKey::Cash { symbol } => symbol,
        }
    }

    pub fn as_option(&self) -> Option<&OptionContract> {
        match self {
            InstrumentKey::Option(contract) => Some(contract),
            InstrumentKey::Cash { .. } => None,
        }
    }
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentKey::Option(contract) => write!(f, "{}", contract),
            InstrumentKey::Cash { symbol } => write!(f, "{}", symbol),
        }
    }
}
