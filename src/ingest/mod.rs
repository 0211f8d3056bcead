//! Ingestion of platform trade exports.
//!
//! - `export`: document decoding (JSON `.clktrd` or CSV) and the required-column check
//! - `normalizer`: row validation into time-ordered `Trade`s

pub mod export;
pub mod normalizer;

pub use export::{ExportFormat, RawExport, RawRow, REQUIRED_COLUMNS};
pub use normalizer::TradeNormalizer;

use crate::domain::Trade;
use crate::error::AnalysisError;

/// Decode, schema-check and normalize an uploaded export in one step.
pub fn load_trades(bytes: &[u8], format: ExportFormat) -> Result<Vec<Trade>, AnalysisError> {
    let export = RawExport::parse(bytes, format)?;
    TradeNormalizer::normalize(&export)
}
