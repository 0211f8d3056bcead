pub mod analysis;
pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;

pub use analysis::Analyzer;
pub use config::{AnalysisPolicy, Config, FlipPolicy, UnrealizedPolicy};
pub use domain::{
    AnalysisResult, Decimal, InstrumentClass, InstrumentKey, MatchedHolding, OptionContract,
    OptionType, Side, Symbol, TimeMs, Trade,
};
pub use error::{AnalysisError, AppError};
pub use ingest::ExportFormat;
