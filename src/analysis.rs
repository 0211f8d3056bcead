//! One analysis run: export bytes + capital -> `AnalysisResult`.
//!
//! Every run builds fresh matchers and an aggregator; nothing is cached between runs.

use crate::config::AnalysisPolicy;
use crate::domain::{AnalysisResult, Decimal, Trade};
use crate::engine::{match_ledger, PerformanceAggregator};
use crate::error::AnalysisError;
use crate::ingest::{self, ExportFormat};

#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer {
    policy: AnalysisPolicy,
}

impl Analyzer {
    pub fn new(policy: AnalysisPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AnalysisPolicy {
        &self.policy
    }

    /// Decode, normalize, match and aggregate an uploaded export.
    ///
    /// # Errors
    /// `UnsupportedSchema` before any row is read, `MalformedRow` on the first bad
    /// row, `InvalidCapital` after matching when `capital <= 0`.
    pub fn analyze(
        &self,
        bytes: &[u8],
        format: ExportFormat,
        capital: Decimal,
    ) -> Result<AnalysisResult, AnalysisError> {
        let trades = ingest::load_trades(bytes, format)?;
        self.analyze_trades(&trades, capital)
    }

    /// Analyze an already-normalized, time-ordered ledger.
    pub fn analyze_trades(
        &self,
        trades: &[Trade],
        capital: Decimal,
    ) -> Result<AnalysisResult, AnalysisError> {
        let matches = match_ledger(trades, &self.policy)?;
        PerformanceAggregator::new(self.policy.unrealized).aggregate(trades, &matches, capital)
    }
}
