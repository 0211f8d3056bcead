//! Pure computation engine(s) for holding-period matching and performance metrics.

use crate::config::AnalysisPolicy;
use crate::domain::{MatchedHolding, OpenLot, Trade, UnmatchedClose};
use crate::error::AnalysisError;

pub mod aggregator;
pub mod contract_matcher;
pub mod fifo_matcher;
pub mod lot_queue;
pub mod option_summary;

pub use aggregator::PerformanceAggregator;
pub use contract_matcher::ContractMatcher;
pub use fifo_matcher::FifoMatcher;
pub use lot_queue::{LotQueue, QueueEffect};

/// Everything one matcher produced over a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchOutput {
    /// In the ledger order of their closing trades.
    pub holdings: Vec<MatchedHolding>,
    /// Grouped by book key, FIFO order within a book.
    pub residual_lots: Vec<OpenLot>,
    pub unmatched_closes: Vec<UnmatchedClose>,
}

/// Matching results for both instrument classes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerMatches {
    pub options: MatchOutput,
    pub cash: MatchOutput,
}

/// Route every trade of a time-ordered ledger through the matcher for its class.
pub fn match_ledger(
    trades: &[Trade],
    policy: &AnalysisPolicy,
) -> Result<LedgerMatches, AnalysisError> {
    let mut contracts = ContractMatcher::new();
    let mut fifo = FifoMatcher::new(policy.flip);

    for trade in trades {
        contracts.process_trade(trade)?;
        fifo.process_trade(trade)?;
    }

    Ok(LedgerMatches {
        options: contracts.into_output(),
        cash: fifo.into_output(),
    })
}
