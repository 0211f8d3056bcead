use crate::domain::{MatchedHolding, OptionContract, Trade, UnmatchedClose};
use crate::error::AnalysisError;
use std::collections::BTreeMap;

use super::{LotQueue, MatchOutput};

/// Matcher for option trades, one lot queue per exact contract.
///
/// The first trade on a flat contract sets the direction of that leg. Closes
/// consume the contract's opens FIFO; closing quantity beyond them is reported
/// as unmatched and never opens a position in the other direction.
#[derive(Default)]
pub struct ContractMatcher {
    books: BTreeMap<OptionContract, LotQueue>,
    holdings: Vec<MatchedHolding>,
    unmatched_closes: Vec<UnmatchedClose>,
}

impl ContractMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single trade. Cash trades are skipped.
    pub fn process_trade(&mut self, trade: &Trade) -> Result<(), AnalysisError> {
        let Some(contract) = trade.instrument.as_option() else {
            return Ok(());
        };

        let book = self.books.entry(contract.clone()).or_default();
        let effect = book.apply(trade)?;

        for holding in &effect.holdings {
            tracing::debug!(
                contract = %contract,
                open_row = holding.open_row,
                close_row = holding.close_row,
                qty = %holding.matched_quantity,
                "matched option lot"
            );
        }
        self.holdings.extend(effect.holdings);

        if effect.excess.is_positive() {
            tracing::warn!(
                contract = %contract,
                row = trade.row_index,
                excess = %effect.excess,
                "option close exceeds open quantity for contract"
            );
            self.unmatched_closes
                .push(UnmatchedClose::new(trade, effect.excess));
        }
        Ok(())
    }

    pub fn book(&self, contract: &OptionContract) -> Option<&LotQueue> {
        self.books.get(contract)
    }

    /// Expired or unclosed contracts stay residual; no synthetic close is made.
    pub fn into_output(self) -> MatchOutput {
        MatchOutput {
            holdings: self.holdings,
            residual_lots: self
                .books
                .into_values()
                .flat_map(LotQueue::into_lots)
                .collect(),
            unmatched_closes: self.unmatched_closes,
        }
    }
}
