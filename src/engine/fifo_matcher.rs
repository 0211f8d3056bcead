use crate::config::FlipPolicy;
use crate::domain::{InstrumentClass, MatchedHolding, OpenLot, Symbol, Trade, UnmatchedClose};
use crate::error::AnalysisError;
use std::collections::BTreeMap;

use super::{LotQueue, MatchOutput};

/// FIFO matcher for cash/underlying trades, one lot queue per symbol.
///
/// Trades must be fed in ledger order (time, then file row).
pub struct FifoMatcher {
    flip_policy: FlipPolicy,
    books: BTreeMap<Symbol, LotQueue>,

    // Outputs accumulated during processing.
    holdings: Vec<MatchedHolding>,
    unmatched_closes: Vec<UnmatchedClose>,
}

impl FifoMatcher {
    pub fn new(flip_policy: FlipPolicy) -> Self {
        Self {
            flip_policy,
            books: BTreeMap::new(),
            holdings: Vec::new(),
            unmatched_closes: Vec::new(),
        }
    }

    /// Process a single trade. Option trades are not this matcher's concern and are skipped.
    pub fn process_trade(&mut self, trade: &Trade) -> Result<(), AnalysisError> {
        if trade.instrument_class() != InstrumentClass::CashUnderlying {
            return Ok(());
        }

        let symbol = trade.instrument.symbol().clone();
        let book = self.books.entry(symbol).or_default();
        let effect = book.apply(trade)?;

        for holding in &effect.holdings {
            tracing::debug!(
                symbol = %trade.instrument,
                open_row = holding.open_row,
                close_row = holding.close_row,
                qty = %holding.matched_quantity,
                "matched cash lot"
            );
        }
        self.holdings.extend(effect.holdings);

        if !effect.excess.is_positive() {
            return Ok(());
        }

        match self.flip_policy {
            FlipPolicy::Reverse => {
                tracing::debug!(
                    symbol = %trade.instrument,
                    row = trade.row_index,
                    excess = %effect.excess,
                    side = %trade.side,
                    "position flipped"
                );
                book.push(OpenLot::from_excess(trade.clone(), effect.excess))?;
            }
            FlipPolicy::Discard => {
                tracing::warn!(
                    symbol = %trade.instrument,
                    row = trade.row_index,
                    excess = %effect.excess,
                    "closing quantity exceeds open lots; excess discarded"
                );
                self.unmatched_closes
                    .push(UnmatchedClose::new(trade, effect.excess));
            }
        }
        Ok(())
    }

    pub fn book(&self, symbol: &Symbol) -> Option<&LotQueue> {
        self.books.get(symbol)
    }

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

impl Default for FifoMatcher {
    fn default() -> Self {
        Self::new(FlipPolicy::default())
    }
}
