use crate::domain::{Decimal, MatchedHolding, OpenLot, Side, Trade};
use crate::error::AnalysisError;
use std::collections::VecDeque;

/// Outcome of applying one trade to a queue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueEffect {
    pub holdings: Vec<MatchedHolding>,
    /// Closing quantity left after the queue was exhausted.
    pub excess: Decimal,
}

/// FIFO queue of open lots for one book (a cash symbol or an option contract).
///
/// All lots in a queue share one direction; the running open quantity is kept
/// alongside so it never needs re-summing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LotQueue {
    lots: VecDeque<OpenLot>,
    open_quantity: Decimal,
}

impl LotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction of the held position, `None` when flat.
    pub fn direction(&self) -> Option<Side> {
        self.lots.front().map(|lot| lot.direction())
    }

    pub fn open_quantity(&self) -> Decimal {
        self.open_quantity
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn lots(&self) -> impl Iterator<Item = &OpenLot> {
        self.lots.iter()
    }

    pub fn push(&mut self, lot: OpenLot) -> Result<(), AnalysisError> {
        self.open_quantity = self
            .open_quantity
            .checked_add(lot.remaining_quantity)
            .ok_or_else(|| {
                AnalysisError::overflow(format!("open quantity at row {}", lot.origin.row_index))
            })?;
        self.lots.push_back(lot);
        Ok(())
    }

    /// Apply a trade: same direction (or flat) opens a lot, opposite direction closes FIFO.
    pub fn apply(&mut self, trade: &Trade) -> Result<QueueEffect, AnalysisError> {
        match self.direction() {
            Some(direction) if trade.side == direction.opposite() => {
                self.close_against(trade, trade.quantity)
            }
            _ => {
                self.push(OpenLot::new(trade.clone()))?;
                Ok(QueueEffect::default())
            }
        }
    }

    /// Consume lots from the front until `quantity` is closed or the queue is empty.
    pub fn close_against(
        &mut self,
        close: &Trade,
        quantity: Decimal,
    ) -> Result<QueueEffect, AnalysisError> {
        let mut remaining_to_close = quantity;
        let mut holdings = Vec::new();

        while remaining_to_close.is_positive() {
            let Some(lot) = self.lots.front_mut() else {
                break;
            };

            let matched = lot.remaining_quantity.min(remaining_to_close);
            holdings.push(MatchedHolding::new(lot, close, matched)?);

            lot.remaining_quantity -= matched;
            remaining_to_close -= matched;
            self.open_quantity -= matched;

            if lot.is_exhausted() {
                self.lots.pop_front();
            }
        }

        Ok(QueueEffect {
            holdings,
            excess: remaining_to_close,
        })
    }

    pub fn into_lots(self) -> Vec<OpenLot> {
        self.lots.into()
    }
}
