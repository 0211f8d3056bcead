//! Trade type representing a single fill from the platform export.

use crate::domain::{Decimal, InstrumentClass, InstrumentKey, Side, TimeMs};
use serde::{Deserialize, Serialize};

/// A single normalized fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// Stable identifier derived from the normalized fields.
    pub trade_key: String,
    /// 0-based position of the row in the uploaded file.
    pub row_index: usize,
    /// Execution time in milliseconds since Unix epoch.
    pub time_ms: TimeMs,
    pub instrument: InstrumentKey,
    pub side: Side,
    /// Always > 0.
    pub quantity: Decimal,
    pub price: Decimal,
}

impl Trade {
    pub fn new(
        row_index: usize,
        time_ms: TimeMs,
        instrument: InstrumentKey,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        let trade_key =
            Self::compute_trade_key(row_index, time_ms, &instrument, side, &quantity, &price);
        Trade {
            trade_key,
            row_index,
            time_ms,
            instrument,
            side,
            quantity,
            price,
        }
    }

    /// Generate a stable key for this trade.
    ///
    /// The row index is part of the hash so identical fills on separate rows stay distinct.
    pub fn compute_trade_key(
        row_index: usize,
        time_ms: TimeMs,
        instrument: &InstrumentKey,
        side: Side,
        quantity: &Decimal,
        price: &Decimal,
    ) -> String {
        use sha2::{Digest, Sha256};

        fn hash_var(hasher: &mut Sha256, data: &str) {
            hasher.update((data.len() as u32).to_le_bytes());
            hasher.update(data.as_bytes());
        }

        let mut hasher = Sha256::new();
        hasher.update((row_index as u64).to_le_bytes());
        hasher.update(time_ms.as_ms().to_le_bytes());
        hash_var(&mut hasher, &instrument.to_string());
        hasher.update(if side == Side::Buy { b"B" } else { b"S" });
        hash_var(&mut hasher, &quantity.to_canonical_string());
        hash_var(&mut hasher, &price.to_canonical_string());
        let hash = hasher.finalize();
        format!("trade:{}", hex::encode(&hash[..12]))
    }

    pub fn trade_key(&self) -> &str {
        &self.trade_key
    }

    pub fn instrument_class(&self) -> InstrumentClass {
        self.instrument.class()
    }

    /// Signed cash flow of this fill: buys pay, sells receive. `None` on overflow.
    pub fn cashflow(&self) -> Option<Decimal> {
        self.price
            .checked_mul(self.quantity)?
            .checked_mul(Decimal::from_i64((-self.side.sign()).into()))
    }
}
