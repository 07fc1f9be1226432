use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::structs::{Currency, InstrumentKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Trade of {quantity} at {timestamp} flips position {instrument} of {open_quantity}")]
    PositionFlip {
        instrument: InstrumentKey,
        timestamp: NaiveDateTime,
        open_quantity: Decimal,
        quantity: Decimal,
    },
    #[error("Trade at {timestamp} in {instrument} is in {observed}, open position is in {stored}")]
    CurrencyMismatch {
        instrument: InstrumentKey,
        timestamp: NaiveDateTime,
        stored: Currency,
        observed: Currency,
    },
}
