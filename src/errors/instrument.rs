use thiserror::Error;

use crate::structs::Currency;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    /* Stored and freshly observed currency disagree: continuing would mix currencies silently */
    #[error("Currency mismatch for {symbol}: stored {stored} vs observed {observed}")]
    CurrencyMismatch {
        symbol: String,
        stored: Currency,
        observed: Currency,
    },
}
