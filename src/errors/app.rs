use thiserror::Error;

use super::{ApiError, InstrumentError, IoError, LedgerError, MoneyError, ParseError};

/* Everything that stops a run: main prints it and exits non-zero */
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Io: {0}")]
    Io(#[from] IoError),
    #[error("Parsing: {0}")]
    Parse(#[from] ParseError),
    #[error("Instrument: {0}")]
    Instrument(#[from] InstrumentError),
    #[error("Ledger: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Api: {0}")]
    Api(#[from] ApiError),
    #[error("Money: {0}")]
    Money(#[from] MoneyError),
    #[error("Config: {0}")]
    Config(String),
}
