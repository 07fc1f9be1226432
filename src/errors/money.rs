use thiserror::Error;

use crate::structs::Currency;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Cannot combine {left} with {right} without conversion")]
    CurrencyMismatch { left: Currency, right: Currency },
    #[error("Division by zero amount in {0}")]
    DivisionByZero(Currency),
}
