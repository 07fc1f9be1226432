use chrono::NaiveDate;
use thiserror::Error;

use crate::structs::Currency;

/* Errors coming from the third-party collaborators (price history, symbol search, FX rates) */
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{0}")]
    ApiCallError(String),
    #[error("Error during serde deserialisation: {0}")]
    DeserializationError(String),
    #[error("Couldn't find rate {from}/{to} on {date} after {tries} tries")]
    CouldNotFindRate {
        from: Currency,
        to: Currency,
        date: NaiveDate,
        tries: u32,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::ApiCallError(e.to_string())
    }
}
