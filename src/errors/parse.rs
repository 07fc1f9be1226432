use thiserror::Error;

/* A trade row whose field count matches none of the known layouts */
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown transaction row format. Length {len}. {row:?}")]
pub struct MalformedRowError {
    pub row: Vec<String>,
    pub len: usize,
}

/* Row-local parsing failures: the caller skips the row (and logs) or aborts the batch */
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    MalformedRow(#[from] MalformedRowError),
    #[error("Unexpected row prefix: {0:?}")]
    UnexpectedPrefix(Vec<String>),
    #[error("Row too short, expected at least {expected} fields: {row:?}")]
    TooShort { expected: usize, row: Vec<String> },
    #[error("Invalid number in field {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Invalid date '{value}' (expected {format})")]
    InvalidDate { value: String, format: &'static str },
    #[error("Missing exchange: '{exchange}' Row: {row:?}")]
    UnknownExchange { exchange: String, row: Vec<String> },
    #[error("Invalid corporate action description: '{0}'")]
    InvalidCorporateAction(String),
    #[error("Csv error: {0}")]
    Csv(String),
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        ParseError::Csv(e.to_string())
    }
}
