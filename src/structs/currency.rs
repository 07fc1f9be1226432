use std::fmt;

use serde::{Deserialize, Serialize};

/* ISO-4217 style currency code as it appears in the statements: "USD", "EUR", ... */
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Self {
        Currency(code.trim().to_uppercase())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /* Three ascii letters, the only shape the broker uses */
    pub fn is_code(value: &str) -> bool {
        value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase())
    }

    /* Dividend rows carry either "USD" or "Total USD" in their currency cell */
    pub fn from_cell(cell: &str) -> Option<Self> {
        cell.split_whitespace()
            .find(|part| Self::is_code(part))
            .map(Currency::new)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Currency::new(code)
    }
}
