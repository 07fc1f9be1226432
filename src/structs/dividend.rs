use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Currency, Instrument, Money};

/* A received dividend (accruals are not part of the dividend section) */
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Dividend {
    pub date: NaiveDate,
    pub currency: Currency,
    pub symbol: String,
    pub security_id: String,
    pub amount: Money,
    pub description: String,
    pub instrument: Option<Instrument>,
}

impl Dividend {
    pub fn display_name(&self) -> &str {
        self.instrument
            .as_ref()
            .map(|i| i.name.as_str())
            .unwrap_or(&self.symbol)
    }
}
