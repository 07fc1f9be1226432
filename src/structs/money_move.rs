use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Currency, Money};

/* A deposit (positive) or withdrawal (negative) of cash */
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MoneyMove {
    pub date: NaiveDate,
    pub currency: Currency,
    pub amount: Money,
    pub description: String,
}

impl MoneyMove {
    pub fn is_deposit(&self) -> bool {
        self.amount.amount.is_sign_positive()
    }
}
