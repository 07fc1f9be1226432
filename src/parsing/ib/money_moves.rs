use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::ParseError;
use crate::parsing::{field, parse_date, parse_decimal};
use crate::structs::Currency;

/* A line of the "Deposits & Withdrawals" section:
Deposits & Withdrawals,Data,EUR,2020-01-02,Electronic Fund Transfer,1000
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyMoveRow {
    pub date: NaiveDate,
    pub currency: Currency,
    pub description: String,
    pub amount: Decimal,
}

impl MoneyMoveRow {
    pub fn parse(row: &[String]) -> Result<MoneyMoveRow, ParseError> {
        Ok(MoneyMoveRow {
            currency: Currency::new(field(row, 2)?),
            date: parse_date(field(row, 3)?)?,
            description: field(row, 4)?.to_string(),
            amount: parse_decimal("amount", field(row, 5)?)?,
        })
    }
}
