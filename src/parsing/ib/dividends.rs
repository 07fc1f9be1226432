use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::errors::ParseError;
use crate::parsing::{field, parse_date, parse_decimal};
use crate::structs::Currency;

/* A line of the "Dividends" section */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividendRow {
    pub date: NaiveDate,
    pub currency: Currency,
    pub symbol: String,
    pub security_id: String,
    pub amount: Decimal,
    pub description: String,
}

pub struct DividendRowParser {
    account: Regex,
}

impl DividendRowParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(DividendRowParser {
            account: Regex::new(r"^U\d+$")?,
        })
    }

    /* Two layouts, with and without the account id column:
    Dividends,Data,USD,2020-02-13,AAPL(US0378331005) Cash Dividend USD 0.77 per Share (Ordinary Dividend),7.7
    Dividends,Data,USD,U1234567,2020-02-13,AAPL(US0378331005) Cash Dividend USD 0.77 per Share (Ordinary Dividend),7.7
    */
    pub fn parse(&self, row: &[String]) -> Result<DividendRow, ParseError> {
        let offset = if self.account.is_match(field(row, 3)?) { 1 } else { 0 };
        let currency_cell = field(row, 2)?;
        let date = parse_date(field(row, 3 + offset)?)?;
        let description = field(row, 4 + offset)?.to_string();
        let amount = parse_decimal("amount", field(row, 5 + offset)?)?;

        let currency = Currency::from_cell(currency_cell)
            .ok_or_else(|| ParseError::TooShort {
                expected: 3,
                row: row.to_vec(),
            })?;
        let (symbol, rest) = description
            .split_once('(')
            .ok_or_else(|| ParseError::TooShort {
                expected: 5 + offset,
                row: row.to_vec(),
            })?;
        let security_id = rest.split(')').next().unwrap_or_default().trim().to_string();

        Ok(DividendRow {
            date,
            currency,
            symbol: symbol.trim().to_string(),
            security_id,
            amount,
            description: description.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::parsing::split_line;

    #[test]
    fn test_parse_without_account() {
        let row = split_line("Dividends,Data,USD,2020-02-13,AAPL(US0378331005) Cash Dividend USD 0.77 per Share (Ordinary Dividend),7.7").unwrap();
        let dividend = DividendRowParser::new().unwrap().parse(&row).unwrap();
        assert_eq!(dividend.symbol, "AAPL");
        assert_eq!(dividend.security_id, "US0378331005");
        assert_eq!(dividend.amount, dec!(7.7));
        assert_eq!(dividend.currency, Currency::new("USD"));
    }

    #[test]
    fn test_parse_with_account() {
        let row = split_line("Dividends,Data,USD,U1234567,2020-02-13,AAPL(US0378331005) Cash Dividend USD 0.77 per Share (Ordinary Dividend),7.7").unwrap();
        let dividend = DividendRowParser::new().unwrap().parse(&row).unwrap();
        assert_eq!(dividend.date, NaiveDate::from_ymd_opt(2020, 2, 13).unwrap());
        assert_eq!(dividend.amount, dec!(7.7));
    }
}
