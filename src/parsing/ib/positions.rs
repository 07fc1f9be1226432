use rust_decimal::Decimal;

use crate::errors::ParseError;
use crate::parsing::{field, parse_decimal};
use crate::structs::Currency;

/* Holding as reported by the broker at the end of a statement period:
Open Positions,Data,Summary,Stocks,USD,AAPL,40,1,100,4000,4400,400,
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPositionRow {
    pub currency: Currency,
    pub symbol: String,
    pub quantity: Decimal,
}

impl OpenPositionRow {
    pub fn parse(row: &[String]) -> Result<OpenPositionRow, ParseError> {
        Ok(OpenPositionRow {
            currency: Currency::new(field(row, 4)?),
            symbol: field(row, 5)?.trim().to_string(),
            quantity: parse_decimal("quantity", field(row, 6)?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::parsing::split_line;

    #[test]
    fn test_parse() {
        let row = split_line("Long Open Positions,Data,Summary,Stocks,USD,AAPL,40,1,100,4000,4400,400,").unwrap();
        let p = OpenPositionRow::parse(&row).unwrap();
        assert_eq!(p.symbol, "AAPL");
        assert_eq!(p.quantity, dec!(40));
    }
}
