use regex::Regex;

use crate::errors::ParseError;
use crate::parsing::{field, parse_date, parse_decimal};
use crate::structs::{CorporateAction, CorporateActionKind, Currency, RETIRED_SUFFIX};

/* Parses the "Corporate Actions" section. Only splits and mergers touch share counts,
other actions (spin-offs, dividends in kind...) come in as trades and are skipped here. */
pub struct CorporateActionParser {
    ratio: Regex,
}

impl CorporateActionParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(CorporateActionParser {
            ratio: Regex::new(r"(?i)(\d+(?:\.\d+)?) for (\d+(?:\.\d+)?)")?,
        })
    }

    /* Sample line:
    Corporate Actions,Data,Stocks,USD,2020-08-31,"2020-08-28, 20:25:00","AAPL(US0378331005) Split 4 for 1 (AAPL, APPLE INC, US0378331005)",30,0,0,0,
    */
    pub fn parse(&self, row: &[String]) -> Result<Option<CorporateAction>, ParseError> {
        let description = field(row, 6)?;
        let kind = if description.contains("Merged") {
            CorporateActionKind::Merger
        } else if description.contains("Split") {
            CorporateActionKind::Split
        } else {
            return Ok(None);
        };
        let invalid = || ParseError::InvalidCorporateAction(description.to_string());

        let currency = Currency::new(field(row, 3)?);
        let effective_date = parse_date(field(row, 4)?)?;

        let (symbol, rest) = description.split_once('(').ok_or_else(invalid)?;
        let security_id_old = rest.split(')').next().ok_or_else(invalid)?.trim().to_string();
        let security_id_new = description
            .rsplit(',')
            .next()
            .map(|s| s.trim_matches(|c| c == ' ' || c == ')').to_string())
            .ok_or_else(invalid)?;

        let captures = self.ratio.captures(description).ok_or_else(invalid)?;
        let new_units = parse_decimal("ratio", &captures[1])?;
        let old_units = parse_decimal("ratio", &captures[2])?;
        if new_units.is_zero() || old_units.is_zero() {
            return Err(invalid());
        }

        let symbol = symbol.trim();
        let symbol = symbol.strip_suffix(RETIRED_SUFFIX).unwrap_or(symbol);

        Ok(Some(CorporateAction {
            effective_date,
            symbol: symbol.to_string(),
            currency,
            share_factor: new_units / old_units,
            security_id_old,
            security_id_new,
            kind,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::parsing::split_line;

    #[test]
    fn test_parse_split() {
        let row = split_line(r#"Corporate Actions,Data,Stocks,USD,2020-08-31,"2020-08-28, 20:25:00","AAPL(US0378331005) Split 4 for 1 (AAPL, APPLE INC, US0378331005)",30,0,0,0,"#).unwrap();
        let action = CorporateActionParser::new().unwrap().parse(&row).unwrap().unwrap();
        assert_eq!(action.symbol, "AAPL");
        assert_eq!(action.currency, Currency::new("USD"));
        assert_eq!(action.effective_date, NaiveDate::from_ymd_opt(2020, 8, 31).unwrap());
        assert_eq!(action.share_factor, dec!(4));
        assert_eq!(action.security_id_old, "US0378331005");
        assert_eq!(action.security_id_new, "US0378331005");
        assert_eq!(action.kind, CorporateActionKind::Split);
    }

    #[test]
    fn test_parse_reverse_split_old_symbol() {
        let row = split_line(r#"Corporate Actions,Data,Stocks,USD,2021-02-01,"2021-01-29, 20:25:00","ABC.OLD(US0000000001) Split 1 for 10 (ABC, ABC INC, US0000000002)",-90,0,0,0,"#).unwrap();
        let action = CorporateActionParser::new().unwrap().parse(&row).unwrap().unwrap();
        assert_eq!(action.symbol, "ABC");
        assert_eq!(action.share_factor, dec!(0.1));
        assert_eq!(action.security_id_new, "US0000000002");
    }

    #[test]
    fn test_parse_merger() {
        let row = split_line(r#"Corporate Actions,Data,Stocks,CAD,2019-05-24,"2019-05-23, 20:25:00","10E(CA03765K1049) Merged(Acquisition) FOR CA03765K1049 1 FOR 1 (APHA, APHRIA INC, CA03765K1049)",0,0,0,0,"#).unwrap();
        let action = CorporateActionParser::new().unwrap().parse(&row).unwrap().unwrap();
        assert_eq!(action.kind, CorporateActionKind::Merger);
        assert_eq!(action.symbol, "10E");
        assert_eq!(action.share_factor, dec!(1));
    }

    #[test]
    fn test_other_actions_skipped() {
        let row = split_line(r#"Corporate Actions,Data,Stocks,USD,2020-08-31,"2020-08-28, 20:25:00","XYZ(US0000000009) Spinoff 1 for 5 (ABC, ABC INC, US0000000010)",10,0,0,0,"#).unwrap();
        assert_eq!(CorporateActionParser::new().unwrap().parse(&row).unwrap(), None);
    }
}
