use crate::errors::ParseError;
use crate::parsing::field;
use crate::structs::{ContractId, Currency};

/* Listing exchanges that are not real listings */
const IGNORED_EXCHANGES: [&str; 2] = ["CORPACT", "RIGHT"];

/* Listing exchange of an instrument line -> currency the instrument trades in */
pub fn exchange_currency(exchange: &str) -> Option<Currency> {
    let code = match exchange {
        "NYSE" | "NASDAQ" | "ARCA" | "AMEX" | "BATS" | "PINK" | "NYSEARCA" | "NYSEAMER" => "USD",
        "IBIS" | "IBIS2" | "FWB" | "FWB2" | "SWB" | "XETRA" | "SBF" | "AEB" | "BVME" | "ENEXT.BE"
        | "BM" | "VSE" | "BVL" | "TGATE" | "GETTEX" => "EUR",
        "ASX" => "AUD",
        "TSE" | "VENTURE" | "TSX" => "CAD",
        "LSE" | "LSEETF" => "GBP",
        "SEHK" => "HKD",
        "EBS" | "VIRTX" => "CHF",
        "SFB" => "SEK",
        "OSE" => "NOK",
        "CPH" => "DKK",
        "TSEJ" => "JPY",
        "SGX" => "SGD",
        "WSE" => "PLN",
        _ => return None,
    };
    Some(Currency::new(code))
}

/* Metadata of an instrument as given in the "Financial Instrument Information" section.
The trade rows don't carry the name or the contract id, this is where we get them. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentRow {
    pub symbols: Vec<String>, // first one is the current symbol
    pub name: String,
    pub contract_id: ContractId,
    pub security_id: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<Currency>,
}

impl InstrumentRow {
    /* Sample line:
    Financial Instrument Information,Data,Stocks,ROP,ROPER TECHNOLOGIES INC,81025075,US7766961061,NYSE,1,COMMON,
    Older statements have no listing exchange column, the multiplier follows the security id directly.

    Ok(None) means the row describes something that is not a tradable listing. */
    pub fn parse(row: &[String]) -> Result<Option<InstrumentRow>, ParseError> {
        let symbol_cell = field(row, 3)?;
        let name = field(row, 4)?.trim().to_string();
        let contract_id = field(row, 5)?.trim().to_string();
        let security_id = row
            .get(6)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let exchange = row
            .get(7)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && !s.chars().all(|c| c.is_ascii_digit()));

        let mut currency = None;
        if let Some(exchange) = &exchange {
            if IGNORED_EXCHANGES.contains(&exchange.as_str()) {
                return Ok(None);
            }
            currency = Some(exchange_currency(exchange).ok_or_else(|| {
                ParseError::UnknownExchange {
                    exchange: exchange.clone(),
                    row: row.to_vec(),
                }
            })?);
        }

        // "FB, META": the broker lists the old symbol with the new one after a rename
        let symbols: Vec<String> = symbol_cell
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if symbols.is_empty() || contract_id.is_empty() {
            return Err(ParseError::TooShort {
                expected: 6,
                row: row.to_vec(),
            });
        }

        Ok(Some(InstrumentRow {
            symbols,
            name,
            contract_id,
            security_id,
            exchange,
            currency,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: &str) -> Vec<String> {
        crate::parsing::split_line(line).unwrap()
    }

    #[test]
    fn test_parse_with_exchange() {
        let r = row("Financial Instrument Information,Data,Stocks,ROP,ROPER TECHNOLOGIES INC,81025075,US7766961061,NYSE,1,COMMON,");
        let instrument = InstrumentRow::parse(&r).unwrap().unwrap();
        assert_eq!(instrument.symbols, vec!["ROP".to_string()]);
        assert_eq!(instrument.contract_id, "81025075");
        assert_eq!(instrument.security_id.as_deref(), Some("US7766961061"));
        assert_eq!(instrument.currency, Some(Currency::new("USD")));
    }

    #[test]
    fn test_parse_without_exchange() {
        let r = row("Financial Instrument Information,Data,Stocks,ROP,ROPER TECHNOLOGIES INC,81025075,US7766961061,1,COMMON,");
        let instrument = InstrumentRow::parse(&r).unwrap().unwrap();
        assert_eq!(instrument.exchange, None);
        assert_eq!(instrument.currency, None);
    }

    #[test]
    fn test_parse_multiple_symbols() {
        let r = row(r#"Financial Instrument Information,Data,Stocks,"FB, META",META PLATFORMS INC,107113386,US30303M1027,NASDAQ,1,COMMON,"#);
        let instrument = InstrumentRow::parse(&r).unwrap().unwrap();
        assert_eq!(instrument.symbols, vec!["FB".to_string(), "META".to_string()]);
    }

    #[test]
    fn test_corpact_ignored() {
        let r = row("Financial Instrument Information,Data,Stocks,XYZ.RTS,XYZ RIGHTS,1234,,CORPACT,1,RIGHT,");
        assert_eq!(InstrumentRow::parse(&r).unwrap(), None);
    }

    #[test]
    fn test_unknown_exchange() {
        let r = row("Financial Instrument Information,Data,Stocks,XYZ,XYZ INC,1234,,MOON,1,COMMON,");
        assert!(matches!(
            InstrumentRow::parse(&r),
            Err(ParseError::UnknownExchange { .. })
        ));
    }
}
