use chrono::NaiveDate;
use hashbrown::HashMap;
use rust_decimal::Decimal;
use tracing::debug;

use crate::api::{MarketData, PriceSource, RateSource};
use crate::errors::{AppError, ParseError};
use crate::parsing::{Category, DividendRowParser, StatementReader};
use crate::structs::{Currency, Dividend, InstrumentFilter, InstrumentManager, Money};
use crate::utils::DateWindow;

use super::{skip_or_abort, LoadOptions};

/* Received dividends (not accruals), oldest first.

The same payment shows up in every overlapping statement: an identical line is a duplicate.
Two payments of the same amount on the same day with different descriptions are both kept. */
pub fn collect_dividends(
    reader: &StatementReader,
    instruments: &InstrumentManager,
    options: &LoadOptions,
) -> Result<Vec<Dividend>, ParseError> {
    let parser = DividendRowParser::new()
        .map_err(|e| ParseError::Csv(format!("Invalid dividend pattern: {e}")))?;
    let mut seen: HashMap<(NaiveDate, String, String, Decimal), Vec<String>> = HashMap::new();
    let mut dividends = Vec::new();
    let mut skipped = 0;

    for row in reader.rows(Category::Dividends) {
        let row = match row.and_then(|row| parser.parse(&row)) {
            Ok(row) => row,
            Err(e) => {
                skip_or_abort(e, options, &mut skipped)?;
                continue;
            }
        };

        let key = (row.date, row.symbol.clone(), row.security_id.clone(), row.amount);
        let descriptions = seen.entry(key).or_default();
        if descriptions.contains(&row.description) {
            debug!("Skipping duplicate dividend: {} {} {}", row.date, row.symbol, row.amount);
            continue;
        }
        descriptions.push(row.description.clone());

        let instrument = instruments
            .get_by_symbol(&row.symbol)
            .or_else(|| instruments.get_by_security_id(&row.security_id))
            .cloned();
        dividends.push(Dividend {
            date: row.date,
            amount: Money::new(row.amount, row.currency.clone()),
            currency: row.currency,
            symbol: row.symbol,
            security_id: row.security_id,
            description: row.description,
            instrument,
        });
    }
    dividends.sort_by_key(|d| d.date);
    Ok(dividends)
}

#[derive(Debug, Clone, Default)]
pub struct DividendQuery {
    pub filter: InstrumentFilter,
    pub currency: Option<Currency>,
    pub window: DateWindow,
    pub display_currency: Option<Currency>,
}

impl DividendQuery {
    pub fn accepts(&self, dividend: &Dividend) -> bool {
        if let Some(currency) = &self.currency {
            if currency != &dividend.currency {
                return false;
            }
        }
        self.window.contains(dividend.date)
            && !self
                .filter
                .is_ignored(&[dividend.symbol.clone()], dividend.instrument.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct DividendLine {
    pub dividend: Dividend,
    pub amount: Money, // in display currency when one is asked for
}

#[derive(Debug, Clone)]
pub struct DividendReport {
    pub lines: Vec<DividendLine>,
    pub total: Money,
}

pub async fn dividend_report<P, R>(
    dividends: &[Dividend],
    query: &DividendQuery,
    market: &mut MarketData<P, R>,
    default_currency: &Currency,
) -> Result<DividendReport, AppError>
where
    P: PriceSource + 'static,
    R: RateSource,
{
    let total_currency = query
        .display_currency
        .clone()
        .unwrap_or_else(|| default_currency.clone());
    let mut total = Money::zero(total_currency.clone());
    let mut lines = Vec::new();
    for dividend in dividends.iter().filter(|d| query.accepts(d)) {
        let amount = market
            .convert(&dividend.amount, query.display_currency.as_ref(), dividend.date)
            .await?;
        let in_total = market
            .convert(&amount, Some(&total_currency), dividend.date)
            .await?;
        total = total.checked_add(&in_total)?;
        lines.push(DividendLine {
            dividend: dividend.clone(),
            amount,
        });
    }
    Ok(DividendReport { lines, total })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::structs::Persistable;

    const DIVIDENDS: &str = r#"Dividends,Data,USD,2020-02-13,AAPL(US0378331005) Cash Dividend USD 0.77 per Share (Ordinary Dividend),7.7
Dividends,Data,USD,2020-02-13,AAPL(US0378331005) Cash Dividend USD 0.77 per Share (Ordinary Dividend),7.7
Dividends,Data,USD,U1234567,2020-02-13,AAPL(US0378331005) Cash Dividend USD 0.77 per Share (Bonus Dividend),7.7
Dividends,Data,EUR,2020-05-20,SAP(DE0007164600) Cash Dividend EUR 1.58 per Share (Ordinary Dividend),15.8
Dividends,Data,Total,,,31.2
"#;

    #[test]
    fn test_duplicates() {
        let reader = StatementReader::from_content(DIVIDENDS).unwrap();
        let instruments = InstrumentManager::new_non_persistent().unwrap();
        let dividends = collect_dividends(&reader, &instruments, &LoadOptions::default()).unwrap();

        assert_eq!(dividends.len(), 3);
        assert_eq!(dividends[0].symbol, "AAPL");
        assert_eq!(dividends[2].amount, Money::new(dec!(15.8), Currency::new("EUR")));
    }

    #[test]
    fn test_query() {
        let reader = StatementReader::from_content(DIVIDENDS).unwrap();
        let instruments = InstrumentManager::new_non_persistent().unwrap();
        let dividends = collect_dividends(&reader, &instruments, &LoadOptions::default()).unwrap();

        let query = DividendQuery {
            currency: Some(Currency::new("EUR")),
            ..DividendQuery::default()
        };
        assert_eq!(dividends.iter().filter(|d| query.accepts(d)).count(), 1);

        let query = DividendQuery {
            filter: InstrumentFilter::new(Vec::new(), vec!["AAPL".to_string()]),
            ..DividendQuery::default()
        };
        assert_eq!(dividends.iter().filter(|d| query.accepts(d)).count(), 2);
    }
}
