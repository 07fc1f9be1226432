use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::api::{MarketData, PriceSource, RateSource};
use crate::errors::AppError;
use crate::structs::{Currency, Dividend, Transaction};
use crate::utils::month_end;

/* Cumulated realized profits and dividends at the end of a month */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealizedPoint {
    pub date: NaiveDate,
    pub realized: Decimal,
    pub dividends: Decimal,
}

impl RealizedPoint {
    pub fn total(&self) -> Decimal {
        self.realized + self.dividends
    }
}

/* Per day sums, cumulated and sampled at every month end between the first and the last day.
`items` are (date, realized, dividend) in one currency. */
pub fn realized_series(items: &[(NaiveDate, Decimal, Decimal)]) -> Vec<RealizedPoint> {
    let mut days: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for (date, realized, dividend) in items {
        let day = days.entry(*date).or_default();
        day.0 += realized;
        day.1 += dividend;
    }
    let (Some(first), Some(last)) = (days.keys().next().copied(), days.keys().last().copied())
    else {
        return Vec::new();
    };

    let mut points = Vec::new();
    let mut realized = Decimal::ZERO;
    let mut dividends = Decimal::ZERO;
    let mut days = days.into_iter().peekable();
    let mut sample = month_end(first);
    loop {
        while let Some((_, (r, d))) = days.next_if(|(date, _)| *date <= sample) {
            realized += r;
            dividends += d;
        }
        points.push(RealizedPoint {
            date: sample,
            realized,
            dividends,
        });
        if sample >= last {
            break;
        }
        match sample.succ_opt() {
            Some(next) => sample = month_end(next),
            None => break,
        }
    }
    points
}

pub async fn realized_report<P, R>(
    sells: &[&Transaction],
    dividends: &[&Dividend],
    market: &mut MarketData<P, R>,
    currency: &Currency,
) -> Result<Vec<RealizedPoint>, AppError>
where
    P: PriceSource + 'static,
    R: RateSource,
{
    let mut items = Vec::new();
    for tx in sells {
        let realized = market.convert(&tx.realized, Some(currency), tx.date()).await?;
        items.push((tx.date(), realized.amount, Decimal::ZERO));
    }
    for dividend in dividends {
        let amount = market
            .convert(&dividend.amount, Some(currency), dividend.date)
            .await?;
        items.push((dividend.date, Decimal::ZERO, amount.amount));
    }
    Ok(realized_series(&items))
}
