use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::api::{MarketData, PriceSource, RateSource};
use crate::errors::AppError;
use crate::structs::{Currency, InstrumentFilter, Ledger, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Amount,
    Symbol,
}

/* "name", "amount", "symbol", with a "_r" suffix for the reverse order */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub reverse: bool,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder {
            key: SortKey::Name,
            reverse: false,
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (name, reverse) = match value.strip_suffix("_r") {
            Some(name) => (name, true),
            None => (value, false),
        };
        let key = match name {
            "name" => SortKey::Name,
            "amount" => SortKey::Amount,
            "symbol" => SortKey::Symbol,
            other => return Err(format!("Unknown sort order '{other}'")),
        };
        Ok(SortOrder { key, reverse })
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioLine {
    pub currency: Currency,
    pub name: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Money,
    pub price_now: Money,
    pub value: Money, // in the report currency
    pub weight: Decimal,
}

#[derive(Debug, Clone)]
pub struct PortfolioReport {
    pub lines: Vec<PortfolioLine>,
    pub total: Money,
}

/* Share of each position in the total value. All values must be in one currency. */
pub fn set_weights(lines: &mut [PortfolioLine], total: &Money) {
    for line in lines.iter_mut() {
        line.weight = line.value.ratio(total).unwrap_or(Decimal::ZERO);
    }
}

pub fn sort_lines(lines: &mut [PortfolioLine], order: SortOrder) {
    match order.key {
        SortKey::Name => lines.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Amount => lines.sort_by(|a, b| a.quantity.cmp(&b.quantity)),
        SortKey::Symbol => lines.sort_by(|a, b| a.symbol.cmp(&b.symbol)),
    }
    if order.reverse {
        lines.reverse();
    }
}

pub async fn portfolio_report<P, R>(
    ledger: &Ledger,
    filter: &InstrumentFilter,
    market: &mut MarketData<P, R>,
    currency: &Currency,
    order: SortOrder,
    today: NaiveDate,
) -> Result<PortfolioReport, AppError>
where
    P: PriceSource + 'static,
    R: RateSource,
{
    let positions: Vec<_> = ledger
        .positions()
        .filter(|p| filter.accepts(&p.instrument))
        .collect();
    market
        .prefetch(positions.iter().map(|p| &p.instrument), None)
        .await;

    let mut lines = Vec::new();
    let mut total = Money::zero(currency.clone());
    for position in positions {
        let price_now = market.price(&position.instrument, None).await;
        let value = market
            .convert(&position.value(&price_now), Some(currency), today)
            .await?;
        total = total.checked_add(&value)?;
        lines.push(PortfolioLine {
            currency: position.average_cost.currency.clone(),
            name: position.instrument.name.clone(),
            symbol: position.instrument.display_symbol().to_string(),
            quantity: position.quantity,
            average_cost: position.average_cost.clone(),
            price_now,
            value,
            weight: Decimal::ZERO,
        });
    }
    set_weights(&mut lines, &total);
    sort_lines(&mut lines, order);
    Ok(PortfolioReport { lines, total })
}
