use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::api::{MarketData, PriceSource, RateSource};
use crate::errors::AppError;
use crate::structs::{Currency, InstrumentFilter, Money, Transaction};
use crate::utils::DateWindow;

#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub filter: InstrumentFilter,
    pub currency: Option<Currency>,
    pub only_buy: bool,
    pub only_sell: bool,
    pub window: DateWindow,
    pub display_currency: Option<Currency>,
}

impl TransactionQuery {
    pub fn accepts(&self, tx: &Transaction) -> bool {
        if (self.only_buy && !tx.is_buy()) || (self.only_sell && !tx.is_sell()) {
            return false;
        }
        if self.currency.as_ref().map_or(false, |c| c != tx.currency()) {
            return false;
        }
        self.window.contains(tx.date()) && self.filter.accepts(&tx.instrument)
    }
}

/* Average buy price over the selected buys, blended on the quantity held after each buy */
#[derive(Debug, Clone, Default)]
pub struct BuyAverage {
    average: Option<Decimal>,
}

impl BuyAverage {
    /* `quantity_total` is the running sum of all selected quantities, the new buy included */
    pub fn add(&mut self, quantity_total: Decimal, quantity: Decimal, price: Decimal) {
        self.average = match self.average {
            Some(average) if !quantity_total.is_zero() => {
                let previous = quantity_total - quantity;
                Some((previous * average + quantity * price) / quantity_total)
            }
            Some(average) => Some(average),
            None => Some(price),
        };
    }

    pub fn get(&self) -> Option<Decimal> {
        self.average
    }
}

#[derive(Debug, Clone)]
pub struct TransactionLine {
    pub date: NaiveDate,
    pub currency: Currency,
    pub name: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub price: Money,
    pub price_today: Money,
    pub total: Money,
    pub unrealized: Option<Decimal>,
    pub realized: Option<Money>,
    pub realized_percent: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct TransactionReport {
    pub lines: Vec<TransactionLine>,
    pub quantity_total: Decimal,
    pub average_price: Option<Money>,
    pub invested_total: Money,
    pub realized_total: Money,
    pub unrealized: Option<Decimal>,
}

/* price today / price paid - 1 */
fn unrealized(price_today: &Money, price: &Money) -> Option<Decimal> {
    price_today.ratio(price).ok().map(|r| r - Decimal::ONE)
}

pub async fn transaction_report<P, R>(
    transactions: &[Transaction],
    query: &TransactionQuery,
    market: &mut MarketData<P, R>,
    default_currency: &Currency,
    today: NaiveDate,
) -> Result<TransactionReport, AppError>
where
    P: PriceSource + 'static,
    R: RateSource,
{
    let selected: Vec<&Transaction> = transactions.iter().filter(|t| query.accepts(t)).collect();
    market
        .prefetch(selected.iter().map(|t| &t.instrument), None)
        .await;

    let total_currency = query
        .display_currency
        .clone()
        .unwrap_or_else(|| default_currency.clone());
    let mut lines = Vec::new();
    let mut quantity_total = Decimal::ZERO;
    let mut average = BuyAverage::default();
    let mut invested_total = Money::zero(total_currency.clone());
    let mut realized_total = Money::zero(total_currency.clone());
    let mut last_price_today = None;

    for tx in selected {
        quantity_total += tx.quantity;
        let display = query.display_currency.as_ref();
        let price = market.convert(&tx.price(), display, tx.date()).await?;
        let price_today = market.price(&tx.instrument, None).await;
        let price_today = market.convert(&price_today, display, today).await?;

        let total = -(&price * tx.quantity);
        let total_in = market.convert(&total, Some(&total_currency), tx.date()).await?;
        invested_total = invested_total.checked_add(&total_in)?;

        let realized = if tx.is_sell() {
            let realized = market.convert(&tx.realized, display, tx.date()).await?;
            let realized_in = market
                .convert(&realized, Some(&total_currency), tx.date())
                .await?;
            realized_total = realized_total.checked_add(&realized_in)?;
            Some(realized)
        } else {
            let price_in = market.convert(&price, Some(&total_currency), tx.date()).await?;
            average.add(quantity_total, tx.quantity, price_in.amount);
            None
        };

        lines.push(TransactionLine {
            date: tx.date(),
            currency: tx.currency().clone(),
            name: tx.instrument.name.clone(),
            symbol: tx.instrument.display_symbol().to_string(),
            quantity: tx.quantity,
            unrealized: unrealized(&price_today, &price),
            total,
            realized,
            realized_percent: tx.realized_percent.filter(|_| tx.is_sell()),
            price,
            price_today: price_today.clone(),
        });
        last_price_today = Some(price_today);
    }

    let average_price = average.get().map(|a| Money::new(a, total_currency.clone()));
    let unrealized = match (&last_price_today, &average_price) {
        (Some(today_price), Some(average_price)) => {
            let today_price = market
                .convert(today_price, Some(&total_currency), today)
                .await?;
            unrealized(&today_price, average_price)
        }
        _ => None,
    };

    Ok(TransactionReport {
        lines,
        quantity_total,
        average_price,
        invested_total,
        realized_total,
        unrealized,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::structs::Instrument;

    fn tx(day: u32, quantity: Decimal, currency: &str) -> Transaction {
        let currency = Currency::new(currency);
        Transaction {
            timestamp: NaiveDate::from_ymd_opt(2021, 1, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            instrument: Instrument::provisional("ABC", currency.clone()),
            quantity,
            transaction_price: Money::new(dec!(10), currency.clone()),
            fee: Money::zero(currency.clone()),
            realized: Money::zero(currency.clone()),
            transaction_total: Money::new(dec!(-10) * quantity, currency),
            realized_percent: None,
        }
    }

    #[test]
    fn test_query() {
        let txs = vec![tx(4, dec!(10), "USD"), tx(5, dec!(-5), "USD"), tx(6, dec!(3), "EUR")];
        let count = |q: &TransactionQuery| txs.iter().filter(|t| q.accepts(t)).count();

        assert_eq!(count(&TransactionQuery::default()), 3);
        assert_eq!(
            count(&TransactionQuery {
                only_sell: true,
                ..TransactionQuery::default()
            }),
            1
        );
        assert_eq!(
            count(&TransactionQuery {
                only_buy: true,
                currency: Some(Currency::new("USD")),
                ..TransactionQuery::default()
            }),
            1
        );
        let window = DateWindow {
            start: NaiveDate::from_ymd_opt(2021, 1, 5),
            end: None,
        };
        assert_eq!(
            count(&TransactionQuery {
                window,
                ..TransactionQuery::default()
            }),
            2
        );
    }

    #[test]
    fn test_buy_average() {
        let mut average = BuyAverage::default();
        average.add(dec!(10), dec!(10), dec!(10));
        average.add(dec!(15), dec!(5), dec!(13));
        assert_eq!(average.get(), Some(dec!(11)));
    }
}
