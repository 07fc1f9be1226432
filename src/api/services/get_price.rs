/* Prices of instruments, from the local store or the price site */

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, Weekday};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::api::PriceSource;
use crate::structs::{Currency, Instrument, Money, PriceManager};

/* Returned when no price could be fetched. Not zero so that ratios stay computable. */
pub const PRICE_SENTINEL: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/* Today when no date is given, Sunday moved to Saturday */
pub fn price_date(date: Option<NaiveDate>) -> NaiveDate {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    if date.weekday() == Weekday::Sun {
        return date.pred_opt().unwrap_or(date);
    }
    date
}

/* Close price of `date`, stepping back one day per failed attempt (weekends, holidays) */
pub async fn fetch_close_price<S>(
    source: &S,
    symbol: &str,
    date: NaiveDate,
    max_tries: u32,
) -> Option<Decimal>
where
    S: PriceSource + ?Sized,
{
    let mut day = date;
    for failed_tries in 0..max_tries {
        match source.close_price(symbol, day).await {
            Ok(Some(price)) => return Some(price),
            Ok(None) => warn!("Failed to fetch price: {symbol} {day} (no data)"),
            Err(e) => warn!("Failed to fetch price: {symbol} {day}: {e}"),
        }
        debug!("{symbol}: {} failed attempts", failed_tries + 1);
        day = day.pred_opt()?;
    }
    warn!(
        "Refusing to fetch {symbol} {date} because of {max_tries} previous failed attempts. Returning {PRICE_SENTINEL}"
    );
    None
}

pub struct PriceService<S> {
    source: Arc<S>,
    max_tries: u32,
    default_currency: Currency,
}

impl<S: PriceSource> PriceService<S> {
    pub fn new(source: Arc<S>, max_tries: u32, default_currency: Currency) -> Self {
        PriceService {
            source,
            max_tries,
            default_currency,
        }
    }

    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /* Price of one share at `date` (today when None), in the instrument's currency */
    pub async fn get(
        &self,
        prices: &mut PriceManager,
        instrument: &Instrument,
        date: Option<NaiveDate>,
    ) -> Money {
        let currency = instrument
            .currency
            .clone()
            .unwrap_or_else(|| self.default_currency.clone());
        let Some(symbol) = &instrument.lookup_symbol else {
            warn!("Can't get price for {instrument}, as we don't have a lookup symbol.");
            return Money::zero(currency);
        };

        let date = price_date(date);
        let key = instrument.key();
        if let Some(price) = prices.get(&key, date) {
            return Money::new(price, currency);
        }
        match fetch_close_price(self.source.as_ref(), symbol, date, self.max_tries).await {
            Some(price) => {
                prices.insert(key, date, price);
                Money::new(price, currency)
            }
            None => Money::new(PRICE_SENTINEL, currency),
        }
    }
}
