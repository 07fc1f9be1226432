use chrono::NaiveDate;
use tracing::debug;

use crate::api::RateSource;
use crate::errors::ApiError;
use crate::structs::{Currency, Money, RateManager};

pub struct CurrencyConverter<R> {
    source: R,
    max_tries: u32,
}

impl<R: RateSource> CurrencyConverter<R> {
    pub fn new(source: R, max_tries: u32) -> Self {
        CurrencyConverter { source, max_tries }
    }

    /* Amount expressed in `to` at the rate of `date` */
    pub async fn convert(
        &self,
        rates: &mut RateManager,
        money: &Money,
        to: &Currency,
        date: NaiveDate,
    ) -> Result<Money, ApiError> {
        if &money.currency == to {
            return Ok(money.clone());
        }
        if let Some(rate) = rates.get(&money.currency, to, date) {
            return Ok(Money::new(money.amount * rate, to.clone()));
        }

        let mut tries = 0;
        let rate = loop {
            tries += 1;
            match self.source.rate(&money.currency, to, date).await {
                Ok(rate) => break rate,
                Err(e) if tries >= self.max_tries.max(1) => {
                    debug!("Giving up rate {}-{to}: {e}", money.currency);
                    return Err(ApiError::CouldNotFindRate {
                        from: money.currency.clone(),
                        to: to.clone(),
                        date,
                        tries,
                    });
                }
                Err(e) => debug!("Retry {tries} rate {}-{to}: {e}", money.currency),
            }
        };
        rates.insert(money.currency.clone(), to.clone(), date, rate);
        Ok(Money::new(money.amount * rate, to.clone()))
    }
}
