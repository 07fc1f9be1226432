use chrono::NaiveDate;

use crate::api::{PriceSource, RateSource};
use crate::errors::ApiError;
use crate::structs::{Currency, Instrument, Money, PriceManager, RateManager};

use super::{CurrencyConverter, PricePrefetcher, PriceService};

/* Prices and rates as the reports need them: stores plus the services filling them */
pub struct MarketData<P, R> {
    pub prices: PriceManager,
    pub rates: RateManager,
    price_service: PriceService<P>,
    converter: CurrencyConverter<R>,
    workers: usize,
}

impl<P: PriceSource + 'static, R: RateSource> MarketData<P, R> {
    pub fn new(
        prices: PriceManager,
        rates: RateManager,
        price_service: PriceService<P>,
        converter: CurrencyConverter<R>,
        workers: usize,
    ) -> Self {
        MarketData {
            prices,
            rates,
            price_service,
            converter,
            workers,
        }
    }

    pub async fn price(&mut self, instrument: &Instrument, date: Option<NaiveDate>) -> Money {
        self.price_service.get(&mut self.prices, instrument, date).await
    }

    /* Unchanged when no target currency is given */
    pub async fn convert(
        &mut self,
        money: &Money,
        to: Option<&Currency>,
        date: NaiveDate,
    ) -> Result<Money, ApiError> {
        match to {
            Some(to) => self.converter.convert(&mut self.rates, money, to, date).await,
            None => Ok(money.clone()),
        }
    }

    /* Fetches the prices of `date` (today when None) of all instruments concurrently */
    pub async fn prefetch<'a, I>(&mut self, instruments: I, date: Option<NaiveDate>) -> usize
    where
        I: IntoIterator<Item = &'a Instrument>,
    {
        let mut prefetcher = PricePrefetcher::new(
            self.price_service.source(),
            self.workers,
            self.price_service.max_tries(),
        );
        for instrument in instruments {
            prefetcher.submit(&self.prices, instrument, date);
        }
        prefetcher.run(&mut self.prices).await
    }
}
