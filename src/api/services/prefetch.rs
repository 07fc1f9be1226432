use std::sync::Arc;

use chrono::NaiveDate;
use hashbrown::HashSet;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::api::PriceSource;
use crate::structs::{Instrument, InstrumentKey, PriceManager};

use super::{fetch_close_price, price_date};

struct PriceJob {
    key: InstrumentKey,
    symbol: String,
    date: NaiveDate,
}

/* Fetches prices in the background before a report needs them.
A given (instrument, day) is queued at most once, the fetches run on a bounded pool. */
pub struct PricePrefetcher<S> {
    source: Arc<S>,
    workers: usize,
    max_tries: u32,
    queued: HashSet<(InstrumentKey, NaiveDate)>,
    jobs: Vec<PriceJob>,
}

impl<S: PriceSource + 'static> PricePrefetcher<S> {
    pub fn new(source: Arc<S>, workers: usize, max_tries: u32) -> Self {
        PricePrefetcher {
            source,
            workers: workers.max(1),
            max_tries,
            queued: HashSet::new(),
            jobs: Vec::new(),
        }
    }

    /* Returns false when nothing needs to be fetched */
    pub fn submit(
        &mut self,
        prices: &PriceManager,
        instrument: &Instrument,
        date: Option<NaiveDate>,
    ) -> bool {
        let Some(symbol) = &instrument.lookup_symbol else {
            return false;
        };
        let date = price_date(date);
        let key = instrument.key();
        if prices.contains(&key, date) || !self.queued.insert((key.clone(), date)) {
            return false;
        }
        self.jobs.push(PriceJob {
            key,
            symbol: symbol.clone(),
            date,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /* Runs all queued fetches and stores what was found. Returns the number of prices stored. */
    pub async fn run(self, prices: &mut PriceManager) -> usize {
        if self.jobs.is_empty() {
            return 0;
        }
        info!(
            "Prefetching {} prices with {} workers",
            self.jobs.len(),
            self.workers
        );
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut set: JoinSet<(InstrumentKey, NaiveDate, Option<Decimal>)> = JoinSet::new();
        for job in self.jobs {
            let semaphore = Arc::clone(&semaphore);
            let source = Arc::clone(&self.source);
            let max_tries = self.max_tries;
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let price = fetch_close_price(source.as_ref(), &job.symbol, job.date, max_tries).await;
                (job.key, job.date, price)
            });
        }

        let mut stored = 0;
        while let Some(result) = set.join_next().await {
            match result {
                Ok((key, date, Some(price))) => {
                    prices.insert(key, date, price);
                    stored += 1;
                }
                Ok((key, date, None)) => debug!("No price for {key} on {date}"),
                Err(e) => error!("Price fetch task failed: {e}"),
            }
        }
        stored
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::errors::ApiError;
    use crate::structs::{Currency, Persistable};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        async fn close_price(&self, _symbol: &str, _date: NaiveDate) -> Result<Option<Decimal>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(dec!(10)))
        }
    }

    fn instrument(contract_id: &str) -> Instrument {
        let mut instrument = Instrument::new(
            contract_id.to_string(),
            contract_id,
            contract_id,
            None,
            Some(Currency::new("USD")),
        );
        instrument.lookup_symbol = Some(contract_id.to_string());
        instrument
    }

    #[tokio::test]
    async fn test_at_most_one_fetch_per_key() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let mut prices = PriceManager::new_non_persistent().unwrap();
        let monday = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();

        let mut prefetcher = PricePrefetcher::new(Arc::clone(&source), 2, 3);
        assert!(prefetcher.submit(&prices, &instrument("A"), Some(monday)));
        assert!(!prefetcher.submit(&prices, &instrument("A"), Some(monday)));
        assert!(prefetcher.submit(&prices, &instrument("B"), Some(monday)));
        assert!(prefetcher.submit(&prices, &instrument("C"), Some(monday)));
        assert!(!prefetcher.submit(
            &prices,
            &Instrument::provisional("X", Currency::new("USD")),
            Some(monday)
        ));

        assert_eq!(prefetcher.run(&mut prices).await, 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(prices.get(&instrument("A").key(), monday), Some(dec!(10)));

        // cached now, nothing to queue
        let mut prefetcher = PricePrefetcher::new(Arc::clone(&source), 2, 3);
        assert!(!prefetcher.submit(&prices, &instrument("A"), Some(monday)));
        assert!(prefetcher.is_empty());
    }
}
