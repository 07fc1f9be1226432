use chrono::NaiveDate;
use hashbrown::HashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::structs::Currency;

use super::Persistable;

/* Exchange rates already fetched: one `from` is worth `rate` of `to` */
#[derive(Serialize, Deserialize)]
pub struct RateManager {
    rates: HashMap<(Currency, Currency, NaiveDate), Decimal>,
    #[serde(skip)]
    path: String,
    #[serde(skip)]
    persist: bool,
}

impl Persistable for RateManager {
    const PATH: &'static str = ".data/rates";

    fn default_new(path: String, persist: bool) -> Self {
        Self {
            rates: HashMap::new(),
            path,
            persist,
        }
    }

    fn get_path(&self) -> &str {
        &self.path
    }

    fn attach(&mut self, path: String, persist: bool) {
        self.path = path;
        self.persist = persist;
    }

    fn is_persistent(&self) -> bool {
        self.persist
    }
}

impl Drop for RateManager {
    fn drop(&mut self) {
        if self.persist {
            let _save = self.save();
        }
    }
}

impl RateManager {
    /* Direct pair first, else the inverse of the reversed pair */
    pub fn get(&self, from: &Currency, to: &Currency, date: NaiveDate) -> Option<Decimal> {
        if let Some(rate) = self.rates.get(&(from.clone(), to.clone(), date)) {
            return Some(*rate);
        }
        self.rates
            .get(&(to.clone(), from.clone(), date))
            .filter(|rate| !rate.is_zero())
            .map(|rate| Decimal::ONE / rate)
    }

    pub fn insert(&mut self, from: Currency, to: Currency, date: NaiveDate, rate: Decimal) {
        self.rates.insert((from, to, date), rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
