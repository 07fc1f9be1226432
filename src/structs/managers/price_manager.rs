use chrono::NaiveDate;
use hashbrown::HashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::structs::InstrumentKey;

use super::Persistable;

/* Close prices already fetched, by instrument and day */
#[derive(Serialize, Deserialize)]
pub struct PriceManager {
    prices: HashMap<(InstrumentKey, NaiveDate), Decimal>,
    #[serde(skip)]
    path: String,
    #[serde(skip)]
    persist: bool,
}

impl Persistable for PriceManager {
    const PATH: &'static str = ".data/prices";

    fn default_new(path: String, persist: bool) -> Self {
        Self {
            prices: HashMap::new(),
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

impl Drop for PriceManager {
    fn drop(&mut self) {
        if self.persist {
            let _save = self.save();
        }
    }
}

impl PriceManager {
    pub fn get(&self, instrument: &InstrumentKey, date: NaiveDate) -> Option<Decimal> {
        self.prices.get(&(instrument.clone(), date)).copied()
    }

    pub fn contains(&self, instrument: &InstrumentKey, date: NaiveDate) -> bool {
        self.prices.contains_key(&(instrument.clone(), date))
    }

    pub fn insert(&mut self, instrument: InstrumentKey, date: NaiveDate, price: Decimal) {
        self.prices.insert((instrument, date), price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_save_and_reload() {
        let path = ".data_test/prices".to_string();
        let key = InstrumentKey::Contract("265598".to_string());
        let date = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        {
            let mut prices = PriceManager::new(Some(path.clone())).unwrap();
            prices.insert(key.clone(), date, dec!(127.79));
        }
        let prices = PriceManager::new(Some(path)).unwrap();
        assert_eq!(prices.get(&key, date), Some(dec!(127.79)));
        assert!(!prices.contains(&key, date.succ_opt().unwrap()));
        prices.delete().unwrap();
    }
}
