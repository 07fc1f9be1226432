use chrono::{NaiveDate, NaiveDateTime};
use hashbrown::{HashMap, HashSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::structs::{CorporateAction, InstrumentKey, Money, RatioEffect, Transaction};

use super::InstrumentManager;

/* (effective date, action symbol, transaction timestamp): one correction per pair */
pub type AppliedKey = (NaiveDate, String, NaiveDateTime);

/* Audit record of a rewritten transaction */
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AppliedAdjustment {
    pub effective_date: NaiveDate,
    pub symbol: String,
    pub instrument: InstrumentKey,
    pub timestamp: NaiveDateTime,
    pub share_factor: Decimal,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    pub price_before: Money,
    pub price_after: Money,
}

/* Splits and mergers by (retired marker stripped) symbol, and the corrections already made */
#[derive(Default)]
pub struct CorporateActionManager {
    actions: HashMap<String, Vec<CorporateAction>>,
    applied: HashSet<AppliedKey>,
    adjustments: Vec<AppliedAdjustment>,
}

impl CorporateActionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /* The same action shows up in every statement covering its date */
    pub fn add(&mut self, action: CorporateAction) -> bool {
        let actions = self.actions.entry(action.symbol.clone()).or_default();
        if actions.contains(&action) {
            return false;
        }
        actions.push(action);
        true
    }

    pub fn extend(&mut self, actions: Vec<CorporateAction>) {
        for action in actions {
            self.add(action);
        }
    }

    pub fn len(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn adjustments(&self) -> &[AppliedAdjustment] {
        &self.adjustments
    }

    /* Rewrites quantity and price of every transaction made before a split/merger of its
    instrument. Running it again on the same transactions changes nothing.
    Returns the number of corrections made. */
    pub fn apply(&mut self, transactions: &mut [Transaction], instruments: &InstrumentManager) -> usize {
        let mut count = 0;
        for tx in transactions.iter_mut() {
            let symbols = instruments.all_known_symbols(&tx.instrument);
            let candidates: Vec<&CorporateAction> = symbols
                .iter()
                .filter_map(|s| self.actions.get(s))
                .flatten()
                .collect();
            if candidates.is_empty() {
                continue;
            }

            for action in candidates {
                let key = (action.effective_date, action.symbol.clone(), tx.timestamp);
                if tx.timestamp >= action.effective_at()
                    || &action.currency != tx.currency()
                    || self.applied.contains(&key)
                {
                    continue;
                }

                let quantity_before = tx.quantity;
                let price_before = tx.transaction_price.clone();
                tx.quantity = action.adjust_quantity(tx.quantity);
                tx.transaction_price = action.adjust_price(&tx.transaction_price);

                let effect = action.effect();
                if effect == RatioEffect::Neutral {
                    debug!("Applying {effect}: {} {}", action.ratio(), action.symbol);
                } else {
                    info!("Applying {effect}: {} {}", action.ratio(), action.symbol);
                }
                self.adjustments.push(AppliedAdjustment {
                    effective_date: action.effective_date,
                    symbol: action.symbol.clone(),
                    instrument: tx.instrument.key(),
                    timestamp: tx.timestamp,
                    share_factor: action.share_factor,
                    quantity_before,
                    quantity_after: tx.quantity,
                    price_before,
                    price_after: tx.transaction_price.clone(),
                });
                self.applied.insert(key);
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::parsing::InstrumentRow;
    use crate::structs::{CorporateActionKind, Currency, Instrument, Persistable};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn split(symbol: &str, share_factor: Decimal, effective_date: NaiveDate) -> CorporateAction {
        CorporateAction {
            effective_date,
            symbol: symbol.to_string(),
            currency: Currency::new("USD"),
            share_factor,
            security_id_old: "US0".to_string(),
            security_id_new: "US0".to_string(),
            kind: CorporateActionKind::Split,
        }
    }

    fn buy(instrument: &Instrument, day: NaiveDate, quantity: Decimal, price: Decimal) -> Transaction {
        let usd = Currency::new("USD");
        Transaction {
            timestamp: day.and_hms_opt(15, 30, 0).unwrap(),
            instrument: instrument.clone(),
            quantity,
            transaction_price: Money::new(price, usd.clone()),
            fee: Money::zero(usd.clone()),
            realized: Money::zero(usd.clone()),
            transaction_total: Money::new(-quantity * price, usd),
            realized_percent: None,
        }
    }

    fn instruments() -> (InstrumentManager, Instrument) {
        let mut manager = InstrumentManager::new_non_persistent().unwrap();
        manager.register(&InstrumentRow {
            symbols: vec!["FB".to_string()],
            name: "FACEBOOK".to_string(),
            contract_id: "1".to_string(),
            security_id: None,
            exchange: Some("NASDAQ".to_string()),
            currency: Some(Currency::new("USD")),
        });
        manager.register(&InstrumentRow {
            symbols: vec!["META".to_string()],
            name: "META PLATFORMS".to_string(),
            contract_id: "1".to_string(),
            security_id: None,
            exchange: Some("NASDAQ".to_string()),
            currency: Some(Currency::new("USD")),
        });
        let instrument = manager.get("1").unwrap().clone();
        (manager, instrument)
    }

    #[test]
    fn test_two_for_one_split() {
        let (instruments, instrument) = instruments();
        let mut manager = CorporateActionManager::new();
        manager.add(split("META", dec!(2), date(2021, 6, 1)));

        let mut txs = vec![buy(&instrument, date(2021, 1, 4), dec!(10), dec!(20))];
        assert_eq!(manager.apply(&mut txs, &instruments), 1);
        assert_eq!(txs[0].quantity, dec!(20));
        assert_eq!(txs[0].transaction_price.amount, dec!(10));
        assert_eq!(txs[0].quantity * txs[0].transaction_price.amount, dec!(200));
        assert_eq!(manager.adjustments()[0].quantity_before, dec!(10));
    }

    #[test]
    fn test_apply_twice_is_a_no_op() {
        let (instruments, instrument) = instruments();
        let mut manager = CorporateActionManager::new();
        manager.add(split("META", dec!(4), date(2021, 6, 1)));
        assert!(!manager.add(split("META", dec!(4), date(2021, 6, 1))));

        let mut txs = vec![buy(&instrument, date(2021, 1, 4), dec!(10), dec!(20))];
        manager.apply(&mut txs, &instruments);
        let once = txs.clone();
        assert_eq!(manager.apply(&mut txs, &instruments), 0);
        assert_eq!(txs, once);
        assert_eq!(txs[0].quantity, dec!(40));
    }

    #[test]
    fn test_action_on_old_alias() {
        let (instruments, instrument) = instruments();
        let mut manager = CorporateActionManager::new();
        manager.add(split("FB", dec!(2), date(2021, 6, 1)));

        let mut txs = vec![buy(&instrument, date(2021, 1, 4), dec!(10), dec!(20))];
        assert_eq!(manager.apply(&mut txs, &instruments), 1);
        assert_eq!(txs[0].quantity, dec!(20));
    }

    #[test]
    fn test_later_and_other_currency_untouched() {
        let (instruments, instrument) = instruments();
        let mut manager = CorporateActionManager::new();
        manager.add(split("META", dec!(2), date(2021, 6, 1)));
        let mut other = split("META", dec!(3), date(2021, 6, 1));
        other.currency = Currency::new("EUR");
        manager.add(other);

        let mut txs = vec![
            buy(&instrument, date(2021, 6, 1), dec!(10), dec!(20)),
            buy(&instrument, date(2021, 7, 1), dec!(10), dec!(20)),
        ];
        assert_eq!(manager.apply(&mut txs, &instruments), 0);
        assert_eq!(txs[0].quantity, dec!(10));
    }

    #[test]
    fn test_ratio_one_keeps_values() {
        let (instruments, instrument) = instruments();
        let mut manager = CorporateActionManager::new();
        manager.add(split("META", dec!(1), date(2021, 6, 1)));

        let mut txs = vec![buy(&instrument, date(2021, 1, 4), dec!(10), dec!(20))];
        assert_eq!(manager.apply(&mut txs, &instruments), 1);
        assert_eq!(txs[0].quantity, dec!(10));
        assert_eq!(txs[0].transaction_price.amount, dec!(20));
    }
}
