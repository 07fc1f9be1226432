use hashbrown::HashMap;
use tracing::debug;

use crate::errors::LedgerError;
use crate::structs::{InstrumentKey, Position, PositionUpdate, Transaction};

/* Open positions by instrument, built by folding the trades in time order.
The average cost depends on the order, folding out of order gives wrong averages. */
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    positions: HashMap<InstrumentKey, Position>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /* Stops at the first fatal error */
    pub fn build(transactions: &[Transaction]) -> Result<Ledger, LedgerError> {
        let mut ledger = Ledger::new();
        for tx in transactions {
            ledger.fold(tx)?;
        }
        Ok(ledger)
    }

    pub fn fold(&mut self, tx: &Transaction) -> Result<PositionUpdate, LedgerError> {
        let key = tx.instrument.key();
        let open = self.positions.get(&key).map_or(false, |p| !p.quantity.is_zero());
        if !open {
            if tx.quantity.round().is_zero() {
                debug!("{key}: {} shares round to nothing, no position opened", tx.quantity);
                self.positions.remove(&key);
                return Ok(PositionUpdate::Ignored);
            }
            let position = Position::open(tx);
            debug!("Open {} {} @ {}", position.quantity, key, position.average_cost);
            self.positions.insert(key, position);
            return Ok(PositionUpdate::Opened);
        }
        let Some(position) = self.positions.get_mut(&key) else {
            return Ok(PositionUpdate::Ignored);
        };

        let update = position.update(tx)?;
        if update == PositionUpdate::Closed {
            debug!("Close {key} at {}", tx.timestamp);
            self.positions.remove(&key);
        }
        Ok(update)
    }

    pub fn get(&self, key: &InstrumentKey) -> Option<&Position> {
        self.positions.get(key)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::structs::{Currency, Instrument, Money};

    fn trade(day: u32, quantity: Decimal, price: Decimal) -> Transaction {
        let usd = Currency::new("USD");
        Transaction {
            timestamp: NaiveDate::from_ymd_opt(2020, 1, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            instrument: Instrument::new("1".to_string(), "ABC", "ABC INC", None, Some(usd.clone())),
            quantity,
            transaction_price: Money::new(price, usd.clone()),
            fee: Money::zero(usd.clone()),
            realized: Money::zero(usd.clone()),
            transaction_total: Money::new(-quantity * price, usd),
            realized_percent: None,
        }
    }

    fn key() -> InstrumentKey {
        InstrumentKey::Contract("1".to_string())
    }

    #[test]
    fn test_buys_blend_average() {
        let ledger = Ledger::build(&[trade(1, dec!(10), dec!(10)), trade(2, dec!(5), dec!(13))]).unwrap();
        let position = ledger.get(&key()).unwrap();
        assert_eq!(position.quantity, dec!(15));
        assert_eq!(position.average_cost.amount, dec!(11));
    }

    #[test]
    fn test_average_is_weighted_mean_of_buys() {
        let buys = [
            trade(1, dec!(3), dec!(7.5)),
            trade(2, dec!(5), dec!(9.5)),
            trade(3, dec!(12), dec!(11.25)),
        ];
        let ledger = Ledger::build(&buys).unwrap();
        let total: Decimal = buys.iter().map(|b| b.quantity * b.transaction_price.amount).sum();
        let quantity: Decimal = buys.iter().map(|b| b.quantity).sum();
        assert_eq!(ledger.get(&key()).unwrap().average_cost.amount, total / quantity);
    }

    #[test]
    fn test_partial_sell_keeps_average() {
        let mut ledger = Ledger::build(&[trade(1, dec!(10), dec!(10))]).unwrap();
        assert_eq!(ledger.fold(&trade(2, dec!(-4), dec!(15))).unwrap(), PositionUpdate::Reduced);
        let position = ledger.get(&key()).unwrap();
        assert_eq!(position.quantity, dec!(6));
        assert_eq!(position.average_cost.amount, dec!(10));
    }

    #[test]
    fn test_sell_all_closes() {
        let mut sell = trade(2, dec!(-10), dec!(15));
        sell.realized = Money::new(dec!(50), Currency::new("USD"));
        let ledger = Ledger::build(&[trade(1, dec!(10), dec!(10)), sell.clone()]).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(sell.realized.amount, dec!(50));
    }

    #[test]
    fn test_flip_is_rejected() {
        let err = Ledger::build(&[trade(1, dec!(10), dec!(10)), trade(2, dec!(-15), dec!(12))]).unwrap_err();
        assert!(matches!(err, LedgerError::PositionFlip { .. }));
    }

    #[test]
    fn test_short_position_grows() {
        let ledger = Ledger::build(&[trade(1, dec!(-10), dec!(10)), trade(2, dec!(-10), dec!(20))]).unwrap();
        let position = ledger.get(&key()).unwrap();
        assert_eq!(position.quantity, dec!(-20));
        assert_eq!(position.average_cost.amount, dec!(15));
    }

    #[test]
    fn test_fraction_below_one_share_opens_nothing() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.fold(&trade(1, dec!(0.4), dec!(100))).unwrap(), PositionUpdate::Ignored);
        assert!(ledger.is_empty());
        assert_eq!(ledger.fold(&trade(2, dec!(0.3), dec!(100))).unwrap(), PositionUpdate::Ignored);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_sell_after_fraction_opens_short() {
        let ledger = Ledger::build(&[trade(1, dec!(0.4), dec!(100)), trade(2, dec!(-1), dec!(90))]).unwrap();
        let position = ledger.get(&key()).unwrap();
        assert_eq!(position.quantity, dec!(-1));
        assert_eq!(position.average_cost.amount, dec!(90));
    }

    #[test]
    fn test_fractional_quantities_are_rounded() {
        let ledger = Ledger::build(&[trade(1, dec!(10.4), dec!(10))]).unwrap();
        assert_eq!(ledger.get(&key()).unwrap().quantity, dec!(10));
    }
}
