use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

use super::{Instrument, Money, Transaction};

/* What folding one transaction did to a position */
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum PositionUpdate {
    Opened,
    Ignored, // rounds to zero shares
    Increased,
    Reduced,
    Closed,
}

/* Current holding of one instrument: whole shares and the weighted average cost per share */
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub instrument: Instrument,
    pub quantity: Decimal,
    pub average_cost: Money,
}

impl Position {
    pub fn open(tx: &Transaction) -> Self {
        Position {
            instrument: tx.instrument.clone(),
            quantity: tx.quantity.round(),
            average_cost: tx.transaction_price.clone(),
        }
    }

    /* Folds a later transaction of the same instrument into the position.

    Buying more (or shorting more) blends the average cost, selling only reduces the quantity.
    A trade bigger than the open position would flip long to short and is rejected. */
    pub fn update(&mut self, tx: &Transaction) -> Result<PositionUpdate, LedgerError> {
        if tx.currency() != &self.average_cost.currency {
            return Err(LedgerError::CurrencyMismatch {
                instrument: self.instrument.key(),
                timestamp: tx.timestamp,
                stored: self.average_cost.currency.clone(),
                observed: tx.currency().clone(),
            });
        }

        let new_quantity = (self.quantity + tx.quantity).round();
        if new_quantity.is_zero() {
            self.quantity = new_quantity;
            return Ok(PositionUpdate::Closed);
        }

        let same_direction = tx.quantity.is_sign_positive() == self.quantity.is_sign_positive();
        if same_direction {
            let old_value = self.quantity * self.average_cost.amount;
            let new_value = tx.quantity * tx.transaction_price.amount;
            self.average_cost.amount = (old_value + new_value) / new_quantity;
            self.quantity = new_quantity;
            return Ok(PositionUpdate::Increased);
        }

        if new_quantity.is_sign_positive() != self.quantity.is_sign_positive() {
            return Err(LedgerError::PositionFlip {
                instrument: self.instrument.key(),
                timestamp: tx.timestamp,
                open_quantity: self.quantity,
                quantity: tx.quantity,
            });
        }

        self.quantity = new_quantity;
        Ok(PositionUpdate::Reduced)
    }

    /* Market value at the given price per share */
    pub fn value(&self, price: &Money) -> Money {
        price * self.quantity
    }
}
