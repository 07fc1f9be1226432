use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{Currency, Instrument, InstrumentKey, Money};

/* Two records with the same key are the same trade, seen in two overlapping statements.
The time part matters: several trades of one instrument can happen on the same day. */
pub type TransactionKey = (NaiveDateTime, InstrumentKey);

/* A buy (positive quantity) or sell (negative quantity) of a stock, built from a trade row.

The corporate action corrector may rewrite `quantity` and `transaction_price` before the
transaction is folded into the ledger, after that it is not modified anymore. */
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: NaiveDateTime,
    pub instrument: Instrument,
    pub quantity: Decimal,
    pub transaction_price: Money, // per share, as executed
    pub fee: Money,               // negative when paid
    pub realized: Money,          // only meaningful for sells
    pub transaction_total: Money,
    pub realized_percent: Option<Decimal>, // fraction, 0.1 is 10%
}

impl Transaction {
    pub fn key(&self) -> TransactionKey {
        (self.timestamp, self.instrument.key())
    }

    pub fn currency(&self) -> &Currency {
        &self.transaction_price.currency
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn is_buy(&self) -> bool {
        self.quantity.is_sign_positive()
    }

    pub fn is_sell(&self) -> bool {
        self.quantity.is_sign_negative()
    }

    /* The per-share price including the fee spread over each share bought/sold */
    pub fn price(&self) -> Money {
        if self.transaction_price.is_zero() {
            // Spin-offs come in at zero, we didn't pay for them but can't calculate with zero
            return Money::new(dec!(0.01), self.currency().clone());
        }
        let fee_per_share = self.fee.amount / self.quantity;
        Money::new(
            self.transaction_price.amount - fee_per_share,
            self.currency().clone(),
        )
    }
}
