use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Currency, Money};

#[derive(Hash, Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CorporateActionKind {
    Split,
    Merger,
}

/* A split or merger announced in the statement. "N for M" means N new shares for M old ones:
`share_factor` is N/M and is what a historical quantity gets multiplied with. */
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CorporateAction {
    pub effective_date: NaiveDate,
    pub symbol: String, // old broker symbol, retired marker stripped
    pub currency: Currency,
    pub share_factor: Decimal,
    pub security_id_old: String,
    pub security_id_new: String,
    pub kind: CorporateActionKind,
}

/* Classification of what applying the action does to historical share counts */
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RatioEffect {
    ForwardSplit,
    Consolidation, // reverse split or merger into fewer shares
    Neutral,
}

impl fmt::Display for RatioEffect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RatioEffect::ForwardSplit => write!(f, "split"),
            RatioEffect::Consolidation => write!(f, "reverse split/merge"),
            RatioEffect::Neutral => write!(f, "no-op"),
        }
    }
}

impl CorporateAction {
    /* Old units per new unit: below one for a forward split */
    pub fn ratio(&self) -> Decimal {
        Decimal::ONE / self.share_factor
    }

    pub fn effect(&self) -> RatioEffect {
        let ratio = self.ratio();
        if ratio < Decimal::ONE {
            RatioEffect::ForwardSplit
        } else if ratio > Decimal::ONE {
            RatioEffect::Consolidation
        } else {
            RatioEffect::Neutral
        }
    }

    /* Start of the effective day. Only trades strictly before it are corrected. */
    pub fn effective_at(&self) -> NaiveDateTime {
        self.effective_date.and_time(chrono::NaiveTime::MIN)
    }

    pub fn adjust_quantity(&self, quantity: Decimal) -> Decimal {
        quantity * self.share_factor
    }

    /* Keeps quantity * price unchanged */
    pub fn adjust_price(&self, price: &Money) -> Money {
        price / self.share_factor
    }
}
