use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::ApiError;
use crate::structs::Currency;

pub mod yahoo_chart;
pub use yahoo_chart::*;

pub mod yahoo_search;
pub use yahoo_search::*;

pub mod frankfurter;
pub use frankfurter::*;

pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/* Daily close prices by lookup symbol */
#[async_trait]
pub trait PriceSource: Send + Sync {
    /* Ok(None) when the market had no price that day */
    async fn close_price(&self, symbol: &str, date: NaiveDate) -> Result<Option<Decimal>, ApiError>;
}

/* Exchange rate: how many `to` for one `from` */
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn rate(&self, from: &Currency, to: &Currency, date: NaiveDate)
        -> Result<Decimal, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub currency: Option<Currency>,
}

/* Finds the symbol the price site uses, from a security id or a company name */
#[async_trait]
pub trait SymbolLookup: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<SymbolMatch>, ApiError>;
}
