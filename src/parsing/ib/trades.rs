use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::errors::{MalformedRowError, ParseError};
use crate::parsing::{parse_decimal, parse_optional_decimal, parse_timestamp};
use crate::structs::Currency;

/* The leading category columns of a trade row, stripped before classification */
pub const TRADE_ROW_PREFIXES: [[&str; 4]; 2] = [
    [
        "Trades",
        "Data",
        "Order",
        "Stocks - Held with Interactive Brokers (U.K.) Limited carried by Interactive Brokers LLC",
    ],
    ["Trades", "Data", "Order", "Stocks"],
];

/* The layouts the broker used over the years for the same trade section.
Two of them are 13 fields wide, the fourth field tells them apart. */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeRowFormat {
    /* currency, symbol, timestamp, quantity, t_price, c_price, proceeds, fee, basis, realized, realized_pct, mtm, code */
    Standard,
    /* like Standard with an empty column after the timestamp */
    WithBlank,
    /* like Standard without realized_pct */
    NoRealizedPercent,
    /* like NoRealizedPercent with the exchange after the timestamp */
    WithExchange,
}

impl TradeRowFormat {
    /* Column of the quantity, everything up to `mtm` follows it in the same order */
    fn quantity_index(&self) -> usize {
        match self {
            TradeRowFormat::Standard | TradeRowFormat::NoRealizedPercent => 3,
            TradeRowFormat::WithBlank | TradeRowFormat::WithExchange => 4,
        }
    }

    fn has_realized_percent(&self) -> bool {
        matches!(self, TradeRowFormat::Standard | TradeRowFormat::WithBlank)
    }
}

/* "500", "-1,200" */
fn is_integer_like(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == ',')
}

/* Picks the layout of a trade row (category columns already stripped) */
pub fn classify(fields: &[String]) -> Result<TradeRowFormat, MalformedRowError> {
    match fields.len() {
        13 if is_integer_like(&fields[3]) => Ok(TradeRowFormat::Standard),
        13 => Ok(TradeRowFormat::WithExchange),
        14 => Ok(TradeRowFormat::WithBlank),
        12 => Ok(TradeRowFormat::NoRealizedPercent),
        len => Err(MalformedRowError {
            row: fields.to_vec(),
            len,
        }),
    }
}

/* A trade row with named fields, whatever its layout. Values are still the raw strings. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRow {
    pub format: TradeRowFormat,
    pub currency: String,
    pub symbol: String,
    pub timestamp: String,
    pub exchange: Option<String>,
    pub quantity: String,
    pub transaction_price: String,
    pub close_price: String,
    pub transaction_total: String,
    pub fee: String,
    pub basis: String,
    pub realized: String,
    pub realized_percent: Option<String>,
    pub mtm: String,
    pub code: String,
}

/* Parsed numbers of a trade row */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeValues {
    pub currency: Currency,
    pub timestamp: NaiveDateTime,
    pub quantity: Decimal,
    pub transaction_price: Decimal,
    pub fee: Decimal,
    pub realized: Decimal,
    pub transaction_total: Decimal,
    pub realized_percent: Option<Decimal>,
}

impl TradeRow {
    /* Full statement row, starting with the category columns */
    pub fn parse(row: &[String]) -> Result<TradeRow, ParseError> {
        let known_prefix = TRADE_ROW_PREFIXES
            .iter()
            .any(|prefix| row.len() >= 4 && row[..4].iter().zip(prefix).all(|(a, b)| a == b));
        if !known_prefix {
            return Err(ParseError::UnexpectedPrefix(row.to_vec()));
        }
        Ok(Self::from_fields(&row[4..])?)
    }

    pub fn from_fields(fields: &[String]) -> Result<TradeRow, MalformedRowError> {
        let format = classify(fields)?;
        let q = format.quantity_index();
        let exchange = match format {
            TradeRowFormat::WithExchange => Some(fields[3].clone()),
            _ => None,
        };
        let (realized_percent, mtm, code) = if format.has_realized_percent() {
            (
                Some(fields[q + 7].clone()),
                fields[q + 8].clone(),
                fields[q + 9].clone(),
            )
        } else {
            (None, fields[q + 7].clone(), fields[q + 8].clone())
        };
        Ok(TradeRow {
            format,
            currency: fields[0].clone(),
            symbol: fields[1].clone(),
            timestamp: fields[2].clone(),
            exchange,
            quantity: fields[q].clone(),
            transaction_price: fields[q + 1].clone(),
            close_price: fields[q + 2].clone(),
            transaction_total: fields[q + 3].clone(),
            fee: fields[q + 4].clone(),
            basis: fields[q + 5].clone(),
            realized: fields[q + 6].clone(),
            realized_percent,
            mtm,
            code,
        })
    }

    pub fn values(&self) -> Result<TradeValues, ParseError> {
        let realized_percent = match &self.realized_percent {
            Some(p) => parse_optional_decimal("realized_percent", p)?.map(|p| p / dec!(100)),
            None => None,
        };
        Ok(TradeValues {
            currency: Currency::new(&self.currency),
            timestamp: parse_timestamp(&self.timestamp)?,
            quantity: parse_decimal("quantity", &self.quantity)?,
            transaction_price: parse_decimal("transaction_price", &self.transaction_price)?,
            fee: parse_decimal("fee", &self.fee)?,
            realized: parse_decimal("realized", &self.realized)?,
            transaction_total: parse_decimal("transaction_total", &self.transaction_total)?,
            realized_percent,
        })
    }
}
