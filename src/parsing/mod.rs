pub mod reader;
pub use reader::*;

pub mod ib;
pub use ib::*;

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::errors::ParseError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d, %H:%M:%S";

/* Numbers in statements may carry thousands separators: "1,000" */
pub fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, ParseError> {
    let cleaned = value.trim().replace(',', "");
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| ParseError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/* Empty cell means "not given" */
pub fn parse_optional_decimal(
    field: &'static str,
    value: &str,
) -> Result<Option<Decimal>, ParseError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal(field, value).map(Some)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ParseError::InvalidDate {
        value: value.to_string(),
        format: DATE_FORMAT,
    })
}

/* "2019-06-16, 20:09:34". Some exports drop the comma. */
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ParseError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| ParseError::InvalidDate {
            value: value.to_string(),
            format: TIMESTAMP_FORMAT,
        })
}

pub fn field<'a>(row: &'a [String], index: usize) -> Result<&'a str, ParseError> {
    row.get(index)
        .map(String::as_str)
        .ok_or_else(|| ParseError::TooShort {
            expected: index + 1,
            row: row.to_vec(),
        })
}
