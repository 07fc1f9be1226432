use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::errors::ParseError;
use crate::parsing::{parse_date, DATE_FORMAT};

/* A date range filter. Both ends inclusive, open when None. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /* Accepts "10d", "2w", "ytd", "2020-01-01--2020-12-31" and "2020-01-01--" */
    pub fn parse(value: &str, today: NaiveDate) -> Result<Self, ParseError> {
        let value = value.trim();
        let invalid = || ParseError::InvalidDate {
            value: value.to_string(),
            format: "10d, 2w, ytd or YYYY-MM-DD--[YYYY-MM-DD]",
        };

        if value.eq_ignore_ascii_case("ytd") {
            let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).ok_or_else(invalid)?;
            return Ok(DateWindow {
                start: Some(start),
                end: None,
            });
        }

        if let Some((start, end)) = value.split_once("--") {
            let start = parse_date(start)?;
            let end = match end.trim() {
                "" => None,
                end => Some(parse_date(end)?),
            };
            return Ok(DateWindow {
                start: Some(start),
                end,
            });
        }

        let (count, unit) = value.split_at(value.len().saturating_sub(1));
        let count = i64::from_str(count).map_err(|_| invalid())?;
        let days = match unit {
            "d" => count,
            "w" => count * 7,
            _ => return Err(invalid()),
        };
        Ok(DateWindow {
            start: Some(today - Duration::days(days)),
            end: None,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_FORMAT).to_string());
        write!(
            f,
            "{}--{}",
            fmt(self.start).unwrap_or_default(),
            fmt(self.end).unwrap_or_default()
        )
    }
}

/* Last day of the month of `date` */
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}
