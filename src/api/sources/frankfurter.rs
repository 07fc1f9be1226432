use async_trait::async_trait;
use chrono::NaiveDate;
use hashbrown::HashMap;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::ApiError;
use crate::parsing::DATE_FORMAT;
use crate::structs::Currency;

use super::RateSource;

const API_FRANKFURTER_ENDPOINT: &str = "https://api.frankfurter.app";

#[derive(Deserialize, Debug)]
struct RatesResponse {
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

/* Reference rates of the european central bank */
pub struct FrankfurterSource {
    client: reqwest::Client,
}

impl FrankfurterSource {
    pub fn new() -> Self {
        FrankfurterSource {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for FrankfurterSource {
    fn default() -> Self {
        Self::new()
    }
}

fn rate_of(response: RatesResponse, from: &Currency, to: &Currency, date: NaiveDate) -> Result<Decimal, ApiError> {
    response
        .rates
        .get(to.code())
        .copied()
        .ok_or_else(|| ApiError::CouldNotFindRate {
            from: from.clone(),
            to: to.clone(),
            date,
            tries: 1,
        })
}

#[async_trait]
impl RateSource for FrankfurterSource {
    async fn rate(
        &self,
        from: &Currency,
        to: &Currency,
        date: NaiveDate,
    ) -> Result<Decimal, ApiError> {
        debug!("Fetching rate: {from}-{to} {date}");
        let text = self
            .client
            .get(format!(
                "{API_FRANKFURTER_ENDPOINT}/{}",
                date.format(DATE_FORMAT)
            ))
            .query(&[("from", from.code()), ("to", to.code())])
            .send()
            .await?
            .text()
            .await?;
        let response: RatesResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        rate_of(response, from, to, date)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_rate_of() {
        let json = r#"{"amount":1.0,"base":"USD","date":"2020-01-02","rates":{"EUR":0.8917}}"#;
        let response: RatesResponse = serde_json::from_str(json).unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let usd = Currency::new("USD");
        let eur = Currency::new("EUR");
        assert_eq!(rate_of(response, &usd, &eur, date).unwrap(), dec!(0.8917));
    }
}
