use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::ApiError;

use super::{PriceSource, USER_AGENT};

const API_YAHOO_CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize, Debug)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooChartSource {
    client: reqwest::Client,
}

impl YahooChartSource {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(YahooChartSource { client })
    }
}

/* First non-empty close of the answer */
fn first_close(response: ChartResponse) -> Result<Option<Decimal>, ApiError> {
    if let Some(error) = response.chart.error {
        return Err(ApiError::ApiCallError(format!(
            "{}: {}",
            error.code, error.description
        )));
    }
    let close = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .flat_map(|r| r.indicators.quote)
        .flat_map(|q| q.close)
        .flatten()
        .next();
    Ok(close.and_then(Decimal::from_f64).map(|p| p.round_dp(6)))
}

#[async_trait]
impl PriceSource for YahooChartSource {
    async fn close_price(&self, symbol: &str, date: NaiveDate) -> Result<Option<Decimal>, ApiError> {
        let start = date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end = (date + Duration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        debug!("{symbol}: Fetching {date}");
        let text = self
            .client
            .get(format!("{API_YAHOO_CHART_ENDPOINT}/{symbol}"))
            .query(&[
                ("period1", start.to_string()),
                ("period2", end.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await?
            .text()
            .await?;
        let response: ChartResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        first_close(response)
    }
}
