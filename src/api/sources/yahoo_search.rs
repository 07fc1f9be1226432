use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::ApiError;
use crate::structs::Currency;

use super::{SymbolLookup, SymbolMatch, USER_AGENT};

/* Same endpoint the search field of the finance site uses */
const API_YAHOO_SEARCH_ENDPOINT: &str = "https://query1.finance.yahoo.com/v1/finance/search";

/* Exchange code of a search result -> currency of the listing */
pub fn yahoo_exchange_currency(exchange: &str) -> Option<Currency> {
    let code = match exchange {
        "NMS" | "NYQ" | "NGM" | "NCM" | "PCX" | "ASE" | "BTS" | "PNK" => "USD",
        "GER" | "FRA" | "STU" | "MUN" | "DUS" | "HAM" | "BER" | "PAR" | "AMS" | "MIL" | "MCE"
        | "BRU" | "VIE" | "LIS" => "EUR",
        "ASX" => "AUD",
        "TOR" | "VAN" => "CAD",
        "LSE" => "GBP",
        "HKG" => "HKD",
        "EBS" => "CHF",
        "STO" => "SEK",
        "OSL" => "NOK",
        "CPH" => "DKK",
        "JPX" => "JPY",
        _ => return None,
    };
    Some(Currency::new(code))
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Deserialize, Debug)]
struct SearchQuote {
    symbol: String,
    longname: Option<String>,
    shortname: Option<String>,
    exchange: Option<String>,
}

pub struct YahooSearchSource {
    client: reqwest::Client,
}

impl YahooSearchSource {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(YahooSearchSource { client })
    }
}

fn best_match(query: &str, response: SearchResponse) -> Option<SymbolMatch> {
    let Some(quote) = response.quotes.into_iter().next() else {
        debug!("{query:12}: No quotes found.");
        return None;
    };
    let currency = quote.exchange.as_deref().and_then(yahoo_exchange_currency);
    if currency.is_none() {
        warn!(
            "Unknown currency for exchange: {:?} ({})",
            quote.exchange, quote.symbol
        );
    }
    let name = quote
        .longname
        .or(quote.shortname)
        .unwrap_or_else(|| quote.symbol.clone());
    Some(SymbolMatch {
        symbol: quote.symbol,
        name,
        currency,
    })
}

#[async_trait]
impl SymbolLookup for YahooSearchSource {
    async fn search(&self, query: &str) -> Result<Option<SymbolMatch>, ApiError> {
        debug!("Query lookup: {query}");
        let text = self
            .client
            .get(API_YAHOO_SEARCH_ENDPOINT)
            .query(&[("q", query)])
            .send()
            .await?
            .text()
            .await?;
        let response: SearchResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(best_match(query, response))
    }
}
