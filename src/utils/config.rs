use std::env;
use std::str::FromStr;

use crate::errors::AppError;
use crate::structs::Currency;

/* Settings read from the environment (a .env file is loaded first by main) */
#[derive(Debug, Clone)]
pub struct Config {
    pub csv_path: String,
    pub data_dir: String,
    pub default_currency: Currency,
    pub ignored_symbols: Vec<String>,
    pub price_fetch_max_tries: u32,
    pub lookup_max_tries: u32,
    pub price_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            csv_path: ".".to_string(),
            data_dir: ".data".to_string(),
            default_currency: Currency::new("EUR"),
            ignored_symbols: Vec::new(),
            price_fetch_max_tries: 3,
            lookup_max_tries: 3,
            price_workers: 10,
        }
    }
}

fn parsed<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{name} has an invalid value: '{value}'"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let default = Config::default();
        let csv_path = env::var("IBP_CSV_PATH")
            .map_err(|_| AppError::Config("IBP_CSV_PATH must be set".to_string()))?;
        let ignored_symbols = env::var("IBP_IGNORED_SYMBOLS")
            .map(|v| split_symbols(&v))
            .unwrap_or_default();

        Ok(Config {
            csv_path,
            data_dir: env::var("IBP_DATA_DIR").unwrap_or(default.data_dir),
            default_currency: env::var("IBP_DEFAULT_CURRENCY")
                .map(|c| Currency::new(&c))
                .unwrap_or(default.default_currency),
            ignored_symbols,
            price_fetch_max_tries: parsed(
                "IBP_PRICE_FETCH_MAX_TRIES",
                default.price_fetch_max_tries,
            )?,
            lookup_max_tries: parsed("IBP_LOOKUP_MAX_TRIES", default.lookup_max_tries)?,
            price_workers: parsed("IBP_PRICE_WORKERS", default.price_workers)?,
        })
    }

    /* Path of a store file inside the data directory */
    pub fn store_path(&self, name: &str) -> String {
        format!("{}/{name}", self.data_dir.trim_end_matches('/'))
    }
}

pub fn split_symbols(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
