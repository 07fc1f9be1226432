pub mod api;
pub mod errors;
pub mod functions;
pub mod parsing;
pub mod structs;
pub mod utils;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use rust_decimal::Decimal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use api::{
    CurrencyConverter, FrankfurterSource, MarketData, PriceService, YahooChartSource,
    YahooSearchSource,
};
use errors::AppError;
use functions::{
    check_positions, collect_dividends, collect_money_moves, deposit_report, dividend_report,
    load_open_positions, load_registered_statement, portfolio_report, realized_report,
    register_instruments, transaction_report, DividendQuery, LoadOptions, SortOrder, Statement,
    TransactionQuery,
};
use parsing::StatementReader;
use structs::{
    Currency, InstrumentFilter, InstrumentManager, Persistable, PriceManager, RateManager,
};
use utils::{Config, DateWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    #[value(alias = "t")]
    Transactions,
    #[value(alias = "p")]
    Portfolio,
    #[value(alias = "d")]
    Dividends,
    #[value(alias = "e")]
    Deposits,
    #[value(name = "report_realized", alias = "rr")]
    ReportRealized,
    Check,
}

/// Positions, trades and dividends from Interactive Brokers activity statements
#[derive(Debug, Parser)]
#[command(name = "ibledger", version, about, long_about = None)]
struct Args {
    mode: Mode,

    /// Only these symbols
    symbols: Vec<String>,

    /// Only rows in this currency
    #[arg(short = 'c', long = "currency")]
    currency: Option<String>,

    /// Convert amounts into this currency
    #[arg(short = 'f', long = "display-currency")]
    display_currency: Option<String>,

    /// Time window: 10d, 2w, ytd, 2020-01-01--2020-06-30 or 2020-01-01--
    #[arg(short = 'd', long = "date")]
    window: Option<String>,

    /// Only sells
    #[arg(short = 's', long = "sells", conflicts_with = "buys")]
    sells: bool,

    /// Only buys
    #[arg(short = 'b', long = "buys")]
    buys: bool,

    /// Portfolio order: name, amount, symbol (append _r to reverse)
    #[arg(short = 'o', long = "order", default_value = "name")]
    order: SortOrder,

    /// Stop at the first malformed row instead of skipping it
    #[arg(long)]
    abort_on_malformed: bool,
}

type Market = MarketData<YahooChartSource, FrankfurterSource>;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let config = Config::from_env()?;
    let today = Local::now().date_naive();
    let window = match &args.window {
        Some(value) => DateWindow::parse(value, today)?,
        None => DateWindow::default(),
    };
    let options = LoadOptions {
        abort_on_malformed: args.abort_on_malformed,
    };
    let load_filter = InstrumentFilter::new(config.ignored_symbols.clone(), Vec::new());
    let filter = InstrumentFilter::new(config.ignored_symbols.clone(), args.symbols.clone());
    let currency = args.currency.as_deref().map(Currency::new);
    let display_currency = args.display_currency.as_deref().map(Currency::new);

    let reader = StatementReader::from_dir(&config.csv_path)?;
    let mut instruments = InstrumentManager::new(Some(config.store_path("instruments")))?;

    let skipped = register_instruments(&reader, &mut instruments, &load_filter, &options)?;
    let lookup = YahooSearchSource::new()?;
    let found = instruments
        .fill_lookup_symbols(&lookup, config.lookup_max_tries)
        .await;
    if found > 0 {
        info!("Found {found} new lookup symbols");
        instruments.save()?;
    }

    let statement =
        load_registered_statement(&reader, &instruments, &load_filter, &options, skipped)?;

    let mut market = MarketData::new(
        PriceManager::new(Some(config.store_path("prices")))?,
        RateManager::new(Some(config.store_path("rates")))?,
        PriceService::new(
            Arc::new(YahooChartSource::new()?),
            config.price_fetch_max_tries,
            config.default_currency.clone(),
        ),
        CurrencyConverter::new(FrankfurterSource::new(), config.price_fetch_max_tries),
        config.price_workers,
    );

    match args.mode {
        Mode::Transactions => {
            let query = TransactionQuery {
                filter,
                currency,
                only_buy: args.buys,
                only_sell: args.sells,
                window,
                display_currency,
            };
            print_transactions(&statement, &query, &mut market, &config, today).await?;
        }
        Mode::Portfolio => {
            let currency = display_currency.unwrap_or(config.default_currency.clone());
            let report = portfolio_report(
                &statement.ledger,
                &filter,
                &mut market,
                &currency,
                args.order,
                today,
            )
            .await?;
            for line in &report.lines {
                println!(
                    "{:<40} {:<10} {:>10} {:>12} {:>12} {:>14} {:>7}%",
                    line.name,
                    line.symbol,
                    line.quantity,
                    line.average_cost,
                    line.price_now,
                    line.value,
                    percent(line.weight)
                );
            }
            println!("Total: {}", report.total);
        }
        Mode::Dividends => {
            let dividends = collect_dividends(&reader, &instruments, &options)?;
            let query = DividendQuery {
                filter,
                currency,
                window,
                display_currency,
            };
            let report =
                dividend_report(&dividends, &query, &mut market, &config.default_currency).await?;
            for line in &report.lines {
                println!(
                    "{} {:<40} {:>12} {:>12}",
                    line.dividend.date,
                    line.dividend.display_name(),
                    line.dividend.amount,
                    line.amount
                );
            }
            println!("Total: {}", report.total);
        }
        Mode::Deposits => {
            let moves = collect_money_moves(&reader, &options)?;
            let report = deposit_report(
                &moves,
                currency.as_ref(),
                &window,
                display_currency.as_ref(),
                &mut market,
                &config.default_currency,
            )
            .await?;
            for (money_move, amount) in &report.lines {
                let kind = if money_move.is_deposit() {
                    "Deposit"
                } else {
                    "Withdrawal"
                };
                println!(
                    "{} {:<10} {:<40} {:>12} {:>12}",
                    money_move.date, kind, money_move.description, money_move.amount, amount
                );
            }
            println!("Total: {}", report.total);
        }
        Mode::ReportRealized => {
            let currency = display_currency.unwrap_or(config.default_currency.clone());
            let query = TransactionQuery {
                filter: filter.clone(),
                only_sell: true,
                window,
                ..Default::default()
            };
            let sells: Vec<_> = statement
                .transactions
                .iter()
                .filter(|tx| query.accepts(tx))
                .collect();
            let dividends = collect_dividends(&reader, &instruments, &options)?;
            let dividend_query = DividendQuery {
                filter,
                window,
                ..Default::default()
            };
            let dividends: Vec<_> = dividends
                .iter()
                .filter(|d| dividend_query.accepts(d))
                .collect();
            let points = realized_report(&sells, &dividends, &mut market, &currency).await?;
            for point in &points {
                println!(
                    "{} {:>12} {:>12} {:>12} {currency}",
                    point.date,
                    point.realized.round_dp(2),
                    point.dividends.round_dp(2),
                    point.total().round_dp(2)
                );
            }
        }
        Mode::Check => {
            let positions = load_open_positions(Path::new(&config.csv_path))?;
            let mismatches =
                check_positions(&statement.transactions, &positions, &instruments);
            if mismatches.is_empty() {
                println!("All {} positions match", positions.len());
            }
            for mismatch in &mismatches {
                println!(
                    "{:<10} broker: {:>10} transactions: {:>10}",
                    mismatch.symbol, mismatch.broker, mismatch.transactions
                );
            }
        }
    }

    market.prices.save()?;
    market.rates.save()?;
    Ok(())
}

async fn print_transactions(
    statement: &Statement,
    query: &TransactionQuery,
    market: &mut Market,
    config: &Config,
    today: NaiveDate,
) -> Result<(), AppError> {
    let report = transaction_report(
        &statement.transactions,
        query,
        market,
        &config.default_currency,
        today,
    )
    .await?;
    for line in &report.lines {
        let unrealized = line
            .unrealized
            .map(|u| format!("{}%", percent(u)))
            .unwrap_or_default();
        let realized = match (&line.realized, line.realized_percent) {
            (Some(realized), Some(pct)) => format!("{realized} ({}%)", percent(pct)),
            (Some(realized), None) => realized.to_string(),
            _ => String::new(),
        };
        println!(
            "{} {:<40} {:<10} {:>10} {:>12} {:>12} {:>14} {:>8} {}",
            line.date,
            line.name,
            line.symbol,
            line.quantity,
            line.price,
            line.price_today,
            line.total,
            unrealized,
            realized
        );
    }
    let average = report
        .average_price
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_default();
    println!(
        "Quantity: {} Average: {average} Invested: {} Realized: {}",
        report.quantity_total, report.invested_total, report.realized_total
    );
    if let Some(unrealized) = report.unrealized {
        println!("Unrealized: {}%", percent(unrealized));
    }
    Ok(())
}

fn percent(fraction: Decimal) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED).round_dp(2)
}
