use rust_decimal_macros::dec;

use crate::errors::AppError;
use crate::functions::{
    collect_corporate_actions, collect_transactions, load_registered_statement, load_statement,
    register_instruments, LoadOptions, Statement,
};
use crate::parsing::StatementReader;
use crate::structs::{InstrumentFilter, InstrumentKey, InstrumentManager, Persistable};

const INSTRUMENTS: &str = "Financial Instrument Information,Data,Stocks,AAPL,APPLE INC,265598,US0378331005,NASDAQ,1,COMMON,\n";

const SPLIT: &str = r#"Corporate Actions,Data,Stocks,USD,2020-08-31,"2020-08-28, 20:25:00","AAPL(US0378331005) Split 2 for 1 (AAPL, APPLE INC, US0378331005)",10,0,0,0,
"#;

fn trade(timestamp: &str, quantity: &str, price: &str, realized: &str) -> String {
    format!(
        "Trades,Data,Order,Stocks,USD,AAPL,\"{timestamp}\",{quantity},{price},{price},0,-1,0,{realized},0,0,O\n"
    )
}

fn load(content: &str, options: &LoadOptions) -> Result<Statement, AppError> {
    let reader = StatementReader::from_content(content)?;
    let mut instruments = InstrumentManager::new_non_persistent()?;
    load_statement(&reader, &mut instruments, &InstrumentFilter::default(), options)
}

fn aapl() -> InstrumentKey {
    InstrumentKey::Contract("265598".to_string())
}

#[test]
fn overlapping_statements_are_folded_once() {
    let statement = format!(
        "{INSTRUMENTS}{}{}",
        trade("2020-01-03, 10:00:00", "10", "10", "0"),
        trade("2020-01-03, 14:30:00", "5", "13", "0")
    );
    // the same month exported twice
    let content = format!("{statement}{statement}");

    let loaded = load(&content, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.transactions.len(), 2);
    let position = loaded.ledger.get(&aapl()).unwrap();
    assert_eq!(position.quantity, dec!(15));
    assert_eq!(position.average_cost.amount, dec!(11));
}

#[test]
fn split_corrects_earlier_trades() {
    let content = format!(
        "{INSTRUMENTS}{}{}{SPLIT}",
        trade("2020-01-03, 10:00:00", "10", "20", "0"),
        trade("2020-09-01, 10:00:00", "4", "10", "0")
    );
    let loaded = load(&content, &LoadOptions::default()).unwrap();

    assert_eq!(loaded.transactions[0].quantity, dec!(20));
    assert_eq!(loaded.transactions[0].transaction_price.amount, dec!(10));
    // after the effective date, untouched
    assert_eq!(loaded.transactions[1].quantity, dec!(4));
    assert_eq!(loaded.adjustments.len(), 1);
    assert_eq!(loaded.adjustments[0].quantity_before, dec!(10));

    let position = loaded.ledger.get(&aapl()).unwrap();
    assert_eq!(position.quantity, dec!(24));
    assert_eq!(position.average_cost.amount, dec!(10));
}

#[test]
fn corrections_are_applied_once() {
    let content = format!(
        "{INSTRUMENTS}{}{SPLIT}{SPLIT}",
        trade("2020-01-03, 10:00:00", "10", "20", "0")
    );
    let options = LoadOptions::default();
    let filter = InstrumentFilter::default();
    let reader = StatementReader::from_content(&content).unwrap();
    let mut instruments = InstrumentManager::new_non_persistent().unwrap();
    register_instruments(&reader, &mut instruments, &filter, &options).unwrap();

    let (transactions, _) = collect_transactions(&reader, &instruments, &filter, &options).unwrap();
    let mut transactions = transactions.sorted();
    let (mut actions, _) = collect_corporate_actions(&reader, &options).unwrap();
    assert_eq!(actions.len(), 1);

    assert_eq!(actions.apply(&mut transactions, &instruments), 1);
    assert_eq!(actions.apply(&mut transactions, &instruments), 0);
    assert_eq!(transactions[0].quantity, dec!(20));
    assert_eq!(actions.adjustments().len(), 1);
}

#[test]
fn sell_closes_position() {
    let content = format!(
        "{INSTRUMENTS}{}{}",
        trade("2020-01-03, 10:00:00", "10", "20", "0"),
        trade("2020-02-03, 10:00:00", "-10", "25", "49")
    );
    let loaded = load(&content, &LoadOptions::default()).unwrap();

    assert!(loaded.ledger.get(&aapl()).is_none());
    assert!(loaded.ledger.is_empty());
    assert_eq!(loaded.transactions[1].realized.amount, dec!(49));
}

#[test]
fn malformed_rows_are_skipped_unless_asked() {
    let content = format!(
        "{INSTRUMENTS}{}Trades,Data,Order,Stocks,USD,AAPL,\"2020-01-05, 10:00:00\",10\n",
        trade("2020-01-03, 10:00:00", "10", "20", "0")
    );

    let loaded = load(&content, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.skipped_rows, 1);
    assert_eq!(loaded.transactions.len(), 1);

    let options = LoadOptions {
        abort_on_malformed: true,
    };
    assert!(matches!(load(&content, &options), Err(AppError::Parse(_))));
}

#[test]
fn position_flip_is_fatal() {
    let content = format!(
        "{INSTRUMENTS}{}{}",
        trade("2020-01-03, 10:00:00", "10", "20", "0"),
        trade("2020-02-03, 10:00:00", "-15", "25", "0")
    );
    assert!(matches!(
        load(&content, &LoadOptions::default()),
        Err(AppError::Ledger(_))
    ));
}

#[test]
fn registered_instruments_are_not_registered_again() {
    let content = format!(
        "{INSTRUMENTS}Financial Instrument Information,Data,Stocks,XYZ,XYZ CORP,777,US0000000777,NOWHERE,1,COMMON,\n{}",
        trade("2020-01-03, 10:00:00", "10", "20", "0")
    );
    let options = LoadOptions::default();
    let filter = InstrumentFilter::default();
    let reader = StatementReader::from_content(&content).unwrap();
    let mut instruments = InstrumentManager::new_non_persistent().unwrap();

    let skipped = register_instruments(&reader, &mut instruments, &filter, &options).unwrap();
    assert_eq!(skipped, 1);
    assert_eq!(instruments.len(), 1);

    let loaded =
        load_registered_statement(&reader, &instruments, &filter, &options, skipped).unwrap();
    assert_eq!(loaded.skipped_rows, 1);
    assert_eq!(loaded.ledger.get(&aapl()).unwrap().quantity, dec!(10));
}
