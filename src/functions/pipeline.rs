use tracing::{debug, info, warn};

use crate::errors::{AppError, ParseError};
use crate::parsing::{Category, CorporateActionParser, InstrumentRow, StatementReader, TradeRow};
use crate::structs::{
    AppliedAdjustment, CorporateActionManager, InstrumentFilter, InstrumentManager, Ledger, Money,
    Transaction, TransactionManager,
};

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /* A malformed row stops the load instead of being skipped with a warning */
    pub abort_on_malformed: bool,
}

/* Trades of all statement files: deduplicated, corrected for splits and mergers, sorted,
and the open positions they add up to */
#[derive(Debug)]
pub struct Statement {
    pub transactions: Vec<Transaction>,
    pub ledger: Ledger,
    pub adjustments: Vec<AppliedAdjustment>,
    pub skipped_rows: usize,
}

/* Row-local errors are skipped, unless the caller asked to abort */
pub fn skip_or_abort(
    error: ParseError,
    options: &LoadOptions,
    skipped: &mut usize,
) -> Result<(), ParseError> {
    if options.abort_on_malformed {
        return Err(error);
    }
    warn!("Skipping row: {error}");
    *skipped += 1;
    Ok(())
}

/* Instrument metadata lines into the store */
pub fn register_instruments(
    reader: &StatementReader,
    instruments: &mut InstrumentManager,
    filter: &InstrumentFilter,
    options: &LoadOptions,
) -> Result<usize, ParseError> {
    let mut skipped = 0;
    for row in reader.rows(Category::Instruments) {
        let parsed = row.and_then(|row| InstrumentRow::parse(&row));
        match parsed {
            Ok(Some(row)) => {
                if filter.is_ignored(&row.symbols, instruments.get(&row.contract_id)) {
                    debug!("Ignoring instrument {:?}", row.symbols);
                    continue;
                }
                instruments.register(&row);
            }
            Ok(None) => {}
            Err(e) => skip_or_abort(e, options, &mut skipped)?,
        }
    }
    Ok(skipped)
}

/* Trade lines into transactions on canonical instruments, duplicates dropped */
pub fn collect_transactions(
    reader: &StatementReader,
    instruments: &InstrumentManager,
    filter: &InstrumentFilter,
    options: &LoadOptions,
) -> Result<(TransactionManager, usize), AppError> {
    let mut manager = TransactionManager::new();
    let mut skipped = 0;
    for row in reader.rows(Category::Trades) {
        let values = match row
            .and_then(|row| TradeRow::parse(&row))
            .and_then(|trade| Ok((trade.values()?, trade.symbol)))
        {
            Ok(values) => values,
            Err(e) => {
                skip_or_abort(e, options, &mut skipped)?;
                continue;
            }
        };
        let (values, symbol) = values;

        if values.quantity.is_zero() {
            debug!("{} {symbol}: Ignore 0 amount transaction", values.timestamp);
            continue;
        }
        if filter.is_ignored(&[symbol.clone()], instruments.get_by_symbol(&symbol)) {
            continue;
        }

        let instrument = instruments.resolve(&symbol, &values.currency, None)?;
        let currency = values.currency;
        manager.push(Transaction {
            timestamp: values.timestamp,
            instrument,
            quantity: values.quantity,
            transaction_price: Money::new(values.transaction_price, currency.clone()),
            fee: Money::new(values.fee, currency.clone()),
            realized: Money::new(values.realized, currency.clone()),
            transaction_total: Money::new(values.transaction_total, currency),
            realized_percent: values.realized_percent,
        });
    }
    Ok((manager, skipped))
}

pub fn collect_corporate_actions(
    reader: &StatementReader,
    options: &LoadOptions,
) -> Result<(CorporateActionManager, usize), AppError> {
    let parser = CorporateActionParser::new()
        .map_err(|e| AppError::Config(format!("Invalid corporate action pattern: {e}")))?;
    let mut manager = CorporateActionManager::new();
    let mut skipped = 0;
    for row in reader.rows(Category::CorporateActions) {
        match row.and_then(|row| parser.parse(&row)) {
            Ok(Some(action)) => {
                manager.add(action);
            }
            Ok(None) => {}
            Err(e) => skip_or_abort(e, options, &mut skipped)?,
        }
    }
    Ok((manager, skipped))
}

/* reader -> instruments -> trades -> dedup -> sort -> corporate actions -> ledger */
pub fn load_statement(
    reader: &StatementReader,
    instruments: &mut InstrumentManager,
    filter: &InstrumentFilter,
    options: &LoadOptions,
) -> Result<Statement, AppError> {
    let skipped_rows = register_instruments(reader, instruments, filter, options)?;
    load_registered_statement(reader, instruments, filter, options, skipped_rows)
}

/* Everything after the instrument registration, for instruments already registered from
`reader`. `skipped_rows` are the rows the registration skipped. */
pub fn load_registered_statement(
    reader: &StatementReader,
    instruments: &InstrumentManager,
    filter: &InstrumentFilter,
    options: &LoadOptions,
    mut skipped_rows: usize,
) -> Result<Statement, AppError> {
    let (transactions, skipped) = collect_transactions(reader, instruments, filter, options)?;
    skipped_rows += skipped;
    let mut transactions = transactions.sorted();

    let (mut actions, skipped) = collect_corporate_actions(reader, options)?;
    skipped_rows += skipped;
    actions.apply(&mut transactions, instruments);

    let provisional = transactions
        .iter()
        .filter(|tx| tx.instrument.is_provisional())
        .count();
    if provisional > 0 {
        warn!("{provisional} transactions on instruments without metadata");
    }

    let ledger = Ledger::build(&transactions)?;
    info!(
        "Loaded {} transactions, {} open positions, {} corrections, {} rows skipped",
        transactions.len(),
        ledger.len(),
        actions.adjustments().len(),
        skipped_rows
    );

    Ok(Statement {
        transactions,
        ledger,
        adjustments: actions.adjustments().to_vec(),
        skipped_rows,
    })
}
