use std::path::Path;

use hashbrown::HashMap;
use rust_decimal::Decimal;
use tracing::warn;

use crate::errors::IoError;
use crate::parsing::{Category, OpenPositionRow, StatementReader};
use crate::structs::{InstrumentManager, Transaction};
use crate::utils::latest_file;

/* Broker and trades don't agree on the number of shares */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMismatch {
    pub symbol: String,
    pub broker: Decimal,
    pub transactions: Decimal,
}

/* Open positions listed in the most recent statement of the directory */
pub fn load_open_positions(dir: &Path) -> Result<Vec<OpenPositionRow>, IoError> {
    let latest = latest_file(dir)?;
    let reader = StatementReader::from_files(vec![latest], &[Category::OpenPositions])?;
    let mut positions = Vec::new();
    for row in reader.rows(Category::OpenPositions) {
        match row.and_then(|row| OpenPositionRow::parse(&row)) {
            Ok(position) => positions.push(position),
            Err(e) => warn!("Skipping open position row: {e}"),
        }
    }
    Ok(positions)
}

/* Sum of the traded quantities per symbol against what the broker holds */
pub fn check_positions(
    transactions: &[Transaction],
    positions: &[OpenPositionRow],
    instruments: &InstrumentManager,
) -> Vec<PositionMismatch> {
    let mut traded: HashMap<&str, Decimal> = HashMap::new();
    for tx in transactions {
        *traded.entry(tx.instrument.symbol.as_str()).or_default() += tx.quantity;
    }

    positions
        .iter()
        .filter_map(|position| {
            let symbol = instruments
                .get_by_symbol(&position.symbol)
                .map(|i| i.symbol.as_str())
                .unwrap_or(&position.symbol);
            let transactions = traded.get(symbol).copied().unwrap_or_default();
            if transactions == position.quantity {
                return None;
            }
            Some(PositionMismatch {
                symbol: position.symbol.clone(),
                broker: position.quantity,
                transactions,
            })
        })
        .collect()
}
