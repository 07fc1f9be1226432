use hashbrown::HashSet;

use crate::api::{MarketData, PriceSource, RateSource};
use crate::errors::{AppError, ParseError};
use crate::parsing::{Category, MoneyMoveRow, StatementReader};
use crate::structs::{Currency, Money, MoneyMove};
use crate::utils::DateWindow;

use super::{skip_or_abort, LoadOptions};

/* Deposits and withdrawals, oldest first, each one once even if several statements list it */
pub fn collect_money_moves(
    reader: &StatementReader,
    options: &LoadOptions,
) -> Result<Vec<MoneyMove>, ParseError> {
    let mut seen = HashSet::new();
    let mut moves = Vec::new();
    let mut skipped = 0;
    for row in reader.rows(Category::MoneyMoves) {
        let row = match row.and_then(|row| MoneyMoveRow::parse(&row)) {
            Ok(row) => row,
            Err(e) => {
                skip_or_abort(e, options, &mut skipped)?;
                continue;
            }
        };
        let key = (
            row.date,
            row.amount,
            row.description.clone(),
            row.currency.clone(),
        );
        if !seen.insert(key) {
            continue;
        }
        moves.push(MoneyMove {
            date: row.date,
            amount: Money::new(row.amount, row.currency.clone()),
            currency: row.currency,
            description: row.description,
        });
    }
    moves.sort_by_key(|m| m.date);
    Ok(moves)
}

#[derive(Debug, Clone)]
pub struct DepositReport {
    pub lines: Vec<(MoneyMove, Money)>,
    pub total: Money,
}

pub async fn deposit_report<P, R>(
    moves: &[MoneyMove],
    currency: Option<&Currency>,
    window: &DateWindow,
    display_currency: Option<&Currency>,
    market: &mut MarketData<P, R>,
    default_currency: &Currency,
) -> Result<DepositReport, AppError>
where
    P: PriceSource + 'static,
    R: RateSource,
{
    let total_currency = display_currency.unwrap_or(default_currency);
    let mut total = Money::zero(total_currency.clone());
    let mut lines = Vec::new();
    for m in moves {
        if currency.map_or(false, |c| c != &m.currency) || !window.contains(m.date) {
            continue;
        }
        let amount = market.convert(&m.amount, display_currency, m.date).await?;
        let in_total = market.convert(&amount, Some(total_currency), m.date).await?;
        total = total.checked_add(&in_total)?;
        lines.push((m.clone(), amount));
    }
    Ok(DepositReport { lines, total })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_duplicates_dropped() {
        let content = "Deposits & Withdrawals,Data,EUR,2020-01-02,Electronic Fund Transfer,1000
Deposits & Withdrawals,Data,EUR,2020-03-02,Electronic Fund Transfer,500
Deposits & Withdrawals,Data,EUR,2020-01-02,Electronic Fund Transfer,1000
Deposits & Withdrawals,Data,EUR,2020-01-02,Disbursement,-1000
";
        let reader = StatementReader::from_content(content).unwrap();
        let moves = collect_money_moves(&reader, &LoadOptions::default()).unwrap();
        assert_eq!(moves.len(), 3);
        assert!(moves[0].is_deposit());
        assert!(!moves[1].is_deposit());
        assert_eq!(moves[2].amount.amount, dec!(500));
    }
}
