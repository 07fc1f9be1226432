use hashbrown::HashSet;
use tracing::debug;

use crate::structs::{Transaction, TransactionKey};

/* Collects the trades of all statement files. Overlapping exports repeat the same trades,
only the first record per (timestamp, instrument) is kept. */
#[derive(Default)]
pub struct TransactionManager {
    transactions: Vec<Transaction>,
    hash_set: HashSet<TransactionKey>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &Vec<Transaction> {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /* Add transaction by avoiding duplicates */
    pub fn push(&mut self, tx: Transaction) -> bool {
        if self.hash_set.insert(tx.key()) {
            self.transactions.push(tx);
            return true;
        }
        debug!("Skipping duplicate {} {}", tx.timestamp, tx.instrument);
        false
    }

    /* Extends transactions by avoiding duplicates, returns how many were new */
    pub fn extend(&mut self, txs: Vec<Transaction>) -> usize {
        txs.into_iter().map(|tx| self.push(tx)).filter(|new| *new).count()
    }

    /* Stable: trades with the same timestamp keep their statement order */
    pub fn sort(&mut self) {
        self.transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp))
    }

    pub fn sorted(mut self) -> Vec<Transaction> {
        self.sort();
        self.transactions
    }
}
