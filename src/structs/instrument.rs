use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Currency;

pub type ContractId = String;

/* Marker the broker appends to a symbol that is no longer valid after a rename */
pub const RETIRED_SUFFIX: &str = ".OLD";

/* Identity of an instrument across the ledger, dedup keys and caches.
Instruments we only know from a trade row (no metadata line) are keyed by symbol and currency. */
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Serialize, Deserialize)]
pub enum InstrumentKey {
    Contract(ContractId),
    Provisional { symbol: String, currency: Currency },
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InstrumentKey::Contract(id) => write!(f, "{id}"),
            InstrumentKey::Provisional { symbol, currency } => write!(f, "{symbol}:{currency}?"),
        }
    }
}

/* A canonical instrument: one per broker contract id, whichever symbol a row used for it */
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub contract_id: Option<ContractId>,
    pub symbol: String,
    pub name: String,
    pub lookup_symbol: Option<String>, // Symbol of the price-lookup site, the statements don't carry it
    pub security_id: Option<String>,
    pub currency: Option<Currency>,
    pub aliases: BTreeSet<String>, // Other broker symbols seen for the same contract id
}

impl Instrument {
    pub fn new(
        contract_id: ContractId,
        symbol: &str,
        name: &str,
        security_id: Option<String>,
        currency: Option<Currency>,
    ) -> Self {
        Instrument {
            contract_id: Some(contract_id),
            symbol: symbol.to_string(),
            name: name.to_string(),
            lookup_symbol: None,
            security_id,
            currency,
            aliases: BTreeSet::new(),
        }
    }

    /* Stand-in for a symbol without any metadata line, e.g. a stock bought this month */
    pub fn provisional(symbol: &str, currency: Currency) -> Self {
        Instrument {
            contract_id: None,
            symbol: symbol.to_string(),
            name: format!("{symbol} ?"),
            lookup_symbol: None,
            security_id: None,
            currency: Some(currency),
            aliases: BTreeSet::new(),
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.contract_id.is_none()
    }

    pub fn key(&self) -> InstrumentKey {
        match &self.contract_id {
            Some(id) => InstrumentKey::Contract(id.clone()),
            None => InstrumentKey::Provisional {
                symbol: self.symbol.clone(),
                currency: self
                    .currency
                    .clone()
                    .unwrap_or_else(|| Currency::new("???")),
            },
        }
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbol == symbol || self.aliases.contains(symbol)
    }

    /* Canonical symbol, aliases and the lookup symbol */
    pub fn known_symbols(&self) -> Vec<&str> {
        let mut symbols = vec![self.symbol.as_str()];
        symbols.extend(self.aliases.iter().map(String::as_str));
        if let Some(lookup) = &self.lookup_symbol {
            symbols.push(lookup);
        }
        symbols
    }

    pub fn display_symbol(&self) -> &str {
        self.lookup_symbol.as_deref().unwrap_or(&self.symbol)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.currency {
            Some(currency) => write!(f, "<{} {}>", self.symbol, currency),
            None => write!(f, "<{} ?>", self.symbol),
        }
    }
}

pub fn is_retired(symbol: &str) -> bool {
    symbol.ends_with(RETIRED_SUFFIX)
}

/* Removes suffixes like the exchange name or the retired marker: "ABC.OLD" -> "ABC" */
pub fn extract_symbol(symbol: &str) -> &str {
    symbol.split('.').next().unwrap_or(symbol)
}
