use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{SymbolLookup, SymbolMatch};
use crate::errors::{ApiError, InstrumentError};
use crate::parsing::InstrumentRow;
use crate::structs::{extract_symbol, is_retired, ContractId, Currency, Instrument};

use super::Persistable;

/* What `register` did with an instrument line */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(ContractId),
    Merged(ContractId),
    Ignored,
}

/* Canonical instruments keyed by broker contract id, kept between runs.
The lookup symbols are expensive to find, they are the main reason this store is persisted. */
#[derive(Serialize, Deserialize)]
pub struct InstrumentManager {
    instruments: HashMap<ContractId, Instrument>,
    #[serde(skip)]
    path: String,
    #[serde(skip)]
    persist: bool,
}

impl Persistable for InstrumentManager {
    const PATH: &'static str = ".data/instruments";

    fn default_new(path: String, persist: bool) -> Self {
        Self {
            instruments: HashMap::new(),
            path,
            persist,
        }
    }

    fn get_path(&self) -> &str {
        &self.path
    }

    fn attach(&mut self, path: String, persist: bool) {
        self.path = path;
        self.persist = persist;
    }

    fn is_persistent(&self) -> bool {
        self.persist
    }
}

impl Drop for InstrumentManager {
    fn drop(&mut self) {
        if self.persist {
            let _save = self.save();
        }
    }
}

impl InstrumentManager {
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn instruments(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.values()
    }

    pub fn get(&self, contract_id: &str) -> Option<&Instrument> {
        self.instruments.get(contract_id)
    }

    /* Adds the instrument of a metadata line or merges its symbols into the known one */
    pub fn register(&mut self, row: &InstrumentRow) -> Registration {
        if let Some(existing) = self.instruments.get_mut(&row.contract_id) {
            merge_symbols(existing, &row.symbols);
            if existing.currency.is_none() {
                existing.currency = row.currency.clone();
            } else if row.currency.is_some() && row.currency != existing.currency {
                warn!(
                    "{}: listing currency {:?} differs from stored {:?}, keeping stored",
                    existing.symbol, row.currency, existing.currency
                );
            }
            return Registration::Merged(row.contract_id.clone());
        }

        let symbol = &row.symbols[0];
        if is_retired(symbol) {
            warn!("Ignoring {symbol} as no longer valid name.");
            return Registration::Ignored;
        }
        let mut instrument = Instrument::new(
            row.contract_id.clone(),
            symbol,
            &row.name,
            row.security_id.clone(),
            row.currency.clone(),
        );
        instrument.aliases.extend(
            row.symbols[1..]
                .iter()
                .filter(|s| !is_retired(s) && *s != symbol)
                .cloned(),
        );
        debug!("Add instrument {instrument} ({})", row.contract_id);
        self.instruments.insert(row.contract_id.clone(), instrument);
        Registration::Created(row.contract_id.clone())
    }

    /* Maps a trade row's symbol to its canonical instrument.

    Lookup order: contract id, canonical symbol with currency, alias. Nothing found gives a
    provisional instrument, which happens for stocks bought in a period without metadata lines. */
    pub fn resolve(
        &self,
        symbol: &str,
        currency: &Currency,
        contract_id: Option<&str>,
    ) -> Result<Instrument, InstrumentError> {
        let found = contract_id
            .and_then(|id| self.instruments.get(id))
            .or_else(|| {
                self.instruments.values().find(|i| {
                    i.symbol == symbol && i.currency.as_ref().map_or(true, |c| c == currency)
                })
            })
            .or_else(|| self.instruments.values().find(|i| i.aliases.contains(symbol)));

        match found {
            Some(instrument) => {
                let mut instrument = instrument.clone();
                match &instrument.currency {
                    Some(stored) if stored != currency => {
                        return Err(InstrumentError::CurrencyMismatch {
                            symbol: symbol.to_string(),
                            stored: stored.clone(),
                            observed: currency.clone(),
                        })
                    }
                    Some(_) => {}
                    None => instrument.currency = Some(currency.clone()),
                }
                Ok(instrument)
            }
            None => {
                warn!("{symbol}: Missing currency metadata");
                Ok(Instrument::provisional(symbol, currency.clone()))
            }
        }
    }

    /* Canonical symbol, aliases and lookup symbol, as stored */
    pub fn all_known_symbols(&self, instrument: &Instrument) -> Vec<String> {
        let stored = instrument
            .contract_id
            .as_ref()
            .and_then(|id| self.instruments.get(id))
            .unwrap_or(instrument);
        stored.known_symbols().into_iter().map(str::to_string).collect()
    }

    /* Any instrument using this symbol, canonical first */
    pub fn get_by_symbol(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .values()
            .find(|i| i.symbol == symbol)
            .or_else(|| self.instruments.values().find(|i| i.has_symbol(symbol)))
    }

    pub fn get_by_security_id(&self, security_id: &str) -> Option<&Instrument> {
        self.instruments
            .values()
            .find(|i| i.security_id.as_deref() == Some(security_id))
    }

    /* Searches the price site's symbol for every instrument that doesn't have one yet */
    pub async fn fill_lookup_symbols<L>(&mut self, lookup: &L, max_tries: u32) -> usize
    where
        L: SymbolLookup + ?Sized,
    {
        let mut found = 0;
        for instrument in self.instruments.values_mut() {
            if instrument.lookup_symbol.is_some() {
                continue;
            }
            debug!(
                "{:12}: Start lookup, currency {:?}, name '{}', id {}",
                instrument.symbol,
                instrument.currency,
                instrument.name,
                instrument.security_id.as_deref().unwrap_or("-")
            );

            let mut queries = Vec::new();
            if let Some(security_id) = &instrument.security_id {
                queries.push(security_id.clone());
            }
            queries.push(instrument.name.clone());

            for query in queries {
                let candidate = match search_with_retries(lookup, &query, max_tries).await {
                    Ok(Some(candidate)) => candidate,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("{}: lookup of '{query}' failed: {e}", instrument.symbol);
                        continue;
                    }
                };
                if let (Some(stored), Some(observed)) = (&instrument.currency, &candidate.currency)
                {
                    if stored != observed {
                        warn!(
                            "Could not confirm currency of {} with lookup result {}: {stored} != {observed}",
                            instrument.symbol, candidate.symbol
                        );
                        continue;
                    }
                }
                if instrument.currency.is_none() {
                    instrument.currency = candidate.currency.clone();
                }
                info!("{:12}: Found {} | {}", instrument.symbol, candidate.symbol, candidate.name);
                instrument.lookup_symbol = Some(candidate.symbol);
                found += 1;
                break;
            }
        }
        found
    }
}

async fn search_with_retries<L>(
    lookup: &L,
    query: &str,
    max_tries: u32,
) -> Result<Option<SymbolMatch>, ApiError>
where
    L: SymbolLookup + ?Sized,
{
    let mut tries = 0;
    loop {
        tries += 1;
        match lookup.search(query).await {
            Ok(result) => return Ok(result),
            Err(e) if tries >= max_tries.max(1) => return Err(e),
            Err(e) => debug!("Retry {tries} for '{query}': {e}"),
        }
    }
}

/* Union of the symbols, the first one becomes canonical after a rename.
A retired (".OLD") symbol never becomes canonical nor an alias. */
fn merge_symbols(instrument: &mut Instrument, symbols: &[String]) {
    let mut symbols: Vec<String> = symbols.to_vec();
    if !symbols.contains(&instrument.symbol) {
        symbols.push(instrument.symbol.clone());
        if !is_retired(&symbols[0]) {
            debug!("Rename {} -> {}", instrument.symbol, symbols[0]);
            instrument.symbol = symbols[0].clone();
        }
    }
    instrument.aliases.extend(symbols.into_iter().filter(|s| !is_retired(s)));
    let canonical = instrument.symbol.clone();
    instrument.aliases.remove(&canonical);
}

/* Symbols to skip (configured) and, optionally, the only symbols to keep */
#[derive(Debug, Clone, Default)]
pub struct InstrumentFilter {
    ignored: Vec<String>,
    wanted: Vec<String>,
}

impl InstrumentFilter {
    pub fn new(ignored: Vec<String>, wanted: Vec<String>) -> Self {
        InstrumentFilter { ignored, wanted }
    }

    /* Symbols as seen on a row, plus the stored instrument when there is one */
    pub fn is_ignored(&self, symbols: &[String], known: Option<&Instrument>) -> bool {
        if symbols
            .iter()
            .any(|s| self.ignored.iter().any(|i| i == extract_symbol(s)))
        {
            return true;
        }
        if self.wanted.is_empty() {
            return false;
        }
        let wanted = |s: &str| self.wanted.iter().any(|w| w == s);
        if symbols.iter().any(|s| wanted(extract_symbol(s))) {
            return false;
        }
        match known {
            Some(instrument) => !instrument
                .known_symbols()
                .into_iter()
                .any(|s| wanted(s) || wanted(extract_symbol(s))),
            None => true,
        }
    }

    pub fn accepts(&self, instrument: &Instrument) -> bool {
        !self.is_ignored(&[instrument.symbol.clone()], Some(instrument))
    }
}
