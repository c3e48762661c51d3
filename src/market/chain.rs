//! Option chain lookup

use super::Symbol;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Lists the contracts of an option chain
pub trait OptionChainProvider: Send + Sync {
    /// Contracts listed for `underlying` as of `date`
    fn option_contracts(&self, underlying: &Symbol, date: NaiveDate) -> Vec<Symbol>;
}

/// In-memory chains keyed by underlying symbol
#[derive(Debug, Clone, Default)]
pub struct StaticOptionChain {
    chains: HashMap<Symbol, Vec<Symbol>>,
}

impl StaticOptionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the contracts of one chain
    pub fn with_chain(mut self, underlying: Symbol, contracts: Vec<Symbol>) -> Self {
        self.chains.insert(underlying, contracts);
        self
    }
}

impl OptionChainProvider for StaticOptionChain {
    fn option_contracts(&self, underlying: &Symbol, _date: NaiveDate) -> Vec<Symbol> {
        self.chains.get(underlying).cloned().unwrap_or_default()
    }
}
