//! Active subscription tracking
//!
//! Several subscriptions (for example a trade and a quote stream) may
//! reference the same symbol. The symbol stays active until the last of
//! them is removed.

use crate::feed::SubscriptionId;
use crate::market::{Symbol, TickType};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Result of removing a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsubscribed {
    pub symbol: Symbol,
    /// True when this was the symbol's last subscription
    pub deactivated: bool,
}

#[derive(Debug, Default)]
struct SubscriptionSet {
    by_symbol: HashMap<Symbol, HashMap<SubscriptionId, TickType>>,
    by_id: HashMap<SubscriptionId, Symbol>,
}

impl SubscriptionSet {
    fn remove(&mut self, id: &SubscriptionId) -> Option<Unsubscribed> {
        let symbol = self.by_id.remove(id)?;
        let deactivated = match self.by_symbol.get_mut(&symbol) {
            Some(ids) => {
                ids.remove(id);
                ids.is_empty()
            }
            None => true,
        };
        if deactivated {
            self.by_symbol.remove(&symbol);
        }
        Some(Unsubscribed {
            symbol,
            deactivated,
        })
    }
}

/// Set of active subscriptions, safe to share between callers and the emitter
#[derive(Debug, Default)]
pub struct SubscriptionLifecycle {
    inner: RwLock<SubscriptionSet>,
}

impl SubscriptionLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a subscription; returns true when the symbol became active
    ///
    /// Re-subscribing an existing id updates its requested tick type.
    pub fn subscribe(&self, id: SubscriptionId, symbol: &Symbol, tick_type: TickType) -> bool {
        let mut set = self.inner.write();

        if set.by_id.get(&id).is_some_and(|current| current != symbol) {
            set.remove(&id);
        }

        let ids = set.by_symbol.entry(symbol.clone()).or_default();
        let activated = ids.is_empty();
        ids.insert(id, tick_type);
        set.by_id.insert(id, symbol.clone());

        if activated {
            tracing::info!(%symbol, "Symbol activated");
        }
        activated
    }

    /// Remove a subscription; unknown ids are ignored
    pub fn unsubscribe(&self, id: &SubscriptionId) -> Option<Unsubscribed> {
        let removed = self.inner.write().remove(id);
        if let Some(Unsubscribed {
            symbol,
            deactivated: true,
        }) = &removed
        {
            tracing::info!(%symbol, "Symbol deactivated");
        }
        removed
    }

    /// Sorted snapshot of the active symbols
    ///
    /// Firings walk symbols in this order, which fixes the sequence of random draws.
    pub fn active_symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.inner.read().by_symbol.keys().cloned().collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn is_active(&self, symbol: &Symbol) -> bool {
        self.inner.read().by_symbol.contains_key(symbol)
    }

    /// Distinct tick types requested for a symbol
    pub fn requested_tick_types(&self, symbol: &Symbol) -> Vec<TickType> {
        let set = self.inner.read();
        let mut types: Vec<TickType> = Vec::new();
        if let Some(ids) = set.by_symbol.get(symbol) {
            for tick_type in ids.values() {
                if !types.contains(tick_type) {
                    types.push(*tick_type);
                }
            }
        }
        types
    }

    /// Number of active symbols
    pub fn symbol_count(&self) -> usize {
        self.inner.read().by_symbol.len()
    }

    /// Number of subscriptions across all symbols
    pub fn subscription_count(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn clear(&self) {
        let mut set = self.inner.write();
        set.by_symbol.clear();
        set.by_id.clear();
    }
}
