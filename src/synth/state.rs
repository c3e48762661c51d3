//! Per-symbol walk state

use super::SubscriptionLifecycle;
use crate::market::{CalendarError, MarketCalendar, Symbol};
use chrono::{DateTime, FixedOffset, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;

/// State store errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("cannot resolve exchange time zone: {0}")]
    Calendar(#[from] CalendarError),
}

/// Mutable walk state of one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolState {
    /// Last walked price
    pub last_price: Decimal,
    /// UTC offset of the symbol's exchange
    pub exchange_offset: FixedOffset,
}

impl SymbolState {
    pub fn new(last_price: Decimal, exchange_offset: FixedOffset) -> Self {
        Self {
            last_price,
            exchange_offset,
        }
    }

    /// Convert a UTC instant to exchange-local time
    pub fn exchange_time(&self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        utc.with_timezone(&self.exchange_offset)
    }
}

/// Concurrent map from symbol to walk state
///
/// All mutation goes through per-entry locked operations, so a symbol is
/// initialized at most once even when several callers race on it.
pub struct SymbolStateStore {
    states: DashMap<Symbol, SymbolState>,
    calendar: Arc<dyn MarketCalendar>,
    initial_price: Decimal,
}

impl SymbolStateStore {
    pub fn new(calendar: Arc<dyn MarketCalendar>, initial_price: Decimal) -> Self {
        Self {
            states: DashMap::new(),
            calendar,
            initial_price,
        }
    }

    /// Snapshot of the symbol's state, creating it on first access
    pub fn get_or_create(&self, symbol: &Symbol) -> Result<SymbolState, StateError> {
        self.with_state(symbol, |state| state.clone())
    }

    /// Run `f` on the symbol's state under its entry lock, creating the state first if needed
    pub fn with_state<T>(
        &self,
        symbol: &Symbol,
        f: impl FnOnce(&mut SymbolState) -> T,
    ) -> Result<T, StateError> {
        match self.states.entry(symbol.clone()) {
            Entry::Occupied(mut entry) => Ok(f(entry.get_mut())),
            Entry::Vacant(entry) => {
                let offset = self.calendar.time_zone(symbol)?;
                tracing::debug!(%symbol, price = %self.initial_price, "Seeding symbol state");
                let mut state = entry.insert(SymbolState::new(self.initial_price, offset));
                Ok(f(state.value_mut()))
            }
        }
    }

    /// Delete the symbol's state unless it is still subscribed
    ///
    /// The subscription check runs under the entry lock, so a concurrent
    /// subscribe either keeps the entry or recreates it on next access.
    pub fn remove_if_unused(&self, symbol: &Symbol, lifecycle: &SubscriptionLifecycle) -> bool {
        let removed = self
            .states
            .remove_if(symbol, |symbol, _| !lifecycle.is_active(symbol))
            .is_some();
        if removed {
            tracing::debug!(%symbol, "Removed symbol state");
        }
        removed
    }

    /// Remove every state whose symbol is no longer subscribed; returns how many were removed
    pub fn sweep(&self, lifecycle: &SubscriptionLifecycle) -> usize {
        let mut removed = 0;
        self.states.retain(|symbol, _| {
            let keep = lifecycle.is_active(symbol);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn last_price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.states.get(symbol).map(|state| state.last_price)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.states.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&self) {
        self.states.clear();
    }
}
