//! Host-facing synthetic data queue

use super::{
    EmitterError, FiringReport, RandomSource, SubscriptionLifecycle, SymbolStateStore, TickEmitter,
};
use crate::config::GenerationConfig;
use crate::feed::{SubscriptionId, Tick, TickAggregator};
use crate::market::{MarketCalendar, OptionChainProvider, SecurityType, Symbol, TickType};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Data queue errors
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("data queue has been disposed")]
    Disposed,
    #[error(transparent)]
    Emitter(#[from] EmitterError),
}

/// A request for one tick stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub symbol: Symbol,
    pub tick_type: TickType,
}

impl SubscriptionRequest {
    pub fn new(symbol: Symbol, tick_type: TickType) -> Self {
        Self { symbol, tick_type }
    }

    pub fn trades(symbol: Symbol) -> Self {
        Self::new(symbol, TickType::Trade)
    }

    pub fn quotes(symbol: Symbol) -> Self {
        Self::new(symbol, TickType::Quote)
    }
}

/// Live data queue that synthesizes ticks for its subscribers
///
/// Subscriptions are tracked by [`SubscriptionLifecycle`], walk state by
/// [`SymbolStateStore`], and ticks flow through a [`TickAggregator`] to the
/// stream returned from [`subscribe`](Self::subscribe).
pub struct SyntheticDataQueue {
    lifecycle: Arc<SubscriptionLifecycle>,
    store: Arc<SymbolStateStore>,
    aggregator: Arc<TickAggregator>,
    emitter: Arc<TickEmitter>,
    chains: Arc<dyn OptionChainProvider>,
}

impl SyntheticDataQueue {
    pub fn new(
        config: GenerationConfig,
        calendar: Arc<dyn MarketCalendar>,
        chains: Arc<dyn OptionChainProvider>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let config = config.sanitized();
        let lifecycle = Arc::new(SubscriptionLifecycle::new());
        let store = Arc::new(SymbolStateStore::new(calendar, config.initial_price));
        let aggregator = Arc::new(TickAggregator::new());
        let emitter = Arc::new(TickEmitter::new(
            config,
            Arc::clone(&lifecycle),
            Arc::clone(&store),
            aggregator.clone(),
            random,
        ));

        Self {
            lifecycle,
            store,
            aggregator,
            emitter,
            chains,
        }
    }

    /// Arm the emission timer; requires a tokio runtime
    pub fn start(&self) -> Result<(), QueueError> {
        self.emitter.start()?;
        Ok(())
    }

    /// Open a tick stream for a symbol
    ///
    /// A symbol whose market has no calendar entry is still subscribed; its
    /// firings fail and are skipped until the subscription is removed.
    pub fn subscribe(
        &self,
        request: SubscriptionRequest,
    ) -> Result<(SubscriptionId, mpsc::Receiver<Tick>), QueueError> {
        if !self.is_connected() {
            return Err(QueueError::Disposed);
        }

        let id = Uuid::new_v4();
        let SubscriptionRequest { symbol, tick_type } = request;
        let rx = self.aggregator.add(id, symbol.clone(), tick_type);
        self.lifecycle.subscribe(id, &symbol, tick_type);

        if let Err(e) = self.store.get_or_create(&symbol) {
            tracing::warn!(%symbol, error = %e, "Subscribed symbol has no exchange time zone");
        }

        // A dispose that raced the registration has already cleared; undo ours
        if self.emitter.is_disposed() {
            self.rollback(&id);
            self.store.remove_if_unused(&symbol, &self.lifecycle);
            return Err(QueueError::Disposed);
        }

        tracing::info!(%id, %symbol, ?tick_type, "Subscription added");
        Ok((id, rx))
    }

    /// Close a tick stream; returns false for unknown ids
    pub fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        let Some(symbol) = self.rollback(id) else {
            return false;
        };
        tracing::info!(%id, %symbol, "Subscription removed");
        true
    }

    fn rollback(&self, id: &SubscriptionId) -> Option<Symbol> {
        self.aggregator.remove(id);
        let removed = self.lifecycle.unsubscribe(id)?;
        if removed.deactivated {
            self.store.remove_if_unused(&removed.symbol, &self.lifecycle);
        }
        Some(removed.symbol)
    }

    /// True until disposed
    pub fn is_connected(&self) -> bool {
        !self.emitter.is_disposed()
    }

    /// Contracts of an option chain as of today
    pub fn lookup_symbols(
        &self,
        symbol: &Symbol,
        include_expired: bool,
    ) -> impl Iterator<Item = Symbol> {
        self.lookup_symbols_at(symbol, include_expired, Utc::now().date_naive())
    }

    /// Contracts of an option chain as of `date`; empty for non-option symbols
    pub fn lookup_symbols_at(
        &self,
        symbol: &Symbol,
        include_expired: bool,
        date: NaiveDate,
    ) -> impl Iterator<Item = Symbol> {
        let contracts = if symbol.security_type() == SecurityType::Option {
            self.chains.option_contracts(symbol, date)
        } else {
            Vec::new()
        };

        contracts
            .into_iter()
            .filter(move |contract| include_expired || !contract.is_expired(date))
    }

    /// Run one firing immediately
    pub fn fire_now(&self) -> FiringReport {
        self.emitter.fire()
    }

    /// Stop emission and close every stream; repeated calls are harmless
    pub fn dispose(&self) {
        if !self.emitter.dispose() {
            return;
        }
        self.aggregator.clear();
        self.lifecycle.clear();
        self.store.clear();
    }

    pub fn active_symbols(&self) -> Vec<Symbol> {
        self.lifecycle.active_symbols()
    }

    pub fn has_state(&self, symbol: &Symbol) -> bool {
        self.store.contains(symbol)
    }

    pub fn last_price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.store.last_price(symbol)
    }

    pub fn emitter(&self) -> &Arc<TickEmitter> {
        &self.emitter
    }
}

impl Drop for SyntheticDataQueue {
    fn drop(&mut self) {
        self.dispose();
    }
}
