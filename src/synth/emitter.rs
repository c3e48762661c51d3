//! Timer-driven tick emission

use super::walk::{self, PRICE_DP};
use super::{RandomSource, StateError, SubscriptionLifecycle, SymbolStateStore};
use crate::config::GenerationConfig;
use crate::feed::{QuoteTick, Tick, TickSink, TradeTick};
use crate::market::{Symbol, TickType};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Decimal places kept on synthesized sizes
pub const SIZE_DP: u32 = 2;

/// Emitter errors
#[derive(Debug, thiserror::Error)]
pub enum EmitterError {
    #[error("emitter has been disposed")]
    Disposed,
    #[error("no tokio runtime to drive the timer: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Lifecycle state of an emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    Armed,
    Disposed,
}

/// Outcome of one firing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiringReport {
    /// Symbols processed
    pub symbols: usize,
    pub trades: usize,
    pub quotes: usize,
    /// Symbols that failed and were skipped
    pub failures: usize,
    /// States removed for symbols no longer subscribed
    pub removed: usize,
    /// The firing did not run (disposed or overlapping)
    pub skipped: bool,
}

impl FiringReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}

/// Walks subscribed symbols and publishes synthetic ticks on every firing
pub struct TickEmitter {
    config: GenerationConfig,
    lifecycle: Arc<SubscriptionLifecycle>,
    store: Arc<SymbolStateStore>,
    sink: Arc<dyn TickSink>,
    /// Held for a whole firing, which also keeps firings from overlapping
    random: Mutex<Box<dyn RandomSource>>,
    disposed: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl TickEmitter {
    pub fn new(
        config: GenerationConfig,
        lifecycle: Arc<SubscriptionLifecycle>,
        store: Arc<SymbolStateStore>,
        sink: Arc<dyn TickSink>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            config: config.sanitized(),
            lifecycle,
            store,
            sink,
            random: Mutex::new(random),
            disposed: AtomicBool::new(false),
            timer: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn state(&self) -> EmitterState {
        if self.is_disposed() {
            EmitterState::Disposed
        } else {
            EmitterState::Armed
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Schedule firings every interval, after an initial delay of one interval
    ///
    /// Starting an already started emitter is a no-op.
    pub fn start(self: &Arc<Self>) -> Result<(), EmitterError> {
        if self.is_disposed() {
            return Err(EmitterError::Disposed);
        }
        let runtime = tokio::runtime::Handle::try_current()?;

        let mut timer = self.timer.lock();
        if timer.is_some() {
            return Ok(());
        }

        let period = self.config.interval();
        let emitter = Arc::downgrade(self);
        *timer = Some(runtime.spawn(Self::run_timer(emitter, period)));

        tracing::info!(interval_ms = self.config.interval_ms, "Tick emitter armed");
        Ok(())
    }

    async fn run_timer(emitter: Weak<Self>, period: std::time::Duration) {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let Some(emitter) = emitter.upgrade() else {
                tracing::debug!("Tick emitter dropped, stopping timer");
                break;
            };
            if emitter.is_disposed() {
                break;
            }

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| emitter.fire())) {
                telemetry::increment(CounterMetric::FiringPanics, 1);
                tracing::error!(panic = panic_message(&*payload), "Firing aborted");
            }
        }
    }

    /// Stop the timer; later firings are ignored
    ///
    /// A firing already in progress runs to completion. Returns true only for
    /// the call that performed the transition; repeated calls are harmless.
    pub fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
        }
        tracing::info!("Tick emitter disposed");
        true
    }

    /// Fire once at the current time
    pub fn fire(&self) -> FiringReport {
        self.fire_at(Utc::now())
    }

    /// Fire once with all ticks stamped from `now`
    pub fn fire_at(&self, now: DateTime<Utc>) -> FiringReport {
        if self.is_disposed() {
            return FiringReport::skipped();
        }
        let Some(mut random) = self.random.try_lock() else {
            telemetry::increment(CounterMetric::SkippedFirings, 1);
            tracing::debug!("Previous firing still running, skipping");
            return FiringReport::skipped();
        };

        let mut report = FiringReport {
            removed: self.store.sweep(&self.lifecycle),
            ..Default::default()
        };

        let symbols: Vec<Symbol> = self
            .lifecycle
            .active_symbols()
            .into_iter()
            .filter(|symbol| !symbol.is_canonical() && !symbol.is_universe())
            .collect();
        telemetry::set_gauge(GaugeMetric::ActiveSymbols, symbols.len() as f64);

        if symbols.is_empty() {
            return report;
        }

        for symbol in &symbols {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.emit_symbol(symbol, now, &mut **random)
            }));
            match outcome {
                Ok(Ok((trades, quotes))) => {
                    report.trades += trades;
                    report.quotes += quotes;
                }
                Ok(Err(e)) => {
                    report.failures += 1;
                    tracing::warn!(%symbol, error = %e, "Skipping symbol for this firing");
                }
                Err(payload) => {
                    report.failures += 1;
                    telemetry::increment(CounterMetric::FiringPanics, 1);
                    tracing::error!(
                        %symbol,
                        panic = panic_message(&*payload),
                        "Symbol panicked during firing"
                    );
                }
            }
        }
        report.symbols = symbols.len();

        telemetry::increment(CounterMetric::Firings, 1);
        telemetry::increment(CounterMetric::SymbolErrors, report.failures as u64);
        telemetry::record_ticks(TickType::Trade, report.trades as u64);
        telemetry::record_ticks(TickType::Quote, report.quotes as u64);
        telemetry::set_gauge(GaugeMetric::TrackedSymbols, self.store.len() as f64);
        tracing::trace!(?report, "Firing complete");

        report
    }

    /// Walk one symbol and publish its ticks; returns (trades, quotes)
    fn emit_symbol(
        &self,
        symbol: &Symbol,
        now: DateTime<Utc>,
        random: &mut dyn RandomSource,
    ) -> Result<(usize, usize), StateError> {
        let (time, price) = self.store.with_state(symbol, |state| {
            let time = state.exchange_time(now);
            (time, walk::next_price(state, &self.config, &mut *random))
        })?;

        let mut trades = 0;
        let mut quotes = 0;
        for tick_type in symbol.security_type().default_tick_types() {
            match tick_type {
                TickType::Trade => {
                    let quantity = self.draw_size(
                        random,
                        self.config.min_trade_size,
                        self.config.max_trade_size,
                    );
                    self.sink.publish(Tick::Trade(TradeTick {
                        time,
                        symbol: symbol.clone(),
                        price,
                        quantity,
                    }));
                    trades += 1;
                }
                TickType::Quote => {
                    let (bid_price, ask_price) = self.quote_prices(price);
                    let (min_size, max_size) = self.config.quote_size_range();
                    let bid_size = self.draw_size(random, min_size, max_size);
                    let ask_size = self.draw_size(random, min_size, max_size);
                    self.sink.publish(Tick::Quote(QuoteTick {
                        time,
                        symbol: symbol.clone(),
                        bid_price,
                        bid_size,
                        ask_price,
                        ask_size,
                    }));
                    quotes += 1;
                }
            }
        }

        Ok((trades, quotes))
    }

    /// Bid and ask around `price`, each clamped to the price bounds
    fn quote_prices(&self, price: Decimal) -> (Decimal, Decimal) {
        let spread = (price * self.config.spread_fraction).max(self.config.min_spread);
        let half = spread / Decimal::TWO;

        let mut bid = self.config.clamp_price((price - half).round_dp(PRICE_DP));
        let ask = price.checked_add(half).unwrap_or(price).round_dp(PRICE_DP);
        let ask = self.config.clamp_price(ask);
        if bid <= Decimal::ZERO {
            bid = price.min(ask);
        }
        (bid, ask)
    }

    fn draw_size(&self, random: &mut dyn RandomSource, min: Decimal, max: Decimal) -> Decimal {
        random.between(min, max).round_dp(SIZE_DP).clamp(min, max)
    }
}

impl Drop for TickEmitter {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().take() {
            handle.abort();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
