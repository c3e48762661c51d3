//! Configuration types for synth-feed

use crate::market::{CalendarError, StaticCalendar};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GenerationConfig,
    #[serde(default)]
    pub markets: MarketsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Tick generation parameters, read once at construction
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Milliseconds between firings
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Seed price of a new symbol, and the reset price when a walk hits zero
    #[serde(default = "default_initial_price")]
    pub initial_price: Decimal,

    /// Maximum absolute random move per firing
    #[serde(default = "default_price_step")]
    pub price_step: Decimal,

    /// Per-firing move as a fraction of the last price
    #[serde(default)]
    pub drift: Decimal,

    /// Quote spread as a fraction of price
    #[serde(default = "default_spread_fraction")]
    pub spread_fraction: Decimal,

    /// Smallest quoted spread
    #[serde(default = "default_min_spread")]
    pub min_spread: Decimal,

    /// Lower price bound (0 = unbounded)
    #[serde(default)]
    pub min_price: Decimal,

    /// Upper price bound (0 = unbounded)
    #[serde(default)]
    pub max_price: Decimal,

    #[serde(default = "default_min_size")]
    pub min_trade_size: Decimal,

    #[serde(default = "default_max_size")]
    pub max_trade_size: Decimal,

    /// Mirrors `min_trade_size` when unset
    #[serde(default)]
    pub min_quote_size: Option<Decimal>,

    /// Mirrors `max_trade_size` when unset
    #[serde(default)]
    pub max_quote_size: Option<Decimal>,
}

fn default_interval_ms() -> u64 {
    250
}
fn default_initial_price() -> Decimal {
    dec!(100)
}
fn default_price_step() -> Decimal {
    dec!(0.25)
}
fn default_spread_fraction() -> Decimal {
    dec!(0.0025)
}
fn default_min_spread() -> Decimal {
    dec!(0.01)
}
fn default_min_size() -> Decimal {
    dec!(1)
}
fn default_max_size() -> Decimal {
    dec!(50)
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            initial_price: default_initial_price(),
            price_step: default_price_step(),
            drift: Decimal::ZERO,
            spread_fraction: default_spread_fraction(),
            min_spread: default_min_spread(),
            min_price: Decimal::ZERO,
            max_price: Decimal::ZERO,
            min_trade_size: default_min_size(),
            max_trade_size: default_max_size(),
            min_quote_size: None,
            max_quote_size: None,
        }
    }
}

impl GenerationConfig {
    /// Timer period
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn quote_size_range(&self) -> (Decimal, Decimal) {
        (
            self.min_quote_size.unwrap_or(self.min_trade_size),
            self.max_quote_size.unwrap_or(self.max_trade_size),
        )
    }

    /// Clamp `price` into the configured bounds; a zero bound is open
    pub fn clamp_price(&self, price: Decimal) -> Decimal {
        let mut price = price;
        if self.min_price > Decimal::ZERO && price < self.min_price {
            price = self.min_price;
        }
        if self.max_price > Decimal::ZERO && price > self.max_price {
            price = self.max_price;
        }
        price
    }

    /// Correct out-of-range values instead of failing
    pub fn sanitized(mut self) -> Self {
        if self.interval_ms == 0 {
            tracing::warn!("interval_ms must be positive, using default");
            self.interval_ms = default_interval_ms();
        }
        if self.initial_price <= Decimal::ZERO {
            tracing::warn!(initial_price = %self.initial_price, "initial_price must be positive, using default");
            self.initial_price = default_initial_price();
        }
        if self.price_step < Decimal::ZERO {
            tracing::warn!(price_step = %self.price_step, "negative price_step, using default");
            self.price_step = default_price_step();
        }
        if self.spread_fraction < Decimal::ZERO {
            tracing::warn!(spread_fraction = %self.spread_fraction, "negative spread_fraction, using default");
            self.spread_fraction = default_spread_fraction();
        }
        if self.min_spread < Decimal::ZERO {
            tracing::warn!(min_spread = %self.min_spread, "negative min_spread, using default");
            self.min_spread = default_min_spread();
        }
        if self.min_price < Decimal::ZERO {
            tracing::warn!(min_price = %self.min_price, "negative min_price, leaving unbounded");
            self.min_price = Decimal::ZERO;
        }
        if self.max_price < Decimal::ZERO {
            tracing::warn!(max_price = %self.max_price, "negative max_price, leaving unbounded");
            self.max_price = Decimal::ZERO;
        }
        if self.max_price > Decimal::ZERO && self.max_price < self.min_price {
            tracing::warn!(min_price = %self.min_price, max_price = %self.max_price, "max_price below min_price, raising");
            self.max_price = self.min_price;
        }
        if self.min_trade_size < Decimal::ZERO {
            tracing::warn!(min_trade_size = %self.min_trade_size, "negative min_trade_size, using default");
            self.min_trade_size = default_min_size();
        }
        if self.max_trade_size < self.min_trade_size {
            tracing::warn!(max_trade_size = %self.max_trade_size, "max_trade_size below min_trade_size, raising");
            self.max_trade_size = self.min_trade_size;
        }
        if let Some(min) = self.min_quote_size.filter(|min| *min < Decimal::ZERO) {
            tracing::warn!(min_quote_size = %min, "negative min_quote_size, mirroring trade size");
            self.min_quote_size = None;
        }
        let (min_quote, max_quote) = self.quote_size_range();
        if max_quote < min_quote {
            tracing::warn!(max_quote_size = %max_quote, "max_quote_size below min_quote_size, raising");
            self.max_quote_size = Some(min_quote);
        }
        self
    }
}

/// Exchange time zone overrides
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MarketsConfig {
    /// Market name to UTC offset in minutes, layered over the built-in table
    #[serde(default)]
    pub utc_offsets: BTreeMap<String, i32>,
}

impl MarketsConfig {
    /// Built-in calendar with the configured overrides applied
    pub fn calendar(&self) -> Result<StaticCalendar, CalendarError> {
        self.utc_offsets
            .iter()
            .try_fold(StaticCalendar::default(), |calendar, (market, minutes)| {
                calendar.with_market(market, *minutes)
            })
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Prometheus exporter port (0 = disabled)
    #[serde(default)]
    pub metrics_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable output
    #[serde(default)]
    pub json_logs: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: 0,
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// Defaults for the `run` command
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunConfig {
    /// Symbols as `TICKER:MARKET:TYPE`
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Random seed; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
    /// Stop after this many firings; run until interrupted when unset
    #[serde(default)]
    pub firings: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
