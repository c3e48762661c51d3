//! Exchange time zone lookup

use super::Symbol;
use chrono::FixedOffset;
use std::collections::HashMap;

/// Market calendar errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("no calendar entry for market {0:?}")]
    UnknownMarket(String),
    #[error("invalid UTC offset of {minutes} minutes for market {market:?}")]
    InvalidOffset { market: String, minutes: i32 },
}

/// Resolves the exchange time zone of a symbol
pub trait MarketCalendar: Send + Sync {
    /// UTC offset of the symbol's listing market
    fn time_zone(&self, symbol: &Symbol) -> Result<FixedOffset, CalendarError>;
}

/// Default market offsets in minutes east of UTC
const DEFAULT_OFFSETS: &[(&str, i32)] = &[
    ("usa", -300),
    ("fxcm", -300),
    ("oanda", -300),
    ("cme", -360),
    ("cbot", -360),
    ("eurex", 60),
    ("coinbase", 0),
    ("binance", 0),
];

/// Fixed table of market offsets
#[derive(Debug, Clone)]
pub struct StaticCalendar {
    offsets: HashMap<String, FixedOffset>,
}

impl StaticCalendar {
    /// Create an empty calendar
    pub fn empty() -> Self {
        Self {
            offsets: HashMap::new(),
        }
    }

    /// Build a calendar from `(market, minutes east of UTC)` pairs
    pub fn from_minutes<'a>(
        entries: impl IntoIterator<Item = (&'a str, i32)>,
    ) -> Result<Self, CalendarError> {
        let mut calendar = Self::empty();
        for (market, minutes) in entries {
            calendar = calendar.with_market(market, minutes)?;
        }
        Ok(calendar)
    }

    /// Add or replace a market offset
    pub fn with_market(mut self, market: &str, minutes: i32) -> Result<Self, CalendarError> {
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            CalendarError::InvalidOffset {
                market: market.to_string(),
                minutes,
            }
        })?;
        self.offsets.insert(market.to_lowercase(), offset);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl Default for StaticCalendar {
    fn default() -> Self {
        let offsets = DEFAULT_OFFSETS
            .iter()
            .filter_map(|(market, minutes)| {
                FixedOffset::east_opt(minutes * 60).map(|offset| (market.to_string(), offset))
            })
            .collect();
        Self { offsets }
    }
}

impl MarketCalendar for StaticCalendar {
    fn time_zone(&self, symbol: &Symbol) -> Result<FixedOffset, CalendarError> {
        self.offsets
            .get(symbol.market())
            .copied()
            .ok_or_else(|| CalendarError::UnknownMarket(symbol.market().to_string()))
    }
}
