//! Market model
//!
//! Symbol identity, instrument classes, exchange time zones and option chains

mod calendar;
mod chain;
mod symbol;

pub use calendar::{CalendarError, MarketCalendar, StaticCalendar};
pub use chain::{OptionChainProvider, StaticOptionChain};
pub use symbol::{SecurityType, Symbol, SymbolParseError, TickType, UNIVERSE_PREFIX};
