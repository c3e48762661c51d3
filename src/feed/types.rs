//! Synthetic tick types

use crate::market::{Symbol, TickType};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A synthetic trade print
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTick {
    /// Exchange-local timestamp
    pub time: DateTime<FixedOffset>,
    pub symbol: Symbol,
    /// Trade price
    pub price: Decimal,
    /// Trade quantity
    pub quantity: Decimal,
}

/// A synthetic top-of-book quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteTick {
    /// Exchange-local timestamp
    pub time: DateTime<FixedOffset>,
    pub symbol: Symbol,
    pub bid_price: Decimal,
    pub bid_size: Decimal,
    pub ask_price: Decimal,
    pub ask_size: Decimal,
}

/// A single market data event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Tick {
    Trade(TradeTick),
    Quote(QuoteTick),
}

impl Tick {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Tick::Trade(trade) => &trade.symbol,
            Tick::Quote(quote) => &quote.symbol,
        }
    }

    pub fn time(&self) -> DateTime<FixedOffset> {
        match self {
            Tick::Trade(trade) => trade.time,
            Tick::Quote(quote) => quote.time,
        }
    }

    pub fn tick_type(&self) -> TickType {
        match self {
            Tick::Trade(_) => TickType::Trade,
            Tick::Quote(_) => TickType::Quote,
        }
    }

    /// Trade price, or the quote midpoint
    pub fn price(&self) -> Decimal {
        match self {
            Tick::Trade(trade) => trade.price,
            Tick::Quote(quote) => {
                quote.bid_price + (quote.ask_price - quote.bid_price) / Decimal::TWO
            }
        }
    }
}
