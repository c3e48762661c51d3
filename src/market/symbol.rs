//! Symbol identity and instrument classes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticker prefix marking a synthetic universe-selection symbol
pub const UNIVERSE_PREFIX: &str = "universe-";

/// Instrument class of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityType {
    Equity,
    Forex,
    Cfd,
    Crypto,
    Future,
    Option,
    Index,
}

impl SecurityType {
    /// Tick kinds a market of this class publishes by default
    pub fn default_tick_types(self) -> &'static [TickType] {
        match self {
            SecurityType::Equity
            | SecurityType::Crypto
            | SecurityType::Future
            | SecurityType::Option => &[TickType::Trade, TickType::Quote],
            SecurityType::Forex | SecurityType::Cfd => &[TickType::Quote],
            SecurityType::Index => &[TickType::Trade],
        }
    }

    /// Futures and options have chain roots in addition to contracts
    pub fn has_chains(self) -> bool {
        matches!(self, SecurityType::Future | SecurityType::Option)
    }
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecurityType::Equity => "equity",
            SecurityType::Forex => "forex",
            SecurityType::Cfd => "cfd",
            SecurityType::Crypto => "crypto",
            SecurityType::Future => "future",
            SecurityType::Option => "option",
            SecurityType::Index => "index",
        };
        f.write_str(s)
    }
}

impl FromStr for SecurityType {
    type Err = SymbolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equity" => Ok(SecurityType::Equity),
            "forex" => Ok(SecurityType::Forex),
            "cfd" => Ok(SecurityType::Cfd),
            "crypto" => Ok(SecurityType::Crypto),
            "future" => Ok(SecurityType::Future),
            "option" => Ok(SecurityType::Option),
            "index" => Ok(SecurityType::Index),
            other => Err(SymbolParseError::UnknownSecurityType(other.to_string())),
        }
    }
}

/// Kind of market data event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickType {
    Trade,
    Quote,
}

/// Errors from parsing a `TICKER:MARKET:TYPE` symbol string
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SymbolParseError {
    #[error("expected TICKER:MARKET:TYPE, got {0:?}")]
    Malformed(String),
    #[error("unknown security type {0:?}")]
    UnknownSecurityType(String),
    #[error("invalid contract expiry {0:?}, expected YYYYMMDD")]
    InvalidExpiry(String),
}

/// Immutable instrument identity: ticker, market and security type
///
/// Futures and options additionally carry either a contract expiry or the
/// canonical flag marking the chain root. Symbols order by ticker, then
/// market, type and expiry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol {
    ticker: String,
    market: String,
    security_type: SecurityType,
    expiry: Option<NaiveDate>,
    canonical: bool,
}

impl Symbol {
    /// Create a symbol for a plain tradable instrument
    pub fn new(
        ticker: impl Into<String>,
        market: impl Into<String>,
        security_type: SecurityType,
    ) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            market: market.into().to_lowercase(),
            security_type,
            expiry: None,
            canonical: false,
        }
    }

    /// Create the canonical chain root for a future or option
    pub fn canonical(
        ticker: impl Into<String>,
        market: impl Into<String>,
        security_type: SecurityType,
    ) -> Self {
        Self {
            canonical: security_type.has_chains(),
            ..Self::new(ticker, market, security_type)
        }
    }

    /// Create a dated contract of a future or option chain
    pub fn contract(
        ticker: impl Into<String>,
        market: impl Into<String>,
        security_type: SecurityType,
        expiry: NaiveDate,
    ) -> Self {
        Self {
            expiry: Some(expiry),
            ..Self::new(ticker, market, security_type)
        }
    }

    /// Create a universe-selection marker symbol for a market
    pub fn universe(name: &str, market: impl Into<String>, security_type: SecurityType) -> Self {
        // Universe tickers keep their lowercase prefix so they never collide with instruments
        Self {
            ticker: format!("{UNIVERSE_PREFIX}{}", name.to_lowercase()),
            market: market.into().to_lowercase(),
            security_type,
            expiry: None,
            canonical: false,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn security_type(&self) -> SecurityType {
        self.security_type
    }

    pub fn expiry(&self) -> Option<NaiveDate> {
        self.expiry
    }

    /// True for a chain root rather than a tradable contract
    pub fn is_canonical(&self) -> bool {
        self.canonical
    }

    /// True for a universe-selection marker
    pub fn is_universe(&self) -> bool {
        self.ticker.starts_with(UNIVERSE_PREFIX)
    }

    /// True when the contract expired before `date`; undated symbols never expire
    pub fn is_expired(&self, date: NaiveDate) -> bool {
        self.expiry.is_some_and(|expiry| expiry < date)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.ticker, self.market, self.security_type)?;
        if let Some(expiry) = self.expiry {
            write!(f, ":{}", expiry.format("%Y%m%d"))?;
        }
        Ok(())
    }
}

impl FromStr for Symbol {
    type Err = SymbolParseError;

    /// Parse `TICKER:MARKET:TYPE[:YYYYMMDD]`
    ///
    /// A future or option without an expiry is its chain's canonical root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [ticker, market, kind] if !ticker.is_empty() && !market.is_empty() => {
                let security_type = kind.parse()?;
                let lowered = ticker.to_lowercase();
                match lowered.strip_prefix(UNIVERSE_PREFIX) {
                    Some(name) => Ok(Symbol::universe(name, *market, security_type)),
                    None => Ok(Symbol::canonical(*ticker, *market, security_type)),
                }
            }
            [ticker, market, kind, expiry] if !ticker.is_empty() && !market.is_empty() => {
                let expiry = NaiveDate::parse_from_str(expiry, "%Y%m%d")
                    .map_err(|_| SymbolParseError::InvalidExpiry(expiry.to_string()))?;
                Ok(Symbol::contract(*ticker, *market, kind.parse()?, expiry))
            }
            _ => Err(SymbolParseError::Malformed(s.to_string())),
        }
    }
}
