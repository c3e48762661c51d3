//! Tick output module
//!
//! Synthetic tick types and the downstream sink they are published to

mod aggregator;
mod types;

pub use aggregator::{SubscriptionId, TickAggregator, STREAM_BUFFER};
pub use types::{QuoteTick, Tick, TradeTick};

/// Fire-and-forget consumer of synthesized ticks
pub trait TickSink: Send + Sync {
    /// Take ownership of a tick; delivery failures are the sink's concern
    fn publish(&self, tick: Tick);
}
