//! Fan-out of synthetic ticks to subscriber streams

use super::{Tick, TickSink};
use crate::market::{Symbol, TickType};
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Identifier of one subscription stream
pub type SubscriptionId = Uuid;

/// Buffered ticks per stream before new ticks are dropped
pub const STREAM_BUFFER: usize = 1024;

struct Stream {
    symbol: Symbol,
    tick_type: TickType,
    tx: mpsc::Sender<Tick>,
}

/// Routes each tick to the streams subscribed to its symbol and tick type
#[derive(Default)]
pub struct TickAggregator {
    streams: RwLock<HashMap<SubscriptionId, Stream>>,
}

impl TickAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stream and return its receiving end
    pub fn add(
        &self,
        id: SubscriptionId,
        symbol: Symbol,
        tick_type: TickType,
    ) -> mpsc::Receiver<Tick> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        self.streams.write().insert(
            id,
            Stream {
                symbol,
                tick_type,
                tx,
            },
        );
        rx
    }

    /// Drop a stream; its receiver sees end-of-stream once drained
    pub fn remove(&self, id: &SubscriptionId) -> Option<Symbol> {
        self.streams.write().remove(id).map(|stream| stream.symbol)
    }

    /// Drop every stream
    pub fn clear(&self) {
        self.streams.write().clear();
    }

    pub fn stream_count(&self) -> usize {
        self.streams.read().len()
    }
}

impl TickSink for TickAggregator {
    fn publish(&self, tick: Tick) {
        let mut closed = Vec::new();
        {
            let streams = self.streams.read();
            for (id, stream) in streams.iter() {
                if &stream.symbol != tick.symbol() || stream.tick_type != tick.tick_type() {
                    continue;
                }
                match stream.tx.try_send(tick.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::debug!(%id, symbol = %stream.symbol, "Stream buffer full, dropping tick");
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut streams = self.streams.write();
            for id in closed {
                tracing::debug!(%id, "Stream receiver dropped, removing");
                streams.remove(&id);
            }
        }
    }
}
