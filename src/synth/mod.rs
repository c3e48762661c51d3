//! Synthetic tick generation
//!
//! A periodic [`TickEmitter`] walks the price of every subscribed symbol and
//! publishes trade and quote ticks. [`SyntheticDataQueue`] wires the pieces
//! together behind a subscribe/unsubscribe surface.

mod emitter;
mod handler;
mod random;
mod state;
mod subscription;
pub mod walk;

pub use emitter::{EmitterError, EmitterState, FiringReport, TickEmitter, SIZE_DP};
pub use handler::{QueueError, SubscriptionRequest, SyntheticDataQueue};
pub use random::{FixedRandom, RandomSource, SeededRandom};
pub use state::{StateError, SymbolState, SymbolStateStore};
pub use subscription::{SubscriptionLifecycle, Unsubscribed};
