//! synth-feed: Synthetic market tick generator
//!
//! This library provides the core components for:
//! - Bounded random-walk pricing with drift and price clamps
//! - Per-symbol walk state keyed by subscription
//! - Subscription lifecycle with reference-counted streams
//! - Timer-driven trade and quote synthesis
//! - Fan-out of ticks to subscriber streams
//! - Configuration, logging and metrics

pub mod cli;
pub mod config;
pub mod feed;
pub mod market;
pub mod synth;
pub mod telemetry;
