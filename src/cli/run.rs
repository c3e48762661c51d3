//! Run command implementation

use crate::config::Config;
use crate::feed::Tick;
use crate::market::{StaticOptionChain, Symbol};
use crate::synth::{RandomSource, SeededRandom, SubscriptionRequest, SyntheticDataQueue};
use clap::Args;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Symbols streamed when neither the CLI nor the config names any
const DEFAULT_SYMBOLS: &[&str] = &["SPY:usa:equity", "EURUSD:oanda:forex", "BTCUSD:coinbase:crypto"];

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Symbols as TICKER:MARKET:TYPE, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many firings
    #[arg(long)]
    pub firings: Option<u64>,
}

impl RunArgs {
    /// Symbols to stream: CLI first, then config, then the built-in list
    pub fn resolve_symbols(&self, config: &Config) -> anyhow::Result<Vec<Symbol>> {
        let raw: Vec<String> = if !self.symbols.is_empty() {
            self.symbols.clone()
        } else if !config.run.symbols.is_empty() {
            config.run.symbols.clone()
        } else {
            DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
        };

        raw.iter()
            .map(|s| s.parse::<Symbol>().map_err(anyhow::Error::from))
            .collect()
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbols = self.resolve_symbols(config)?;
        let seed = self.seed.or(config.run.seed);
        let firings = self.firings.or(config.run.firings);

        let random: Box<dyn RandomSource> = match seed {
            Some(seed) => Box::new(SeededRandom::from_seed(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };
        let queue = SyntheticDataQueue::new(
            config.generator.clone(),
            Arc::new(config.markets.calendar()?),
            Arc::new(StaticOptionChain::new()),
            random,
        );

        let mut streams = Vec::new();
        for symbol in symbols {
            for tick_type in symbol.security_type().default_tick_types() {
                let (_id, rx) = queue.subscribe(SubscriptionRequest::new(symbol.clone(), *tick_type))?;
                streams.push(rx);
            }
        }

        // A bounded run fires manually so output is reproducible under a seed
        if firings.is_none() {
            queue.start()?;
        }
        tracing::info!(streams = streams.len(), ?firings, ?seed, "Streaming synthetic ticks");

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(queue.emitter().config().interval());
        let mut fired = 0u64;
        let stdout = std::io::stdout();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Interrupted, stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Some(limit) = firings {
                        if fired >= limit {
                            break;
                        }
                        queue.fire_now();
                        fired += 1;
                    }
                    write_pending(&mut stdout.lock(), &mut streams)?;
                }
            }
        }

        queue.dispose();
        Ok(())
    }
}

/// Write every buffered tick as one JSON line, stream by stream
fn write_pending(out: &mut impl Write, streams: &mut [mpsc::Receiver<Tick>]) -> anyhow::Result<()> {
    for rx in streams.iter_mut() {
        while let Ok(tick) = rx.try_recv() {
            serde_json::to_writer(&mut *out, &tick)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
