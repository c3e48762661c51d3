//! Integration tests for subscription lifecycle and emission

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use synth_feed::config::GenerationConfig;
use synth_feed::feed::Tick;
use synth_feed::market::{SecurityType, StaticCalendar, StaticOptionChain, Symbol};
use synth_feed::synth::{SeededRandom, SubscriptionRequest, SyntheticDataQueue};
use tokio::sync::mpsc;

fn queue(config: GenerationConfig, seed: u64) -> SyntheticDataQueue {
    SyntheticDataQueue::new(
        config,
        Arc::new(StaticCalendar::default()),
        Arc::new(StaticOptionChain::new()),
        Box::new(SeededRandom::from_seed(seed)),
    )
}

fn spy() -> Symbol {
    Symbol::new("SPY", "usa", SecurityType::Equity)
}

fn drain(rx: &mut mpsc::Receiver<Tick>) -> Vec<Tick> {
    let mut ticks = Vec::new();
    while let Ok(tick) = rx.try_recv() {
        ticks.push(tick);
    }
    ticks
}

#[test]
fn test_subscribe_fire_unsubscribe_fire() {
    let queue = queue(GenerationConfig::default(), 1);
    let (id, mut rx) = queue.subscribe(SubscriptionRequest::trades(spy())).unwrap();

    let first = queue.fire_now();
    assert_eq!(first.trades, 1);

    let trades = drain(&mut rx);
    assert!(queue.unsubscribe(&id));

    let second = queue.fire_now();
    assert_eq!(second.trades, 0);
    assert_eq!(trades.len(), 1);
    assert!(!queue.has_state(&spy()));
    assert!(queue.active_symbols().is_empty());
}

#[test]
fn test_flat_walk_holds_initial_price() {
    let config = GenerationConfig {
        price_step: dec!(0),
        drift: dec!(0),
        ..Default::default()
    };
    let queue = queue(config, 5);
    let (_id, mut rx) = queue.subscribe(SubscriptionRequest::trades(spy())).unwrap();

    for _ in 0..10 {
        queue.fire_now();
    }

    let prices: Vec<Decimal> = drain(&mut rx).iter().map(Tick::price).collect();
    assert_eq!(prices, vec![dec!(100); 10]);
}

#[test]
fn test_identical_seeds_identical_streams() {
    let run = |seed| {
        let queue = queue(GenerationConfig::default(), seed);
        let (_id, mut rx) = queue.subscribe(SubscriptionRequest::quotes(spy())).unwrap();
        for _ in 0..50 {
            queue.fire_now();
        }
        drain(&mut rx)
            .into_iter()
            .map(|tick| match tick {
                Tick::Quote(quote) => (quote.bid_price, quote.bid_size, quote.ask_price, quote.ask_size),
                Tick::Trade(_) => unreachable!("quote stream"),
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(17), run(17));
    assert_ne!(run(17), run(18));
}

#[test]
fn test_identical_seeds_identical_multi_symbol_streams() {
    let symbols = ["SPY:usa:equity", "EURUSD:oanda:forex", "BTCUSD:coinbase:crypto"];
    let run = || {
        let queue = queue(GenerationConfig::default(), 42);
        let mut streams: Vec<_> = symbols
            .iter()
            .map(|raw| {
                let symbol: Symbol = raw.parse().unwrap();
                let (_id, rx) = queue.subscribe(SubscriptionRequest::quotes(symbol)).unwrap();
                rx
            })
            .collect();
        for _ in 0..20 {
            queue.fire_now();
        }
        streams
            .iter_mut()
            .map(|rx| drain(rx).iter().map(Tick::price).collect::<Vec<Decimal>>())
            .collect::<Vec<_>>()
    };

    let first = run();
    assert!(first.iter().all(|prices| prices.len() == 20));
    assert_eq!(first, run());
}

#[test]
fn test_concurrent_subscribers_and_firings() {
    let queue = Arc::new(queue(GenerationConfig::default(), 2));
    let symbols: Vec<Symbol> = ["AAPL", "MSFT", "NVDA", "AMZN"]
        .iter()
        .map(|ticker| Symbol::new(*ticker, "usa", SecurityType::Equity))
        .collect();

    let subscribers: Vec<_> = symbols
        .iter()
        .cloned()
        .map(|symbol| {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let (id, _rx) = queue
                        .subscribe(SubscriptionRequest::trades(symbol.clone()))
                        .unwrap();
                    queue.unsubscribe(&id);
                }
            })
        })
        .collect();

    let firer = {
        let queue = Arc::clone(&queue);
        std::thread::spawn(move || {
            for _ in 0..200 {
                let report = queue.fire_now();
                assert_eq!(report.failures, 0);
            }
        })
    };

    for handle in subscribers {
        handle.join().unwrap();
    }
    firer.join().unwrap();

    // One more firing sweeps anything left behind by the races
    queue.fire_now();
    assert!(queue.active_symbols().is_empty());
    for symbol in &symbols {
        assert!(!queue.has_state(symbol));
    }
}
