//! Integration tests for the emission timer

use std::sync::Arc;
use std::time::Duration;
use synth_feed::config::GenerationConfig;
use synth_feed::market::{SecurityType, StaticCalendar, StaticOptionChain, Symbol};
use synth_feed::synth::{SeededRandom, SubscriptionRequest, SyntheticDataQueue};

#[tokio::test(start_paused = true)]
async fn test_timer_streams_until_dispose() {
    let config = GenerationConfig {
        interval_ms: 250,
        ..Default::default()
    };
    let queue = SyntheticDataQueue::new(
        config,
        Arc::new(StaticCalendar::default()),
        Arc::new(StaticOptionChain::new()),
        Box::new(SeededRandom::from_seed(3)),
    );
    let btc = Symbol::new("BTCUSD", "coinbase", SecurityType::Crypto);
    let (_id, mut rx) = queue.subscribe(SubscriptionRequest::trades(btc)).unwrap();
    queue.start().unwrap();

    let mut last_time = None;
    for _ in 0..4 {
        let tick = rx.recv().await.unwrap();
        if let Some(previous) = last_time {
            assert!(tick.time() >= previous);
        }
        last_time = Some(tick.time());
    }

    queue.dispose();
    assert!(!queue.is_connected());
    while rx.recv().await.is_some() {}

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(queue.fire_now().skipped);
}
