//! Integration tests for configuration loading

use rust_decimal_macros::dec;
use synth_feed::config::Config;
use synth_feed::market::{MarketCalendar, SecurityType, Symbol};

#[test]
fn test_config_example_loads() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap();

    assert_eq!(config.generator.interval_ms, 250);
    assert_eq!(config.generator.initial_price, dec!(100));
    assert_eq!(config.telemetry.log_level, "info");
    assert!(!config.run.symbols.is_empty());

    let calendar = config.markets.calendar().unwrap();
    let symbol = Symbol::new("7203", "tse", SecurityType::Equity);
    assert!(calendar.time_zone(&symbol).is_ok());
}

#[test]
fn test_sanitized_config_round_trips_through_toml() {
    let toml = r#"
        [generator]
        min_trade_size = 20
        max_trade_size = 10
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    let generation = config.generator.clone().sanitized();
    assert_eq!(generation.max_trade_size, dec!(20));

    let rendered = toml::to_string_pretty(&config).unwrap();
    let reparsed: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(reparsed.generator, config.generator);
}
