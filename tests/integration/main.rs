//! Integration tests for synth-feed

mod config_test;
mod lifecycle_test;
mod timer_test;
