//! Bounded random walk with drift

use super::{RandomSource, SymbolState};
use crate::config::GenerationConfig;
use rust_decimal::Decimal;

/// Decimal places kept on walked prices
pub const PRICE_DP: u32 = 6;

/// Step `state.last_price` once and return the new price
///
/// `last + u * price_step + last * drift` for `u` uniform in [-1, 1]. A
/// non-positive candidate, or one that overflows the decimal range, restarts
/// at `initial_price`; the result is then clamped to the configured bounds.
pub fn next_price(
    state: &mut SymbolState,
    config: &GenerationConfig,
    random: &mut dyn RandomSource,
) -> Decimal {
    let last = state.last_price;
    let candidate = random
        .signed_unit()
        .checked_mul(config.price_step)
        .zip(last.checked_mul(config.drift))
        .and_then(|(step, drift)| last.checked_add(step)?.checked_add(drift))
        .map(|price| price.round_dp(PRICE_DP));

    let candidate = match candidate {
        Some(price) if price > Decimal::ZERO => price,
        Some(_) => config.initial_price,
        None => {
            tracing::debug!(%last, "Walk overflowed, restarting at initial price");
            config.initial_price
        }
    };

    state.last_price = config.clamp_price(candidate);
    state.last_price
}
