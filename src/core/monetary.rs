//! Monetary units
//!
//! Amounts are carried as u64 minor units everywhere inside the node; floats
//! exist only at the conversion boundary below, for display and for callers
//! that think in whole coins.

/// Number of minor units in one coin.
pub const UNITS_PER_COIN: u64 = 100_000_000;

/// Fixed coinbase reward paid to the miner of a block.
pub const BLOCK_REWARD: u64 = 50 * UNITS_PER_COIN;

/// Convert whole coins to minor units. Lossy for values with more than eight
/// decimal places; this is the only place floats touch amounts.
pub fn coins_to_units(coins: f64) -> u64 {
    (coins * UNITS_PER_COIN as f64) as u64
}

/// Convert minor units to whole coins for display.
pub fn units_to_coins(units: u64) -> f64 {
    units as f64 / UNITS_PER_COIN as f64
}

/// Format minor units as a human-readable coin amount.
pub fn format_units(units: u64) -> String {
    format!("{:.8} coins", units_to_coins(units))
}
