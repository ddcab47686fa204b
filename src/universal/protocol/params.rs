use super::*;
use once_cell::sync::Lazy;

pub const PROTOCOL_LITERAL: &str = "brc-20";
pub const MAX_DECIMAL_WIDTH: u8 = 18;

/// Hard cap on operations carried by one transaction, across all of its
/// OP_RETURN outputs.
pub const MAX_OPS_PER_TX: usize = 32;

/// Whole-unit supply cap, before scaling by decimals.
pub static MAXIMUM_SUPPLY: Lazy<Num> = Lazy::new(|| Num::from(u64::MAX));

pub static BIGDECIMAL_TEN: Lazy<Num> = Lazy::new(|| Num::from(10u64));

pub const fn default_decimals() -> u8 {
  MAX_DECIMAL_WIDTH
}
