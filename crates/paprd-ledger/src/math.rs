//! Overflow-safe arithmetic for balances and collateral checks.

use crate::error::{LedgerError, LedgerResult};

pub fn checked_add(a: u64, b: u64) -> LedgerResult<u64> {
    a.checked_add(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn checked_sub(a: u64, b: u64) -> LedgerResult<u64> {
    a.checked_sub(b).ok_or(LedgerError::ArithmeticUnderflow)
}

/// `collateral * 100 >= balance * ratio`, evaluated in 128 bits.
pub fn covers(collateral: u64, balance: u64, ratio: u64) -> bool {
    covers_wide(collateral, u128::from(balance), ratio)
}

/// [`covers`] for a prospective balance that may not fit in `u64`.
pub fn covers_wide(collateral: u64, balance: u128, ratio: u64) -> bool {
    balance
        .checked_mul(u128::from(ratio))
        .is_some_and(|needed| u128::from(collateral) * 100 >= needed)
}

/// Smallest collateral that covers `balance` at `ratio`, saturating at
/// `u64::MAX`.
pub fn required_collateral(balance: u128, ratio: u64) -> u64 {
    balance
        .checked_mul(u128::from(ratio))
        .and_then(|needed| u64::try_from(needed.div_ceil(100)).ok())
        .unwrap_or(u64::MAX)
}
