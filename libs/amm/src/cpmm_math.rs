//! Constant-product math with exact integer calculations.
//!
//! The swap invariant is `x × y = k` where `x` and `y` are the reserves of
//! the two pool assets. There is no fee component: the output formula is
//! `amount_out = ⌊amount_in × reserve_out / (reserve_in + amount_in)⌋`, and
//! the floor division alone guarantees `k` never decreases across a swap:
//! the pool is never overpaid.

use serde::{Deserialize, Serialize};

use types::PRICE_SCALE;

use crate::error::MathError;

/// Result of pricing a swap: how much goes in, how much comes out.
///
/// Transient by design: produced by [`CpmmMath::quote_out`], consumed
/// immediately, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub amount_in: u128,
    pub amount_out: u128,
}

/// Constant-product math functions over raw `u128` token units.
pub struct CpmmMath;

impl CpmmMath {
    /// Integer square root: `⌊√y⌋`.
    ///
    /// Newton's method from the initial guess `y/2 + 1`; the iteration
    /// sequence decreases monotonically, so termination is guaranteed for
    /// any `u128` input. Returns `0` for `y == 0` and `1` for `1 <= y <= 3`.
    pub fn integer_sqrt(y: u128) -> u128 {
        if y == 0 {
            0
        } else if y < 4 {
            1
        } else {
            let mut z = y;
            let mut x = y / 2 + 1;
            while x < z {
                z = x;
                x = (y / x + x) / 2;
            }
            z
        }
    }

    /// Swap output for an exact input: `⌊amount_in × reserve_out /
    /// (reserve_in + amount_in)⌋`.
    ///
    /// # Errors
    ///
    /// - [`MathError::InvalidInput`] if `amount_in` is zero.
    /// - [`MathError::InvalidReserves`] if either reserve is zero.
    /// - [`MathError::Overflow`] if the widening multiply overflows `u128`.
    pub fn output_amount(
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<u128, MathError> {
        if amount_in == 0 {
            return Err(MathError::InvalidInput);
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(MathError::InvalidReserves);
        }

        let numerator = amount_in
            .checked_mul(reserve_out)
            .ok_or(MathError::Overflow("output numerator"))?;
        let denominator = reserve_in
            .checked_add(amount_in)
            .ok_or(MathError::Overflow("output denominator"))?;

        Ok(numerator / denominator)
    }

    /// Prices an exact-in swap without touching any state.
    pub fn quote_out(
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<Quote, MathError> {
        let amount_out = Self::output_amount(amount_in, reserve_in, reserve_out)?;
        Ok(Quote {
            amount_in,
            amount_out,
        })
    }

    /// Shares minted for depositing `amount` against one side of a funded
    /// pool: `⌊amount × total_shares / reserve⌋`.
    pub fn proportional_share(
        amount: u128,
        total_shares: u128,
        reserve: u128,
    ) -> Result<u128, MathError> {
        if reserve == 0 {
            return Err(MathError::InvalidReserves);
        }
        let numerator = amount
            .checked_mul(total_shares)
            .ok_or(MathError::Overflow("share numerator"))?;
        Ok(numerator / reserve)
    }

    /// One side's payout for burning `shares`: `⌊shares × reserve /
    /// total_shares⌋`. Floor division rounds in the pool's favor.
    pub fn share_payout(
        shares: u128,
        reserve: u128,
        total_shares: u128,
    ) -> Result<u128, MathError> {
        if total_shares == 0 {
            return Err(MathError::InvalidReserves);
        }
        let numerator = shares
            .checked_mul(reserve)
            .ok_or(MathError::Overflow("payout numerator"))?;
        Ok(numerator / total_shares)
    }

    /// Counter-amount at the pool's current ratio: `⌊amount ×
    /// reserve_other / reserve_this⌋`. Used to clamp an unbalanced deposit.
    pub fn proportional_amount(
        amount: u128,
        reserve_this: u128,
        reserve_other: u128,
    ) -> Result<u128, MathError> {
        if reserve_this == 0 || reserve_other == 0 {
            return Err(MathError::InvalidReserves);
        }
        let numerator = amount
            .checked_mul(reserve_other)
            .ok_or(MathError::Overflow("proportional numerator"))?;
        Ok(numerator / reserve_this)
    }

    /// Fixed-point spot price: `reserve_quote × PRICE_SCALE / reserve_base`,
    /// the quantity of the quote asset per one unit of the base asset.
    pub fn spot_price_ratio(reserve_base: u128, reserve_quote: u128) -> Result<u128, MathError> {
        if reserve_base == 0 || reserve_quote == 0 {
            return Err(MathError::InvalidReserves);
        }
        let numerator = reserve_quote
            .checked_mul(PRICE_SCALE)
            .ok_or(MathError::Overflow("price numerator"))?;
        Ok(numerator / reserve_base)
    }
}
