//! # Sluice AMM Library - Constant-Product Pool Mathematics
//!
//! ## Purpose
//!
//! Pure arithmetic for constant-product (`x · y = k`) market making: swap
//! output pricing, liquidity-share minting and payout formulas, the integer
//! square root used to bootstrap a pool's share scale, and fixed-point spot
//! price ratios. Every function is stateless and side-effect free; all
//! arithmetic is checked `u128` with floor division, so rounding always
//! favors the pool and overflow surfaces as a typed error instead of
//! wrapping.
//!
//! ## Integration Points
//!
//! - **Input Sources**: reserve and share totals from `sluice-market` pools,
//!   trade parameters from callers
//! - **Output Destinations**: the liquidity and swap engines, quote requests
//! - **Precision**: raw integer token units in, raw integer token units out;
//!   prices use the 18-decimal fixed-point scale from `types::precision`
//!
//! ## Architecture Role
//!
//! This crate is the mathematical foundation of Sluice. The engines own all
//! state and sequencing; everything that can be expressed as a total
//! function over integers lives here where it can be property-tested in
//! isolation.

pub mod cpmm_math;
pub mod error;

pub use cpmm_math::{CpmmMath, Quote};
pub use error::MathError;
