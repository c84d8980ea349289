//! Fixed-point precision constants.
//!
//! All quantities in Sluice are raw integer token units; prices are the only
//! derived values and are quoted in 18-decimal fixed point. No floating
//! point is used anywhere in financial calculations.

/// Decimal places carried by a spot price.
pub const PRICE_DECIMALS: u32 = 18;

/// Fixed-point scale for spot prices: a price of `PRICE_SCALE` means one
/// unit of the quote asset per unit of the base asset.
pub const PRICE_SCALE: u128 = 10u128.pow(PRICE_DECIMALS);
