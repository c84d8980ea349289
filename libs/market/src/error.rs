//! Market operation errors.

use thiserror::Error;

use sluice_amm::MathError;
use types::PairKey;

use crate::traits::LedgerError;

/// Failures surfaced to callers of market operations.
///
/// Every failure aborts the whole operation with no partial state mutation.
/// There is no internal retry; callers resubmit with adjusted parameters
/// (a fresh deadline, a relaxed minimum) after inspecting the kind.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("deadline {deadline} already passed at {now}")]
    DeadlineExpired { deadline: u64, now: u64 },

    #[error("invalid amount: {0}")]
    InvalidAmount(&'static str),

    #[error("invalid reserves: pool cannot price this operation")]
    InvalidReserves,

    #[error("slippage exceeded: amount {actual} below minimum {minimum}")]
    SlippageExceeded { actual: u128, minimum: u128 },

    #[error("insufficient shares: held {held}, requested {requested}")]
    InsufficientShares { held: u128, requested: u128 },

    #[error("unsupported swap path")]
    UnsupportedPath,

    #[error("pool {0} has no liquidity")]
    EmptyPool(PairKey),

    #[error("no pool for pair {0}")]
    NotFound(PairKey),

    #[error("transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

impl From<MathError> for MarketError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InvalidInput => MarketError::InvalidAmount("input amount must be positive"),
            MathError::InvalidReserves => MarketError::InvalidReserves,
            MathError::Overflow(context) => MarketError::Overflow(context),
        }
    }
}
