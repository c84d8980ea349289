//! Arithmetic error types.

use thiserror::Error;

/// Failures from the pool math functions.
///
/// `InvalidInput` and `InvalidReserves` are argument-validation failures;
/// `Overflow` means a checked `u128` operation would have wrapped. None of
/// these are recoverable inside the math layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("input amount must be positive")]
    InvalidInput,

    #[error("reserves must be positive")]
    InvalidReserves,

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}
