//! Collaborator interfaces.
//!
//! The market consumes three external capabilities: an asset ledger that
//! moves token quantities between accounts, a clock, and a sink for swap
//! notifications. All are object-safe and held as `Arc<dyn _>` so deployments
//! can wire in whatever backs them: an in-memory ledger in tests, a
//! settlement system in production.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use types::{AccountId, AssetId};

/// Failures reported by an [`AssetLedger`].
///
/// Each ledger call is atomic: on error, no balance moved.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("insufficient balance of {asset} in {account}")]
    InsufficientBalance { asset: AssetId, account: AccountId },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Moves asset quantities between external accounts and pool custody.
pub trait AssetLedger: Send + Sync {
    /// Moves `amount` of `asset` from `from` into the custody account `to`.
    fn pull(
        &self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Releases `amount` of `asset` from pool custody to `to`.
    fn push(&self, asset: AssetId, to: AccountId, amount: u128) -> Result<(), LedgerError>;
}

/// Timestamp source, nanoseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock time via `chrono`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // saturates past 2262; fine for deadline comparisons
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(i64::MAX) as u64
    }
}

/// A completed swap, as delivered to the event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub initiator: AccountId,
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: u128,
    pub amount_out: u128,
}

/// Receives swap notifications. Fire-and-forget: the engines never act on a
/// sink's behavior and consume no return value.
pub trait EventSink: Send + Sync {
    fn notify_swap(&self, event: SwapEvent);
}

/// Event sink that logs each swap at INFO.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn notify_swap(&self, event: SwapEvent) {
        info!(
            "swap: {} -> {} {} in, {} out, initiator {}",
            event.asset_in.short(),
            event.asset_out.short(),
            event.amount_in,
            event.amount_out,
            event.initiator.short()
        );
    }
}

/// Event sink that drops every notification.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn notify_swap(&self, _event: SwapEvent) {}
}
