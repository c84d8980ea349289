//! # Sluice Market - Constant-Product Pool State Management
//!
//! ## Purpose
//!
//! The stateful core of the Sluice market maker: a registry of per-pair
//! pools with liquidity-share accounting, swap execution against the
//! constant-product pricing rule, and read-only spot price queries. Asset
//! custody, time, and event delivery are abstract collaborators supplied at
//! construction; the market never moves assets on its own initiative.
//!
//! ## Integration Points
//!
//! - **Input Sources**: caller operations (add/remove liquidity, swap,
//!   price queries) with caller-supplied identity and deadlines
//! - **Output Destinations**: an [`AssetLedger`] for custody movements, an
//!   [`EventSink`] for swap notifications
//! - **State Persistence**: bincode snapshot/restore of the whole registry
//! - **Concurrency**: per-pool mutual exclusion; operations on different
//!   pools proceed in parallel
//!
//! ## Architecture Role
//!
//! ```text
//! Caller Operations → [Market] → [Pool Registry] → [Pool Records]
//!       ↓                ↓              ↓                ↓
//! add_liquidity      Preconditions  Lazy creation    Reserves
//! remove_liquidity   Orientation    Per-pool mutex   Share balances
//! swap               Staged math    Snapshots        Invariants
//! spot_price         Custody calls
//! ```
//!
//! Every mutating operation validates, stages its arithmetic, performs the
//! external transfer calls, and only then commits to the pool record. A
//! collaborator failure leaves the pool exactly as it was.

pub mod error;
pub mod market;
pub mod pool;
pub mod registry;
pub mod traits;

pub use error::MarketError;
pub use market::{resolve_pair, Market};
pub use pool::Pool;
pub use registry::{PoolRegistry, RegistryError};
pub use traits::{
    AssetLedger, Clock, EventSink, LedgerError, NullEventSink, SwapEvent, SystemClock,
    TracingEventSink,
};

// Re-export the pure math surface alongside the engines
pub use sluice_amm::{CpmmMath, MathError, Quote};
