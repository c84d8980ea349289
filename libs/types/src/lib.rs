//! # Sluice Shared Types
//!
//! ## Purpose
//!
//! Common identifier and precision types used across the Sluice market maker
//! crates: opaque asset and account identifiers, the canonical trading-pair
//! key, and the fixed-point scale used for price quotations.
//!
//! ## Integration Points
//!
//! - **Consumers**: `sluice-amm` (price scale), `sluice-market` (pool keys,
//!   share balances, collaborator interfaces), test harnesses
//! - **Identity**: identifiers are opaque 20-byte values; the crate never
//!   dereferences them beyond ordering, hashing, and display
//! - **Serialization**: all types derive serde traits so pool records can be
//!   snapshotted and restored without conversion shims
//!
//! ## Architecture Role
//!
//! This crate sits at the bottom of the dependency graph and carries no
//! engine logic. Anything that two Sluice crates must agree on lives here:
//! what an asset is called, which of a pair's two assets is stored first,
//! and how many fixed-point digits a price carries.

pub mod identifiers;
pub mod pair;
pub mod precision;

pub use identifiers::{AccountId, AssetId, IdParseError, ID_LEN};
pub use pair::{PairKey, PairSide};
pub use precision::{PRICE_DECIMALS, PRICE_SCALE};
