//! Liquidity engine, swap engine, and price query.
//!
//! Every mutating operation follows the same shape: check preconditions,
//! orient the caller's arguments onto the pair's canonical storage order,
//! stage all arithmetic against the locked pool, perform the external
//! custody calls, and only then commit the staged deltas to the pool
//! record. A collaborator failure between the two custody calls triggers a
//! best-effort compensation of the first call and leaves the pool exactly
//! as it was.

use std::cmp;
use std::sync::Arc;

use tracing::debug;

use sluice_amm::{CpmmMath, Quote};
use types::{AccountId, AssetId, PairKey, PairSide};

use crate::error::MarketError;
use crate::registry::PoolRegistry;
use crate::traits::{AssetLedger, Clock, EventSink, SwapEvent};

/// Derives the canonical pair key for two assets. Mirror argument orders
/// resolve to the same key.
pub fn resolve_pair(asset_a: AssetId, asset_b: AssetId) -> PairKey {
    PairKey::of(asset_a, asset_b)
}

/// The market maker: pool registry plus the collaborators every operation
/// needs. Cheap to share behind an `Arc`; all methods take `&self`.
pub struct Market {
    registry: PoolRegistry,
    ledger: Arc<dyn AssetLedger>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    custody: AccountId,
}

impl Market {
    /// Creates a market with an empty registry. `custody` names the account
    /// the ledger pulls deposits into.
    pub fn new(
        ledger: Arc<dyn AssetLedger>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
        custody: AccountId,
    ) -> Self {
        Self {
            registry: PoolRegistry::new(),
            ledger,
            clock,
            events,
            custody,
        }
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub const fn custody(&self) -> AccountId {
        self.custody
    }

    /// Deposits paired assets and mints liquidity shares to `recipient`.
    ///
    /// On an unfunded pool the full desired amounts bootstrap the pool and
    /// fix its share-unit scale: `minted = ⌊√(amount_a × amount_b)⌋`. On a
    /// funded pool the deposit is clamped to the pool's current ratio and
    /// `minted = min(base_in × shares / reserve_base, quote_in × shares /
    /// reserve_quote)`, so suppliers of an unbalanced ratio cannot dilute
    /// existing holders or skew the price.
    ///
    /// Returns the amounts actually taken (in the caller's argument order)
    /// and the minted share count.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        caller: AccountId,
        asset_a: AssetId,
        asset_b: AssetId,
        amount_a_desired: u128,
        amount_b_desired: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        recipient: AccountId,
        deadline: u64,
    ) -> Result<(u128, u128, u128), MarketError> {
        self.ensure_deadline(deadline)?;
        if asset_a == asset_b {
            return Err(MarketError::UnsupportedPath);
        }
        if amount_a_min == 0 || amount_b_min == 0 {
            return Err(MarketError::InvalidAmount("minimum amounts must be positive"));
        }
        if amount_a_desired < amount_a_min || amount_b_desired < amount_b_min {
            return Err(MarketError::InvalidAmount("desired amount below its minimum"));
        }

        let pair = PairKey::of(asset_a, asset_b);
        let a_is_base = asset_a == pair.base();
        let (base_desired, quote_desired, base_min, quote_min) = if a_is_base {
            (amount_a_desired, amount_b_desired, amount_a_min, amount_b_min)
        } else {
            (amount_b_desired, amount_a_desired, amount_b_min, amount_a_min)
        };

        let pool_ref = self.registry.get_or_create(pair);
        let mut pool = pool_ref.lock();

        let (base_in, quote_in, minted) = if pool.is_empty() {
            let product = base_desired
                .checked_mul(quote_desired)
                .ok_or(MarketError::Overflow("bootstrap product"))?;
            let minted = CpmmMath::integer_sqrt(product);
            if minted == 0 {
                return Err(MarketError::InvalidAmount("deposit too small to mint shares"));
            }
            (base_desired, quote_desired, minted)
        } else {
            let reserve_base = pool.reserve_base();
            let reserve_quote = pool.reserve_quote();

            let quote_optimal =
                CpmmMath::proportional_amount(base_desired, reserve_base, reserve_quote)?;
            let (base_in, quote_in) = if quote_optimal <= quote_desired {
                if quote_optimal < quote_min {
                    return Err(MarketError::SlippageExceeded {
                        actual: quote_optimal,
                        minimum: quote_min,
                    });
                }
                (base_desired, quote_optimal)
            } else {
                let base_optimal =
                    CpmmMath::proportional_amount(quote_desired, reserve_quote, reserve_base)?;
                debug_assert!(base_optimal <= base_desired);
                if base_optimal < base_min {
                    return Err(MarketError::SlippageExceeded {
                        actual: base_optimal,
                        minimum: base_min,
                    });
                }
                (base_optimal, quote_desired)
            };

            let total = pool.total_shares();
            let minted = cmp::min(
                CpmmMath::proportional_share(base_in, total, reserve_base)?,
                CpmmMath::proportional_share(quote_in, total, reserve_quote)?,
            );
            if minted == 0 {
                return Err(MarketError::InvalidAmount("deposit too small to mint shares"));
            }
            (base_in, quote_in, minted)
        };

        // Overflow guards up front so the commit after custody movement
        // cannot fail.
        pool.reserve_base()
            .checked_add(base_in)
            .ok_or(MarketError::Overflow("base reserve"))?;
        pool.reserve_quote()
            .checked_add(quote_in)
            .ok_or(MarketError::Overflow("quote reserve"))?;
        pool.total_shares()
            .checked_add(minted)
            .ok_or(MarketError::Overflow("total shares"))?;

        self.ledger.pull(pair.base(), caller, self.custody, base_in)?;
        if let Err(err) = self.ledger.pull(pair.quote(), caller, self.custody, quote_in) {
            self.refund_pull(pair.base(), caller, base_in);
            return Err(err.into());
        }

        pool.commit_deposit(recipient, base_in, quote_in, minted);
        debug!(
            "pool {}: minted {} shares to {} for {} base / {} quote",
            pair,
            minted,
            recipient.short(),
            base_in,
            quote_in
        );

        let (amount_a, amount_b) = if a_is_base {
            (base_in, quote_in)
        } else {
            (quote_in, base_in)
        };
        Ok((amount_a, amount_b, minted))
    }

    /// Burns `shares` of the caller's liquidity and releases the
    /// proportional slice of both reserves to `recipient`.
    ///
    /// Payouts are floored, so rounding loss stays in the pool, never with
    /// the withdrawer.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &self,
        caller: AccountId,
        asset_a: AssetId,
        asset_b: AssetId,
        shares: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        recipient: AccountId,
        deadline: u64,
    ) -> Result<(u128, u128), MarketError> {
        self.ensure_deadline(deadline)?;
        if asset_a == asset_b {
            return Err(MarketError::UnsupportedPath);
        }
        if amount_a_min == 0 || amount_b_min == 0 {
            return Err(MarketError::InvalidAmount("minimum amounts must be positive"));
        }
        if shares == 0 {
            return Err(MarketError::InvalidAmount("share amount must be positive"));
        }

        let pair = PairKey::of(asset_a, asset_b);
        let a_is_base = asset_a == pair.base();
        let (base_min, quote_min) = if a_is_base {
            (amount_a_min, amount_b_min)
        } else {
            (amount_b_min, amount_a_min)
        };

        let pool_ref = self.registry.get_or_create(pair);
        let mut pool = pool_ref.lock();

        let held = pool.shares_of(&caller);
        if held < shares {
            return Err(MarketError::InsufficientShares {
                held,
                requested: shares,
            });
        }

        let total = pool.total_shares();
        let base_out = CpmmMath::share_payout(shares, pool.reserve_base(), total)?;
        let quote_out = CpmmMath::share_payout(shares, pool.reserve_quote(), total)?;
        if base_out < base_min {
            return Err(MarketError::SlippageExceeded {
                actual: base_out,
                minimum: base_min,
            });
        }
        if quote_out < quote_min {
            return Err(MarketError::SlippageExceeded {
                actual: quote_out,
                minimum: quote_min,
            });
        }

        self.ledger.push(pair.base(), recipient, base_out)?;
        if let Err(err) = self.ledger.push(pair.quote(), recipient, quote_out) {
            self.reclaim_push(pair.base(), recipient, base_out);
            return Err(err.into());
        }

        pool.commit_withdrawal(&caller, shares, base_out, quote_out);
        debug!(
            "pool {}: burned {} shares from {} for {} base / {} quote",
            pair,
            shares,
            caller.short(),
            base_out,
            quote_out
        );

        if a_is_base {
            Ok((base_out, quote_out))
        } else {
            Ok((quote_out, base_out))
        }
    }

    /// Swaps an exact input along a direct two-asset path.
    ///
    /// The requested direction is normalized against the pool's canonical
    /// orientation before reserves are read, so `[a, b]` and the pool's
    /// storage order can never disagree about which reserve backs which
    /// asset. The reserve product never decreases across a swap.
    pub fn swap(
        &self,
        caller: AccountId,
        amount_in: u128,
        amount_out_min: u128,
        path: &[AssetId],
        recipient: AccountId,
        deadline: u64,
    ) -> Result<u128, MarketError> {
        self.ensure_deadline(deadline)?;
        let (asset_in, asset_out) = match path {
            [a, b] if a != b => (*a, *b),
            _ => return Err(MarketError::UnsupportedPath),
        };
        if amount_in == 0 {
            return Err(MarketError::InvalidAmount("input amount must be positive"));
        }

        let pair = PairKey::of(asset_in, asset_out);
        let input_side = if asset_in == pair.base() {
            PairSide::Base
        } else {
            PairSide::Quote
        };

        let pool_ref = self.registry.get_or_create(pair);
        let mut pool = pool_ref.lock();

        let (reserve_in, reserve_out) = pool.reserves_for(input_side);
        // output_amount's checked denominator also proves reserve_in +
        // amount_in fits, making the commit below infallible
        let amount_out = CpmmMath::output_amount(amount_in, reserve_in, reserve_out)?;
        if amount_out < amount_out_min {
            return Err(MarketError::SlippageExceeded {
                actual: amount_out,
                minimum: amount_out_min,
            });
        }

        self.ledger.pull(asset_in, caller, self.custody, amount_in)?;
        if let Err(err) = self.ledger.push(asset_out, recipient, amount_out) {
            self.refund_pull(asset_in, caller, amount_in);
            return Err(err.into());
        }

        pool.commit_swap(input_side, amount_in, amount_out);
        self.events.notify_swap(SwapEvent {
            initiator: caller,
            asset_in,
            asset_out,
            amount_in,
            amount_out,
        });
        debug!(
            "pool {}: swapped {} {} for {} {}",
            pair,
            amount_in,
            asset_in.short(),
            amount_out,
            asset_out.short()
        );
        Ok(amount_out)
    }

    /// Spot price of `asset_a` in units of `asset_b`, in 18-decimal fixed
    /// point: the quantity of `asset_b` per one unit of `asset_a` at current
    /// reserves. Pure read; never creates a pool.
    pub fn spot_price(&self, asset_a: AssetId, asset_b: AssetId) -> Result<u128, MarketError> {
        let pair = PairKey::of(asset_a, asset_b);
        let pool_ref = self.registry.get(&pair).ok_or(MarketError::NotFound(pair))?;
        let pool = pool_ref.lock();

        let (reserve_a, reserve_b) = if asset_a == pair.base() {
            (pool.reserve_base(), pool.reserve_quote())
        } else {
            (pool.reserve_quote(), pool.reserve_base())
        };
        if reserve_a == 0 || reserve_b == 0 {
            return Err(MarketError::EmptyPool(pair));
        }
        CpmmMath::spot_price_ratio(reserve_a, reserve_b).map_err(Into::into)
    }

    /// Prices an exact-in swap against explicit reserves without touching
    /// any pool state.
    pub fn quote_out(
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<Quote, MarketError> {
        CpmmMath::quote_out(amount_in, reserve_in, reserve_out).map_err(Into::into)
    }

    fn ensure_deadline(&self, deadline: u64) -> Result<(), MarketError> {
        let now = self.clock.now();
        if now > deadline {
            return Err(MarketError::DeadlineExpired { deadline, now });
        }
        Ok(())
    }

    /// Best-effort compensation: return an already-pulled amount to its
    /// owner after a later custody call failed.
    fn refund_pull(&self, asset: AssetId, to: AccountId, amount: u128) {
        if let Err(err) = self.ledger.push(asset, to, amount) {
            tracing::warn!(
                "compensating refund of {} {} to {} failed: {}",
                amount,
                asset.short(),
                to.short(),
                err
            );
        }
    }

    /// Best-effort compensation: reclaim an already-pushed amount into
    /// custody after a later custody call failed.
    fn reclaim_push(&self, asset: AssetId, from: AccountId, amount: u128) {
        if let Err(err) = self.ledger.pull(asset, from, self.custody, amount) {
            tracing::warn!(
                "compensating reclaim of {} {} from {} failed: {}",
                amount,
                asset.short(),
                from.short(),
                err
            );
        }
    }
}
