//! Pool records and liquidity-share accounting.
//!
//! A pool holds the reserves of one canonical asset pair plus the share
//! ledger of its liquidity providers. All mutation goes through the
//! `commit_*` methods, which are called by the engines only after every
//! precondition check and external transfer has succeeded. The methods
//! themselves are infallible and keep the accounting invariants in one
//! place:
//!
//! - `total_shares` equals the sum of all share balances
//! - `total_shares == 0` exactly when both reserves are zero
//! - a swap never decreases the reserve product

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use types::{AccountId, PairKey, PairSide};

/// State of a single constant-product pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pair: PairKey,
    reserve_base: u128,
    reserve_quote: u128,
    total_shares: u128,
    share_balances: HashMap<AccountId, u128>,
}

impl Pool {
    /// Creates an unfunded pool for `pair`.
    pub fn new(pair: PairKey) -> Self {
        Self {
            pair,
            reserve_base: 0,
            reserve_quote: 0,
            total_shares: 0,
            share_balances: HashMap::new(),
        }
    }

    pub const fn pair(&self) -> PairKey {
        self.pair
    }

    pub const fn reserve_base(&self) -> u128 {
        self.reserve_base
    }

    pub const fn reserve_quote(&self) -> u128 {
        self.reserve_quote
    }

    pub const fn total_shares(&self) -> u128 {
        self.total_shares
    }

    /// Outstanding shares held by `account` (zero if never a provider).
    pub fn shares_of(&self, account: &AccountId) -> u128 {
        self.share_balances.get(account).copied().unwrap_or(0)
    }

    pub fn share_balances(&self) -> &HashMap<AccountId, u128> {
        &self.share_balances
    }

    /// True while the pool holds no liquidity. An empty pool stays
    /// addressable and can be re-funded through the bootstrap path.
    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    /// Reserves as `(reserve_in, reserve_out)` for a swap whose input asset
    /// sits on `input_side` of the canonical pair.
    pub fn reserves_for(&self, input_side: PairSide) -> (u128, u128) {
        match input_side {
            PairSide::Base => (self.reserve_base, self.reserve_quote),
            PairSide::Quote => (self.reserve_quote, self.reserve_base),
        }
    }

    /// Credits a deposit. Caller has already verified the additions cannot
    /// overflow and that `minted > 0`.
    pub(crate) fn commit_deposit(
        &mut self,
        recipient: AccountId,
        base_in: u128,
        quote_in: u128,
        minted: u128,
    ) {
        self.reserve_base += base_in;
        self.reserve_quote += quote_in;
        self.total_shares += minted;
        *self.share_balances.entry(recipient).or_insert(0) += minted;
        debug_assert!(self.invariants_hold());
    }

    /// Debits a withdrawal. Caller has already verified `provider` holds at
    /// least `shares` and that the payouts are the floored proportional
    /// amounts.
    pub(crate) fn commit_withdrawal(
        &mut self,
        provider: &AccountId,
        shares: u128,
        base_out: u128,
        quote_out: u128,
    ) {
        self.reserve_base -= base_out;
        self.reserve_quote -= quote_out;
        self.total_shares -= shares;
        let remaining = {
            let balance = self
                .share_balances
                .get_mut(provider)
                .expect("withdrawal from unknown provider");
            *balance -= shares;
            *balance
        };
        if remaining == 0 {
            self.share_balances.remove(provider);
        }
        debug_assert!(self.invariants_hold());
    }

    /// Applies a swap's reserve delta. Caller has already verified
    /// `amount_out` against the pricing formula, so the output reserve
    /// cannot be drained below zero.
    pub(crate) fn commit_swap(&mut self, input_side: PairSide, amount_in: u128, amount_out: u128) {
        match input_side {
            PairSide::Base => {
                self.reserve_base += amount_in;
                self.reserve_quote -= amount_out;
            }
            PairSide::Quote => {
                self.reserve_quote += amount_in;
                self.reserve_base -= amount_out;
            }
        }
        debug_assert!(self.invariants_hold());
    }

    /// Accounting invariants; used by debug assertions and tests.
    pub fn invariants_hold(&self) -> bool {
        let share_sum: u128 = self.share_balances.values().sum();
        let funded = self.reserve_base > 0 || self.reserve_quote > 0;
        share_sum == self.total_shares && funded == (self.total_shares > 0)
    }
}
