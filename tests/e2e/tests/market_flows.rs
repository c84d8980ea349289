//! Full market flows against the reference in-memory collaborators.

use std::sync::Arc;

use anyhow::Result;

use sluice_e2e_tests::{init_tracing, InMemoryLedger, ManualClock, RecordingSink};
use sluice_market::{resolve_pair, Market, MarketError};
use types::{AccountId, AssetId, ID_LEN};

const FAR: u64 = u64::MAX;

fn asset(b: u8) -> AssetId {
    AssetId::from_bytes([b; ID_LEN])
}

fn account(b: u8) -> AccountId {
    AccountId::from_bytes([b; ID_LEN])
}

struct Harness {
    ledger: Arc<InMemoryLedger>,
    clock: Arc<ManualClock>,
    sink: Arc<RecordingSink>,
    market: Arc<Market>,
    custody: AccountId,
}

fn harness() -> Harness {
    init_tracing();
    let custody = account(0xcc);
    let ledger = Arc::new(InMemoryLedger::new(custody));
    let clock = Arc::new(ManualClock::default());
    let sink = Arc::new(RecordingSink::default());
    let market = Arc::new(Market::new(
        ledger.clone(),
        clock.clone(),
        sink.clone(),
        custody,
    ));
    Harness {
        ledger,
        clock,
        sink,
        market,
        custody,
    }
}

#[test]
fn provision_trade_withdraw_conserves_every_balance() -> Result<()> {
    let h = harness();
    let (a, b) = (asset(1), asset(2));
    let (alice, bob) = (account(10), account(20));

    h.ledger.mint(a, alice, 1_000);
    h.ledger.mint(b, alice, 1_000);
    h.ledger.mint(a, bob, 10);

    let (taken_a, taken_b, shares) =
        h.market
            .add_liquidity(alice, a, b, 100, 400, 1, 1, alice, FAR)?;
    assert_eq!((taken_a, taken_b, shares), (100, 400, 200));
    assert_eq!(h.ledger.balance_of(a, h.custody), 100);
    assert_eq!(h.ledger.balance_of(b, h.custody), 400);

    let out = h.market.swap(bob, 10, 1, &[a, b], bob, FAR)?;
    assert_eq!(out, 36);
    assert_eq!(h.ledger.balance_of(a, bob), 0);
    assert_eq!(h.ledger.balance_of(b, bob), 36);

    let (out_a, out_b) = h
        .market
        .remove_liquidity(alice, a, b, shares, 1, 1, alice, FAR)?;
    assert_eq!((out_a, out_b), (110, 364));

    // custody fully drained, nothing minted or destroyed
    assert_eq!(h.ledger.balance_of(a, h.custody), 0);
    assert_eq!(h.ledger.balance_of(b, h.custody), 0);
    assert_eq!(h.ledger.balance_of(a, alice), 1_010);
    assert_eq!(h.ledger.balance_of(b, alice), 964);

    let events = h.sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].initiator, bob);
    assert_eq!(events[0].amount_out, 36);
    Ok(())
}

#[test]
fn withdrawal_never_returns_more_than_deposited() -> Result<()> {
    let h = harness();
    let (a, b) = (asset(1), asset(2));
    let (alice, bob) = (account(10), account(20));

    h.ledger.mint(a, alice, 1_000);
    h.ledger.mint(b, alice, 1_000);
    h.ledger.mint(a, bob, 1_000);
    h.ledger.mint(b, bob, 1_000);

    h.market.add_liquidity(alice, a, b, 100, 400, 1, 1, alice, FAR)?;
    // bob's deposit clamps to the 1:4 ratio; 33:132 mints floor shares
    let (_, _, bob_shares) = h
        .market
        .add_liquidity(bob, a, b, 33, 999, 1, 1, bob, FAR)?;

    let (out_a, out_b) = h
        .market
        .remove_liquidity(bob, a, b, bob_shares, 1, 1, bob, FAR)?;
    // never more than went in
    assert!(out_a <= 33);
    assert!(out_b <= 132);
    Ok(())
}

#[test]
fn mirror_addressing_consolidates_liquidity() -> Result<()> {
    let h = harness();
    let (a, b) = (asset(3), asset(4));
    let (alice, bob) = (account(10), account(20));

    for (asset_id, who) in [(a, alice), (b, alice), (a, bob), (b, bob)] {
        h.ledger.mint(asset_id, who, 10_000);
    }

    h.market.add_liquidity(alice, a, b, 100, 400, 1, 1, alice, FAR)?;
    h.market.add_liquidity(bob, b, a, 400, 100, 1, 1, bob, FAR)?;

    assert_eq!(h.market.registry().len(), 1);
    let pool = h.market.registry().get(&resolve_pair(b, a)).unwrap();
    let pool = pool.lock();
    assert_eq!(pool.total_shares(), 400);
    assert_eq!(pool.shares_of(&alice), pool.shares_of(&bob));
    Ok(())
}

#[test]
fn deadlines_govern_every_mutating_operation() -> Result<()> {
    let h = harness();
    let (a, b) = (asset(1), asset(2));
    let alice = account(10);
    h.ledger.mint(a, alice, 1_000);
    h.ledger.mint(b, alice, 1_000);

    h.clock.set(5_000);
    let stale = 4_999;

    assert!(matches!(
        h.market
            .add_liquidity(alice, a, b, 100, 400, 1, 1, alice, stale),
        Err(MarketError::DeadlineExpired { .. })
    ));
    assert!(matches!(
        h.market.swap(alice, 10, 1, &[a, b], alice, stale),
        Err(MarketError::DeadlineExpired { .. })
    ));
    assert!(matches!(
        h.market
            .remove_liquidity(alice, a, b, 1, 1, 1, alice, stale),
        Err(MarketError::DeadlineExpired { .. })
    ));

    // a fresh deadline goes through
    h.market
        .add_liquidity(alice, a, b, 100, 400, 1, 1, alice, 5_000)?;
    Ok(())
}

#[test]
fn underfunded_caller_aborts_with_no_trace() -> Result<()> {
    let h = harness();
    let (a, b) = (asset(1), asset(2));
    let (alice, bob) = (account(10), account(20));
    h.ledger.mint(a, alice, 1_000);
    h.ledger.mint(b, alice, 1_000);
    h.market.add_liquidity(alice, a, b, 100, 400, 1, 1, alice, FAR)?;

    // bob owns nothing to swap with
    let result = h.market.swap(bob, 10, 1, &[a, b], bob, FAR);
    assert!(matches!(result, Err(MarketError::TransferFailed(_))));

    let pool = h.market.registry().get(&resolve_pair(a, b)).unwrap();
    {
        let pool = pool.lock();
        assert_eq!(pool.reserve_base(), 100);
        assert_eq!(pool.reserve_quote(), 400);
    }
    assert!(h.sink.events().is_empty());
    assert_eq!(h.ledger.balance_of(b, bob), 0);
    Ok(())
}

#[test]
fn partial_deposit_failure_refunds_the_first_leg() -> Result<()> {
    let h = harness();
    let (a, b) = (asset(1), asset(2));
    let alice = account(10);
    // alice can fund asset a but not asset b
    h.ledger.mint(a, alice, 1_000);

    let result = h
        .market
        .add_liquidity(alice, a, b, 100, 400, 1, 1, alice, FAR);
    assert!(matches!(result, Err(MarketError::TransferFailed(_))));

    // the pulled base leg came back; custody kept nothing
    assert_eq!(h.ledger.balance_of(a, alice), 1_000);
    assert_eq!(h.ledger.balance_of(a, h.custody), 0);
    let pool = h.market.registry().get(&resolve_pair(a, b)).unwrap();
    assert!(pool.lock().is_empty());
    Ok(())
}

#[test]
fn concurrent_swaps_on_one_pool_serialize_cleanly() -> Result<()> {
    let h = harness();
    let (a, b) = (asset(1), asset(2));
    let alice = account(10);
    h.ledger.mint(a, alice, 2_000_000_000);
    h.ledger.mint(b, alice, 2_000_000_000);
    h.market.add_liquidity(
        alice,
        a,
        b,
        1_000_000_000,
        1_000_000_000,
        1,
        1,
        alice,
        FAR,
    )?;
    let initial_product: u128 = 1_000_000_000u128 * 1_000_000_000;

    let workers: u8 = 4;
    let swaps_per_worker: u32 = 50;
    let handles: Vec<_> = (0..workers)
        .map(|i| {
            let market = h.market.clone();
            let ledger = h.ledger.clone();
            let trader = account(0x40 + i);
            ledger.mint(a, trader, 1_000_000);
            std::thread::spawn(move || {
                for _ in 0..swaps_per_worker {
                    market
                        .swap(trader, 1_000, 1, &[a, b], trader, FAR)
                        .expect("funded swap");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let pool = h.market.registry().get(&resolve_pair(a, b)).unwrap();
    let pool = pool.lock();
    assert!(pool.invariants_hold());
    assert!(pool.reserve_base() * pool.reserve_quote() >= initial_product);
    assert_eq!(
        pool.reserve_base(),
        1_000_000_000 + u128::from(workers) * u128::from(swaps_per_worker) * 1_000
    );
    assert_eq!(
        h.sink.events().len(),
        usize::from(workers) * swaps_per_worker as usize
    );
    Ok(())
}

#[test]
fn independent_pools_progress_in_parallel() -> Result<()> {
    let h = harness();
    let alice = account(10);
    let pairs = [(asset(1), asset(2)), (asset(3), asset(4))];
    for (a, b) in pairs {
        h.ledger.mint(a, alice, 10_000_000);
        h.ledger.mint(b, alice, 10_000_000);
        h.market
            .add_liquidity(alice, a, b, 1_000_000, 1_000_000, 1, 1, alice, FAR)?;
    }

    let handles: Vec<_> = pairs
        .iter()
        .enumerate()
        .map(|(i, &(a, b))| {
            let market = h.market.clone();
            let ledger = h.ledger.clone();
            let trader = account(0x50 + i as u8);
            ledger.mint(a, trader, 100_000);
            std::thread::spawn(move || {
                let mut received = 0u128;
                for _ in 0..100 {
                    received += market
                        .swap(trader, 100, 1, &[a, b], trader, FAR)
                        .expect("funded swap");
                }
                received
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().expect("worker panicked") > 0);
    }
    for (a, b) in pairs {
        let pool = h.market.registry().get(&resolve_pair(a, b)).unwrap();
        assert!(pool.lock().invariants_hold());
    }
    Ok(())
}
