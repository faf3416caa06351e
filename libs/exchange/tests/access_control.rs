//! Owner restrictions, pause behaviour and pool registration rules

mod common;

use common::*;
use dex_types::{Address, DexError, ExchangeEvent, PoolKey};

#[test]
fn test_non_owner_cannot_administer() {
    let h = Harness::new();
    let gate = h.engine.gate();
    let asset = Address::from_low_u64(9);

    assert_eq!(
        gate.add_supported_token(ALICE, asset),
        Err(DexError::NotOwner { caller: ALICE })
    );
    assert_eq!(gate.pause(ALICE), Err(DexError::NotOwner { caller: ALICE }));
    assert!(!gate.is_supported(asset));
    assert!(!gate.paused());
}

#[test]
fn test_add_supported_token_is_idempotent() {
    let h = Harness::new();
    let asset = Address::from_low_u64(9);
    assert_eq!(h.engine.gate().add_supported_token(OWNER, asset), Ok(true));
    assert_eq!(h.engine.gate().add_supported_token(OWNER, asset), Ok(false));
    assert_eq!(
        h.engine.gate().supported_assets(),
        vec![TKA, TKB, TKC, asset]
    );
}

#[test]
fn test_pause_blocks_mutations_but_not_reads() {
    let h = Harness::new();
    h.seed(ALICE, TKA, TKB, 100_000, 100_000);
    h.fund(BOB, TKA, 1000);
    h.engine.gate().pause(OWNER).unwrap();

    assert_eq!(
        h.engine.swap_exact_input(BOB, 1000, 0, TKA, TKB),
        Err(DexError::SystemPaused)
    );
    assert_eq!(
        h.engine.swap_exact_output(BOB, 10, 1000, TKA, TKB),
        Err(DexError::SystemPaused)
    );
    assert_eq!(
        h.engine.add_liquidity(BOB, TKA, TKB, 10, 10, 0, 0),
        Err(DexError::SystemPaused)
    );
    assert_eq!(
        h.engine.remove_liquidity(ALICE, TKA, TKB, 10, 0, 0),
        Err(DexError::SystemPaused)
    );
    assert_eq!(
        h.engine.create_pool(OWNER, TKA, TKC),
        Err(DexError::SystemPaused)
    );

    // Reads stay available
    assert_eq!(h.info(TKA, TKB), (100_000, 100_000, 100_000));
    assert_eq!(h.engine.get_amount_out(1000, TKA, TKB).unwrap(), 987);

    h.engine.gate().unpause(OWNER).unwrap();
    assert_eq!(h.engine.swap_exact_input(BOB, 1000, 0, TKA, TKB), Ok(987));
}

#[test]
fn test_duplicate_pool_rejected_in_reverse_order() {
    let h = Harness::new();
    assert_eq!(
        h.engine.create_pool(ALICE, TKB, TKA),
        Err(DexError::PoolAlreadyExists {
            pair: PoolKey::new(TKA, TKB).unwrap()
        })
    );
    assert_eq!(h.engine.registry().pool_count(), 1);
}

#[test]
fn test_pool_registration_rules() {
    let h = Harness::new();
    let unlisted = Address::from_low_u64(9);

    assert_eq!(
        h.engine.create_pool(ALICE, TKA, unlisted),
        Err(DexError::UnsupportedAsset { asset: unlisted })
    );
    assert_eq!(
        h.engine.create_pool(ALICE, TKC, TKC),
        Err(DexError::IdenticalAssets { asset: TKC })
    );

    // Any caller may create a pool for supported assets
    let key = h.engine.create_pool(ALICE, TKC, TKA).unwrap();
    assert_eq!(key, PoolKey::new(TKA, TKC).unwrap());
    assert_eq!(
        h.events.events(),
        vec![ExchangeEvent::PoolCreated {
            pool: key,
            creator: ALICE,
            sequence: 2,
        }]
    );
    assert_eq!(
        h.engine.registry().pool_keys(),
        vec![PoolKey::new(TKA, TKB).unwrap(), key]
    );
}

#[test]
fn test_operations_on_missing_pool() {
    let h = Harness::new();
    let pair = PoolKey::new(TKA, TKC).unwrap();

    assert_eq!(
        h.engine.get_pool_info(TKC, TKA),
        Err(DexError::PoolNotFound { pair })
    );
    assert_eq!(
        h.engine.swap_exact_input(ALICE, 10, 0, TKA, TKC),
        Err(DexError::PoolNotFound { pair })
    );
    assert_eq!(
        h.engine.get_amount_out(10, TKA, TKA),
        Err(DexError::IdenticalAssets { asset: TKA })
    );
}

#[test]
fn test_ownership_transfer_moves_admin_rights() {
    let h = Harness::new();
    let gate = h.engine.gate();

    gate.transfer_ownership(OWNER, ALICE).unwrap();
    assert_eq!(gate.owner(), ALICE);
    assert_eq!(gate.pause(OWNER), Err(DexError::NotOwner { caller: OWNER }));

    gate.pause(ALICE).unwrap();
    assert_eq!(
        h.engine.create_pool(ALICE, TKA, TKC),
        Err(DexError::SystemPaused)
    );
}
