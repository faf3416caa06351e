//! Shared fixtures for exchange integration tests

#![allow(dead_code)]

use dex_exchange::{AccessGate, AssetCustody, EventLog, ExchangeEngine, InMemoryCustody};
use dex_types::{Address, Amount};
use std::sync::Arc;

pub const OWNER: Address = Address::from_low_u64(0xaa);
pub const ALICE: Address = Address::from_low_u64(0xa1);
pub const BOB: Address = Address::from_low_u64(0xb0);

pub const TKA: Address = Address::from_low_u64(1);
pub const TKB: Address = Address::from_low_u64(2);
pub const TKC: Address = Address::from_low_u64(3);

pub const FEE_BPS: u32 = 30;

/// Engine with TKA, TKB and TKC supported and an empty TKA/TKB pool
pub struct Harness {
    pub engine: ExchangeEngine,
    pub custody: Arc<InMemoryCustody>,
    pub events: Arc<EventLog>,
}

impl Harness {
    pub fn new() -> Self {
        let custody = Arc::new(InMemoryCustody::new());
        Self::with_custody(custody.clone(), custody)
    }

    /// Route engine transfers through `engine_custody` while `ledger` stays
    /// available for funding and balance assertions
    pub fn with_custody(ledger: Arc<InMemoryCustody>, engine_custody: Arc<dyn AssetCustody>) -> Self {
        let events = Arc::new(EventLog::new());
        let engine = ExchangeEngine::new(
            Arc::new(AccessGate::new(OWNER)),
            engine_custody,
            events.clone(),
            FEE_BPS,
        )
        .unwrap();

        for asset in [TKA, TKB, TKC] {
            engine.gate().add_supported_token(OWNER, asset).unwrap();
        }
        engine.create_pool(OWNER, TKA, TKB).unwrap();
        events.clear();

        Self {
            engine,
            custody: ledger,
            events,
        }
    }

    /// Mint `amount` to `holder` and let the exchange pull all of it
    pub fn fund(&self, holder: Address, asset: Address, amount: Amount) {
        self.custody.mint(asset, holder, amount).unwrap();
        let balance = self.custody.balance_of(asset, holder);
        self.custody.approve(asset, holder, balance);
    }

    /// Fund `provider` and deposit exactly the given amounts
    pub fn seed(
        &self,
        provider: Address,
        asset_a: Address,
        asset_b: Address,
        amount_a: Amount,
        amount_b: Amount,
    ) -> (Amount, Amount, Amount) {
        self.fund(provider, asset_a, amount_a);
        self.fund(provider, asset_b, amount_b);
        self.engine
            .add_liquidity(provider, asset_a, asset_b, amount_a, amount_b, 0, 0)
            .unwrap()
    }

    /// `(reserve_a, reserve_b, total_shares)` for the pair
    pub fn info(&self, asset_a: Address, asset_b: Address) -> (Amount, Amount, Amount) {
        let info = self.engine.get_pool_info(asset_a, asset_b).unwrap();
        (info.reserve_a, info.reserve_b, info.total_shares)
    }
}
