use crate as pallet_migratable_token;
use frame_support::{
    derive_impl, parameter_types,
    traits::{ConstU128, ConstU32, ConstU64},
    weights::Weight,
    PalletId,
};
use sp_core::H256;
use sp_runtime::{
    traits::{BlakeTwo256, IdentityLookup},
    BuildStorage, DispatchError, DispatchResult,
};
use std::cell::RefCell;

type Block = frame_system::mocking::MockBlock<Test>;

// Configure a mock runtime to test the pallet.
frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        Balances: pallet_balances,
        Token: pallet_migratable_token,
    }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type BaseCallFilter = frame_support::traits::Everything;
    type RuntimeOrigin = RuntimeOrigin;
    type RuntimeCall = RuntimeCall;
    type Nonce = u64;
    type Hash = H256;
    type Hashing = BlakeTwo256;
    type AccountId = u64;
    type Lookup = IdentityLookup<Self::AccountId>;
    type Block = Block;
    type RuntimeEvent = RuntimeEvent;
    type BlockHashCount = ConstU64<250>;
    type PalletInfo = PalletInfo;
    type AccountData = pallet_balances::AccountData<u128>;
    type MaxConsumers = ConstU32<16>;
}

#[derive_impl(pallet_balances::config_preludes::TestDefaultConfig)]
impl pallet_balances::Config for Test {
    type Balance = u128;
    type ExistentialDeposit = ConstU128<1>;
    type AccountStore = System;
}

pub const ADMIN: u64 = 1;
pub const ISSUER: u64 = 2;
pub const ALICE: u64 = 3;
pub const BOB: u64 = 4;
pub const CHARLIE: u64 = 5;
pub const SUCCESSOR: u64 = 100;

pub const TOTAL_SUPPLY: u128 = 1_000_000_000;
pub const SALE_SUPPLY: u128 = 400_000_000;
pub const NATIVE_ENDOWMENT: u128 = 1_000_000;
pub const SUCCESSOR_CREDIT_WEIGHT: Weight = Weight::from_parts(40_000_000, 3_000);

parameter_types! {
    pub const AdminAccount: u64 = ADMIN;
    pub const TokenPalletId: PalletId = PalletId(*b"py/mgtkn");
    // 300 parts per payment unit: at 300 currency per unit, one part is worth one currency unit.
    pub const PaymentUnit: u128 = 300;
    pub const MaxMigrationBatch: u32 = 50;
}

pub struct EnsureAdmin;
impl frame_support::traits::EnsureOrigin<RuntimeOrigin> for EnsureAdmin {
    type Success = u64;

    fn try_origin(o: RuntimeOrigin) -> Result<Self::Success, RuntimeOrigin> {
        match o.clone().into() {
            Ok(frame_system::RawOrigin::Signed(account)) if account == AdminAccount::get() => {
                Ok(account)
            },
            _ => Err(o),
        }
    }

    #[cfg(feature = "runtime-benchmarks")]
    fn try_successful_origin() -> Result<RuntimeOrigin, ()> {
        Ok(RuntimeOrigin::signed(AdminAccount::get()))
    }
}

thread_local! {
    static CREDITS: RefCell<Vec<(u64, u64, u128)>> = const { RefCell::new(Vec::new()) };
    static REJECTED_ACCOUNT: RefCell<Option<u64>> = const { RefCell::new(None) };
}

/// Successor ledger that records every credit it receives.
pub struct RecordingSuccessor;

impl RecordingSuccessor {
    /// `(successor, account, amount)` in call order.
    pub fn credits() -> Vec<(u64, u64, u128)> {
        CREDITS.with(|c| c.borrow().clone())
    }

    /// Total credited to `account` across all calls.
    pub fn credited_to(account: u64) -> u128 {
        CREDITS.with(|c| {
            c.borrow().iter().filter(|(_, a, _)| *a == account).map(|(_, _, v)| v).sum()
        })
    }

    /// Make every credit for `account` fail.
    pub fn reject_credits_for(account: Option<u64>) {
        REJECTED_ACCOUNT.with(|r| *r.borrow_mut() = account);
    }
}

impl pallet_migratable_token::SuccessorLedger<u64> for RecordingSuccessor {
    fn credit(successor: &u64, account: &u64, amount: u128) -> DispatchResult {
        if REJECTED_ACCOUNT.with(|r| *r.borrow()) == Some(*account) {
            return Err(DispatchError::Other("successor rejected credit"));
        }
        CREDITS.with(|c| c.borrow_mut().push((*successor, *account, amount)));
        Ok(())
    }

    fn credit_weight() -> Weight {
        SUCCESSOR_CREDIT_WEIGHT
    }
}

impl pallet_migratable_token::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type AdminOrigin = EnsureAdmin;
    type Currency = Balances;
    type Successor = RecordingSuccessor;
    type PalletId = TokenPalletId;
    type PaymentUnit = PaymentUnit;
    type MaxMigrationBatch = MaxMigrationBatch;
    type WeightInfo = ();
}

/// Genesis used by most tests: sale open, transfers open, no bonus scaling by decimals.
pub fn default_genesis() -> pallet_migratable_token::GenesisConfig<Test> {
    pallet_migratable_token::GenesisConfig::<Test> {
        issuer: Some(ISSUER),
        token_name: b"Test Token".to_vec(),
        token_symbol: b"TST".to_vec(),
        decimals: 0,
        total_supply: TOTAL_SUPPLY,
        supply_for_sale: SALE_SUPPLY,
        currency_per_payment_unit: 300,
        units_per_currency: 100,
        bonus_threshold: 500,
        bonus_amount: 100,
        sale_enabled: true,
        transfers_enabled: true,
    }
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> sp_io::TestExternalities {
    ext_with(default_genesis())
}

pub fn ext_with(genesis: pallet_migratable_token::GenesisConfig<Test>) -> sp_io::TestExternalities {
    CREDITS.with(|c| c.borrow_mut().clear());
    REJECTED_ACCOUNT.with(|r| *r.borrow_mut() = None);

    let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

    pallet_balances::GenesisConfig::<Test> {
        balances: vec![
            (ALICE, NATIVE_ENDOWMENT),
            (BOB, NATIVE_ENDOWMENT),
            (CHARLIE, NATIVE_ENDOWMENT),
        ],
        ..Default::default()
    }
    .assimilate_storage(&mut t)
    .unwrap();

    genesis.assimilate_storage(&mut t).unwrap();

    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| System::set_block_number(1));
    ext
}
