//! Weights for pallet-migratable-token.
//!
//! Placeholder figures until the benchmarks in `benchmarking.rs` are run against
//! reference hardware. Storage access counts match the dispatchable bodies.
//!
//! `migrate` and `migrate_batch` cover this pallet's side only; the successor
//! ledger's `credit_weight` is added per migrated account at dispatch.

use frame_support::{traits::Get, weights::{constants::RocksDbWeight, Weight}};

/// Weight functions needed for pallet-migratable-token.
pub trait WeightInfo {
    fn transfer() -> Weight;
    fn transfer_from() -> Weight;
    fn approve() -> Weight;
    fn buy() -> Weight;
    fn admin_transfer() -> Weight;
    fn set_migration_target() -> Weight;
    fn migrate() -> Weight;
    fn migrate_batch(n: u32) -> Weight;
    fn set_sale_enabled() -> Weight;
    fn set_transfers_enabled() -> Weight;
    fn set_sale_rates() -> Weight;
    fn set_bonus() -> Weight;
}

// For backwards compatibility and tests.
impl WeightInfo for () {
    // Reads: TransfersEnabled, Balances (2), IsHolder. Writes: Balances (2), Holders, IsHolder, HolderCount.
    fn transfer() -> Weight {
        Weight::from_parts(25_000_000, 3_600)
            .saturating_add(RocksDbWeight::get().reads(5))
            .saturating_add(RocksDbWeight::get().writes(5))
    }
    fn transfer_from() -> Weight {
        Weight::from_parts(32_000_000, 3_600)
            .saturating_add(RocksDbWeight::get().reads(6))
            .saturating_add(RocksDbWeight::get().writes(6))
    }
    fn approve() -> Weight {
        Weight::from_parts(15_000_000, 3_600)
            .saturating_add(RocksDbWeight::get().writes(1))
    }
    // Includes the native currency transfer of the payment.
    fn buy() -> Weight {
        Weight::from_parts(60_000_000, 6_200)
            .saturating_add(RocksDbWeight::get().reads(11))
            .saturating_add(RocksDbWeight::get().writes(9))
    }
    fn admin_transfer() -> Weight {
        Weight::from_parts(30_000_000, 3_600)
            .saturating_add(RocksDbWeight::get().reads(7))
            .saturating_add(RocksDbWeight::get().writes(6))
    }
    fn set_migration_target() -> Weight {
        Weight::from_parts(10_000_000, 1_500)
            .saturating_add(RocksDbWeight::get().reads(1))
            .saturating_add(RocksDbWeight::get().writes(1))
    }
    fn migrate() -> Weight {
        Weight::from_parts(30_000_000, 3_600)
            .saturating_add(RocksDbWeight::get().reads(3))
            .saturating_add(RocksDbWeight::get().writes(2))
    }
    /// The range of component `n` is `[1, MaxMigrationBatch]`.
    fn migrate_batch(n: u32) -> Weight {
        Weight::from_parts(12_000_000, 1_500)
            .saturating_add(Weight::from_parts(28_000_000, 2_600).saturating_mul(n.into()))
            .saturating_add(RocksDbWeight::get().reads(3))
            .saturating_add(RocksDbWeight::get().reads((2_u64).saturating_mul(n.into())))
            .saturating_add(RocksDbWeight::get().writes(2))
            .saturating_add(RocksDbWeight::get().writes((1_u64).saturating_mul(n.into())))
    }
    fn set_sale_enabled() -> Weight {
        Weight::from_parts(8_000_000, 0).saturating_add(RocksDbWeight::get().writes(1))
    }
    fn set_transfers_enabled() -> Weight {
        Weight::from_parts(8_000_000, 0).saturating_add(RocksDbWeight::get().writes(1))
    }
    fn set_sale_rates() -> Weight {
        Weight::from_parts(9_000_000, 1_600)
            .saturating_add(RocksDbWeight::get().reads(1))
            .saturating_add(RocksDbWeight::get().writes(1))
    }
    fn set_bonus() -> Weight {
        Weight::from_parts(9_000_000, 1_600)
            .saturating_add(RocksDbWeight::get().reads(1))
            .saturating_add(RocksDbWeight::get().writes(1))
    }
}
