//! Storage migrations for pallet-migratable-token.
//!
//! These are runtime-upgrade migrations of this pallet's own storage layout, not
//! the balance migration to a successor ledger.
//!
//! # Versions
//!
//! - **v0**: balances, allowances and sale state only.
//! - **v1**: adds the holder registry (`Holders`, `HolderCount`, `IsHolder`) and
//!   the migration cursor. [`v1::MigrateToV1`] backfills the registry from every
//!   account holding a non-zero balance.
//!
//! Wire a migration into the runtime's `Executive` migration tuple:
//!
//! ```ignore
//! pub type Migrations = (pallet_migratable_token::migrations::v1::MigrateToV1<Runtime>,);
//! ```
//!
//! Each migration is gated on the on-chain storage version, so running it twice
//! is harmless.

use frame_support::{pallet_prelude::*, traits::OnRuntimeUpgrade};
use sp_runtime::traits::Zero;
use sp_std::marker::PhantomData;

use crate::{Balances, Config, Pallet, LOG_TARGET};

pub mod v1 {
    use super::*;

    /// Registers every current balance holder that the registry does not know yet.
    ///
    /// Existing registry entries keep their positions; backfilled holders are
    /// appended in storage iteration order. The cursor is left untouched.
    pub struct MigrateToV1<T>(PhantomData<T>);

    impl<T: Config> OnRuntimeUpgrade for MigrateToV1<T> {
        fn on_runtime_upgrade() -> Weight {
            let on_chain_version = Pallet::<T>::on_chain_storage_version();

            if on_chain_version >= 1 {
                log::info!(
                    target: LOG_TARGET,
                    "Storage already at v{on_chain_version:?}, skipping v1 migration"
                );
                return T::DbWeight::get().reads(1);
            }

            let mut reads: u64 = 1;
            let mut registered: u64 = 0;
            for (account, balance) in Balances::<T>::iter() {
                reads = reads.saturating_add(1);
                if balance.is_zero() {
                    continue;
                }
                reads = reads.saturating_add(2);
                match Pallet::<T>::register_if_new(&account) {
                    Ok(true) => registered = registered.saturating_add(1),
                    Ok(false) => {},
                    Err(e) => {
                        log::error!(
                            target: LOG_TARGET,
                            "Holder registry full while backfilling {account:?}: {e:?}"
                        );
                        break;
                    },
                }
            }

            StorageVersion::new(1).put::<Pallet<T>>();
            log::info!(
                target: LOG_TARGET,
                "Migrated storage v0 → v1, registered {registered} holders"
            );

            // Three writes per new holder plus the version bump.
            T::DbWeight::get().reads_writes(reads, registered.saturating_mul(3).saturating_add(1))
        }

        #[cfg(feature = "try-runtime")]
        fn pre_upgrade() -> Result<sp_std::vec::Vec<u8>, sp_runtime::TryRuntimeError> {
            let on_chain_version = Pallet::<T>::on_chain_storage_version();
            let holders = Pallet::<T>::holder_count();
            log::info!(
                target: LOG_TARGET,
                "Pre-upgrade: storage version {on_chain_version:?}, {holders} registered holders"
            );
            Ok((on_chain_version, holders).encode())
        }

        #[cfg(feature = "try-runtime")]
        fn post_upgrade(state: sp_std::vec::Vec<u8>) -> Result<(), sp_runtime::TryRuntimeError> {
            let (pre_version, pre_holders): (StorageVersion, u32) =
                Decode::decode(&mut &state[..])
                    .map_err(|_| sp_runtime::TryRuntimeError::Other("Failed to decode pre-state"))?;

            ensure!(
                Pallet::<T>::on_chain_storage_version() >= 1,
                sp_runtime::TryRuntimeError::Other("Migration to v1 did not complete")
            );
            ensure!(
                Pallet::<T>::holder_count() >= pre_holders,
                sp_runtime::TryRuntimeError::Other("Holder registry shrank")
            );
            if pre_version < 1 {
                for (account, balance) in Balances::<T>::iter() {
                    ensure!(
                        balance.is_zero() || Pallet::<T>::is_holder(&account),
                        sp_runtime::TryRuntimeError::Other("Balance holder missing from registry")
                    );
                }
            }
            Pallet::<T>::do_try_state()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mock::{new_test_ext, Test, ALICE, BOB, ISSUER},
        HolderCount, Holders, IsHolder,
    };

    /// Wipe the registry to mimic a v0 ledger that predates it.
    fn drop_registry() {
        let _ = Holders::<Test>::clear(u32::MAX, None);
        let _ = IsHolder::<Test>::clear(u32::MAX, None);
        HolderCount::<Test>::kill();
        StorageVersion::new(0).put::<Pallet<Test>>();
    }

    #[test]
    fn migration_v1_backfills_registry_from_balances() {
        new_test_ext().execute_with(|| {
            Balances::<Test>::insert(ALICE, 10);
            Balances::<Test>::insert(BOB, 20);
            drop_registry();
            assert_eq!(Pallet::<Test>::holder_count(), 0);

            v1::MigrateToV1::<Test>::on_runtime_upgrade();

            assert_eq!(Pallet::<Test>::on_chain_storage_version(), 1);
            assert_eq!(Pallet::<Test>::holder_count(), 3);
            let mut holders = Pallet::<Test>::holders();
            holders.sort();
            assert_eq!(holders, vec![ISSUER, ALICE, BOB]);
            assert!(Pallet::<Test>::is_holder(ALICE));
        });
    }

    #[test]
    fn migration_v1_skips_zero_balances() {
        new_test_ext().execute_with(|| {
            Balances::<Test>::insert(ALICE, 0);
            drop_registry();

            v1::MigrateToV1::<Test>::on_runtime_upgrade();

            assert_eq!(Pallet::<Test>::holders(), vec![ISSUER]);
            assert!(!Pallet::<Test>::is_holder(ALICE));
        });
    }

    #[test]
    fn migration_v1_keeps_existing_entries_in_place() {
        new_test_ext().execute_with(|| {
            // Registry already holds the issuer at index 0.
            Balances::<Test>::insert(ALICE, 10);
            StorageVersion::new(0).put::<Pallet<Test>>();

            v1::MigrateToV1::<Test>::on_runtime_upgrade();

            assert_eq!(Pallet::<Test>::holder_at(0), Some(ISSUER));
            assert_eq!(Pallet::<Test>::holder_at(1), Some(ALICE));
            assert_eq!(Pallet::<Test>::holder_count(), 2);
        });
    }

    #[test]
    fn migration_v1_idempotent() {
        new_test_ext().execute_with(|| {
            Balances::<Test>::insert(ALICE, 10);
            drop_registry();

            v1::MigrateToV1::<Test>::on_runtime_upgrade();
            assert_eq!(Pallet::<Test>::holder_count(), 2);

            // A second run sees v1 and leaves the registry alone.
            Balances::<Test>::insert(BOB, 10);
            v1::MigrateToV1::<Test>::on_runtime_upgrade();
            assert_eq!(Pallet::<Test>::holder_count(), 2);
            assert_eq!(Pallet::<Test>::on_chain_storage_version(), 1);
        });
    }

    #[test]
    fn migration_v1_skipped_on_higher_version() {
        new_test_ext().execute_with(|| {
            drop_registry();
            StorageVersion::new(5).put::<Pallet<Test>>();

            v1::MigrateToV1::<Test>::on_runtime_upgrade();

            assert_eq!(Pallet::<Test>::on_chain_storage_version(), 5);
            assert_eq!(Pallet::<Test>::holder_count(), 0);
        });
    }
}
