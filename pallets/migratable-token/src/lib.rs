#![cfg_attr(not(feature = "std"), no_std)]
// Storage getters are deprecated upstream but still the simplest read API for runtime callers.
#![allow(deprecated)]

//! Fixed-supply fungible token ledger.
//!
//! The whole supply is minted to an issuer account at genesis. From there value
//! moves by direct and delegated transfers, by primary-sale purchases priced from
//! administrator-set rates, and by administrator assignments. Every account that
//! ever receives value is recorded once in an insertion-ordered holder registry,
//! which lets the ledger be drained into a successor ledger either one account at
//! a time (`migrate`) or in bounded administrator batches (`migrate_batch`) that
//! resume from a persistent cursor.
//!
//! Every dispatchable runs inside a storage transaction: a failing call leaves no
//! state change and no event behind.

use frame_support::{
    dispatch::DispatchResult,
    ensure,
    pallet_prelude::*,
    traits::{Currency, EnsureOrigin, ExistenceRequirement},
    PalletId,
};
use frame_system::{ensure_signed, pallet_prelude::*};
use sp_runtime::traits::{AccountIdConversion, TrailingZeroInput, Zero};
use sp_std::prelude::*;

pub use pallet::*;
pub use pricing::SalePricing;
pub use weights::WeightInfo;

pub mod arithmetic;
pub mod migrations;
pub mod pricing;
pub mod weights;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

use arithmetic::{add, sub};

/// The current storage version.
const STORAGE_VERSION: StorageVersion = StorageVersion::new(1);

pub(crate) const LOG_TARGET: &str = "pallet-migratable-token";

/// Ledger that takes over balances migrated away from this pallet.
///
/// `successor` is the migration target configured on-chain; implementations route
/// the credit to whatever that account designates. An `Err` aborts the migrating
/// call as a whole.
pub trait SuccessorLedger<AccountId> {
    fn credit(successor: &AccountId, account: &AccountId, amount: u128) -> DispatchResult;

    /// Upper bound on the weight of one `credit` call. Charged on top of the
    /// pallet's own weight, once per migrated account.
    fn credit_weight() -> Weight;
}

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Origin allowed to run administrative calls.
        type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

        /// Currency sale payments are made in. Payments go to the issuer.
        type Currency: Currency<Self::AccountId, Balance = u128>;

        /// Receiver of migrated balances.
        type Successor: SuccessorLedger<Self::AccountId>;

        /// Identifier the ledger's own account is derived from.
        #[pallet::constant]
        type PalletId: Get<PalletId>;

        /// Smallest payment units per whole payment unit.
        #[pallet::constant]
        type PaymentUnit: Get<u128>;

        /// Largest number of holders one `migrate_batch` call may process.
        #[pallet::constant]
        type MaxMigrationBatch: Get<u32>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    #[pallet::storage_version(STORAGE_VERSION)]
    pub struct Pallet<T>(_);

    /// Token name
    #[pallet::storage]
    #[pallet::getter(fn token_name)]
    pub type TokenName<T> = StorageValue<_, BoundedVec<u8, ConstU32<64>>, ValueQuery>;

    /// Token symbol
    #[pallet::storage]
    #[pallet::getter(fn token_symbol)]
    pub type TokenSymbol<T> = StorageValue<_, BoundedVec<u8, ConstU32<16>>, ValueQuery>;

    /// Token decimals; sale quotes are scaled by `10^decimals`.
    #[pallet::storage]
    #[pallet::getter(fn decimals)]
    pub type Decimals<T> = StorageValue<_, u8, ValueQuery>;

    /// Total token supply. Only migrations reduce it.
    #[pallet::storage]
    #[pallet::getter(fn total_supply)]
    pub type TotalSupply<T> = StorageValue<_, u128, ValueQuery>;

    /// Part of the issuer's holdings still earmarked for the primary sale.
    #[pallet::storage]
    #[pallet::getter(fn supply_for_sale)]
    pub type SupplyForSale<T> = StorageValue<_, u128, ValueQuery>;

    /// Account balances
    #[pallet::storage]
    #[pallet::getter(fn balance_of)]
    pub type Balances<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, u128, ValueQuery>;

    /// Remaining delegated spending limit, keyed by (owner, spender).
    #[pallet::storage]
    #[pallet::getter(fn allowance)]
    pub type Allowances<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        T::AccountId,
        u128,
        ValueQuery,
    >;

    /// Account the genesis supply was minted to; sales and admin assignments draw from it.
    #[pallet::storage]
    #[pallet::getter(fn issuer)]
    pub type Issuer<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    #[pallet::storage]
    #[pallet::getter(fn sale_enabled)]
    pub type SaleEnabled<T> = StorageValue<_, bool, ValueQuery>;

    #[pallet::storage]
    #[pallet::getter(fn transfers_enabled)]
    pub type TransfersEnabled<T> = StorageValue<_, bool, ValueQuery>;

    /// Sale rates and bonus parameters.
    #[pallet::storage]
    #[pallet::getter(fn sale_pricing)]
    pub type Pricing<T> = StorageValue<_, SalePricing, ValueQuery>;

    /// Holder registry, in first-credit order.
    #[pallet::storage]
    #[pallet::getter(fn holder_at)]
    pub type Holders<T: Config> = StorageMap<_, Twox64Concat, u32, T::AccountId, OptionQuery>;

    /// Number of entries in `Holders`.
    #[pallet::storage]
    #[pallet::getter(fn holder_count)]
    pub type HolderCount<T> = StorageValue<_, u32, ValueQuery>;

    /// Membership set mirroring `Holders`.
    #[pallet::storage]
    #[pallet::getter(fn is_holder)]
    pub type IsHolder<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, bool, ValueQuery>;

    /// Successor ledger account. Once set it is never cleared.
    #[pallet::storage]
    #[pallet::getter(fn migration_target)]
    pub type MigrationTarget<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// Index of the next registry entry `migrate_batch` will process.
    #[pallet::storage]
    #[pallet::getter(fn migration_cursor)]
    pub type MigrationCursor<T> = StorageValue<_, u32, ValueQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// Tokens moved from one account to another
        Transferred { from: T::AccountId, to: T::AccountId, amount: u128 },
        /// Delegated spending limit set
        Approved { owner: T::AccountId, spender: T::AccountId, amount: u128 },
        /// Balance handed over to the successor ledger
        Migrated { account: T::AccountId, amount: u128 },
        /// Successor ledger configured
        MigrationTargetSet { target: T::AccountId },
        /// Registry entries `start..end` migrated
        MigrationBatchProcessed { start: u32, end: u32 },
        SaleToggled { enabled: bool },
        TransfersToggled { enabled: bool },
        SaleRatesUpdated { currency_per_payment_unit: u128, units_per_currency: u128 },
        BonusUpdated { threshold: u128, amount: u128 },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Sender balance is lower than the amount moved.
        InsufficientBalance,
        /// Spender allowance is lower than the amount moved.
        AllowanceExceeded,
        /// Recipient is the null account or the ledger itself, or the issuer is buying from itself.
        InvalidRecipient,
        TransfersDisabled,
        /// Neither the sale nor migration is open.
        SaleNotActive,
        /// Purchase or assignment exceeds the supply left for sale.
        SaleSupplyExhausted,
        MigrationNotConfigured,
        /// Batch count is zero or above `MaxMigrationBatch`.
        InvalidBatchSize,
        IssuerNotSet,
    }

    #[pallet::hooks]
    impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
        #[cfg(feature = "try-runtime")]
        fn try_state(_n: BlockNumberFor<T>) -> Result<(), sp_runtime::TryRuntimeError> {
            Self::do_try_state()
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::transfer())]
        pub fn transfer(origin: OriginFor<T>, to: T::AccountId, amount: u128) -> DispatchResult {
            let from = ensure_signed(origin)?;
            ensure!(Self::transfers_enabled(), Error::<T>::TransfersDisabled);
            Self::ensure_valid_recipient(&to)?;
            Self::do_transfer(&from, &to, amount)
        }

        /// Move `amount` from `from` to `to`, spending the caller's allowance.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::transfer_from())]
        pub fn transfer_from(
            origin: OriginFor<T>,
            from: T::AccountId,
            to: T::AccountId,
            amount: u128,
        ) -> DispatchResult {
            let spender = ensure_signed(origin)?;
            ensure!(Self::transfers_enabled(), Error::<T>::TransfersDisabled);
            Self::ensure_valid_recipient(&to)?;

            Allowances::<T>::try_mutate(&from, &spender, |remaining| -> DispatchResult {
                *remaining = sub(*remaining, amount).map_err(|_| Error::<T>::AllowanceExceeded)?;
                Ok(())
            })?;
            Self::do_transfer(&from, &to, amount)
        }

        /// Set the caller's allowance for `spender` to exactly `amount`.
        ///
        /// This overwrites rather than adjusts the previous value. A spender watching
        /// the chain can spend the old allowance before a replacement lands and then
        /// spend the new one too; owners lowering a non-zero allowance should set it
        /// to zero first.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::approve())]
        pub fn approve(origin: OriginFor<T>, spender: T::AccountId, amount: u128) -> DispatchResult {
            let owner = ensure_signed(origin)?;
            Allowances::<T>::insert(&owner, &spender, amount);
            Self::deposit_event(Event::Approved { owner, spender, amount });
            Ok(())
        }

        /// Pay `payment` to buy tokens from the issuer.
        ///
        /// With the sale closed but a migration target set, this migrates the caller's
        /// balance instead and takes no payment.
        #[pallet::call_index(3)]
        #[pallet::weight(
            T::WeightInfo::buy()
                .max(T::WeightInfo::migrate().saturating_add(T::Successor::credit_weight()))
        )]
        pub fn buy(origin: OriginFor<T>, payment: u128) -> DispatchResult {
            let buyer = ensure_signed(origin)?;
            if Self::sale_enabled() {
                Self::do_purchase(&buyer, payment)
            } else if let Some(successor) = Self::migration_target() {
                Self::migrate_account(&successor, &buyer).map(|_| ())
            } else {
                Err(Error::<T>::SaleNotActive.into())
            }
        }

        /// Assign `amount` from the issuer to `to`.
        ///
        /// While the sale is open the assignment is taken out of the sale supply;
        /// otherwise it comes from the reserved part of the issuer's holdings.
        #[pallet::call_index(4)]
        #[pallet::weight(T::WeightInfo::admin_transfer())]
        pub fn admin_transfer(
            origin: OriginFor<T>,
            to: T::AccountId,
            amount: u128,
        ) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            Self::ensure_valid_recipient(&to)?;
            let issuer = Self::issuer().ok_or(Error::<T>::IssuerNotSet)?;
            if Self::sale_enabled() {
                Self::consume_sale_supply(amount)?;
            }
            Self::do_transfer(&issuer, &to, amount)
        }

        #[pallet::call_index(5)]
        #[pallet::weight(T::WeightInfo::set_migration_target())]
        pub fn set_migration_target(origin: OriginFor<T>, target: T::AccountId) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            if let Some(previous) = Self::migration_target() {
                log::warn!(
                    target: LOG_TARGET,
                    "Replacing migration target {previous:?} with {target:?}"
                );
            }
            MigrationTarget::<T>::put(&target);
            log::info!(target: LOG_TARGET, "Migration target set to {target:?}");
            Self::deposit_event(Event::MigrationTargetSet { target });
            Ok(())
        }

        /// Hand the caller's whole balance over to the successor ledger.
        #[pallet::call_index(6)]
        #[pallet::weight(T::WeightInfo::migrate().saturating_add(T::Successor::credit_weight()))]
        pub fn migrate(origin: OriginFor<T>) -> DispatchResult {
            let who = ensure_signed(origin)?;
            let successor = Self::migration_target().ok_or(Error::<T>::MigrationNotConfigured)?;
            Self::migrate_account(&successor, &who).map(|_| ())
        }

        /// Migrate the next `count` registry entries, resuming from the cursor.
        ///
        /// The cursor stops at the end of the registry; a call with nothing left to
        /// process succeeds without effect. Holders already migrated are credited
        /// zero again, so overlapping runs are harmless.
        #[pallet::call_index(7)]
        #[pallet::weight(
            T::WeightInfo::migrate_batch(*count)
                .saturating_add(T::Successor::credit_weight().saturating_mul(u64::from(*count)))
        )]
        pub fn migrate_batch(origin: OriginFor<T>, count: u32) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            ensure!(
                count > 0 && count <= T::MaxMigrationBatch::get(),
                Error::<T>::InvalidBatchSize
            );
            let successor = Self::migration_target().ok_or(Error::<T>::MigrationNotConfigured)?;

            let start = Self::migration_cursor();
            let end = Self::holder_count().min(start.saturating_add(count));
            MigrationCursor::<T>::put(end);

            for index in start..end {
                let holder = Holders::<T>::get(index).ok_or(DispatchError::Corruption)?;
                Self::migrate_account(&successor, &holder)?;
            }

            log::info!(
                target: LOG_TARGET,
                "Migrated holders {start}..{end} of {}",
                Self::holder_count()
            );
            Self::deposit_event(Event::MigrationBatchProcessed { start, end });
            Ok(())
        }

        #[pallet::call_index(8)]
        #[pallet::weight(T::WeightInfo::set_sale_enabled())]
        pub fn set_sale_enabled(origin: OriginFor<T>, enabled: bool) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            SaleEnabled::<T>::put(enabled);
            log::info!(target: LOG_TARGET, "Sale enabled: {enabled}");
            Self::deposit_event(Event::SaleToggled { enabled });
            Ok(())
        }

        #[pallet::call_index(9)]
        #[pallet::weight(T::WeightInfo::set_transfers_enabled())]
        pub fn set_transfers_enabled(origin: OriginFor<T>, enabled: bool) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            TransfersEnabled::<T>::put(enabled);
            log::info!(target: LOG_TARGET, "Transfers enabled: {enabled}");
            Self::deposit_event(Event::TransfersToggled { enabled });
            Ok(())
        }

        #[pallet::call_index(10)]
        #[pallet::weight(T::WeightInfo::set_sale_rates())]
        pub fn set_sale_rates(
            origin: OriginFor<T>,
            currency_per_payment_unit: u128,
            units_per_currency: u128,
        ) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            Pricing::<T>::mutate(|pricing| {
                pricing.currency_per_payment_unit = currency_per_payment_unit;
                pricing.units_per_currency = units_per_currency;
            });
            Self::deposit_event(Event::SaleRatesUpdated {
                currency_per_payment_unit,
                units_per_currency,
            });
            Ok(())
        }

        #[pallet::call_index(11)]
        #[pallet::weight(T::WeightInfo::set_bonus())]
        pub fn set_bonus(origin: OriginFor<T>, threshold: u128, amount: u128) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            Pricing::<T>::mutate(|pricing| {
                pricing.bonus_threshold = threshold;
                pricing.bonus_amount = amount;
            });
            Self::deposit_event(Event::BonusUpdated { threshold, amount });
            Ok(())
        }
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        /// Account receiving the whole supply
        pub issuer: Option<T::AccountId>,
        /// Token name
        pub token_name: Vec<u8>,
        /// Token symbol
        pub token_symbol: Vec<u8>,
        /// Token decimals
        pub decimals: u8,
        pub total_supply: u128,
        /// Part of the supply offered in the primary sale
        pub supply_for_sale: u128,
        pub currency_per_payment_unit: u128,
        pub units_per_currency: u128,
        pub bonus_threshold: u128,
        pub bonus_amount: u128,
        pub sale_enabled: bool,
        pub transfers_enabled: bool,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            let name: BoundedVec<u8, ConstU32<64>> =
                self.token_name.clone().try_into().expect("Token name too long (max 64 bytes)");
            TokenName::<T>::put(name);

            let symbol: BoundedVec<u8, ConstU32<16>> =
                self.token_symbol.clone().try_into().expect("Token symbol too long (max 16 bytes)");
            TokenSymbol::<T>::put(symbol);

            Decimals::<T>::put(self.decimals);

            assert!(
                self.supply_for_sale <= self.total_supply,
                "Sale supply cannot exceed total supply"
            );
            match self.issuer {
                Some(ref issuer) => {
                    Balances::<T>::insert(issuer, self.total_supply);
                    Issuer::<T>::put(issuer);
                    Pallet::<T>::register_if_new(issuer)
                        .expect("Registry is empty at genesis; qed");
                },
                None => assert!(self.total_supply == 0, "A non-zero supply needs an issuer"),
            }
            TotalSupply::<T>::put(self.total_supply);
            SupplyForSale::<T>::put(self.supply_for_sale);

            Pricing::<T>::put(SalePricing {
                currency_per_payment_unit: self.currency_per_payment_unit,
                units_per_currency: self.units_per_currency,
                bonus_threshold: self.bonus_threshold,
                bonus_amount: self.bonus_amount,
            });
            SaleEnabled::<T>::put(self.sale_enabled);
            TransfersEnabled::<T>::put(self.transfers_enabled);
        }
    }
}

impl<T: Config> Pallet<T> {
    /// The ledger's own account.
    pub fn account_id() -> T::AccountId {
        T::PalletId::get().into_account_truncating()
    }

    /// Every registered holder, in registration order.
    pub fn holders() -> Vec<T::AccountId> {
        (0..HolderCount::<T>::get()).filter_map(Holders::<T>::get).collect()
    }

    /// Ledger units `payment` would buy right now, bonus included.
    pub fn quote(payment: u128) -> Result<u128, DispatchError> {
        let multiplier = pricing::decimals_multiplier(Self::decimals())?;
        Ok(Self::sale_pricing().quote(payment, multiplier, T::PaymentUnit::get())?)
    }

    /// Append `who` to the holder registry unless it is already there.
    ///
    /// Returns whether a new entry was created.
    pub fn register_if_new(who: &T::AccountId) -> Result<bool, DispatchError> {
        if IsHolder::<T>::get(who) {
            return Ok(false);
        }
        let index = HolderCount::<T>::get();
        let next = add(index, 1)?;
        Holders::<T>::insert(index, who);
        IsHolder::<T>::insert(who, true);
        HolderCount::<T>::put(next);
        Ok(true)
    }

    fn ensure_valid_recipient(to: &T::AccountId) -> DispatchResult {
        ensure!(*to != Self::account_id(), Error::<T>::InvalidRecipient);
        let null = T::AccountId::decode(&mut TrailingZeroInput::zeroes()).ok();
        ensure!(null.as_ref() != Some(to), Error::<T>::InvalidRecipient);
        Ok(())
    }

    /// Debit `from`, credit `to` and register `to` when it receives value.
    fn do_transfer(from: &T::AccountId, to: &T::AccountId, amount: u128) -> DispatchResult {
        let debited =
            sub(Self::balance_of(from), amount).map_err(|_| Error::<T>::InsufficientBalance)?;
        Balances::<T>::insert(from, debited);
        let credited = add(Self::balance_of(to), amount)?;
        Balances::<T>::insert(to, credited);

        if !amount.is_zero() {
            Self::register_if_new(to)?;
        }

        Self::deposit_event(Event::Transferred { from: from.clone(), to: to.clone(), amount });
        Ok(())
    }

    fn consume_sale_supply(amount: u128) -> DispatchResult {
        SupplyForSale::<T>::try_mutate(|left| -> DispatchResult {
            *left = sub(*left, amount).map_err(|_| Error::<T>::SaleSupplyExhausted)?;
            Ok(())
        })
    }

    fn do_purchase(buyer: &T::AccountId, payment: u128) -> DispatchResult {
        let issuer = Self::issuer().ok_or(Error::<T>::IssuerNotSet)?;
        ensure!(*buyer != issuer, Error::<T>::InvalidRecipient);
        let units = Self::quote(payment)?;
        Self::consume_sale_supply(units)?;
        T::Currency::transfer(buyer, &issuer, payment, ExistenceRequirement::AllowDeath)?;
        Self::do_transfer(&issuer, buyer, units)
    }

    /// Zero `who`'s balance, shrink the supply, then credit the successor.
    ///
    /// Local state is final before the successor is called.
    fn migrate_account(successor: &T::AccountId, who: &T::AccountId) -> Result<u128, DispatchError> {
        let amount = Balances::<T>::take(who);
        TotalSupply::<T>::try_mutate(|supply| -> DispatchResult {
            *supply = sub(*supply, amount)?;
            Ok(())
        })?;

        T::Successor::credit(successor, who, amount)?;

        log::debug!(target: LOG_TARGET, "Migrated {amount} from {who:?}");
        Self::deposit_event(Event::Migrated { account: who.clone(), amount });
        Ok(amount)
    }

    /// Check ledger conservation and registry consistency.
    #[cfg(any(feature = "try-runtime", test))]
    pub fn do_try_state() -> Result<(), sp_runtime::TryRuntimeError> {
        let sum = Balances::<T>::iter_values()
            .try_fold(0u128, add)
            .map_err(|_| "Sum of balances overflows")?;
        ensure!(sum == TotalSupply::<T>::get(), "Sum of balances differs from total supply");

        let count = HolderCount::<T>::get();
        for index in 0..count {
            let holder = Holders::<T>::get(index).ok_or("Holder registry has a gap")?;
            ensure!(IsHolder::<T>::get(&holder), "Registered holder missing from membership set");
        }
        ensure!(
            Holders::<T>::iter_keys().count() == count as usize,
            "Holder registry has entries past its length"
        );
        ensure!(
            IsHolder::<T>::iter_values().filter(|member| *member).count() == count as usize,
            "Membership set and registry differ in size"
        );
        ensure!(MigrationCursor::<T>::get() <= count, "Migration cursor past registry end");
        Ok(())
    }
}
