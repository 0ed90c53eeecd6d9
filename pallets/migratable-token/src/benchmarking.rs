//! Benchmarking setup for pallet-migratable-token

use super::*;

#[allow(unused)]
use crate::Pallet as Token;
use frame_benchmarking::v2::*;
use frame_support::traits::Currency;
use frame_system::RawOrigin;

const SEED: u32 = 0;
const SUPPLY: u128 = 1_000_000_000_000;

/// Give the issuer a supply to draw from and open sale and transfers.
fn setup_ledger<T: Config>() -> T::AccountId {
    let issuer: T::AccountId = account("issuer", 0, SEED);
    Balances::<T>::insert(&issuer, SUPPLY);
    TotalSupply::<T>::put(SUPPLY);
    SupplyForSale::<T>::put(SUPPLY);
    Issuer::<T>::put(&issuer);
    let _ = Pallet::<T>::register_if_new(&issuer);
    SaleEnabled::<T>::put(true);
    TransfersEnabled::<T>::put(true);
    issuer
}

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn transfer() {
        let issuer = setup_ledger::<T>();
        let recipient: T::AccountId = account("recipient", 0, SEED);
        let amount: u128 = 1_000_000;

        #[extrinsic_call]
        _(RawOrigin::Signed(issuer), recipient.clone(), amount);

        assert_eq!(Balances::<T>::get(&recipient), amount);
        assert!(IsHolder::<T>::get(&recipient));
    }

    #[benchmark]
    fn transfer_from() {
        let issuer = setup_ledger::<T>();
        let spender: T::AccountId = whitelisted_caller();
        let recipient: T::AccountId = account("recipient", 0, SEED);
        let amount: u128 = 1_000_000;
        Allowances::<T>::insert(&issuer, &spender, amount);

        #[extrinsic_call]
        _(RawOrigin::Signed(spender.clone()), issuer.clone(), recipient.clone(), amount);

        assert_eq!(Balances::<T>::get(&recipient), amount);
        assert_eq!(Allowances::<T>::get(&issuer, &spender), 0);
    }

    #[benchmark]
    fn approve() {
        let owner: T::AccountId = whitelisted_caller();
        let spender: T::AccountId = account("spender", 0, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner.clone()), spender.clone(), 1_000);

        assert_eq!(Allowances::<T>::get(&owner, &spender), 1_000);
    }

    #[benchmark]
    fn buy() {
        setup_ledger::<T>();
        Pricing::<T>::put(SalePricing {
            currency_per_payment_unit: 1,
            units_per_currency: 1,
            bonus_threshold: 1,
            bonus_amount: 1,
        });
        let buyer: T::AccountId = whitelisted_caller();
        let payment = T::PaymentUnit::get();
        let funds = T::Currency::minimum_balance().saturating_mul(1_000).saturating_add(payment);
        T::Currency::make_free_balance_be(&buyer, funds);

        #[extrinsic_call]
        _(RawOrigin::Signed(buyer.clone()), payment);

        assert!(Balances::<T>::get(&buyer) > 0);
        assert!(IsHolder::<T>::get(&buyer));
    }

    #[benchmark]
    fn admin_transfer() {
        setup_ledger::<T>();
        let recipient: T::AccountId = account("recipient", 0, SEED);
        let origin = T::AdminOrigin::try_successful_origin().expect("Admin origin");

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, recipient.clone(), 1_000);

        assert_eq!(Balances::<T>::get(&recipient), 1_000);
    }

    #[benchmark]
    fn set_migration_target() {
        let target: T::AccountId = account("successor", 0, SEED);
        let origin = T::AdminOrigin::try_successful_origin().expect("Admin origin");

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, target.clone());

        assert_eq!(MigrationTarget::<T>::get(), Some(target));
    }

    #[benchmark]
    fn migrate() {
        let issuer = setup_ledger::<T>();
        MigrationTarget::<T>::put(account::<T::AccountId>("successor", 0, SEED));

        #[extrinsic_call]
        _(RawOrigin::Signed(issuer.clone()));

        assert_eq!(Balances::<T>::get(&issuer), 0);
        assert_eq!(TotalSupply::<T>::get(), 0);
    }

    #[benchmark]
    fn migrate_batch(n: Linear<1, { T::MaxMigrationBatch::get() }>) {
        let issuer = setup_ledger::<T>();
        // Start the sweep at the issuer, after anything registered before.
        let start = HolderCount::<T>::get().saturating_sub(1);
        MigrationCursor::<T>::put(start);
        for i in 1..n {
            let holder: T::AccountId = account("holder", i, SEED);
            Pallet::<T>::do_transfer(&issuer, &holder, 1_000).expect("Issuer holds the supply");
        }
        MigrationTarget::<T>::put(account::<T::AccountId>("successor", 0, SEED));
        let origin = T::AdminOrigin::try_successful_origin().expect("Admin origin");

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, n);

        assert_eq!(MigrationCursor::<T>::get(), start + n);
        assert_eq!(Balances::<T>::get(&issuer), 0);
    }

    #[benchmark]
    fn set_sale_enabled() {
        let origin = T::AdminOrigin::try_successful_origin().expect("Admin origin");

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, true);

        assert!(SaleEnabled::<T>::get());
    }

    #[benchmark]
    fn set_transfers_enabled() {
        let origin = T::AdminOrigin::try_successful_origin().expect("Admin origin");

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, true);

        assert!(TransfersEnabled::<T>::get());
    }

    #[benchmark]
    fn set_sale_rates() {
        let origin = T::AdminOrigin::try_successful_origin().expect("Admin origin");

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, 300, 100);

        assert_eq!(Pricing::<T>::get().units_per_currency, 100);
    }

    #[benchmark]
    fn set_bonus() {
        let origin = T::AdminOrigin::try_successful_origin().expect("Admin origin");

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, 500, 100);

        assert_eq!(Pricing::<T>::get().bonus_amount, 100);
    }

    impl_benchmark_test_suite!(Token, crate::mock::new_test_ext(), crate::mock::Test);
}
