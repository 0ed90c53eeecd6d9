//! Primary-sale pricing.
//!
//! A payment is first valued in the rate currency (`currency_per_payment_unit`),
//! then converted to ledger units (`units_per_currency`, scaled by the token's
//! decimals). Purchases whose ledger-unit value reaches the bonus threshold get
//! the whole bonus added on top; there is no proration below the threshold.

use codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use sp_runtime::{ArithmeticError, RuntimeDebug};

use crate::arithmetic::{add, div, mul};

/// Administrator-set sale parameters.
#[derive(
    Clone, Copy, Default, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen,
)]
pub struct SalePricing {
    /// Rate-currency value of one whole payment unit.
    pub currency_per_payment_unit: u128,
    /// Whole tokens granted per unit of rate currency.
    pub units_per_currency: u128,
    /// Minimum purchase value, in rate currency, that earns the bonus.
    pub bonus_threshold: u128,
    /// Bonus, in rate currency, granted once the threshold is reached.
    pub bonus_amount: u128,
}

impl SalePricing {
    /// Ledger units bought by `payment` (in smallest payment units).
    ///
    /// `decimals_multiplier` is `10^decimals` of the token and `payment_unit` the
    /// number of smallest payment units per whole payment unit. The multiplications
    /// run left to right before the single division, so intermediate overflow is
    /// reported rather than hidden by an early truncation.
    pub fn quote(
        &self,
        payment: u128,
        decimals_multiplier: u128,
        payment_unit: u128,
    ) -> Result<u128, ArithmeticError> {
        let raw = mul(payment, self.currency_per_payment_unit)?;
        let raw = mul(raw, self.units_per_currency)?;
        let raw = mul(raw, decimals_multiplier)?;
        let raw = div(raw, payment_unit)?;

        let threshold = self.to_ledger_units(self.bonus_threshold, decimals_multiplier)?;
        if raw >= threshold {
            let bonus = self.to_ledger_units(self.bonus_amount, decimals_multiplier)?;
            add(raw, bonus)
        } else {
            Ok(raw)
        }
    }

    fn to_ledger_units(
        &self,
        currency: u128,
        decimals_multiplier: u128,
    ) -> Result<u128, ArithmeticError> {
        mul(mul(currency, self.units_per_currency)?, decimals_multiplier)
    }
}

/// `10^decimals`, failing with `Overflow` when it does not fit in `u128`.
pub fn decimals_multiplier(decimals: u8) -> Result<u128, ArithmeticError> {
    10u128.checked_pow(u32::from(decimals)).ok_or(ArithmeticError::Overflow)
}
