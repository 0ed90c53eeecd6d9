//! Checked arithmetic over fixed-width unsigned integers.
//!
//! Every balance, allowance, supply and pricing step of the pallet goes through
//! these helpers. None of them wrap: a result that does not fit the domain is
//! reported as an [`ArithmeticError`], which converts into a `DispatchError` so
//! callers can simply use `?`.

use sp_runtime::{
    traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Zero},
    ArithmeticError,
};

/// `a + b`, failing with `Overflow` past the domain maximum.
pub fn add<N: CheckedAdd>(a: N, b: N) -> Result<N, ArithmeticError> {
    a.checked_add(&b).ok_or(ArithmeticError::Overflow)
}

/// `a - b`, failing with `Underflow` when `b > a`.
pub fn sub<N: CheckedSub>(a: N, b: N) -> Result<N, ArithmeticError> {
    a.checked_sub(&b).ok_or(ArithmeticError::Underflow)
}

/// `a * b`, failing with `Overflow` past the domain maximum.
pub fn mul<N: CheckedMul>(a: N, b: N) -> Result<N, ArithmeticError> {
    a.checked_mul(&b).ok_or(ArithmeticError::Overflow)
}

/// `a / b` truncated toward zero, failing with `DivisionByZero` when `b == 0`.
pub fn div<N: CheckedDiv + Zero>(a: N, b: N) -> Result<N, ArithmeticError> {
    if b.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    a.checked_div(&b).ok_or(ArithmeticError::DivisionByZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reports_overflow() {
        assert_eq!(add(1u128, 2), Ok(3));
        assert_eq!(add(u128::MAX, 0), Ok(u128::MAX));
        assert_eq!(add(u128::MAX, 1), Err(ArithmeticError::Overflow));
        assert_eq!(add(u32::MAX - 1, 2), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn sub_reports_underflow() {
        assert_eq!(sub(10u128, 10), Ok(0));
        assert_eq!(sub(10u128, 3), Ok(7));
        assert_eq!(sub(3u128, 10), Err(ArithmeticError::Underflow));
        assert_eq!(sub(0u32, 1), Err(ArithmeticError::Underflow));
    }

    #[test]
    fn mul_reports_overflow() {
        assert_eq!(mul(0u128, u128::MAX), Ok(0));
        assert_eq!(mul(u128::MAX, 1), Ok(u128::MAX));
        assert_eq!(mul(u128::MAX / 2 + 1, 2), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn div_truncates_and_rejects_zero_divisor() {
        assert_eq!(div(7u128, 2), Ok(3));
        assert_eq!(div(1u128, 3), Ok(0));
        assert_eq!(div(0u128, 5), Ok(0));
        assert_eq!(div(5u128, 0), Err(ArithmeticError::DivisionByZero));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_add_then_sub_restores(a in any::<u64>(), b in any::<u64>()) {
                let (a, b) = (a as u128, b as u128);
                let sum = add(a, b).unwrap();
                prop_assert_eq!(sub(sum, b), Ok(a));
            }

            #[test]
            fn prop_mul_agrees_with_widening(a in any::<u64>(), b in any::<u64>()) {
                let wide = (a as u128) * (b as u128);
                match mul(a, b) {
                    Ok(product) => prop_assert_eq!(product as u128, wide),
                    Err(e) => {
                        prop_assert_eq!(e, ArithmeticError::Overflow);
                        prop_assert!(wide > u64::MAX as u128);
                    }
                }
            }
        }
    }
}
