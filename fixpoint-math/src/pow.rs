//! §4.2.4 — `Pow` and `PowInt`.

use crate::exp::exp;
use crate::log::log;
use fixpoint_kernel::bits::KernelBits;
use fixpoint_kernel::mul::KernelMul;
use fixpoint_types::{BigInt, Limb};

/// `src ^ exp`, both fixed-point with `shift` fractional bits. Defined as
/// `Exp(Log(src) * exp)`; inherits `Log`'s "non-positive src returns 0"
/// domain handling and `Exp`'s overflow/underflow saturation.
pub fn pow<L: Limb, const N: usize>(src: &BigInt<L, N>, exponent: &BigInt<L, N>, shift: u32) -> BigInt<L, N> {
    let ln_src = log(src, shift);
    let mut scaled = BigInt::ZERO;
    scaled.mul_shr(&ln_src, exponent, shift);
    exp(&scaled, shift)
}

/// `src ^ n` for an integer exponent `n`, by binary exponentiation:
/// `result` accumulates `mul` for each set bit of `n`, squaring `mul` every
/// step.
pub fn pow_int<L: Limb, const N: usize>(src: &BigInt<L, N>, n: u32, shift: u32) -> BigInt<L, N> {
    let mut result = BigInt::ZERO;
    result.set32_shl(1, shift);
    let mut mul = *src;
    let mut remaining = n;
    while remaining != 0 {
        if remaining & 1 != 0 {
            let mut next = BigInt::ZERO;
            next.mul_shr(&result, &mul, shift);
            result = next;
        }
        remaining >>= 1;
        if remaining != 0 {
            let mut squared = BigInt::ZERO;
            squared.mul_shr(&mul, &mul, shift);
            mul = squared;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixpoint_kernel::convert::KernelConvert;

    type Bn256 = BigInt<u64, 4>;

    #[test]
    fn pow_int_matches_repeated_multiplication() {
        let shift = 100u32;
        let mut base = Bn256::ZERO;
        base.set_double(1.25, shift);
        let result = pow_int(&base, 5, shift);
        let as_f64 = result.get_double(shift);
        assert!((as_f64 - 1.25f64.powi(5)).abs() < 1e-6);
    }

    #[test]
    fn pow_int_zero_is_one() {
        let shift = 100u32;
        let mut base = Bn256::ZERO;
        base.set_double(7.0, shift);
        let result = pow_int(&base, 0, shift);
        let mut one = Bn256::ZERO;
        one.set32_shl(1, shift);
        assert_eq!(result, one);
    }

    #[test]
    fn pow_matches_f64() {
        let shift = 100u32;
        let mut base = Bn256::ZERO;
        base.set_double(2.0, shift);
        let mut exponent = Bn256::ZERO;
        exponent.set_double(3.0, shift);
        let result = pow(&base, &exponent, shift);
        let as_f64 = result.get_double(shift);
        assert!((as_f64 - 8.0).abs() < 1e-4);
    }
}
