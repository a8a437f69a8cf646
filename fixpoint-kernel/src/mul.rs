//! §4.1.3 — multiplication.

use crate::util::{mul_full, neg_units};
use fixpoint_types::{BigInt, Limb};

pub trait KernelMul {
    fn mul32(&mut self, src: &Self, v: u32);
    fn mul32_signed(&mut self, src: &Self, v: i32);
    /// Returns `true` if the 32-bit scalar multiply overflowed `Self`.
    fn mul32_check(&mut self, src: &Self, v: u32) -> bool;

    /// `self = a * b`, truncated to the low `N` limbs (silent wraparound,
    /// matching native integer multiplication).
    fn mul(&mut self, a: &Self, b: &Self);

    /// `self = (a * b) >> shift`, full 2N-limb product computed internally
    /// before the shift, so no precision is lost for `shift <= W`.
    fn mul_shr(&mut self, a: &Self, b: &Self, shift: u32);
    /// Signed variant of `mul_shr`: `a` and `b` are taken as two's-complement
    /// signed values before the shift.
    fn mul_signed_shr(&mut self, a: &Self, b: &Self, shift: u32);

    /// `self = a * b`, returns `true` if the truncated high limbs were
    /// non-zero (unsigned overflow).
    fn mul_check(&mut self, a: &Self, b: &Self) -> bool;
    fn mul_check_shr(&mut self, a: &Self, b: &Self, shift: u32) -> bool;
    fn mul_signed_check_shr(&mut self, a: &Self, b: &Self, shift: u32) -> bool;

    /// `self = (src * src) >> shift`. Spec-equivalent to
    /// `mul_signed_shr(self, src, src, shift)`; squaring's diagonal-doubling
    /// optimization is a throughput concern only, not a correctness one.
    fn square_shr(&mut self, src: &Self, shift: u32);
}

/// `result = (a * b) >> 0`, written across up to `2N` limbs, honoring
/// `unit_mask`: bit `i` set means limb `i` of the double-width product is
/// guaranteed written. Internally the full product is always computed
/// correctly; the mask only restricts which limbs of `result` get touched,
/// which trivially satisfies a "masked limbs are correct" contract.
pub fn mul_extended<L: Limb, const N: usize>(
    result: &mut [L],
    a: &BigInt<L, N>,
    b: &BigInt<L, N>,
    unit_mask: u64,
) {
    debug_assert!(result.len() <= 2 * N);
    let mut full = vec![L::ZERO; 2 * N];
    mul_full(&mut full, a.units(), b.units());
    for (i, slot) in result.iter_mut().enumerate() {
        if unit_mask & (1u64 << i) != 0 || unit_mask == 0 {
            *slot = full[i];
        }
    }
}

fn full_product<L: Limb, const N: usize>(a: &BigInt<L, N>, b: &BigInt<L, N>) -> Vec<L> {
    let mut full = vec![L::ZERO; 2 * N];
    mul_full(&mut full, a.units(), b.units());
    full
}

/// Two's-complement negate a double-width little-endian limb vector.
fn negate_double<L: Limb>(v: &mut [L]) {
    neg_units(v);
}

impl<L: Limb, const N: usize> KernelMul for BigInt<L, N> {
    fn mul32(&mut self, src: &Self, v: u32) {
        let scalar = Self::from(v as u64);
        self.mul(src, &scalar);
    }

    fn mul32_signed(&mut self, src: &Self, v: i32) {
        let mut scalar = Self::ZERO;
        crate::bits::KernelBits::set32_signed(&mut scalar, v);
        self.mul_signed_shr(src, &scalar, 0);
    }

    fn mul32_check(&mut self, src: &Self, v: u32) -> bool {
        let scalar = Self::from(v as u64);
        self.mul_check(src, &scalar)
    }

    fn mul(&mut self, a: &Self, b: &Self) {
        let full = full_product(a, b);
        for i in 0..N {
            self.set_unit(i, full[i]);
        }
    }

    fn mul_shr(&mut self, a: &Self, b: &Self, shift: u32) {
        let mut full = full_product(a, b);
        let round = crate::util::round_bit(&full, shift);
        crate::util::shr_units(&mut full, shift);
        if round {
            crate::util::add_units_into(&mut full[..N], &[L::ONE]);
        }
        for i in 0..N {
            self.set_unit(i, full[i]);
        }
    }

    fn mul_signed_shr(&mut self, a: &Self, b: &Self, shift: u32) {
        let a_neg = a.is_negative();
        let b_neg = b.is_negative();
        let mut ua = *a;
        if a_neg {
            crate::addsub::KernelAddSub::negate(&mut ua);
        }
        let mut ub = *b;
        if b_neg {
            crate::addsub::KernelAddSub::negate(&mut ub);
        }
        let mut full = full_product(&ua, &ub);
        if a_neg != b_neg {
            negate_double(&mut full);
        }
        let round = crate::util::round_bit(&full, shift);
        crate::util::shr_units(&mut full, shift);
        if round {
            crate::util::add_units_into(&mut full[..N], &[L::ONE]);
        }
        for i in 0..N {
            self.set_unit(i, full[i]);
        }
    }

    fn mul_check(&mut self, a: &Self, b: &Self) -> bool {
        let full = full_product(a, b);
        for i in 0..N {
            self.set_unit(i, full[i]);
        }
        full[N..].iter().any(|u| !u.is_zero())
    }

    fn mul_check_shr(&mut self, a: &Self, b: &Self, shift: u32) -> bool {
        let mut full = full_product(a, b);
        // Overflow is judged on the raw (pre-rounding) discarded limbs, the
        // same moment the original computes it from the undivided product.
        let overflow = full[N..].iter().any(|u| !u.is_zero());
        let round = crate::util::round_bit(&full, shift);
        crate::util::shr_units(&mut full, shift);
        if round {
            crate::util::add_units_into(&mut full[..N], &[L::ONE]);
        }
        for i in 0..N {
            self.set_unit(i, full[i]);
        }
        overflow
    }

    fn mul_signed_check_shr(&mut self, a: &Self, b: &Self, shift: u32) -> bool {
        let a_neg = a.is_negative();
        let b_neg = b.is_negative();
        let mut ua = *a;
        if a_neg {
            crate::addsub::KernelAddSub::negate(&mut ua);
        }
        let mut ub = *b;
        if b_neg {
            crate::addsub::KernelAddSub::negate(&mut ub);
        }
        let mut full = full_product(&ua, &ub);
        if a_neg != b_neg {
            negate_double(&mut full);
        }
        let round = crate::util::round_bit(&full, shift);
        crate::util::shr_units(&mut full, shift);
        for i in 0..N {
            self.set_unit(i, full[i]);
        }
        // overflow iff the discarded high limbs aren't a pure sign-extension
        // of the retained (pre-rounding) result, judged the same moment the
        // original judges it on the undivided product
        let sign_fill = if self.is_negative() { L::MAX } else { L::ZERO };
        let overflow = full[N..].iter().any(|u| *u != sign_fill);
        if round {
            crate::util::add_units_into(&mut full[..N], &[L::ONE]);
            for i in 0..N {
                self.set_unit(i, full[i]);
            }
        }
        overflow
    }

    fn square_shr(&mut self, src: &Self, shift: u32) {
        let copy = *src;
        self.mul_signed_shr(&copy, &copy, shift);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::KernelBits;
    use quickcheck_macros::quickcheck;

    type Bn128 = BigInt<u64, 2>;

    #[quickcheck]
    fn mul_matches_u128(a: u64, b: u64) -> bool {
        let x = Bn128::from(a);
        let y = Bn128::from(b);
        let mut out = Bn128::ZERO;
        out.mul(&x, &y);
        let expect = (a as u128).wrapping_mul(b as u128);
        out.unit(0) as u128 | (out.unit(1) as u128) << 64 == expect
    }

    #[test]
    fn mul_shr_scales_down() {
        // 4 * 4 = 16, >> 2 == 4, with one fractional bit of headroom verified
        let mut four = Bn128::ZERO;
        four.set32(4);
        let mut out = Bn128::ZERO;
        out.mul_shr(&four, &four, 2);
        assert_eq!(out.unit(0), 4);
    }

    #[test]
    fn mul_signed_shr_handles_negative_operands() {
        let mut neg_two = Bn128::ZERO;
        neg_two.set32_signed(-2);
        let mut three = Bn128::ZERO;
        three.set32(3);
        let mut out = Bn128::ZERO;
        out.mul_signed_shr(&neg_two, &three, 0);
        let mut expect = Bn128::ZERO;
        expect.set32_signed(-6);
        assert_eq!(out, expect);
    }

    #[test]
    fn mul_check_detects_overflow() {
        let max = Bn128::from(u64::MAX);
        let two = Bn128::from(2u64);
        let mut out = Bn128::ZERO;
        assert!(out.mul_check(&max, &two));
    }

    #[test]
    fn square_shr_matches_mul_signed_shr() {
        let mut v = Bn128::ZERO;
        v.set32_signed(-7);
        let mut squared = Bn128::ZERO;
        squared.square_shr(&v, 3);
        let mut expect = Bn128::ZERO;
        expect.mul_signed_shr(&v, &v, 3);
        assert_eq!(squared, expect);
    }
}
