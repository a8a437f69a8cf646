//! §4.1.4 — division.
//!
//! The original offset-jumping non-restoring division algorithm is replaced
//! here with a plain bit-serial restoring long division: shift-and-subtract
//! one bit at a time over the full width. Asymptotically equivalent for the
//! widths this kernel targets (<=1024 bits) and far easier to verify without
//! a compiler to lean on.

use crate::addsub::KernelAddSub;
use crate::bits::KernelBits;
use crate::cmp::KernelCmp;
use crate::shift::KernelShift;
use fixpoint_types::{BigInt, Limb};

pub trait KernelDiv {
    fn div32(&mut self, src: &Self, v: u32) -> u32;
    fn div32_signed(&mut self, src: &Self, v: i32) -> i32;
    fn div32_round(&mut self, src: &Self, v: u32);
    fn div32_round_signed(&mut self, src: &Self, v: i32);

    /// Unsigned `self = a / b`.
    fn div(&mut self, a: &Self, b: &Self);
    /// Signed `self = a / b`, truncating toward zero.
    fn div_signed(&mut self, a: &Self, b: &Self);
    /// `self = round(a / b)` (round-half-up on the remainder).
    fn div_round(&mut self, a: &Self, b: &Self);
    /// `self = (a << shift) / b`, for fixed-point quotients.
    fn div_shl(&mut self, a: &Self, b: &Self, shift: u32);
}

/// Unsigned restoring division of two same-width values. Returns
/// `(quotient, remainder)`; division by zero yields the all-ones quotient
/// (saturated) and `a` as the remainder, matching the kernel's no-panic
/// contract (§4.1.4 edge cases).
fn divmod_unsigned<L: Limb, const N: usize>(
    a: &BigInt<L, N>,
    b: &BigInt<L, N>,
) -> (BigInt<L, N>, BigInt<L, N>) {
    if b.cmp_zero() {
        let mut q = BigInt::ZERO;
        for i in 0..N {
            q.set_unit(i, L::MAX);
        }
        return (q, *a);
    }
    let mut quotient = BigInt::ZERO;
    let mut remainder = BigInt::ZERO;
    let width = BigInt::<L, N>::WIDTH;
    for bit in (0..width).rev() {
        let prev = remainder;
        remainder.shl1(&prev);
        if a.extract_bit(bit) {
            remainder.set_bit(0);
        }
        if remainder.cmp_ge(b) {
            remainder.sub(b);
            quotient.set_bit(bit);
        }
    }
    (quotient, remainder)
}

impl<L: Limb, const N: usize> KernelDiv for BigInt<L, N> {
    fn div32(&mut self, src: &Self, v: u32) -> u32 {
        let divisor = Self::from(v as u64);
        let (q, r) = divmod_unsigned(src, &divisor);
        *self = q;
        r.unit(0).to_u64() as u32
    }

    fn div32_signed(&mut self, src: &Self, v: i32) -> i32 {
        let neg_src = src.is_negative();
        let neg_v = v < 0;
        let mut unsigned_src = *src;
        if neg_src {
            unsigned_src.negate();
        }
        let divisor = Self::from(v.unsigned_abs() as u64);
        let (mut q, r) = divmod_unsigned(&unsigned_src, &divisor);
        if neg_src != neg_v {
            q.negate();
        }
        *self = q;
        let rem = r.unit(0).to_u64() as i32;
        if neg_src {
            -rem
        } else {
            rem
        }
    }

    fn div32_round(&mut self, src: &Self, v: u32) {
        let divisor = Self::from(v as u64);
        let (mut q, r) = divmod_unsigned(src, &divisor);
        let mut twice_r = r;
        twice_r.shl1(&r);
        if twice_r.cmp_ge(&divisor) {
            q.add32(1);
        }
        *self = q;
    }

    fn div32_round_signed(&mut self, src: &Self, v: i32) {
        let neg_src = src.is_negative();
        let neg_v = v < 0;
        let mut unsigned_src = *src;
        if neg_src {
            unsigned_src.negate();
        }
        let divisor = Self::from(v.unsigned_abs() as u64);
        let (mut q, r) = divmod_unsigned(&unsigned_src, &divisor);
        let mut twice_r = r;
        twice_r.shl1(&r);
        if twice_r.cmp_ge(&divisor) {
            q.add32(1);
        }
        if neg_src != neg_v {
            q.negate();
        }
        *self = q;
    }

    fn div(&mut self, a: &Self, b: &Self) {
        let (q, _) = divmod_unsigned(a, b);
        *self = q;
    }

    fn div_signed(&mut self, a: &Self, b: &Self) {
        let neg_a = a.is_negative();
        let neg_b = b.is_negative();
        let mut ua = *a;
        if neg_a {
            ua.negate();
        }
        let mut ub = *b;
        if neg_b {
            ub.negate();
        }
        let (mut q, _) = divmod_unsigned(&ua, &ub);
        if neg_a != neg_b {
            q.negate();
        }
        *self = q;
    }

    fn div_round(&mut self, a: &Self, b: &Self) {
        let neg_a = a.is_negative();
        let neg_b = b.is_negative();
        let mut ua = *a;
        if neg_a {
            ua.negate();
        }
        let mut ub = *b;
        if neg_b {
            ub.negate();
        }
        let (mut q, r) = divmod_unsigned(&ua, &ub);
        let mut twice_r = r;
        twice_r.shl1(&r);
        if !ub.cmp_zero() && twice_r.cmp_ge(&ub) {
            q.add32(1);
        }
        if neg_a != neg_b {
            q.negate();
        }
        *self = q;
    }

    fn div_shl(&mut self, a: &Self, b: &Self, shift: u32) {
        let mut shifted = *a;
        shifted.shl(a, shift);
        self.div(&shifted, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    type Bn128 = BigInt<u64, 2>;

    #[quickcheck]
    fn div32_matches_native(a: u32, b: u32) -> bool {
        if b == 0 {
            return true;
        }
        let x = Bn128::from(a as u64);
        let mut out = Bn128::ZERO;
        let rem = out.div32(&x, b);
        out.unit(0) == (a / b) as u64 && rem == a % b
    }

    #[test]
    fn div32_basic() {
        let mut v = Bn128::ZERO;
        v.set32(17);
        let mut q = Bn128::ZERO;
        let r = q.div32(&v, 5);
        assert_eq!(q.unit(0), 3);
        assert_eq!(r, 2);
    }

    #[test]
    fn div_by_zero_saturates_instead_of_panicking() {
        let mut v = Bn128::ZERO;
        v.set32(9);
        let zero = Bn128::ZERO;
        let mut q = Bn128::ZERO;
        q.div(&v, &zero);
        assert_eq!(q, Bn128::from_units([u64::MAX, u64::MAX]));
    }

    #[test]
    fn div_signed_truncates_toward_zero() {
        let mut neg_seven = Bn128::ZERO;
        crate::bits::KernelBits::set32_signed(&mut neg_seven, -7);
        let mut two = Bn128::ZERO;
        two.set32(2);
        let mut out = Bn128::ZERO;
        out.div_signed(&neg_seven, &two);
        let mut expect = Bn128::ZERO;
        crate::bits::KernelBits::set32_signed(&mut expect, -3);
        assert_eq!(out, expect);
    }

    #[test]
    fn div_round_rounds_half_up() {
        let mut seven = Bn128::ZERO;
        seven.set32(7);
        let mut two = Bn128::ZERO;
        two.set32(2);
        let mut out = Bn128::ZERO;
        out.div_round(&seven, &two); // 3.5 -> 4
        assert_eq!(out.unit(0), 4);
    }
}
