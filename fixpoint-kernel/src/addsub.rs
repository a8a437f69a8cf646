//! §4.1.2 — addition, subtraction, negation.

use crate::util::{add_units_into, neg_units, shl_units, sub_units_from};
use fixpoint_types::{BigInt, Limb};

pub trait KernelAddSub {
    fn add32(&mut self, v: u32);
    fn sub32(&mut self, v: u32);
    fn add32_shl(&mut self, v: u32, shift: u32);
    fn sub32_shl(&mut self, v: u32, shift: u32);

    /// `self += src`.
    fn add(&mut self, src: &Self);
    /// `self -= src`.
    fn sub(&mut self, src: &Self);
    /// `self = a + b`.
    fn set_add(&mut self, a: &Self, b: &Self);
    /// `self = a - b`.
    fn set_sub(&mut self, a: &Self, b: &Self);
    /// `self = src + a + b`.
    fn set_add_add(&mut self, src: &Self, a: &Self, b: &Self);
    /// `self = src + a - b`.
    fn set_add_sub(&mut self, src: &Self, a: &Self, b: &Self);
    /// `self = src + a + b - c`.
    fn set_add_add_sub(&mut self, src: &Self, a: &Self, b: &Self, c: &Self);
    /// `self = src + a + b + c - d`.
    fn set_add_add_add_sub(&mut self, src: &Self, a: &Self, b: &Self, c: &Self, d: &Self);

    /// In-place two's-complement negation.
    fn negate(&mut self);
    /// `self = -src`.
    fn set_neg(&mut self, src: &Self);
}

impl<L: Limb, const N: usize> KernelAddSub for BigInt<L, N> {
    fn add32(&mut self, v: u32) {
        let scalar = Self::from(v as u64);
        add_units_into(self.units_mut(), scalar.units());
    }

    fn sub32(&mut self, v: u32) {
        let scalar = Self::from(v as u64);
        sub_units_from(self.units_mut(), scalar.units());
    }

    fn add32_shl(&mut self, v: u32, shift: u32) {
        let mut scalar = Self::from(v as u64);
        shl_units(scalar.units_mut(), shift);
        add_units_into(self.units_mut(), scalar.units());
    }

    fn sub32_shl(&mut self, v: u32, shift: u32) {
        let mut scalar = Self::from(v as u64);
        shl_units(scalar.units_mut(), shift);
        sub_units_from(self.units_mut(), scalar.units());
    }

    fn add(&mut self, src: &Self) {
        add_units_into(self.units_mut(), src.units());
    }

    fn sub(&mut self, src: &Self) {
        sub_units_from(self.units_mut(), src.units());
    }

    fn set_add(&mut self, a: &Self, b: &Self) {
        *self = *a;
        self.add(b);
    }

    fn set_sub(&mut self, a: &Self, b: &Self) {
        *self = *a;
        self.sub(b);
    }

    fn set_add_add(&mut self, src: &Self, a: &Self, b: &Self) {
        *self = *src;
        self.add(a);
        self.add(b);
    }

    fn set_add_sub(&mut self, src: &Self, a: &Self, b: &Self) {
        *self = *src;
        self.add(a);
        self.sub(b);
    }

    fn set_add_add_sub(&mut self, src: &Self, a: &Self, b: &Self, c: &Self) {
        *self = *src;
        self.add(a);
        self.add(b);
        self.sub(c);
    }

    fn set_add_add_add_sub(&mut self, src: &Self, a: &Self, b: &Self, c: &Self, d: &Self) {
        *self = *src;
        self.add(a);
        self.add(b);
        self.add(c);
        self.sub(d);
    }

    fn negate(&mut self) {
        neg_units(self.units_mut());
    }

    fn set_neg(&mut self, src: &Self) {
        *self = *src;
        self.negate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    type Bn128 = BigInt<u64, 2>;

    #[quickcheck]
    fn additive_inverse(lo: u64, hi: u64) -> bool {
        let x = Bn128::from_units([lo, hi]);
        let mut y = Bn128::ZERO;
        y.set_neg(&x);
        y.add(&x);
        y == Bn128::ZERO
    }

    #[test]
    fn add32_carries_across_limbs() {
        let mut v = Bn128::from_units([u64::MAX, 0]);
        v.add32(1);
        assert_eq!(v, Bn128::from_units([0, 1]));
    }

    #[test]
    fn negate_zero_is_zero() {
        let mut v = Bn128::ZERO;
        v.negate();
        assert_eq!(v, Bn128::ZERO);
    }

    #[test]
    fn fused_add_add_sub_matches_sequential() {
        let a = Bn128::from_units([3, 0]);
        let b = Bn128::from_units([5, 0]);
        let c = Bn128::from_units([2, 0]);
        let src = Bn128::from_units([1, 0]);
        let mut fused = Bn128::ZERO;
        fused.set_add_add_sub(&src, &a, &b, &c);

        let mut seq = src;
        seq.add(&a);
        seq.add(&b);
        seq.sub(&c);
        assert_eq!(fused, seq);
    }
}
