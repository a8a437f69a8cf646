//! §4.1.6 — comparisons.

use core::cmp::Ordering;
use fixpoint_types::{BigInt, Limb};

pub trait KernelCmp {
    fn cmp_zero(&self) -> bool;
    fn cmp_not_zero(&self) -> bool;
    fn cmp_eq(&self, other: &Self) -> bool;
    fn cmp_neq(&self, other: &Self) -> bool;

    /// Unsigned `self > other`.
    fn cmp_gt(&self, other: &Self) -> bool;
    fn cmp_ge(&self, other: &Self) -> bool;
    fn cmp_lt(&self, other: &Self) -> bool;
    fn cmp_le(&self, other: &Self) -> bool;

    fn cmp_signed_gt(&self, other: &Self) -> bool;
    fn cmp_signed_ge(&self, other: &Self) -> bool;
    fn cmp_signed_lt(&self, other: &Self) -> bool;
    fn cmp_signed_le(&self, other: &Self) -> bool;

    fn cmp_positive(&self) -> bool;
    fn cmp_negative(&self) -> bool;

    /// `true` iff `self == other` or `self == 0`. The combined
    /// "converged-or-underflowed" termination test the transcendental
    /// loops use.
    fn cmp_eq_or_zero(&self, other: &Self) -> bool;

    /// Compare only the top `bits` most-significant bits, unsigned.
    fn cmp_part(&self, other: &Self, bits: u32) -> Ordering;

    fn cmp_unsigned(&self, other: &Self) -> Ordering;
}

impl<L: Limb, const N: usize> KernelCmp for BigInt<L, N> {
    fn cmp_zero(&self) -> bool {
        self.units().iter().all(|u| u.is_zero())
    }

    fn cmp_not_zero(&self) -> bool {
        !self.cmp_zero()
    }

    fn cmp_eq(&self, other: &Self) -> bool {
        self.units() == other.units()
    }

    fn cmp_neq(&self, other: &Self) -> bool {
        !self.cmp_eq(other)
    }

    fn cmp_unsigned(&self, other: &Self) -> Ordering {
        for i in (0..N).rev() {
            match self.unit(i).cmp(&other.unit(i)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    fn cmp_gt(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) == Ordering::Greater
    }

    fn cmp_ge(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) != Ordering::Less
    }

    fn cmp_lt(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) == Ordering::Less
    }

    fn cmp_le(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) != Ordering::Greater
    }

    fn cmp_signed_gt(&self, other: &Self) -> bool {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => false,
            (false, true) => true,
            _ => self.cmp_gt(other),
        }
    }

    fn cmp_signed_ge(&self, other: &Self) -> bool {
        self.cmp_signed_gt(other) || self.cmp_eq(other)
    }

    fn cmp_signed_lt(&self, other: &Self) -> bool {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => true,
            (false, true) => false,
            _ => self.cmp_lt(other),
        }
    }

    fn cmp_signed_le(&self, other: &Self) -> bool {
        self.cmp_signed_lt(other) || self.cmp_eq(other)
    }

    fn cmp_positive(&self) -> bool {
        !self.is_negative()
    }

    fn cmp_negative(&self) -> bool {
        self.is_negative()
    }

    fn cmp_eq_or_zero(&self, other: &Self) -> bool {
        if self.cmp_zero() {
            return true;
        }
        let mut xored = Self::ZERO;
        for i in 0..N {
            xored.set_unit(i, self.unit(i) ^ other.unit(i));
        }
        xored.cmp_zero()
    }

    fn cmp_part(&self, other: &Self, bits: u32) -> Ordering {
        let bits = bits.min(Self::WIDTH);
        if bits == 0 {
            return Ordering::Equal;
        }
        let skip = Self::WIDTH - bits;
        for b in (skip..Self::WIDTH).rev() {
            match (self.extract_bit_pub(b), other.extract_bit_pub(b)) {
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                _ => continue,
            }
        }
        Ordering::Equal
    }
}

/// `KernelCmp::cmp_part` needs single-bit extraction but lives in a
/// different module than `KernelBits`; this tiny shim avoids a circular
/// `pub use` between the two.
trait ExtractBitPub {
    fn extract_bit_pub(&self, bit: u32) -> bool;
}

impl<L: Limb, const N: usize> ExtractBitPub for BigInt<L, N> {
    fn extract_bit_pub(&self, bit: u32) -> bool {
        use crate::bits::KernelBits;
        self.extract_bit(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::KernelBits;

    type Bn128 = BigInt<u64, 2>;

    #[test]
    fn eq_or_zero_matches_spec_examples() {
        let mut a = Bn128::ZERO;
        a.set32(5);
        let mut b = Bn128::ZERO;
        b.set32(5);
        assert!(a.cmp_eq_or_zero(&b));

        let zero = Bn128::ZERO;
        let mut c = Bn128::ZERO;
        c.set32(9);
        assert!(zero.cmp_eq_or_zero(&c));

        let mut d = Bn128::ZERO;
        d.set32(1);
        let mut e = Bn128::ZERO;
        e.set32(2);
        assert!(!d.cmp_eq_or_zero(&e));
    }

    #[test]
    fn signed_cmp_respects_sign_bit() {
        let mut neg = Bn128::ZERO;
        neg.set32_signed(-1);
        let pos = {
            let mut v = Bn128::ZERO;
            v.set32(1);
            v
        };
        assert!(pos.cmp_signed_gt(&neg));
        assert!(neg.cmp_signed_lt(&pos));
    }

    #[test]
    fn cmp_part_compares_top_bits_only() {
        let mut a = Bn128::ZERO;
        a.set_bit(127);
        let mut b = Bn128::ZERO;
        b.set_bit(127);
        b.set_bit(0); // differs only in the bottom bit
        assert_eq!(a.cmp_part(&b, 8), Ordering::Equal);
        assert_eq!(a.cmp_part(&b, 128), Ordering::Less);
    }
}
