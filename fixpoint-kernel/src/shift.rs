//! §4.1.5 — bitwise shifts.

use crate::bits::KernelBits;
use crate::util::{shl_units, shr_units};
use fixpoint_types::{BigInt, Limb};

pub trait KernelShift {
    /// Logical shift left. `amount >= W` yields zero.
    fn shl(&mut self, src: &Self, amount: u32);
    /// Logical shift right. `amount >= W` yields zero.
    fn shr(&mut self, src: &Self, amount: u32);
    /// Arithmetic (sign-extending) shift left — identical to `shl`.
    fn sal(&mut self, src: &Self, amount: u32);
    /// Arithmetic (sign-extending) shift right.
    fn sar(&mut self, src: &Self, amount: u32);
    /// `shr` plus round-to-nearest on the bit shifted off the low end.
    fn shr_round(&mut self, src: &Self, amount: u32);
    /// `sar` plus round-to-nearest on the bit shifted off the low end.
    fn sar_round(&mut self, src: &Self, amount: u32);

    fn shl1(&mut self, src: &Self);
    fn shr1(&mut self, src: &Self);
}

impl<L: Limb, const N: usize> KernelShift for BigInt<L, N> {
    fn shl(&mut self, src: &Self, amount: u32) {
        *self = *src;
        if amount >= Self::WIDTH {
            *self = Self::ZERO;
        } else {
            shl_units(self.units_mut(), amount);
        }
    }

    fn shr(&mut self, src: &Self, amount: u32) {
        *self = *src;
        if amount >= Self::WIDTH {
            *self = Self::ZERO;
        } else {
            shr_units(self.units_mut(), amount);
        }
    }

    fn sal(&mut self, src: &Self, amount: u32) {
        self.shl(src, amount);
    }

    fn sar(&mut self, src: &Self, amount: u32) {
        let negative = src.is_negative();
        if !negative {
            self.shr(src, amount);
            return;
        }
        if amount >= Self::WIDTH {
            *self = Self::ZERO;
            self.negate_to_all_ones();
            return;
        }
        *self = *src;
        shr_units(self.units_mut(), amount);
        // sign-extend the vacated high bits
        for bit in (Self::WIDTH - amount)..Self::WIDTH {
            self.set_bit(bit);
        }
    }

    fn shr_round(&mut self, src: &Self, amount: u32) {
        let round_up = amount > 0 && amount <= Self::WIDTH && src.extract_bit(amount - 1);
        self.shr(src, amount);
        if round_up {
            crate::addsub::KernelAddSub::add32(self, 1);
        }
    }

    fn sar_round(&mut self, src: &Self, amount: u32) {
        let round_up = amount > 0 && amount <= Self::WIDTH && src.extract_bit(amount - 1);
        self.sar(src, amount);
        if round_up {
            crate::addsub::KernelAddSub::add32(self, 1);
        }
    }

    fn shl1(&mut self, src: &Self) {
        self.shl(src, 1);
    }

    fn shr1(&mut self, src: &Self) {
        self.shr(src, 1);
    }
}

/// Internal helper: set every bit, used by `sar` when the shift amount
/// reaches or exceeds the width of a negative value (result is all-ones).
trait FillOnes {
    fn negate_to_all_ones(&mut self);
}

impl<L: Limb, const N: usize> FillOnes for BigInt<L, N> {
    fn negate_to_all_ones(&mut self) {
        for i in 0..N {
            self.set_unit(i, L::MAX);
        }
    }
}
