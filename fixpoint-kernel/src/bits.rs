//! §4.1.1 — set/get and bit manipulation.

use crate::util::{shl_units, shr_units};
use fixpoint_types::{BigInt, Limb};

/// Set/get, bit manipulation and bitwise logic — the non-arithmetic half of
/// the kernel operation set.
pub trait KernelBits {
    fn zero(&mut self);
    fn set(&mut self, src: &Self);
    fn set32(&mut self, v: u32);
    fn set32_signed(&mut self, v: i32);
    fn set32_shl(&mut self, v: u32, shift: u32);

    fn set_bit(&mut self, bit: u32);
    fn clear_bit(&mut self, bit: u32);
    fn flip_bit(&mut self, bit: u32);
    fn extract_bit(&self, bit: u32) -> bool;
    fn extract32(&self, bit: u32) -> u32;
    fn extract64(&self, bit: u32) -> u64;

    /// Index of the most significant set bit, or -1 if zero.
    fn index_msb(&self) -> i32;
    /// Index of the most significant clear bit, or -1 if all bits set.
    fn index_msz(&self) -> i32;

    fn bit_or(&mut self, a: &Self, b: &Self);
    fn bit_and(&mut self, a: &Self, b: &Self);
    fn bit_xor(&mut self, a: &Self, b: &Self);
    fn bit_nor(&mut self, a: &Self, b: &Self);
    fn bit_nand(&mut self, a: &Self, b: &Self);
    fn bit_nxor(&mut self, a: &Self, b: &Self);
    fn bit_not(&mut self, a: &Self);

    fn or_assign(&mut self, other: &Self);
    fn and_assign(&mut self, other: &Self);
    fn xor_assign(&mut self, other: &Self);
}

impl<L: Limb, const N: usize> KernelBits for BigInt<L, N> {
    fn zero(&mut self) {
        *self = Self::ZERO;
    }

    fn set(&mut self, src: &Self) {
        *self = *src;
    }

    fn set32(&mut self, v: u32) {
        *self = Self::ZERO;
        self.set_unit(0, L::from_u32(v));
        if L::BITS < 32 && N > 1 {
            self.set_unit(1, L::from_u32(v >> L::BITS));
        }
    }

    fn set32_signed(&mut self, v: i32) {
        self.set32(v as u32);
        if v < 0 {
            for bit in 32..Self::WIDTH {
                self.set_bit(bit);
            }
        }
    }

    fn set32_shl(&mut self, v: u32, shift: u32) {
        self.set32(v);
        shl_units(self.units_mut(), shift);
    }

    fn set_bit(&mut self, bit: u32) {
        if bit >= Self::WIDTH {
            return;
        }
        let idx = (bit / L::BITS) as usize;
        let off = bit % L::BITS;
        self.set_unit(idx, self.unit(idx) | L::ONE.shl(off));
    }

    fn clear_bit(&mut self, bit: u32) {
        if bit >= Self::WIDTH {
            return;
        }
        let idx = (bit / L::BITS) as usize;
        let off = bit % L::BITS;
        self.set_unit(idx, self.unit(idx) & !(L::ONE.shl(off)));
    }

    fn flip_bit(&mut self, bit: u32) {
        if bit >= Self::WIDTH {
            return;
        }
        let idx = (bit / L::BITS) as usize;
        let off = bit % L::BITS;
        self.set_unit(idx, self.unit(idx) ^ L::ONE.shl(off));
    }

    fn extract_bit(&self, bit: u32) -> bool {
        if bit >= Self::WIDTH {
            return false;
        }
        let idx = (bit / L::BITS) as usize;
        self.unit(idx).bit(bit % L::BITS)
    }

    fn extract32(&self, bit: u32) -> u32 {
        let mut out = 0u32;
        for i in 0..32 {
            if self.extract_bit(bit + i) {
                out |= 1 << i;
            }
        }
        out
    }

    fn extract64(&self, bit: u32) -> u64 {
        let mut out = 0u64;
        for i in 0..64 {
            if self.extract_bit(bit + i) {
                out |= 1 << i;
            }
        }
        out
    }

    fn index_msb(&self) -> i32 {
        for i in (0..N).rev() {
            let u = self.unit(i);
            if !u.is_zero() {
                let top_zeros = u.leading_zeros();
                return (i as i32) * (L::BITS as i32) + (L::BITS as i32 - 1 - top_zeros as i32);
            }
        }
        -1
    }

    fn index_msz(&self) -> i32 {
        let mut inverted = *self;
        inverted.bit_not(self);
        inverted.index_msb()
    }

    fn bit_or(&mut self, a: &Self, b: &Self) {
        for i in 0..N {
            self.set_unit(i, a.unit(i) | b.unit(i));
        }
    }

    fn bit_and(&mut self, a: &Self, b: &Self) {
        for i in 0..N {
            self.set_unit(i, a.unit(i) & b.unit(i));
        }
    }

    fn bit_xor(&mut self, a: &Self, b: &Self) {
        for i in 0..N {
            self.set_unit(i, a.unit(i) ^ b.unit(i));
        }
    }

    fn bit_nor(&mut self, a: &Self, b: &Self) {
        for i in 0..N {
            self.set_unit(i, !(a.unit(i) | b.unit(i)));
        }
    }

    fn bit_nand(&mut self, a: &Self, b: &Self) {
        for i in 0..N {
            self.set_unit(i, !(a.unit(i) & b.unit(i)));
        }
    }

    fn bit_nxor(&mut self, a: &Self, b: &Self) {
        for i in 0..N {
            self.set_unit(i, !(a.unit(i) ^ b.unit(i)));
        }
    }

    fn bit_not(&mut self, a: &Self) {
        for i in 0..N {
            self.set_unit(i, !a.unit(i));
        }
    }

    fn or_assign(&mut self, other: &Self) {
        let lhs = *self;
        self.bit_or(&lhs, other);
    }

    fn and_assign(&mut self, other: &Self) {
        let lhs = *self;
        self.bit_and(&lhs, other);
    }

    fn xor_assign(&mut self, other: &Self) {
        let lhs = *self;
        self.bit_xor(&lhs, other);
    }
}
