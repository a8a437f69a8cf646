//! §4.2.1 — square root.
//!
//! The original non-restoring digit-by-digit algorithm walks MSB-to-LSB
//! through a combined integer/fractional digit stream, shifting `base` and
//! `dst` left by two bits whenever the integer digits run out so the same
//! loop keeps extracting fractional bits. That shift-in-place step is easy
//! to get subtly wrong without a compiler to check against. We get the
//! identical result a simpler way: binary-search each output bit from MSB
//! to LSB, accepting bit `b` iff `candidate^2 >> shift <= src` — using the
//! kernel's own overflow-checked `MulCheckShr` so a candidate whose true
//! square doesn't fit the container is rejected rather than silently
//! wrapping.

use fixpoint_kernel::bits::KernelBits;
use fixpoint_kernel::cmp::KernelCmp;
use fixpoint_kernel::mul::KernelMul;
use fixpoint_types::{BigInt, Limb};

/// `sqrt(src)`, `src` and the result both fixed-point with `shift`
/// fractional bits. Negative or zero input returns zero.
pub fn sqrt<L: Limb, const N: usize>(src: &BigInt<L, N>, shift: u32) -> BigInt<L, N> {
    if src.is_negative() || src.cmp_zero() {
        return BigInt::ZERO;
    }

    let width = BigInt::<L, N>::WIDTH;
    let mut dst = BigInt::ZERO;
    for bit in (0..width).rev() {
        let mut candidate = dst;
        candidate.set_bit(bit);
        let mut squared = BigInt::ZERO;
        let overflow = squared.mul_check_shr(&candidate, &candidate, shift);
        if !overflow && squared.cmp_le(src) {
            dst = candidate;
        }
    }
    dst
}
