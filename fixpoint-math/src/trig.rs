//! §4.2.5 — `Cos`, `Sin`, `Tan`.

use crate::constants::{constant_shift, pi as stored_pi, rescale};
use fixpoint_kernel::addsub::KernelAddSub;
use fixpoint_kernel::bits::KernelBits;
use fixpoint_kernel::cmp::KernelCmp;
use fixpoint_kernel::div::KernelDiv;
use fixpoint_kernel::mul::KernelMul;
use fixpoint_kernel::shift::KernelShift;
use fixpoint_types::{BigInt, Limb};

/// `cos(src)`, fixed-point with `shift` fractional bits in and out.
pub fn cos<L: Limb, const N: usize>(src: &BigInt<L, N>, shift: u32) -> BigInt<L, N> {
    let c_shift = constant_shift::<L, N>();
    let pi = rescale(&stored_pi::<L, N>(), c_shift, shift);
    let mut two_pi = BigInt::ZERO;
    two_pi.shl1(&pi);
    // Rescaled straight from the full-precision constant with one extra
    // halving folded into the shift, rather than rounding pi to `shift`
    // and then truncating one more bit off of that: round-to-nearest is
    // only correct when it sees every bit the full-precision constant
    // carries, and a second truncation after the first throws that away.
    let half_pi = rescale(&stored_pi::<L, N>(), c_shift + 1, shift);

    let mut base = *src;
    if base.cmp_negative() {
        base.negate();
    }

    if base.cmp_gt(&two_pi) {
        let msb_base = base.index_msb();
        let msb_two_pi = two_pi.index_msb();
        if msb_base - msb_two_pi > 3 {
            let mut quotient = BigInt::ZERO;
            quotient.div(&base, &two_pi);
            let mut consumed = BigInt::ZERO;
            consumed.mul(&quotient, &two_pi);
            base.sub(&consumed);
        } else {
            while base.cmp_gt(&two_pi) {
                base.sub(&two_pi);
            }
        }
    }

    if base.cmp_gt(&pi) {
        let mut reduced = BigInt::ZERO;
        reduced.set_sub(&two_pi, &base);
        base = reduced;
    }

    let mut negate_result = false;
    if base.cmp_gt(&half_pi) {
        let mut reduced = BigInt::ZERO;
        reduced.set_sub(&pi, &base);
        base = reduced;
        negate_result = true;
    }

    let mut one = BigInt::ZERO;
    one.set32_shl(1, shift);
    let mut basesq = BigInt::ZERO;
    basesq.mul_shr(&base, &base, shift);

    let mut term = one;
    let mut sum = one;
    let mut k: u32 = 0;
    loop {
        k += 1;
        let mut next_term = BigInt::ZERO;
        next_term.mul_shr(&term, &basesq, shift);
        let divisor = (2 * k - 1) * (2 * k);
        let mut scaled = BigInt::ZERO;
        scaled.div32_round(&next_term, divisor);
        term = scaled;
        tracing::trace!(k, term_is_zero = term.cmp_zero(), "cos series term");
        if term.cmp_zero() {
            break;
        }
        let mut new_sum = BigInt::ZERO;
        if k % 2 == 1 {
            new_sum.set_sub(&sum, &term);
        } else {
            new_sum.set_add(&sum, &term);
        }
        if new_sum.cmp_eq_or_zero(&sum) {
            sum = new_sum;
            break;
        }
        sum = new_sum;
    }

    if negate_result {
        sum.negate();
    }
    sum
}

/// `sin(src) := cos(src - pi/2)`.
pub fn sin<L: Limb, const N: usize>(src: &BigInt<L, N>, shift: u32) -> BigInt<L, N> {
    let c_shift = constant_shift::<L, N>();
    let half_pi = rescale(&stored_pi::<L, N>(), c_shift + 1, shift);
    let mut shifted = BigInt::ZERO;
    shifted.set_sub(src, &half_pi);
    cos(&shifted, shift)
}

/// `tan(src) := sin(src) / cos(src)`, returning signed infinity (based on
/// the sign of `src`) at the pole where `cos(src) == 0`.
pub fn tan<L: Limb, const N: usize>(src: &BigInt<L, N>, shift: u32) -> BigInt<L, N> {
    let c = cos(src, shift);
    let s = sin(src, shift);
    if c.cmp_zero() {
        return if src.cmp_negative() {
            BigInt::inf_neg()
        } else {
            BigInt::inf_pos()
        };
    }
    let mut scaled_s = BigInt::ZERO;
    scaled_s.shl(&s, shift);
    let mut result = BigInt::ZERO;
    result.div_signed(&scaled_s, &c);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixpoint_kernel::convert::KernelConvert;

    type Bn128 = BigInt<u64, 2>;

    #[test]
    fn cos_of_pi_third_matches_spec_example() {
        let shift = constant_shift::<u64, 2>();
        let pi = stored_pi::<u64, 2>();
        let mut pi_third = Bn128::ZERO;
        pi_third.div32(&pi, 3);
        let result = cos(&pi_third, shift);
        let mut half = Bn128::ZERO;
        half.set32_shl(1, shift - 1);
        let diff = result.get_double(shift) - half.get_double(shift);
        assert!(diff.abs() < 1e-6, "cos(pi/3) = {}", result.get_double(shift));
    }

    #[test]
    fn tan_near_half_pi_grows_large_and_positive() {
        let shift = constant_shift::<u64, 2>();
        let pi = stored_pi::<u64, 2>();
        let mut half_pi = Bn128::ZERO;
        half_pi.shr_round(&pi, 1);

        // cos(pi/2) at this precision: the series converges until its next
        // term rounds to zero, so a few ULPs of residual are expected even
        // with exact rounding at every step; pin that residual down tightly
        // instead of inferring convergence quality from tan's output.
        let c = cos(&half_pi, shift);
        let mut residual = c;
        if residual.is_negative() {
            residual.negate();
        }
        assert!(
            residual.unit(1) == 0 && residual.unit(0) < 1_000_000,
            "cos(pi/2) residual = {c:?}"
        );

        let result = tan(&half_pi, shift);
        assert!(result.cmp_positive());
        // `get_double` returns `f64::INFINITY` for the exact `InfPos`
        // pattern too, so this one comparison covers both the saturated
        // pole and a merely-huge finite quotient.
        assert!(result.get_double(shift) > 1e18);
    }

    #[test]
    fn pythagorean_identity_holds() {
        let shift = 100u32;
        let mut x = Bn128::ZERO;
        x.set_double(0.7, shift);
        let c = cos(&x, shift);
        let s = sin(&x, shift);
        let mut c2 = Bn128::ZERO;
        c2.mul_shr(&c, &c, shift);
        let mut s2 = Bn128::ZERO;
        s2.mul_shr(&s, &s, shift);
        let mut total = Bn128::ZERO;
        total.add(&c2);
        total.add(&s2);
        let diff = total.get_double(shift) - 1.0;
        assert!(diff.abs() < 1e-6, "cos^2+sin^2 = {}", total.get_double(shift));
    }
}
