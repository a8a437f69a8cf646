//! §4.2.3 — exponential.

use crate::constants::{constant_shift, exp_constants, rescale};
use fixpoint_kernel::addsub::KernelAddSub;
use fixpoint_kernel::bits::KernelBits;
use fixpoint_kernel::cmp::KernelCmp;
use fixpoint_kernel::div::KernelDiv;
use fixpoint_kernel::mul::KernelMul;
use fixpoint_kernel::shift::KernelShift;
use fixpoint_types::{BigInt, Limb};

/// Hard cap on range-reduction iterations. Each iteration strips one unit
/// (or one eighth-unit) off the input magnitude; a well-formed fixed-point
/// input at a reasonable `shift` converges in far fewer steps than this,
/// but the cap keeps the routine total even for a pathological
/// `shift = 0` input near the container's max magnitude.
const MAX_REDUCTION_STEPS: u32 = 4096;

/// `e^src`, fixed-point with `shift` fractional bits in and out. Overflow
/// saturates to `InfPos`; underflow returns `0`.
pub fn exp<L: Limb, const N: usize>(src: &BigInt<L, N>, shift: u32) -> BigInt<L, N> {
    let stored = exp_constants::<L, N>();
    let c_shift = constant_shift::<L, N>();
    let e = rescale(&stored.e, c_shift, shift);
    let e_inv = rescale(&stored.e_inv, c_shift, shift);
    let e_eighth = rescale(&stored.e_eighth, c_shift, shift);

    let mut one = BigInt::ZERO;
    one.set32_shl(1, shift);
    let mut eighth = BigInt::ZERO;
    eighth.shr(&one, 3);
    let mut sixteenth = BigInt::ZERO;
    sixteenth.shr(&one, 4);

    let mut base = *src;
    let mut factor = one;
    let mut has_factor = false;

    let mut steps = 0u32;
    while base.cmp_gt(&one) {
        let mut next_factor = BigInt::ZERO;
        let overflow = next_factor.mul_check_shr(&factor, &e, shift);
        if overflow {
            tracing::warn!(steps, "exp range reduction overflowed, saturating to InfPos");
            return BigInt::inf_pos();
        }
        factor = next_factor;
        has_factor = true;
        base.sub(&one);
        steps += 1;
        if steps > MAX_REDUCTION_STEPS {
            return BigInt::inf_pos();
        }
    }

    steps = 0;
    while base.cmp_negative() {
        let mut next_factor = BigInt::ZERO;
        next_factor.mul_shr(&factor, &e_inv, shift);
        factor = next_factor;
        has_factor = true;
        if factor.cmp_zero() {
            return BigInt::ZERO;
        }
        base.add32(1);
        steps += 1;
        if steps > MAX_REDUCTION_STEPS {
            return BigInt::ZERO;
        }
    }

    while base.cmp_gt(&sixteenth) {
        let mut next_factor = BigInt::ZERO;
        next_factor.mul_shr(&factor, &e_eighth, shift);
        factor = next_factor;
        has_factor = true;
        base.sub(&eighth);
    }

    let x = base;
    let mut term = one;
    let mut sum = one;
    let mut n: u32 = 0;
    loop {
        n += 1;
        let mut next_term = BigInt::ZERO;
        next_term.mul_shr(&term, &x, shift);
        let mut scaled = BigInt::ZERO;
        scaled.div32_round(&next_term, n);
        term = scaled;
        tracing::trace!(n, term_is_zero = term.cmp_zero(), "exp series term");
        if term.cmp_zero() {
            break;
        }
        let mut new_sum = BigInt::ZERO;
        new_sum.set_add(&sum, &term);
        if new_sum.cmp_eq_or_zero(&sum) {
            sum = new_sum;
            break;
        }
        sum = new_sum;
    }

    if !has_factor {
        return sum;
    }
    let mut result = BigInt::ZERO;
    result.mul_shr(&sum, &factor, shift);
    result
}
