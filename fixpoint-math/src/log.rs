//! §4.2.2 — natural logarithm.

use crate::constants::{constant_shift, log_constants, rescale};
use fixpoint_kernel::addsub::KernelAddSub;
use fixpoint_kernel::bits::KernelBits;
use fixpoint_kernel::cmp::KernelCmp;
use fixpoint_kernel::div::KernelDiv;
use fixpoint_kernel::mul::KernelMul;
use fixpoint_kernel::shift::KernelShift;
use fixpoint_types::{BigInt, Limb};

/// `log(src)`, fixed-point with `shift` fractional bits in and out.
/// Non-positive input returns zero (domain error is silent, per §4.1.7's
/// "no trapping" contract extended to the transcendental layer).
pub fn log<L: Limb, const N: usize>(src: &BigInt<L, N>, shift: u32) -> BigInt<L, N> {
    if src.cmp_negative() || src.cmp_zero() {
        return BigInt::ZERO;
    }

    let stored = log_constants::<L, N>();
    let c_shift = constant_shift::<L, N>();
    let ln2 = rescale(&stored.ln2, c_shift, shift);
    let ln1p0625 = rescale(&stored.ln1p0625, c_shift, shift);

    let mut one = BigInt::ZERO;
    one.set32_shl(1, shift);
    let mut two = BigInt::ZERO;
    two.shl1(&one);
    let mut half = BigInt::ZERO;
    half.shr1(&one);

    // 33/32 and 31/32, the range-reduction band around 1.0.
    let mut eps = BigInt::ZERO;
    eps.shr(&one, 5);
    let mut hi_band = BigInt::ZERO;
    hi_band.set_add(&one, &eps);
    let mut lo_band = BigInt::ZERO;
    lo_band.set_sub(&one, &eps);

    // 1.0625 and its reciprocal.
    let mut sixteenth = BigInt::ZERO;
    sixteenth.shr(&one, 4);
    let mut mul_1p0625 = BigInt::ZERO;
    mul_1p0625.set_add(&one, &sixteenth);
    let mut div_1p0625 = BigInt::ZERO;
    div_1p0625.div(&one, &mul_1p0625);

    let mut base = *src;
    let mut acc = BigInt::ZERO;

    while base.cmp_gt(&two) {
        let mut halved = BigInt::ZERO;
        halved.shr1(&base);
        base = halved;
        acc.add(&ln2);
    }
    while base.cmp_lt(&half) {
        let mut doubled = BigInt::ZERO;
        doubled.shl1(&base);
        base = doubled;
        acc.sub(&ln2);
    }
    while base.cmp_gt(&hi_band) {
        let mut reduced = BigInt::ZERO;
        reduced.mul_shr(&base, &div_1p0625, shift);
        base = reduced;
        acc.add(&ln1p0625);
    }
    while base.cmp_lt(&lo_band) {
        let mut reduced = BigInt::ZERO;
        reduced.mul_shr(&base, &mul_1p0625, shift);
        base = reduced;
        acc.sub(&ln1p0625);
    }

    let mut x = BigInt::ZERO;
    x.set_sub(&base, &one);

    let mut sum = x;
    let mut power = x;
    let mut n: u32 = 1;
    loop {
        n += 1;
        let mut next_power = BigInt::ZERO;
        next_power.mul_shr(&power, &x, shift);
        power = next_power;

        let mut term = BigInt::ZERO;
        term.div32_round(&power, n);
        tracing::trace!(n, term_is_zero = term.cmp_zero(), "log series term");
        if term.cmp_zero() {
            break;
        }

        let mut new_sum = BigInt::ZERO;
        if n % 2 == 0 {
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

    let mut result = BigInt::ZERO;
    result.set_add(&acc, &sum);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{constant_shift, exp_constants};
    use fixpoint_kernel::convert::KernelConvert;

    type Bn256 = BigInt<u64, 4>;

    #[test]
    fn log_of_e_is_one() {
        let shift = constant_shift::<u64, 4>();
        let e = exp_constants::<u64, 4>().e;
        let result = log(&e, shift);
        let mut one = Bn256::ZERO;
        one.set32_shl(1, shift);
        let diff = result.get_double(shift) - one.get_double(shift);
        assert!(diff.abs() < 1e-6, "log(e) = {}", result.get_double(shift));
    }

    #[test]
    fn log_of_nonpositive_is_zero() {
        let zero = Bn256::ZERO;
        assert_eq!(log(&zero, 64), Bn256::ZERO);
    }

    #[test]
    fn log_matches_f64_for_small_values() {
        let shift = 100u32;
        let mut x = Bn256::ZERO;
        x.set_double(3.5, shift);
        let result = log(&x, shift);
        let as_f64 = result.get_double(shift);
        assert!((as_f64 - 3.5f64.ln()).abs() < 1e-6);
    }
}
