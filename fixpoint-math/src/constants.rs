//! §4.2 "Constants" — Pi, the natural log/exp family, and the 1.0625
//! range-reduction multiplier/divider, computed once per width via
//! convergent series rather than transcribed per-width hex tables.
//!
//! Each constant is generic over `BigInt<L, N>`. Because a `static` item
//! cannot itself be generic over an enclosing function's type parameters,
//! the memoisation cache is keyed by `TypeId` of the concrete `BigInt<L, N>`
//! instead of relying on per-monomorphisation statics — one entry per width
//! actually used, populated lazily on first use and shared thereafter.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use fixpoint_kernel::addsub::KernelAddSub;
use fixpoint_kernel::bits::KernelBits;
use fixpoint_kernel::cmp::KernelCmp;
use fixpoint_kernel::div::KernelDiv;
use fixpoint_kernel::mul::KernelMul;
use fixpoint_kernel::shift::KernelShift;
use fixpoint_types::{BigInt, Limb};

fn cache() -> &'static Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>> {
    static CACHE: OnceLock<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn get_or_compute<T, K>(build: impl FnOnce() -> T) -> T
where
    T: Any + Send + Sync + Clone,
    K: Any + 'static,
{
    let key = TypeId::of::<K>();
    let mut map = cache().lock().expect("constant cache poisoned");
    map.entry(key)
        .or_insert_with(|| Box::new(build()) as Box<dyn Any + Send + Sync>)
        .downcast_ref::<T>()
        .expect("constant cache type mismatch is a programming error")
        .clone()
}

/// The fractional-bit position every bootstrapped constant is stored at:
/// `W - 2`, matching spec.md's "typically W-2 for Pi" convention so a
/// single working shift covers Pi, the logs, and the exp family without
/// per-constant bookkeeping.
pub fn constant_shift<L: Limb, const N: usize>() -> u32 {
    BigInt::<L, N>::WIDTH - 2
}

fn reciprocal<L: Limb, const N: usize>(denom: u32, shift: u32) -> BigInt<L, N> {
    let mut one = BigInt::ZERO;
    one.set32_shl(1, shift);
    let d = BigInt::from(denom as u64);
    let mut out = BigInt::ZERO;
    out.div(&one, &d);
    out
}

/// `sum_{k=0}^{inf} sign^k * x^(2k+1) / (2k+1)`, evaluated at fixed-point
/// `shift`. With `alternate = false` this is the `atanh` series (all terms
/// added); with `alternate = true` it is `atan` (Leibniz-style alternating
/// series). Both `ln(2)`/`ln(1.0625)` and `Pi` bootstrap from this one
/// routine, matching the paired-term evaluation style the kernel's own
/// `Log`/`Exp`/`Cos` use post range-reduction.
fn odd_power_series<L: Limb, const N: usize>(
    x: BigInt<L, N>,
    alternate: bool,
    shift: u32,
) -> BigInt<L, N> {
    let mut x2 = BigInt::ZERO;
    x2.mul_shr(&x, &x, shift);

    let mut term = x;
    let mut sum = x;
    let mut n: u32 = 1;
    loop {
        let mut next_term = BigInt::ZERO;
        next_term.mul_shr(&term, &x2, shift);
        term = next_term;
        n += 2;

        let mut add_term = BigInt::ZERO;
        add_term.div32_round(&term, n);
        if add_term.cmp_zero() {
            break;
        }

        // Leibniz sign: term k = (n-1)/2 is negated when k is odd, i.e.
        // whenever n % 4 == 3 (n runs 1, 3, 5, 7, ... and k runs 0, 1, 2, 3, ...).
        let mut new_sum = BigInt::ZERO;
        if alternate && (n % 4 == 3) {
            new_sum.set_sub(&sum, &add_term);
        } else {
            new_sum.set_add(&sum, &add_term);
        }
        if new_sum.cmp_eq_or_zero(&sum) {
            sum = new_sum;
            break;
        }
        sum = new_sum;
    }
    sum
}

/// A paired-term Taylor evaluation of `e^x` for small `x` (no range
/// reduction) — the exact series `Exp` itself evaluates after its own
/// range reduction has driven `|x| <= 1/16`. Used here to bootstrap
/// `e^0.125` directly; correctness does not depend on the `1/16` bound,
/// only on convergence speed, and `x = 1/8` still converges in well under
/// `DivFactor`'s iteration bound.
pub(crate) fn series_exp<L: Limb, const N: usize>(x: BigInt<L, N>, shift: u32) -> BigInt<L, N> {
    let mut one = BigInt::ZERO;
    one.set32_shl(1, shift);

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
    sum
}

#[derive(Clone, Copy)]
pub struct LogConstants<L: Limb, const N: usize> {
    pub ln2: BigInt<L, N>,
    pub ln1p0625: BigInt<L, N>,
}

#[derive(Clone, Copy)]
pub struct ExpConstants<L: Limb, const N: usize> {
    pub e: BigInt<L, N>,
    pub e_inv: BigInt<L, N>,
    pub e_eighth: BigInt<L, N>,
}

pub fn pi<L: Limb, const N: usize>() -> BigInt<L, N> {
    get_or_compute::<BigInt<L, N>, BigInt<L, N>>(|| {
        let shift = constant_shift::<L, N>();
        let one_fifth: BigInt<L, N> = reciprocal(5, shift);
        let one_239th: BigInt<L, N> = reciprocal(239, shift);
        let atan5 = odd_power_series(one_fifth, true, shift);
        let atan239 = odd_power_series(one_239th, true, shift);
        let mut sixteen_atan5 = BigInt::ZERO;
        sixteen_atan5.mul32(&atan5, 16);
        let mut four_atan239 = BigInt::ZERO;
        four_atan239.mul32(&atan239, 4);
        let mut result = BigInt::ZERO;
        result.set_sub(&sixteen_atan5, &four_atan239);
        result
    })
}

pub fn log_constants<L: Limb, const N: usize>() -> LogConstants<L, N> {
    get_or_compute::<LogConstants<L, N>, LogConstants<L, N>>(|| {
        let shift = constant_shift::<L, N>();
        let one_third: BigInt<L, N> = reciprocal(3, shift);
        let one_33rd: BigInt<L, N> = reciprocal(33, shift);
        let mut ln2 = BigInt::ZERO;
        ln2.shl1(&odd_power_series(one_third, false, shift));
        let mut ln1p0625 = BigInt::ZERO;
        ln1p0625.shl1(&odd_power_series(one_33rd, false, shift));
        LogConstants { ln2, ln1p0625 }
    })
}

/// Re-scale a value stored at `from_shift` fractional bits to `to_shift`
/// fractional bits. Used to bring the bootstrapped constants (always
/// cached at [`constant_shift`]) to whatever `shift` a caller's operation
/// is working at.
pub fn rescale<L: Limb, const N: usize>(
    v: &BigInt<L, N>,
    from_shift: u32,
    to_shift: u32,
) -> BigInt<L, N> {
    if to_shift == from_shift {
        return *v;
    }
    let mut out = BigInt::ZERO;
    if to_shift > from_shift {
        out.shl(v, to_shift - from_shift);
    } else {
        out.shr_round(v, from_shift - to_shift);
    }
    out
}

pub fn exp_constants<L: Limb, const N: usize>() -> ExpConstants<L, N> {
    get_or_compute::<ExpConstants<L, N>, ExpConstants<L, N>>(|| {
        let shift = constant_shift::<L, N>();
        let one_eighth: BigInt<L, N> = reciprocal(8, shift);
        let e_eighth = series_exp(one_eighth, shift);
        // e = (e^(1/8))^8, by three repeated squarings (8 = 2^3) rather
        // than the general PowInt loop since the exponent is a compile
        // time constant here.
        let mut e_quarter = BigInt::ZERO;
        e_quarter.mul_shr(&e_eighth, &e_eighth, shift);
        let mut e_half = BigInt::ZERO;
        e_half.mul_shr(&e_quarter, &e_quarter, shift);
        let mut e = BigInt::ZERO;
        e.mul_shr(&e_half, &e_half, shift);

        let mut one = BigInt::ZERO;
        one.set32_shl(1, shift);
        let mut e_inv = BigInt::ZERO;
        e_inv.div(&one, &e);

        ExpConstants { e, e_inv, e_eighth }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixpoint_kernel::convert::KernelConvert;

    type Bn256 = BigInt<u64, 4>;

    #[test]
    fn pi_matches_f64_within_ulps() {
        let shift = constant_shift::<u64, 4>();
        let p = pi::<u64, 4>();
        let as_f64 = p.get_double(shift);
        assert!((as_f64 - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn ln2_matches_f64_within_ulps() {
        let shift = constant_shift::<u64, 4>();
        let c = log_constants::<u64, 4>();
        let as_f64 = c.ln2.get_double(shift);
        assert!((as_f64 - std::f64::consts::LN_2).abs() < 1e-9);
    }

    #[test]
    fn e_matches_f64_within_ulps() {
        let shift = constant_shift::<u64, 4>();
        let c = exp_constants::<u64, 4>();
        let as_f64 = c.e.get_double(shift);
        assert!((as_f64 - std::f64::consts::E).abs() < 1e-9);
    }

    #[test]
    fn e_inv_is_reciprocal_of_e() {
        let shift = constant_shift::<u64, 4>();
        let c = exp_constants::<u64, 4>();
        let mut product = Bn256::ZERO;
        product.mul_shr(&c.e, &c.e_inv, shift);
        let mut one = Bn256::ZERO;
        one.set32_shl(1, shift);
        let diff = product.get_double(shift) - one.get_double(shift);
        assert!(diff.abs() < 1e-6);
    }
}
