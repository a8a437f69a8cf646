//! End-to-end coverage of the §8 worked scenarios, exercised against the
//! crate's public API rather than from inside the modules that implement
//! them — promoted here the way the teacher keeps its cross-module
//! scenarios in a top-level `tests/` directory instead of buried in a
//! single module's `#[cfg(test)]` block.

use fixpoint_kernel::addsub::KernelAddSub;
use fixpoint_kernel::cmp::KernelCmp;
use fixpoint_kernel::convert::KernelConvert;
use fixpoint_kernel::div::KernelDiv;
use fixpoint_math::{cos, log, print_decimal, scan_decimal, sqrt, tan};
use fixpoint_types::BigInt;

type Bn128 = BigInt<u64, 2>;
type Bn256 = BigInt<u64, 4>;

#[test]
fn sqrt_of_two_at_shift_124() {
    let mut x = Bn128::ZERO;
    x.set_double(2.0, 124);
    let r = sqrt(&x, 124);
    assert_eq!(r.unit(1) >> 4, 0x16A09E667F3BCC9);
}

#[test]
fn log_of_e_at_shift_126() {
    let shift = 126u32;
    let mut e = Bn256::ZERO;
    e.set_double(std::f64::consts::E, shift);
    let result = log(&e, shift);
    let as_f64 = result.get_double(shift);
    assert!((as_f64 - 1.0).abs() < 1e-6, "log(e) = {as_f64}");
}

#[test]
fn cos_of_pi_third_at_shift_126() {
    let shift = 126u32;
    let mut pi_third = Bn256::ZERO;
    pi_third.set_double(std::f64::consts::FRAC_PI_3, shift);
    let result = cos(&pi_third, shift);
    let as_f64 = result.get_double(shift);
    assert!((as_f64 - 0.5).abs() < 1e-6, "cos(pi/3) = {as_f64}");
}

#[test]
fn print_negative_one_third_as_decimal() {
    let shift = 126u32;
    let mut one = Bn256::ZERO;
    one.set32_shl(1, shift);
    let three = Bn256::from(3u64);
    let mut one_third = Bn256::ZERO;
    one_third.div(&one, &three);
    one_third.negate();
    let s = print_decimal(&one_third, shift, 20, true);
    assert_eq!(s, "-0.33333333333333333333");
}

#[test]
fn scan_pi_then_get_double_round_trips() {
    let shift = 126u32;
    let v: Bn256 = scan_decimal("3.14159265358979323846", shift);
    let as_f64 = v.get_double(shift);
    assert!((as_f64 - std::f64::consts::PI).abs() < 1e-9);
}

#[test]
fn tan_of_half_pi_saturates_to_positive_infinity() {
    let shift = 126u32;
    let mut half_pi = Bn128::ZERO;
    half_pi.set_double(std::f64::consts::FRAC_PI_2, shift);
    let result = tan(&half_pi, shift);
    assert!(result.cmp_positive());
    // `half_pi` here round-trips through an f64, so it's already off from
    // the true pi/2 by f64's own ~2^-53 relative precision before the
    // fixed-point cosine ever runs; `get_double` maps the exact `InfPos`
    // pattern to `f64::INFINITY`, so this single comparison covers both
    // the saturated pole and a large-but-finite quotient.
    assert!(result.get_double(shift) > 1e18);
}
