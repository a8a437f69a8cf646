//! §4.3 — decimal, hex and binary I/O.
//!
//! The original's decimal fraction extraction multiplies a running
//! reciprocal-divisor by 10 each digit and doubles it (tracking a
//! `postshift` correction) whenever that would overflow its register — a
//! trick for working entirely in fixed registers without a wider
//! intermediate type. Since we're generic over `N` already we extract
//! fraction digits the more direct way: repeatedly multiply the fractional
//! remainder by 10 and take the integer part that falls out above the
//! binary point. Same digit sequence, no register-overflow bookkeeping to
//! replicate by hand.

use fixpoint_kernel::addsub::KernelAddSub;
use fixpoint_kernel::bits::KernelBits;
use fixpoint_kernel::cmp::KernelCmp;
use fixpoint_kernel::div::KernelDiv;
use fixpoint_kernel::mul::KernelMul;
use fixpoint_kernel::shift::KernelShift;
use fixpoint_types::{BigInt, Limb};

/// Print `value` (fixed-point, `shift` fractional bits) as a decimal
/// string with up to `fraction_digits` digits after the point (clamped to
/// `W - 1`, per spec.md's clamp rule). `signed` selects two's-complement
/// interpretation; unsigned callers should pass `false`.
pub fn print_decimal<L: Limb, const N: usize>(
    value: &BigInt<L, N>,
    shift: u32,
    fraction_digits: u32,
    signed: bool,
) -> String {
    let width = BigInt::<L, N>::WIDTH;
    let fraction_digits = fraction_digits.min(width.saturating_sub(1));

    let mut v = *value;
    let negative = signed && v.is_negative();
    if negative {
        v.negate();
    }

    let mut int_part = BigInt::ZERO;
    int_part.shr(&v, shift);

    let mut frac_mask = BigInt::ZERO;
    frac_mask.shl(&int_part, shift);
    let mut frac = BigInt::ZERO;
    frac.set_sub(&v, &frac_mask);

    // Integer digits, least-significant first.
    let mut int_digits = Vec::new();
    if int_part.cmp_zero() {
        int_digits.push(0u8);
    } else {
        while int_part.cmp_not_zero() {
            let mut q = BigInt::ZERO;
            let r = q.div32(&int_part, 10);
            int_digits.push(r as u8);
            int_part = q;
        }
    }

    // Fraction digits, most-significant first, with one extra guard digit
    // to decide whether to round the last kept digit up.
    let mut frac_digits = Vec::with_capacity((fraction_digits + 1) as usize);
    let mut remainder = frac;
    for _ in 0..=fraction_digits {
        let mut scaled = BigInt::ZERO;
        scaled.mul32(&remainder, 10);
        let mut digit_val = BigInt::ZERO;
        digit_val.shr(&scaled, shift);
        let digit = digit_val.unit(0) as u8;
        let mut digit_shifted = BigInt::ZERO;
        digit_shifted.shl(&digit_val, shift);
        let mut next_remainder = BigInt::ZERO;
        next_remainder.set_sub(&scaled, &digit_shifted);
        remainder = next_remainder;
        frac_digits.push(digit);
    }
    let round_up = frac_digits.pop().unwrap_or(0) >= 5;

    if round_up {
        let mut carry = true;
        for d in frac_digits.iter_mut().rev() {
            if !carry {
                break;
            }
            *d += 1;
            if *d == 10 {
                *d = 0;
            } else {
                carry = false;
            }
        }
        if carry {
            for d in int_digits.iter_mut() {
                if !carry {
                    break;
                }
                *d += 1;
                if *d == 10 {
                    *d = 0;
                } else {
                    carry = false;
                }
            }
            if carry {
                int_digits.push(1);
            }
        }
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    for d in int_digits.iter().rev() {
        out.push((b'0' + d) as char);
    }
    if fraction_digits > 0 {
        out.push('.');
        for d in frac_digits.iter() {
            out.push((b'0' + d) as char);
        }
    }
    out
}

/// Radix for `print_radix` — the two non-decimal bases spec.md's I/O
/// section calls out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Radix {
    Binary,
    Hex,
}

impl Radix {
    fn bits_per_digit(self) -> u32 {
        match self {
            Radix::Binary => 1,
            Radix::Hex => 4,
        }
    }

    fn digit_char(self, value: u32) -> char {
        match self {
            Radix::Binary => (b'0' + value as u8) as char,
            Radix::Hex => {
                if value < 10 {
                    (b'0' + value as u8) as char
                } else {
                    (b'a' + (value - 10) as u8) as char
                }
            }
        }
    }
}

/// Print `value`'s raw bit pattern in `radix`, splitting at `point` (the
/// number of low bits treated as fractional): digits from the top bit down
/// to `point` form the integer part, and (if `fraction_digits > 0`) a `.`
/// followed by up to `fraction_digits` digits from `point - 1` down cover
/// the fraction. This is a positional dump of the stored bits, not a
/// value-preserving re-round like `print_decimal` — hex/binary readers are
/// expected to know the container's `point`.
pub fn print_radix<L: Limb, const N: usize>(
    value: &BigInt<L, N>,
    radix: Radix,
    point: u32,
    fraction_digits: u32,
    signed: bool,
) -> String {
    let width = BigInt::<L, N>::WIDTH;
    let point = point.min(width);
    let digit_bits = radix.bits_per_digit();

    let mut v = *value;
    let negative = signed && v.is_negative();
    if negative {
        v.negate();
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }

    let int_bits = width - point;
    let int_digit_count = int_bits.div_ceil(digit_bits).max(1);
    let mut digits = Vec::with_capacity(int_digit_count as usize);
    for i in (0..int_digit_count).rev() {
        let lo = point + i * digit_bits;
        digits.push(extract_digit(&v, lo, digit_bits));
    }
    // Trim leading zero digits, but always keep at least one.
    let first_nonzero = digits.iter().position(|&d| d != 0).unwrap_or(digits.len() - 1);
    for &d in &digits[first_nonzero..] {
        out.push(radix.digit_char(d));
    }

    if fraction_digits > 0 && point > 0 {
        out.push('.');
        let count = fraction_digits.min(point.div_ceil(digit_bits));
        for i in 0..count {
            let hi = point.saturating_sub(i * digit_bits);
            let lo = hi.saturating_sub(digit_bits);
            out.push(radix.digit_char(extract_digit(&v, lo, digit_bits)));
        }
    }
    out
}

fn extract_digit<L: Limb, const N: usize>(value: &BigInt<L, N>, lo: u32, bits: u32) -> u32 {
    let mut out = 0u32;
    for i in 0..bits {
        if value.extract_bit(lo + i) {
            out |= 1 << i;
        }
    }
    out
}

/// Parse a decimal string into a fixed-point value at `shift` fractional
/// bits. Accepts an optional leading `-`, integer digits, an optional `.`,
/// and fraction digits.
pub fn scan_decimal<L: Limb, const N: usize>(input: &str, shift: u32) -> BigInt<L, N> {
    let input = input.trim();
    let (negative, rest) = match input.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, input),
    };
    let (int_str, frac_str) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };

    let mut dst = BigInt::ZERO;
    for ch in int_str.bytes() {
        if !ch.is_ascii_digit() {
            continue;
        }
        let digit = (ch - b'0') as u32;
        let mut scaled = BigInt::ZERO;
        scaled.mul32(&dst, 10);
        dst = scaled;
        dst.add32_shl(digit, shift);
    }

    // Fraction digits: accumulate as a plain decimal integer in-width
    // (clamped so `frac_bigint * 2^shift` can't overflow the container),
    // then divide by the matching power of ten at the target shift in one
    // shot: `frac / 10^count` computed as `(frac << shift) / 10^count`.
    let width = BigInt::<L, N>::WIDTH;
    let max_frac_digits = (width / 4).min(38);
    let mut frac_bigint = BigInt::ZERO;
    let mut frac_count: u32 = 0;
    for ch in frac_str.bytes() {
        if !ch.is_ascii_digit() || frac_count >= max_frac_digits {
            continue;
        }
        let digit = (ch - b'0') as u32;
        let mut scaled = BigInt::ZERO;
        scaled.mul32(&frac_bigint, 10);
        frac_bigint = scaled;
        frac_bigint.add32(digit);
        frac_count += 1;
    }
    if frac_count > 0 {
        let mut numerator = BigInt::ZERO;
        numerator.set32_shl(1, shift);
        let mut scaled_numerator = BigInt::ZERO;
        scaled_numerator.mul(&numerator, &frac_bigint);

        let mut denom = BigInt::ZERO;
        denom.set32(1);
        for _ in 0..frac_count {
            let mut next = BigInt::ZERO;
            next.mul32(&denom, 10);
            denom = next;
        }
        let mut frac_part = BigInt::ZERO;
        frac_part.div_round(&scaled_numerator, &denom);
        dst.add(&frac_part);
    }

    if negative {
        dst.negate();
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixpoint_kernel::convert::KernelConvert;
    use fixpoint_kernel::mul::KernelMul;

    type Bn256 = BigInt<u64, 4>;

    #[test]
    fn print_matches_spec_example() {
        let shift = 126u32;
        let mut one_third = Bn256::ZERO;
        let mut one = Bn256::ZERO;
        one.set32_shl(1, shift);
        let three = Bn256::from(3u64);
        one_third.div(&one, &three);
        one_third.negate();
        let s = print_decimal(&one_third, shift, 20, true);
        assert_eq!(s, "-0.33333333333333333333");
    }

    #[test]
    fn scan_then_double_matches_pi() {
        let shift = 126u32;
        let v: Bn256 = scan_decimal("3.14159265358979323846", shift);
        let as_f64 = v.get_double(shift);
        assert!((as_f64 - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn print_scan_round_trip() {
        let shift = 100u32;
        let mut x = Bn256::ZERO;
        x.set_double(123.456, shift);
        let s = print_decimal(&x, shift, 30, true);
        let back: Bn256 = scan_decimal(&s, shift);
        let diff = back.get_double(shift) - x.get_double(shift);
        assert!(diff.abs() < 1e-9);
    }

    #[test]
    fn print_radix_hex_integer_value() {
        let shift = 64u32;
        let mut v = Bn256::ZERO;
        v.set32(0xabcd);
        let int_value = v;
        v.shl(&int_value, shift);
        let s = print_radix(&v, Radix::Hex, shift, 0, true);
        assert_eq!(s, "abcd");
    }

    #[test]
    fn print_radix_binary_matches_bit_pattern() {
        let mut v = Bn256::ZERO;
        v.set32(0b1011);
        let s = print_radix(&v, Radix::Binary, 0, 0, false);
        assert_eq!(s, "1011");
    }

    #[test]
    fn print_integer_value_has_no_fraction_noise() {
        let shift = 64u32;
        let mut v = Bn256::ZERO;
        v.set32(42);
        let int_value = v;
        v.shl(&int_value, shift);
        let s = print_decimal(&v, shift, 6, true);
        assert_eq!(s, "42.000000");
    }
}
