//! Named widths, matching spec.md's W ∈ {128, 192, 256, 512, 1024}.
//!
//! The 64-bit-limb aliases are the ones the rest of the workspace builds on.
//! The `x32` aliases exist so the B ∈ {32, 64} leg of §8's invariants can be
//! exercised against a second, independent limb size without any code
//! duplication — they are the same generic `BigInt<L, N>`, just instantiated
//! with `L = u32` and twice the limb count.

use crate::bigint::BigInt;

pub type Bn128 = BigInt<u64, 2>;
pub type Bn192 = BigInt<u64, 3>;
pub type Bn256 = BigInt<u64, 4>;
pub type Bn512 = BigInt<u64, 8>;
pub type Bn1024 = BigInt<u64, 16>;

pub type Bn128x32 = BigInt<u32, 4>;
pub type Bn192x32 = BigInt<u32, 6>;
pub type Bn256x32 = BigInt<u32, 8>;
pub type Bn512x32 = BigInt<u32, 16>;
pub type Bn1024x32 = BigInt<u32, 32>;
