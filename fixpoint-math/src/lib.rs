//! §4.2/§4.3 — transcendental routines and I/O, built on `fixpoint-kernel`.
//! Owns constant bootstrapping (§4.2.6): `pi`, `ln2`, `e` and friends are
//! computed once per width from convergent series and cached, never
//! transcribed as per-width hex literals.

pub mod constants;
pub mod divfactor;
pub mod exp;
pub mod io;
pub mod log;
pub mod pow;
pub mod sqrt;
pub mod trig;

pub use divfactor::{divfactor_128, DIVFACTOR_LEN, DIVFACTOR_SHIFT};
pub use exp::exp;
pub use io::{print_decimal, print_radix, scan_decimal, Radix};
pub use log::log;
pub use pow::{pow, pow_int};
pub use sqrt::sqrt;
pub use trig::{cos, sin, tan};
