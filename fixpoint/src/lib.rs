//! Fixed-width, two's-complement, fixed-point bignum arithmetic with a
//! small scripting runtime layered on top.
//!
//! - [`fixpoint_types`] / [`fixpoint_kernel`] — §4.1 the `BigInt<L, N>`
//!   container and its kernel operation set (add/sub/mul/div/shift/cmp/bit).
//! - [`fixpoint_math`] — §4.2/§4.3 transcendental routines and decimal/hex/
//!   binary I/O built on the kernel.
//! - [`fixpoint_script_asm`] / [`fixpoint_script_vm`] — §4.4 the scripting
//!   language's lexer/parser/emitter and its bytecode interpreter.
//! - [`host`] — §6 the single-instance lock and config-file parser a host
//!   process built on this crate needs.

pub mod host;

pub use fixpoint_kernel as kernel;
pub use fixpoint_math as math;
pub use fixpoint_script_asm as script_asm;
pub use fixpoint_script_vm as script_vm;
pub use fixpoint_types as types;

pub use fixpoint_types::{
    BigInt, Bn1024, Bn1024x32, Bn128, Bn128x32, Bn192, Bn192x32, Bn256, Bn256x32, Bn512,
    Bn512x32, Limb,
};
