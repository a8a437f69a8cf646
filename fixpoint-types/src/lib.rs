//! Atomic types of the fixpoint arithmetic core: the [`Limb`] unit
//! primitive trait and the width-parameterised [`BigInt`] value type.
//!
//! This crate owns data, not behaviour — see `fixpoint-kernel` for the
//! operation set (§4.1) and `fixpoint-math` for the transcendental and I/O
//! layers built on top of it.

#![cfg_attr(not(feature = "std"), no_std)]

mod bigint;
mod limb;
mod widths;

pub use bigint::BigInt;
pub use limb::Limb;
pub use widths::*;
