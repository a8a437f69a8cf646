//! The fixed-width arithmetic kernel: every operation in this crate takes
//! `O(N)` limb operations (or `O(N^2)` for multiply/divide) and never
//! panics on a well-formed `BigInt`, matching the host-callable contract
//! these routines were grounded on.

pub mod addsub;
pub mod bits;
pub mod cmp;
pub mod convert;
pub mod div;
pub mod mul;
pub mod shift;
pub mod util;

pub use addsub::KernelAddSub;
pub use bits::KernelBits;
pub use cmp::KernelCmp;
pub use convert::KernelConvert;
pub use div::KernelDiv;
pub use mul::{mul_extended, KernelMul};
pub use shift::KernelShift;

use fixpoint_types::{BigInt, Limb};

/// Convenience supertrait bundling the full kernel operation set so callers
/// needing several families at once don't have to import each piece.
pub trait Kernel:
    KernelBits + KernelAddSub + KernelMul + KernelDiv + KernelShift + KernelCmp + KernelConvert
{
}

impl<L: Limb, const N: usize> Kernel for BigInt<L, N> {}
