//! The acceleration seam.
//!
//! Every lanewise operation offers its opcode, its statically-typed operands
//! and a portable fallback closure to the active backend. The closure is the
//! specification of correctness; a backend that recognizes the opcode and
//! shape may compute the result natively, and everything else must be
//! answered by invoking the closure. A backend therefore can never change
//! observable behavior, only speed.
//!
//! Backends must be referentially transparent and safe to call from any
//! number of threads with no shared scratch state.

use crate::element::Element;
use crate::mask::Mask;
use crate::ops::{Associative, Binary, Comparison, Ternary, Test, Unary};
use crate::shuffle::Shuffle;
use crate::vector::Vector;

#[allow(unused_variables)]
pub trait Backend: Send + Sync {
    fn lanewise_unary<E: Element, const N: usize>(
        &self,
        op: Unary,
        a: &Vector<E, N>,
        m: Option<&Mask<E, N>>,
        fallback: impl FnOnce() -> Vector<E, N>,
    ) -> Vector<E, N> {
        fallback()
    }

    fn lanewise_binary<E: Element, const N: usize>(
        &self,
        op: Binary,
        a: &Vector<E, N>,
        b: &Vector<E, N>,
        m: Option<&Mask<E, N>>,
        fallback: impl FnOnce() -> Vector<E, N>,
    ) -> Vector<E, N> {
        fallback()
    }

    fn lanewise_shift<E: Element, const N: usize>(
        &self,
        op: Binary,
        a: &Vector<E, N>,
        amount: u32,
        m: Option<&Mask<E, N>>,
        fallback: impl FnOnce() -> Vector<E, N>,
    ) -> Vector<E, N> {
        fallback()
    }

    fn lanewise_ternary<E: Element, const N: usize>(
        &self,
        op: Ternary,
        a: &Vector<E, N>,
        b: &Vector<E, N>,
        c: &Vector<E, N>,
        m: Option<&Mask<E, N>>,
        fallback: impl FnOnce() -> Vector<E, N>,
    ) -> Vector<E, N> {
        fallback()
    }

    fn reduce<E: Element, const N: usize>(
        &self,
        op: Associative,
        a: &Vector<E, N>,
        m: Option<&Mask<E, N>>,
        fallback: impl FnOnce() -> E,
    ) -> E {
        fallback()
    }

    fn compare<E: Element, const N: usize>(
        &self,
        op: Comparison,
        a: &Vector<E, N>,
        b: &Vector<E, N>,
        m: Option<&Mask<E, N>>,
        fallback: impl FnOnce() -> Mask<E, N>,
    ) -> Mask<E, N> {
        fallback()
    }

    fn test<E: Element, const N: usize>(
        &self,
        op: Test,
        a: &Vector<E, N>,
        m: Option<&Mask<E, N>>,
        fallback: impl FnOnce() -> Mask<E, N>,
    ) -> Mask<E, N> {
        fallback()
    }

    fn blend<E: Element, const N: usize>(
        &self,
        a: &Vector<E, N>,
        b: &Vector<E, N>,
        m: &Mask<E, N>,
        fallback: impl FnOnce() -> Vector<E, N>,
    ) -> Vector<E, N> {
        fallback()
    }

    fn rearrange<E: Element, const N: usize>(
        &self,
        a: &Vector<E, N>,
        s: &Shuffle<E, N>,
        fallback: impl FnOnce() -> Vector<E, N>,
    ) -> Vector<E, N> {
        fallback()
    }

    fn compress<E: Element, const N: usize>(
        &self,
        a: &Vector<E, N>,
        m: &Mask<E, N>,
        fallback: impl FnOnce() -> Vector<E, N>,
    ) -> Vector<E, N> {
        fallback()
    }

    fn expand<E: Element, const N: usize>(
        &self,
        a: &Vector<E, N>,
        m: &Mask<E, N>,
        fallback: impl FnOnce() -> Vector<E, N>,
    ) -> Vector<E, N> {
        fallback()
    }

    fn mask_binary<E: Element, const N: usize>(
        &self,
        op: Binary,
        a: &Mask<E, N>,
        b: &Mask<E, N>,
        fallback: impl FnOnce() -> Mask<E, N>,
    ) -> Mask<E, N> {
        fallback()
    }
}

/// The backend that declines every opcode, leaving every operation to its
/// portable per-lane fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct Portable;

impl Backend for Portable {}

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))] {
        mod sse2;
        pub use self::sse2::Sse2;

        pub(crate) fn active() -> &'static Sse2 {
            &Sse2
        }
    } else {
        pub(crate) fn active() -> &'static Portable {
            &Portable
        }
    }
}
