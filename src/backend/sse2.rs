//! SSE2 fast paths for 16-lane byte shapes.
//!
//! Only unmasked opcodes with a single-instruction SSE2 lowering are taken;
//! everything else is declined so the portable closure runs. Results are
//! bit-identical to the fallback by construction (wrapping adds, unsigned
//! min/max, signed compares).

use core::any::TypeId;
use std::arch::x86_64::*;

use super::Backend;
use crate::element::Element;
use crate::mask::Mask;
use crate::ops::{Binary, Comparison};
use crate::vector::Vector;

#[derive(Debug, Default, Clone, Copy)]
pub struct Sse2;

fn is_byte_x16<E: Element, const N: usize>() -> bool {
    N == 16 && (TypeId::of::<E>() == TypeId::of::<u8>() || TypeId::of::<E>() == TypeId::of::<i8>())
}

#[inline]
unsafe fn loadu<E: Element, const N: usize>(v: &Vector<E, N>) -> __m128i {
    debug_assert_eq!(N * E::BYTES, 16);
    _mm_loadu_si128(v.as_array().as_ptr().cast())
}

#[inline]
unsafe fn storeu<E: Element, const N: usize>(x: __m128i) -> Vector<E, N> {
    debug_assert_eq!(N * E::BYTES, 16);
    let mut out = [E::ZERO; N];
    _mm_storeu_si128(out.as_mut_ptr().cast(), x);
    Vector::from_array(out)
}

impl Backend for Sse2 {
    fn lanewise_binary<E: Element, const N: usize>(
        &self,
        op: Binary,
        a: &Vector<E, N>,
        b: &Vector<E, N>,
        m: Option<&Mask<E, N>>,
        fallback: impl FnOnce() -> Vector<E, N>,
    ) -> Vector<E, N> {
        if m.is_some() || !is_byte_x16::<E, N>() {
            return fallback();
        }
        let native = unsafe {
            let x = loadu(a);
            let y = loadu(b);
            match (op, E::IS_SIGNED) {
                (Binary::Add, _) => Some(_mm_add_epi8(x, y)),
                (Binary::Sub, _) => Some(_mm_sub_epi8(x, y)),
                (Binary::And, _) => Some(_mm_and_si128(x, y)),
                (Binary::Or, _) => Some(_mm_or_si128(x, y)),
                (Binary::Xor, _) => Some(_mm_xor_si128(x, y)),
                (Binary::Min, false) => Some(_mm_min_epu8(x, y)),
                (Binary::Max, false) => Some(_mm_max_epu8(x, y)),
                _ => None,
            }
        };
        match native {
            Some(x) => unsafe { storeu(x) },
            None => fallback(),
        }
    }

    fn compare<E: Element, const N: usize>(
        &self,
        op: Comparison,
        a: &Vector<E, N>,
        b: &Vector<E, N>,
        m: Option<&Mask<E, N>>,
        fallback: impl FnOnce() -> Mask<E, N>,
    ) -> Mask<E, N> {
        if m.is_some() || !is_byte_x16::<E, N>() {
            return fallback();
        }
        let native = unsafe {
            let x = loadu(a);
            let y = loadu(b);
            match (op, E::IS_SIGNED) {
                (Comparison::Eq, _) => Some(_mm_cmpeq_epi8(x, y)),
                (Comparison::Gt, true) => Some(_mm_cmpgt_epi8(x, y)),
                (Comparison::Lt, true) => Some(_mm_cmpgt_epi8(y, x)),
                _ => None,
            }
        };
        match native {
            Some(cmp) => {
                let bits = unsafe { _mm_movemask_epi8(cmp) } as u32 as u64;
                match Mask::from_bitmask(bits) {
                    Ok(mask) => mask,
                    Err(_) => fallback(),
                }
            }
            None => fallback(),
        }
    }
}
