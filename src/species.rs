//! Species descriptors: immutable metadata per (element type, lane count).
//!
//! The typed handle [`Species`] carries everything at compile time through
//! monomorphization; the [`SpeciesDescriptor`] registry is the one piece of
//! process-wide state, populated lazily on first use of a shape and
//! read-only afterwards. Racing first-time constructions converge on a
//! single leaked descriptor instance.

use core::any::TypeId;
use core::marker::PhantomData;
use std::sync::{OnceLock, PoisonError, RwLock};

use ahash::AHashMap;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::shuffle::Shuffle;
use crate::vector::Vector;

/// Total bit widths with a hardware register shape.
pub const SUPPORTED_VECTOR_BITS: [u64; 4] = [64, 128, 256, 512];

/// Runtime metadata for one (element type, lane count) pair. One instance
/// per distinct pair for the life of the process.
#[derive(Debug, PartialEq, Eq)]
pub struct SpeciesDescriptor {
    pub element: &'static str,
    pub element_bits: u32,
    pub lane_count: usize,
    pub vector_bits: u64,
}

static REGISTRY: OnceLock<RwLock<AHashMap<(TypeId, usize), &'static SpeciesDescriptor>>> =
    OnceLock::new();

fn registry() -> &'static RwLock<AHashMap<(TypeId, usize), &'static SpeciesDescriptor>> {
    REGISTRY.get_or_init(|| RwLock::new(AHashMap::new()))
}

fn descriptor_of<E: Element, const N: usize>() -> Result<&'static SpeciesDescriptor> {
    let bits = E::BITS as u64 * N as u64;
    if N == 0 || !SUPPORTED_VECTOR_BITS.contains(&bits) {
        return Err(Error::unsupported_shape(E::NAME, N, bits));
    }
    let key = (TypeId::of::<E>(), N);
    if let Some(desc) = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(desc);
    }
    let mut map = registry().write().unwrap_or_else(PoisonError::into_inner);
    // Re-check under the write lock so concurrent first uses agree on one
    // instance.
    Ok(map.entry(key).or_insert_with(|| {
        Box::leak(Box::new(SpeciesDescriptor {
            element: E::NAME,
            element_bits: E::BITS,
            lane_count: N,
            vector_bits: bits,
        }))
    }))
}

/// Typed handle for one vector shape, and the factory for its vectors,
/// masks and shuffles.
#[derive(Debug, Clone, Copy)]
pub struct Species<E: Element, const N: usize> {
    desc: &'static SpeciesDescriptor,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Element, const N: usize> Species<E, N> {
    pub const LANES: usize = N;
    pub const ELEMENT_BITS: u32 = E::BITS;
    pub const BIT_SIZE: u64 = E::BITS as u64 * N as u64;
    pub const BYTE_SIZE: usize = E::BYTES * N;

    /// Looks up (registering on first use) the descriptor for this shape.
    /// Fails with `UnsupportedShape` when the total width is not a hardware
    /// register width.
    pub fn new() -> Result<Self> {
        Ok(Species {
            desc: descriptor_of::<E, N>()?,
            _marker: PhantomData,
        })
    }

    pub fn descriptor(&self) -> &'static SpeciesDescriptor {
        self.desc
    }

    pub fn lane_count(&self) -> usize {
        N
    }

    pub fn element_size(&self) -> u32 {
        E::BITS
    }

    pub fn vector_bit_size(&self) -> u64 {
        Self::BIT_SIZE
    }

    pub fn vector_byte_size(&self) -> usize {
        Self::BYTE_SIZE
    }

    // Vector factories

    pub fn zero(&self) -> Vector<E, N> {
        Vector::splat(E::ZERO)
    }

    pub fn broadcast(&self, e: E) -> Vector<E, N> {
        Vector::splat(e)
    }

    /// Broadcast from a wide integer, narrowing with `as`-cast semantics.
    pub fn broadcast_i64(&self, v: i64) -> Vector<E, N> {
        Vector::splat(E::from_i64(v))
    }

    /// The vector holding `0, 1, 2, ...` in lane order.
    pub fn iota(&self) -> Vector<E, N> {
        Vector::iota()
    }

    // Mask factories

    pub fn mask_all(&self, set: bool) -> Mask<E, N> {
        Mask::splat(set)
    }

    /// Lane `i` is set iff `offset + i < limit`; the tail mask for a
    /// partial final loop iteration.
    pub fn index_in_range(&self, offset: usize, limit: usize) -> Mask<E, N> {
        Mask::index_in_range(offset, limit)
    }

    pub fn mask_from_bitmask(&self, bits: u64) -> Result<Mask<E, N>> {
        Mask::from_bitmask(bits)
    }

    // Shuffle factories

    pub fn shuffle_from_indices(&self, indices: &[i32]) -> Result<Shuffle<E, N>> {
        Shuffle::from_indices(indices)
    }

    pub fn shuffle_from_fn(&self, f: impl FnMut(usize) -> i32) -> Shuffle<E, N> {
        Shuffle::from_fn(f)
    }

    /// The identity permutation.
    pub fn iota_shuffle(&self) -> Shuffle<E, N> {
        Shuffle::identity()
    }

    /// `start, start + step, start + 2 * step, ...`, fully wrapped into
    /// `[0, N)` when `wrap` is set and partially wrapped otherwise.
    pub fn iota_shuffle_stepped(&self, start: i32, step: i32, wrap: bool) -> Shuffle<E, N> {
        let s = Shuffle::from_fn(|i| start.wrapping_add((i as i32).wrapping_mul(step)));
        if wrap {
            s.wrap_indexes()
        } else {
            s
        }
    }
}
