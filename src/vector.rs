//! The lane-vector value type and its closed algebra.
//!
//! A `Vector<E, N>` is an immutable fixed-length sequence of `N` lanes of
//! element type `E`; shape compatibility between operands is enforced by the
//! type system, so each monomorphized instantiation plays the role of one
//! hand-specialized vector class. Every operation first offers its opcode
//! and operands to the active acceleration backend together with a closure
//! realizing the portable per-lane semantics; the closure is the ground
//! truth, the backend only a fast path.
//!
//! Masked operations use merge semantics throughout: lanes the mask leaves
//! out keep the original operand value, they are never zeroed.

use core::array;

use crate::backend::{self, Backend};
use crate::element::{Element, LaneCast};
use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::memory::ByteOrder;
use crate::ops::{Associative, Binary, Comparison, Ternary, Test, Unary};
use crate::shuffle::Shuffle;

/// Largest supported register size (512 bits) in bytes; scratch buffers for
/// bit-pattern reinterpretation are sized to it.
pub(crate) const MAX_VECTOR_BYTES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<E: Element, const N: usize>(pub(crate) [E; N]);

pub(crate) fn check_part(context: &'static str, part: usize, limit: usize) -> Result<()> {
    if part < limit {
        Ok(())
    } else {
        Err(Error::index_out_of_range(
            context,
            part as i64,
            0,
            limit as i64,
        ))
    }
}

impl<E: Element, const N: usize> Vector<E, N> {
    pub const LANES: usize = N;

    pub fn splat(e: E) -> Self {
        Vector([e; N])
    }

    pub fn from_array(lanes: [E; N]) -> Self {
        Vector(lanes)
    }

    pub fn zero() -> Self {
        Self::splat(E::ZERO)
    }

    /// `0, 1, 2, ...` in lane order.
    pub fn iota() -> Self {
        Vector(array::from_fn(|i| E::from_i64(i as i64)))
    }

    pub fn as_array(&self) -> &[E; N] {
        &self.0
    }

    pub fn to_array(self) -> [E; N] {
        self.0
    }

    // Per-lane templates: the fallback bodies handed to the backend. The
    // masked forms keep the original lane where the mask is clear.

    fn uop(self, m: Option<&Mask<E, N>>, f: impl Fn(E) -> E) -> Self {
        let mut out = self.0;
        for (i, lane) in out.iter_mut().enumerate() {
            if m.map_or(true, |m| m.get(i)) {
                *lane = f(*lane);
            }
        }
        Vector(out)
    }

    fn bop(self, other: Self, m: Option<&Mask<E, N>>, f: impl Fn(E, E) -> E) -> Self {
        let mut out = self.0;
        for (i, lane) in out.iter_mut().enumerate() {
            if m.map_or(true, |m| m.get(i)) {
                *lane = f(*lane, other.0[i]);
            }
        }
        Vector(out)
    }

    fn top(self, v1: Self, v2: Self, m: Option<&Mask<E, N>>, f: impl Fn(E, E, E) -> E) -> Self {
        let mut out = self.0;
        for (i, lane) in out.iter_mut().enumerate() {
            if m.map_or(true, |m| m.get(i)) {
                *lane = f(*lane, v1.0[i], v2.0[i]);
            }
        }
        Vector(out)
    }

    // Lanewise entry points

    pub fn lanewise_unary(self, op: Unary, m: Option<&Mask<E, N>>) -> Result<Self> {
        if E::apply_unary(op, E::ZERO).is_none() {
            return Err(Error::unsupported_operation(op.name(), E::NAME));
        }
        Ok(backend::active().lanewise_unary(op, &self, m, || {
            self.uop(m, |a| E::apply_unary(op, a).unwrap_or(a))
        }))
    }

    pub fn lanewise_binary(self, op: Binary, other: Self, m: Option<&Mask<E, N>>) -> Result<Self> {
        if E::apply_binary(op, E::ZERO, E::ZERO).is_none() {
            return Err(Error::unsupported_operation(op.name(), E::NAME));
        }
        Ok(backend::active().lanewise_binary(op, &self, &other, m, || {
            self.bop(other, m, |a, b| E::apply_binary(op, a, b).unwrap_or(a))
        }))
    }

    /// Shift every lane by the same scalar amount, reduced modulo the
    /// element bit width (two's-complement shift semantics).
    pub fn lanewise_shift(self, op: Binary, amount: u32, m: Option<&Mask<E, N>>) -> Result<Self> {
        if E::apply_shift(op, E::ZERO, 0).is_none() {
            return Err(Error::unsupported_operation(op.name(), E::NAME));
        }
        Ok(backend::active().lanewise_shift(op, &self, amount, m, || {
            self.uop(m, |a| E::apply_shift(op, a, amount).unwrap_or(a))
        }))
    }

    pub fn lanewise_ternary(
        self,
        op: Ternary,
        v1: Self,
        v2: Self,
        m: Option<&Mask<E, N>>,
    ) -> Result<Self> {
        if E::apply_ternary(op, E::ZERO, E::ZERO, E::ZERO).is_none() {
            return Err(Error::unsupported_operation(op.name(), E::NAME));
        }
        Ok(backend::active().lanewise_ternary(op, &self, &v1, &v2, m, || {
            self.top(v1, v2, m, |a, b, c| E::apply_ternary(op, a, b, c).unwrap_or(a))
        }))
    }

    /// `self + iota * scale`, wrapping.
    pub fn add_index(self, scale: i64) -> Self {
        let mut out = self.0;
        for (i, lane) in out.iter_mut().enumerate() {
            *lane = lane.wrapping_add(E::from_i64((i as i64).wrapping_mul(scale)));
        }
        Vector(out)
    }

    // Reductions

    /// Folds the participating lanes with an associative operator. The
    /// fold order is deterministic per backend; the portable fold runs in
    /// lane order. Masked-out lanes contribute the operator's identity.
    pub fn reduce_lanes(self, op: Associative, m: Option<&Mask<E, N>>) -> Result<E> {
        let id = E::assoc_identity(op)
            .ok_or_else(|| Error::unsupported_operation(op.name(), E::NAME))?;
        Ok(backend::active().reduce(op, &self, m, || {
            let mut acc = id;
            for i in 0..N {
                let v = if m.map_or(true, |m| m.get(i)) {
                    self.0[i]
                } else {
                    id
                };
                acc = E::apply_binary(op.binary(), acc, v).unwrap_or(acc);
            }
            acc
        }))
    }

    /// Reduction with a 64-bit accumulator, so narrow integer lanes cannot
    /// overflow while accumulating.
    pub fn reduce_lanes_to_i64(self, op: Associative, m: Option<&Mask<E, N>>) -> Result<i64> {
        if E::assoc_identity(op).is_none() {
            return Err(Error::unsupported_operation(op.name(), E::NAME));
        }
        let id = i64::assoc_identity(op).unwrap_or(0);
        let mut acc = id;
        for i in 0..N {
            let v = if m.map_or(true, |m| m.get(i)) {
                self.0[i].to_i64()
            } else {
                id
            };
            acc = i64::apply_binary(op.binary(), acc, v).unwrap_or(acc);
        }
        Ok(acc)
    }

    // Comparisons and tests

    pub fn compare(self, op: Comparison, other: Self, m: Option<&Mask<E, N>>) -> Mask<E, N> {
        backend::active().compare(op, &self, &other, m, || {
            Mask::from_fn(|i| {
                m.map_or(true, |m| m.get(i)) && E::compare(op, self.0[i], other.0[i])
            })
        })
    }

    pub fn compare_scalar(self, op: Comparison, s: E, m: Option<&Mask<E, N>>) -> Mask<E, N> {
        self.compare(op, Self::splat(s), m)
    }

    /// Single-operand predicate, e.g. "is this lane negative".
    pub fn test(self, op: Test, m: Option<&Mask<E, N>>) -> Result<Mask<E, N>> {
        if E::test(op, E::ZERO).is_none() {
            return Err(Error::unsupported_operation(op.name(), E::NAME));
        }
        Ok(backend::active().test(op, &self, m, || {
            Mask::from_fn(|i| {
                m.map_or(true, |m| m.get(i)) && E::test(op, self.0[i]).unwrap_or(false)
            })
        }))
    }

    // Lane movement

    /// Lane `i` of the result is `other[i]` where the mask is set, else
    /// `self[i]`.
    pub fn blend(self, other: Self, m: &Mask<E, N>) -> Self {
        backend::active().blend(&self, &other, m, || {
            Vector(array::from_fn(|i| {
                if m.get(i) {
                    other.0[i]
                } else {
                    self.0[i]
                }
            }))
        })
    }

    /// Shifts lanes down by `origin`, filling the vacated high lanes from
    /// the low lanes of `filler`.
    pub fn slice(self, origin: usize, filler: Self) -> Result<Self> {
        if origin > N {
            return Err(Error::index_out_of_range(
                "slice origin",
                origin as i64,
                0,
                N as i64 + 1,
            ));
        }
        Ok(Vector(array::from_fn(|i| {
            let j = origin + i;
            if j < N {
                self.0[j]
            } else {
                filler.0[j - N]
            }
        })))
    }

    pub fn slice_zero(self, origin: usize) -> Result<Self> {
        self.slice(origin, Self::zero())
    }

    /// Inverse of [`Vector::slice`]: inserts `self` into `w` at `origin`.
    /// `part` 0 writes the lanes that land inside `w`; `part` 1 writes the
    /// overflow lanes into the low end of the following destination.
    pub fn unslice(self, origin: usize, w: Self, part: usize) -> Result<Self> {
        self.unslice_impl(origin, w, part, None)
    }

    /// Masked insert: only the lanes of `self` the mask selects are
    /// written into the destination.
    pub fn unslice_masked(
        self,
        origin: usize,
        w: Self,
        part: usize,
        m: &Mask<E, N>,
    ) -> Result<Self> {
        self.unslice_impl(origin, w, part, Some(m))
    }

    fn unslice_impl(
        self,
        origin: usize,
        w: Self,
        part: usize,
        m: Option<&Mask<E, N>>,
    ) -> Result<Self> {
        if origin > N {
            return Err(Error::index_out_of_range(
                "unslice origin",
                origin as i64,
                0,
                N as i64 + 1,
            ));
        }
        check_part("unslice part", part, 2)?;
        let mut out = w.0;
        if part == 0 {
            for j in 0..N - origin {
                if m.map_or(true, |m| m.get(j)) {
                    out[origin + j] = self.0[j];
                }
            }
        } else {
            for j in 0..origin {
                let src = N - origin + j;
                if m.map_or(true, |m| m.get(src)) {
                    out[j] = self.0[src];
                }
            }
        }
        Ok(Vector(out))
    }

    /// Permutes lanes: result lane `i` is `self[s[i]]` for a valid stored
    /// index. Lanes whose stored index is exceptional (negative) carry an
    /// implementation-defined value; the portable backend leaves zero.
    pub fn rearrange(self, s: &Shuffle<E, N>) -> Self {
        backend::active().rearrange(&self, s, || {
            Vector(array::from_fn(|i| {
                let idx = s.raw(i);
                if idx >= 0 {
                    self.0[idx as usize]
                } else {
                    E::ZERO
                }
            }))
        })
    }

    /// Merge-masked permute: lanes the mask leaves out keep their original
    /// value.
    pub fn rearrange_masked(self, s: &Shuffle<E, N>, m: &Mask<E, N>) -> Self {
        self.blend(self.rearrange(s), m)
    }

    /// Permute with a companion vector: exceptional indices select from
    /// `other` at the wrapped position instead of being undefined.
    pub fn rearrange_or(self, s: &Shuffle<E, N>, other: Self) -> Self {
        Vector(array::from_fn(|i| {
            let idx = s.raw(i);
            if idx >= 0 {
                self.0[idx as usize]
            } else {
                other.0[(idx + N as i64) as usize]
            }
        }))
    }

    /// Packs the lanes the mask selects into the low lanes, preserving
    /// their relative order. The remaining high lanes are unspecified; the
    /// portable backend leaves zero.
    pub fn compress(self, m: &Mask<E, N>) -> Self {
        backend::active().compress(&self, m, || {
            let mut out = [E::ZERO; N];
            let mut k = 0;
            for i in 0..N {
                if m.get(i) {
                    out[k] = self.0[i];
                    k += 1;
                }
            }
            Vector(out)
        })
    }

    /// Inverse of [`Vector::compress`]: scatters the low lanes of `self`
    /// into the positions the mask selects; other lanes are zero.
    pub fn expand(self, m: &Mask<E, N>) -> Self {
        backend::active().expand(&self, m, || {
            let mut out = [E::ZERO; N];
            let mut k = 0;
            for i in 0..N {
                if m.get(i) {
                    out[i] = self.0[k];
                    k += 1;
                }
            }
            Vector(out)
        })
    }

    /// Data-side permute: treats `self`'s lanes as shuffle indices into
    /// `table`, wrapping each index into `[0, N)`.
    pub fn select_from(self, table: Self) -> Self {
        table.rearrange(&self.to_shuffle().wrap_indexes())
    }

    /// Two-table variant: indices wrap into `[0, 2N)` and pick from
    /// `table0` below `N`, `table1` at and above it.
    pub fn select_from2(self, table0: Self, table1: Self) -> Self {
        Vector(array::from_fn(|i| {
            let idx = self.0[i].to_i64().rem_euclid(2 * N as i64) as usize;
            if idx < N {
                table0.0[idx]
            } else {
                table1.0[idx - N]
            }
        }))
    }

    /// Reads the lanes as shuffle source indices, partially wrapping each
    /// into `[-N, N)`.
    pub fn to_shuffle(self) -> Shuffle<E, N> {
        Shuffle::from_raw(array::from_fn(|i| self.0[i].to_i64()))
    }

    // Shape changes

    /// Converts element representation into another species. When the lane
    /// counts differ, `part` selects which contiguous segment of the wider
    /// geometry is covered: for a narrowing conversion it picks the source
    /// segment, for a widening one the destination segment (other
    /// destination lanes are zero).
    pub fn convert_shape<F, const M: usize>(self, part: usize) -> Result<Vector<F, M>>
    where
        F: Element + LaneCast<E>,
    {
        if M == N {
            check_part("convert_shape part", part, 1)?;
            Ok(Vector(array::from_fn(|i| F::cast_from(self.0[i]))))
        } else if N > M {
            if N % M != 0 {
                return Err(Error::shape_mismatch("convert_shape", M, N));
            }
            check_part("convert_shape part", part, N / M)?;
            Ok(Vector(array::from_fn(|i| F::cast_from(self.0[part * M + i]))))
        } else {
            if M % N != 0 {
                return Err(Error::shape_mismatch("convert_shape", N, M));
            }
            check_part("convert_shape part", part, M / N)?;
            let mut out = [F::ZERO; M];
            for i in 0..N {
                out[part * N + i] = F::cast_from(self.0[i]);
            }
            Ok(Vector(out))
        }
    }

    /// Reinterprets the register bit pattern under another species without
    /// numeric conversion, using the little-endian lane-register model.
    /// `part` selects the byte segment exactly as in
    /// [`Vector::convert_shape`]. Round-tripping through the inverse
    /// reinterpretation is the identity on bit pattern.
    pub fn reinterpret_shape<F: Element, const M: usize>(self, part: usize) -> Result<Vector<F, M>> {
        let sbytes = E::BYTES * N;
        let dbytes = F::BYTES * M;
        if sbytes > MAX_VECTOR_BYTES {
            return Err(Error::unsupported_shape(E::NAME, N, E::BITS as u64 * N as u64));
        }
        if dbytes > MAX_VECTOR_BYTES {
            return Err(Error::unsupported_shape(F::NAME, M, F::BITS as u64 * M as u64));
        }
        let mut src = [0u8; MAX_VECTOR_BYTES];
        self.write_lanes(&mut src[..sbytes], ByteOrder::LittleEndian);
        let mut dst = [0u8; MAX_VECTOR_BYTES];
        if sbytes == dbytes {
            check_part("reinterpret_shape part", part, 1)?;
            dst[..dbytes].copy_from_slice(&src[..sbytes]);
        } else if sbytes > dbytes {
            if sbytes % dbytes != 0 {
                return Err(Error::shape_mismatch("reinterpret_shape", dbytes, sbytes));
            }
            check_part("reinterpret_shape part", part, sbytes / dbytes)?;
            dst[..dbytes].copy_from_slice(&src[part * dbytes..(part + 1) * dbytes]);
        } else {
            if dbytes % sbytes != 0 {
                return Err(Error::shape_mismatch("reinterpret_shape", sbytes, dbytes));
            }
            check_part("reinterpret_shape part", part, dbytes / sbytes)?;
            dst[part * sbytes..(part + 1) * sbytes].copy_from_slice(&src[..sbytes]);
        }
        Ok(Vector::<F, M>::read_lanes(&dst[..dbytes], ByteOrder::LittleEndian))
    }

    pub(crate) fn write_lanes(&self, buf: &mut [u8], order: ByteOrder) {
        for i in 0..N {
            self.0[i].write_bytes(&mut buf[i * E::BYTES..], order);
        }
    }

    pub(crate) fn read_lanes(buf: &[u8], order: ByteOrder) -> Self {
        Vector(array::from_fn(|i| E::read_bytes(&buf[i * E::BYTES..], order)))
    }

    // Lane accessors

    pub fn lane(&self, i: usize) -> Result<E> {
        if i < N {
            Ok(self.0[i])
        } else {
            Err(Error::index_out_of_range("lane", i as i64, 0, N as i64))
        }
    }

    /// Copy-on-write single-lane replacement.
    pub fn with_lane(self, i: usize, e: E) -> Result<Self> {
        if i >= N {
            return Err(Error::index_out_of_range("with_lane", i as i64, 0, N as i64));
        }
        let mut out = self.0;
        out[i] = e;
        Ok(Vector(out))
    }
}
