//! Per-lane boolean masks.
//!
//! A mask says which lanes participate in a masked operation: unselected
//! lanes keep their prior value (merge semantics) or drop out of a
//! reduction or compaction. Masks are plain immutable values; every
//! operation returns a fresh mask.

use core::marker::PhantomData;

use crate::backend::{self, Backend};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::ops::Binary;
use crate::vector::Vector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mask<E: Element, const N: usize> {
    bits: [bool; N],
    _marker: PhantomData<fn() -> E>,
}

impl<E: Element, const N: usize> Mask<E, N> {
    pub const LANES: usize = N;

    pub fn splat(set: bool) -> Self {
        Self::from_array([set; N])
    }

    pub fn from_array(bits: [bool; N]) -> Self {
        Mask {
            bits,
            _marker: PhantomData,
        }
    }

    pub fn from_fn(f: impl FnMut(usize) -> bool) -> Self {
        Self::from_array(core::array::from_fn(f))
    }

    /// Lane `i` is set iff `offset + i < limit`.
    pub fn index_in_range(offset: usize, limit: usize) -> Self {
        Self::from_fn(|i| offset.checked_add(i).is_some_and(|j| j < limit))
    }

    pub fn as_array(&self) -> &[bool; N] {
        &self.bits
    }

    pub fn to_array(self) -> [bool; N] {
        self.bits
    }

    #[inline]
    pub(crate) fn get(&self, i: usize) -> bool {
        self.bits[i]
    }

    pub fn lane_is_set(&self, i: usize) -> Result<bool> {
        if i < N {
            Ok(self.bits[i])
        } else {
            Err(Error::index_out_of_range("mask lane", i as i64, 0, N as i64))
        }
    }

    // Boolean algebra

    pub fn and(self, other: Self) -> Self {
        backend::active().mask_binary(Binary::And, &self, &other, || {
            Self::from_fn(|i| self.bits[i] & other.bits[i])
        })
    }

    pub fn or(self, other: Self) -> Self {
        backend::active().mask_binary(Binary::Or, &self, &other, || {
            Self::from_fn(|i| self.bits[i] | other.bits[i])
        })
    }

    pub fn xor(self, other: Self) -> Self {
        backend::active().mask_binary(Binary::Xor, &self, &other, || {
            Self::from_fn(|i| self.bits[i] ^ other.bits[i])
        })
    }

    pub fn not(self) -> Self {
        self.xor(Self::splat(true))
    }

    pub fn and_not(self, other: Self) -> Self {
        self.and(other.not())
    }

    // Queries

    pub fn true_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Index of the first set lane, or the lane count if none is set.
    pub fn first_true(&self) -> usize {
        self.bits.iter().position(|&b| b).unwrap_or(N)
    }

    /// Index of the last set lane, `None` if none is set.
    pub fn last_true(&self) -> Option<usize> {
        self.bits.iter().rposition(|&b| b)
    }

    pub fn any_true(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    pub fn all_true(&self) -> bool {
        self.bits.iter().all(|&b| b)
    }

    /// Packs the lanes into an integer bitset, lane `i` at bit `i`.
    pub fn to_bitmask(&self) -> Result<u64> {
        if N > 64 {
            return Err(Error::unsupported_operation("to_bitmask", E::NAME));
        }
        let mut out = 0u64;
        for i in 0..N {
            out |= (self.bits[i] as u64) << i;
        }
        Ok(out)
    }

    /// Inverse of [`Mask::to_bitmask`]; bits at and above the lane count
    /// must be clear.
    pub fn from_bitmask(bits: u64) -> Result<Self> {
        if N > 64 {
            return Err(Error::unsupported_operation("from_bitmask", E::NAME));
        }
        if N < 64 && (bits >> N) != 0 {
            return Err(Error::index_out_of_range(
                "mask bitset",
                (64 - bits.leading_zeros()) as i64 - 1,
                0,
                N as i64,
            ));
        }
        Ok(Self::from_fn(|i| (bits >> i) & 1 != 0))
    }

    /// Mask whose set lanes are exactly the low `true_count()` lanes.
    pub fn compress(self) -> Self {
        let k = self.true_count();
        Self::from_fn(|i| i < k)
    }

    /// Same lane pattern under another element type of equal lane count.
    pub fn cast<F: Element>(self) -> Mask<F, N> {
        Mask::from_array(self.bits)
    }

    /// Set lanes become the all-ones bit pattern of the element type,
    /// clear lanes become zero.
    pub fn to_vector(self) -> Vector<E, N> {
        Vector::from_array(core::array::from_fn(|i| E::from_mask_lane(self.bits[i])))
    }

    /// Lane `i` is set iff lane `i` of `v` is nonzero.
    pub fn from_vector(v: &Vector<E, N>) -> Self {
        Self::from_fn(|i| v.as_array()[i] != E::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type M8 = Mask<i32, 8>;

    #[test]
    fn complement_laws() {
        let m = M8::from_array([true, false, true, true, false, false, true, false]);
        assert_eq!(m.and(m.not()).true_count(), 0);
        assert!(m.or(m.not()).all_true());
        assert_eq!(m.not().not(), m);
    }

    #[test]
    fn xor_is_symmetric_difference() {
        let a = M8::from_fn(|i| i % 2 == 0);
        let b = M8::from_fn(|i| i < 4);
        assert_eq!(a.xor(b), a.and_not(b).or(b.and_not(a)));
    }

    #[test]
    fn population_queries() {
        let m = M8::from_array([false, true, false, true, false, false, true, false]);
        assert_eq!(m.true_count(), 3);
        assert_eq!(m.first_true(), 1);
        assert_eq!(m.last_true(), Some(6));
        assert!(m.any_true());
        assert!(!m.all_true());

        let none = M8::splat(false);
        assert_eq!(none.first_true(), 8);
        assert_eq!(none.last_true(), None);
        assert!(!none.any_true());
    }

    #[test]
    fn bitmask_roundtrip() {
        let m = M8::from_array([true, false, false, true, true, false, false, false]);
        let bits = m.to_bitmask().unwrap();
        assert_eq!(bits, 0b0001_1001);
        assert_eq!(M8::from_bitmask(bits).unwrap(), m);
        assert!(M8::from_bitmask(1 << 8).is_err());
    }

    #[test]
    fn compress_keeps_population() {
        let m = M8::from_array([false, true, true, false, false, true, false, false]);
        let c = m.compress();
        assert_eq!(c.true_count(), m.true_count());
        assert_eq!(c.to_array(), [true, true, true, false, false, false, false, false]);
    }

    #[test]
    fn lane_is_set_bounds() {
        let m = M8::splat(true);
        assert_eq!(m.lane_is_set(7), Ok(true));
        assert!(matches!(
            m.lane_is_set(8),
            Err(Error::IndexOutOfRange { index: 8, .. })
        ));
    }

    #[test]
    fn vector_roundtrip() {
        let m = Mask::<i16, 8>::from_fn(|i| i == 0 || i == 5);
        let v = m.to_vector();
        assert_eq!(v.as_array()[0], -1);
        assert_eq!(v.as_array()[1], 0);
        assert_eq!(Mask::from_vector(&v), m);
    }

    #[test]
    fn cast_preserves_lane_pattern() {
        let m = Mask::<u8, 8>::from_fn(|i| i >= 6);
        let f: Mask<f32, 8> = m.cast();
        assert_eq!(f.to_array(), m.to_array());
    }

    #[test]
    fn tail_mask_never_overflows() {
        let m = Mask::<u8, 16>::index_in_range(usize::MAX - 4, usize::MAX);
        assert_eq!(m.true_count(), 4);
    }
}
