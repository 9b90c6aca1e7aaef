//! Per-lane source-index permutations.
//!
//! Indices live in the partially wrapped domain `[-N, N)`: a non-negative
//! index names a source lane, a negative one is exceptional ("no valid
//! source"). Consumers either treat exceptional lanes as
//! implementation-defined, take them from a companion vector, or normalize
//! them with [`Shuffle::wrap_indexes`].

use crate::element::Element;
use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::memory::ByteOrder;
use crate::vector::Vector;

/// Maps any index into `[-N, N)`: in-range values are untouched,
/// out-of-range values wrap into `[0, N)` and are then marked exceptional
/// by subtracting the lane count.
pub(crate) fn partially_wrap(index: i64, lanes: i64) -> i64 {
    let wrapped = index.rem_euclid(lanes);
    if wrapped == index {
        index
    } else {
        wrapped - lanes
    }
}

/// Normalizes a partially wrapped index into `[0, N)`. Power-of-two lane
/// counts mask with `N - 1`; otherwise only negative indices are lifted by
/// `N` and already-non-negative ones are left alone (the deliberate
/// asymmetry of the partial wrap).
pub(crate) fn wrap_lane(index: i64, lanes: i64) -> i64 {
    if lanes & (lanes - 1) == 0 {
        index & (lanes - 1)
    } else if index < 0 {
        index + lanes
    } else {
        index
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shuffle<E: Element, const N: usize> {
    indices: [<E as Element>::Int; N],
}

impl<E: Element, const N: usize> Shuffle<E, N> {
    pub const LANES: usize = N;

    /// Builds a shuffle from explicit indices. The slice length must equal
    /// the lane count and every index must already lie in `[-N, N)`.
    pub fn from_indices(indices: &[i32]) -> Result<Self> {
        if indices.len() != N {
            return Err(Error::shape_mismatch("shuffle indices", N, indices.len()));
        }
        for &si in indices {
            if (si as i64) < -(N as i64) || (si as i64) >= N as i64 {
                return Err(Error::index_out_of_range(
                    "shuffle index",
                    si as i64,
                    -(N as i64),
                    N as i64,
                ));
            }
        }
        Ok(Shuffle {
            indices: core::array::from_fn(|i| E::Int::from_i64(indices[i] as i64)),
        })
    }

    /// Builds a shuffle from a generator; out-of-range results are
    /// partially wrapped instead of faulting.
    pub fn from_fn(mut f: impl FnMut(usize) -> i32) -> Self {
        Shuffle {
            indices: core::array::from_fn(|i| {
                E::Int::from_i64(partially_wrap(f(i) as i64, N as i64))
            }),
        }
    }

    /// The identity permutation `f(i) = i`.
    pub fn identity() -> Self {
        Self::from_fn(|i| i as i32)
    }

    pub(crate) fn from_raw(raw: [i64; N]) -> Self {
        Shuffle {
            indices: core::array::from_fn(|i| E::Int::from_i64(partially_wrap(raw[i], N as i64))),
        }
    }

    #[inline]
    pub(crate) fn raw(&self, i: usize) -> i64 {
        self.indices[i].to_i64()
    }

    /// The raw stored index for lane `i`, in `[-N, N)`.
    pub fn lane_source(&self, i: usize) -> Result<i32> {
        if i < N {
            Ok(self.raw(i) as i32)
        } else {
            Err(Error::index_out_of_range(
                "shuffle lane",
                i as i64,
                0,
                N as i64,
            ))
        }
    }

    /// Materializes the stored indices as a vector of the species'
    /// integral counterpart.
    pub fn to_vector(self) -> Vector<<E as Element>::Int, N> {
        Vector::from_array(self.indices)
    }

    /// Marks the lanes whose stored index names a valid source lane.
    pub fn lane_is_valid(&self) -> Mask<E, N> {
        Mask::from_fn(|i| self.raw(i) >= 0)
    }

    /// Normalizes every index into `[0, N)`; see [`wrap_lane`] for the
    /// non-power-of-two asymmetry.
    pub fn wrap_indexes(&self) -> Self {
        Shuffle {
            indices: core::array::from_fn(|i| E::Int::from_i64(wrap_lane(self.raw(i), N as i64))),
        }
    }

    /// Composes two shuffles without materializing an intermediate vector:
    /// lane `i` of the result is `self[other[i]]`. An exceptional index in
    /// `other` passes through unchanged.
    pub fn rearrange(&self, other: &Shuffle<E, N>) -> Self {
        Shuffle {
            indices: core::array::from_fn(|i| {
                let si = other.raw(i);
                if si >= 0 {
                    self.indices[si as usize]
                } else {
                    other.indices[i]
                }
            }),
        }
    }

    /// Same index pattern under another element type of equal lane count.
    pub fn cast<F: Element>(self) -> Shuffle<F, N> {
        Shuffle {
            indices: core::array::from_fn(|i| F::Int::from_i64(self.raw(i))),
        }
    }

    /// Exports the indices as native-width integers into `out` at
    /// `offset`.
    pub fn into_slice(&self, out: &mut [i32], offset: usize) -> Result<()> {
        let end = offset.checked_add(N).filter(|&e| e <= out.len());
        if end.is_none() {
            return Err(Error::out_of_bounds("shuffle into_slice", offset, N, out.len()));
        }
        for i in 0..N {
            out[offset + i] = self.raw(i) as i32;
        }
        Ok(())
    }

    /// Exports the indices as native-width (32-bit) integers into a byte
    /// buffer, widening narrow stored indices segment by segment.
    pub fn write_to_bytes(&self, buf: &mut [u8], offset: usize, order: ByteOrder) -> Result<()> {
        let total = N * core::mem::size_of::<i32>();
        let end = offset.checked_add(total).filter(|&e| e <= buf.len());
        if end.is_none() {
            return Err(Error::out_of_bounds(
                "shuffle write_to_bytes",
                offset,
                total,
                buf.len(),
            ));
        }
        for i in 0..N {
            let at = offset + i * core::mem::size_of::<i32>();
            (self.raw(i) as i32).write_bytes(&mut buf[at..], order);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type S4 = Shuffle<i32, 4>;

    #[test]
    fn identity_generator_is_iota() {
        let s = Shuffle::<i16, 8>::identity();
        for i in 0..8 {
            assert_eq!(s.to_vector().lane(i).unwrap(), i as i16);
        }
    }

    #[test]
    fn explicit_indices_are_validated() {
        assert!(S4::from_indices(&[2, -1, 0, 3]).is_ok());
        assert!(matches!(
            S4::from_indices(&[0, 4, 1, 2]),
            Err(Error::IndexOutOfRange { index: 4, .. })
        ));
        assert!(matches!(
            S4::from_indices(&[0, -5, 1, 2]),
            Err(Error::IndexOutOfRange { index: -5, .. })
        ));
        assert!(matches!(
            S4::from_indices(&[0, 1, 2]),
            Err(Error::ShapeMismatch { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn generator_partially_wraps() {
        let s = S4::from_fn(|i| i as i32 + 3);
        // 3 stays, 4..6 wrap to exceptional -1..1 minus lane count
        assert_eq!(s.to_vector().to_array(), [3, -4, -3, -2]);
        assert_eq!(s.lane_is_valid().to_array(), [true, false, false, false]);
    }

    #[test]
    fn wrap_indexes_power_of_two_masks() {
        let s = S4::from_indices(&[2, -1, 0, -4]).unwrap();
        assert_eq!(s.wrap_indexes().to_vector().to_array(), [2, 3, 0, 0]);
    }

    #[test]
    fn wrap_lane_non_power_of_two_is_partial() {
        // the slow path lifts negatives but never reduces in-range values
        assert_eq!(wrap_lane(-1, 6), 5);
        assert_eq!(wrap_lane(-6, 6), 0);
        assert_eq!(wrap_lane(4, 6), 4);
        assert_eq!(wrap_lane(5, 6), 5);
    }

    #[test]
    fn composition_chains_permutations() {
        let rot1 = S4::from_fn(|i| i as i32 + 1).wrap_indexes();
        let rot2 = rot1.rearrange(&rot1);
        assert_eq!(rot2.to_vector().to_array(), [2, 3, 0, 1]);
        // exceptional lanes in the outer shuffle pass through
        let holed = S4::from_indices(&[0, -1, 2, 3]).unwrap();
        let composed = rot1.rearrange(&holed);
        assert_eq!(composed.to_vector().to_array(), [1, -1, 3, 0]);
    }

    #[test]
    fn serialization_bounds_checked() {
        let s = S4::from_indices(&[1, 0, 3, 2]).unwrap();
        let mut out = [0i32; 6];
        s.into_slice(&mut out, 2).unwrap();
        assert_eq!(out, [0, 0, 1, 0, 3, 2]);
        assert!(s.into_slice(&mut out, 3).is_err());

        let mut buf = [0u8; 16];
        s.write_to_bytes(&mut buf, 0, ByteOrder::LittleEndian).unwrap();
        assert_eq!(&buf[0..4], &[1, 0, 0, 0]);
        assert_eq!(&buf[12..16], &[2, 0, 0, 0]);
        assert!(s.write_to_bytes(&mut buf, 1, ByteOrder::LittleEndian).is_err());
    }

    #[test]
    fn cast_keeps_raw_indices() {
        let s = Shuffle::<u8, 16>::from_fn(|i| 15 - i as i32);
        let t: Shuffle<f32, 16> = s.cast();
        assert_eq!(t.lane_source(0).unwrap(), 15);
        assert_eq!(t.lane_source(15).unwrap(), 0);
    }
}
