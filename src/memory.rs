//! Memory transfers between vectors, masks and flat storage.
//!
//! All transfers are bounds-checked up front and all-or-nothing: a fault
//! leaves the destination untouched. Masked loads fill unselected lanes
//! with zero; masked stores leave unselected storage untouched; both check
//! bounds only for the lanes the mask selects, so a tail mask makes the
//! final partial stride of a loop safe without scalar cleanup.

use core::array;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::vector::Vector;

/// Byte order for (de)serializing lanes through byte buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// The byte order of the host.
    pub fn native() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(target_endian = "big")] {
                ByteOrder::BigEndian
            } else {
                ByteOrder::LittleEndian
            }
        }
    }
}

fn check_span(context: &'static str, offset: usize, touched: usize, len: usize) -> Result<()> {
    match offset.checked_add(touched) {
        Some(end) if end <= len => Ok(()),
        _ => Err(Error::out_of_bounds(context, offset, touched, len)),
    }
}

impl<E: Element, const N: usize> Vector<E, N> {
    /// Loads `N` consecutive elements starting at `offset`.
    pub fn from_slice(src: &[E], offset: usize) -> Result<Self> {
        check_span("vector load", offset, N, src.len())?;
        Ok(Vector::from_array(array::from_fn(|i| src[offset + i])))
    }

    /// Masked load: selected lanes read `src[offset + i]`, unselected lanes
    /// are zero. Only selected lanes are bounds-checked.
    pub fn from_slice_masked(src: &[E], offset: usize, m: &Mask<E, N>) -> Result<Self> {
        Self::from_slice_masked_hinted(src, offset, m, false)
    }

    /// Like [`Vector::from_slice_masked`], with a caller-supplied promise
    /// that the whole `N`-lane span lies inside `src`. The hint only skips
    /// the per-lane bounds pass; it never changes which lanes are read, and
    /// a false promise is a caller bug.
    pub fn from_slice_masked_hinted(
        src: &[E],
        offset: usize,
        m: &Mask<E, N>,
        offset_in_range: bool,
    ) -> Result<Self> {
        if offset_in_range {
            debug_assert!(
                offset.checked_add(N).is_some_and(|e| e <= src.len()),
                "offset_in_range hint violated"
            );
        } else {
            for i in 0..N {
                if m.get(i) && offset.checked_add(i).is_none_or(|j| j >= src.len()) {
                    return Err(Error::out_of_bounds("masked vector load", offset, i + 1, src.len()));
                }
            }
        }
        Ok(Vector::from_array(array::from_fn(|i| {
            if m.get(i) {
                src[offset + i]
            } else {
                E::ZERO
            }
        })))
    }

    /// Stores all `N` lanes to `dst` starting at `offset`.
    pub fn write_to_slice(&self, dst: &mut [E], offset: usize) -> Result<()> {
        check_span("vector store", offset, N, dst.len())?;
        dst[offset..offset + N].copy_from_slice(self.as_array());
        Ok(())
    }

    /// Masked store: only selected lanes are written, the rest of the
    /// destination keeps its prior contents. Only selected lanes are
    /// bounds-checked, and nothing is written on a fault.
    pub fn write_to_slice_masked(&self, dst: &mut [E], offset: usize, m: &Mask<E, N>) -> Result<()> {
        self.write_to_slice_masked_hinted(dst, offset, m, false)
    }

    /// Like [`Vector::write_to_slice_masked`], with the same
    /// `offset_in_range` contract as [`Vector::from_slice_masked_hinted`].
    pub fn write_to_slice_masked_hinted(
        &self,
        dst: &mut [E],
        offset: usize,
        m: &Mask<E, N>,
        offset_in_range: bool,
    ) -> Result<()> {
        if offset_in_range {
            debug_assert!(
                offset.checked_add(N).is_some_and(|e| e <= dst.len()),
                "offset_in_range hint violated"
            );
        } else {
            for i in 0..N {
                if m.get(i) && offset.checked_add(i).is_none_or(|j| j >= dst.len()) {
                    return Err(Error::out_of_bounds("masked vector store", offset, i + 1, dst.len()));
                }
            }
        }
        for i in 0..N {
            if m.get(i) {
                dst[offset + i] = self.as_array()[i];
            }
        }
        Ok(())
    }

    /// Gathers lane `i` from `src[offset + index_map[map_offset + i]]`.
    /// Every effective index is validated before any lane is read.
    pub fn gather(src: &[E], offset: usize, index_map: &[i32], map_offset: usize) -> Result<Self> {
        Self::gather_masked(src, offset, index_map, map_offset, &Mask::splat(true))
    }

    /// Masked gather; unselected lanes are zero and their map entries are
    /// neither read nor validated.
    pub fn gather_masked(
        src: &[E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
        m: &Mask<E, N>,
    ) -> Result<Self> {
        let at = gather_indices("gather", src.len(), offset, index_map, map_offset, m)?;
        Ok(Vector::from_array(array::from_fn(|i| match at[i] {
            Some(j) => src[j],
            None => E::ZERO,
        })))
    }

    /// Scatters lane `i` to `dst[offset + index_map[map_offset + i]]`.
    /// Duplicate indices are written in lane order, the highest lane wins.
    pub fn scatter(&self, dst: &mut [E], offset: usize, index_map: &[i32], map_offset: usize) -> Result<()> {
        self.scatter_masked(dst, offset, index_map, map_offset, &Mask::splat(true))
    }

    pub fn scatter_masked(
        &self,
        dst: &mut [E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
        m: &Mask<E, N>,
    ) -> Result<()> {
        let at = gather_indices("scatter", dst.len(), offset, index_map, map_offset, m)?;
        for i in 0..N {
            if let Some(j) = at[i] {
                dst[j] = self.as_array()[i];
            }
        }
        Ok(())
    }

    /// Deserializes `N` lanes from a byte buffer under the given order.
    pub fn from_bytes(src: &[u8], offset: usize, order: ByteOrder) -> Result<Self> {
        check_span("vector byte load", offset, N * E::BYTES, src.len())?;
        Ok(Vector::read_lanes(&src[offset..], order))
    }

    /// Lane-granular masked byte load; unselected lanes are zero.
    pub fn from_bytes_masked(
        src: &[u8],
        offset: usize,
        order: ByteOrder,
        m: &Mask<E, N>,
    ) -> Result<Self> {
        check_lane_bytes("masked vector byte load", offset, src.len(), m)?;
        Ok(Vector::from_array(array::from_fn(|i| {
            if m.get(i) {
                E::read_bytes(&src[offset + i * E::BYTES..], order)
            } else {
                E::ZERO
            }
        })))
    }

    /// Serializes all lanes into a byte buffer under the given order.
    pub fn write_to_bytes(&self, dst: &mut [u8], offset: usize, order: ByteOrder) -> Result<()> {
        check_span("vector byte store", offset, N * E::BYTES, dst.len())?;
        self.write_lanes(&mut dst[offset..], order);
        Ok(())
    }

    /// Lane-granular masked byte store; unselected lanes leave their bytes
    /// untouched.
    pub fn write_to_bytes_masked(
        &self,
        dst: &mut [u8],
        offset: usize,
        order: ByteOrder,
        m: &Mask<E, N>,
    ) -> Result<()> {
        check_lane_bytes("masked vector byte store", offset, dst.len(), m)?;
        for i in 0..N {
            if m.get(i) {
                self.as_array()[i].write_bytes(&mut dst[offset + i * E::BYTES..], order);
            }
        }
        Ok(())
    }
}

/// Resolves the effective element index for every selected lane, or faults
/// if any map entry or effective index is out of range.
fn gather_indices<E: Element, const N: usize>(
    context: &'static str,
    len: usize,
    offset: usize,
    index_map: &[i32],
    map_offset: usize,
    m: &Mask<E, N>,
) -> Result<[Option<usize>; N]> {
    check_span(context, map_offset, N, index_map.len())?;
    let mut at = [None; N];
    for i in 0..N {
        if !m.get(i) {
            continue;
        }
        let idx = index_map[map_offset + i] as i64;
        let j = offset as i64 + idx;
        if j < 0 || j as usize >= len {
            return Err(Error::index_out_of_range(context, j, 0, len as i64));
        }
        at[i] = Some(j as usize);
    }
    Ok(at)
}

fn check_lane_bytes<E: Element, const N: usize>(
    context: &'static str,
    offset: usize,
    len: usize,
    m: &Mask<E, N>,
) -> Result<()> {
    for i in 0..N {
        if m.get(i) {
            let end = offset.checked_add((i + 1) * E::BYTES);
            if end.is_none_or(|e| e > len) {
                return Err(Error::out_of_bounds(context, offset, (i + 1) * E::BYTES, len));
            }
        }
    }
    Ok(())
}

impl<E: Element, const N: usize> Mask<E, N> {
    /// Loads `N` lane flags from consecutive booleans at `offset`.
    pub fn from_bool_slice(src: &[bool], offset: usize) -> Result<Self> {
        check_span("mask load", offset, N, src.len())?;
        Ok(Mask::from_fn(|i| src[offset + i]))
    }

    /// Masked flag load: selected lanes read `src[offset + i]`, unselected
    /// lanes are clear; only selected lanes are bounds-checked.
    pub fn from_bool_slice_masked(src: &[bool], offset: usize, m: &Mask<E, N>) -> Result<Self> {
        for i in 0..N {
            if m.get(i) && offset.checked_add(i).is_none_or(|j| j >= src.len()) {
                return Err(Error::out_of_bounds("masked mask load", offset, i + 1, src.len()));
            }
        }
        Ok(Mask::from_fn(|i| m.get(i) && src[offset + i]))
    }

    /// Stores all lane flags to `dst` starting at `offset`.
    pub fn write_to_bool_slice(&self, dst: &mut [bool], offset: usize) -> Result<()> {
        check_span("mask store", offset, N, dst.len())?;
        for i in 0..N {
            dst[offset + i] = self.get(i);
        }
        Ok(())
    }

    /// Masked flag store: only selected lanes are written.
    pub fn write_to_bool_slice_masked(
        &self,
        dst: &mut [bool],
        offset: usize,
        m: &Mask<E, N>,
    ) -> Result<()> {
        for i in 0..N {
            if m.get(i) && offset.checked_add(i).is_none_or(|j| j >= dst.len()) {
                return Err(Error::out_of_bounds("masked mask store", offset, i + 1, dst.len()));
            }
        }
        for i in 0..N {
            if m.get(i) {
                dst[offset + i] = self.get(i);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type V4 = Vector<i32, 4>;
    type M4 = Mask<i32, 4>;

    #[test]
    fn slice_roundtrip_bounds_checked() {
        let data = [5, 6, 7, 8, 9, 10];
        let v = V4::from_slice(&data, 2).unwrap();
        assert_eq!(v.to_array(), [7, 8, 9, 10]);
        assert!(matches!(
            V4::from_slice(&data, 3),
            Err(Error::OutOfBounds { offset: 3, touched: 4, len: 6, .. })
        ));

        let mut out = [0; 6];
        v.write_to_slice(&mut out, 1).unwrap();
        assert_eq!(out, [0, 7, 8, 9, 10, 0]);
        assert!(v.write_to_slice(&mut out, 3).is_err());
        // the failed store wrote nothing
        assert_eq!(out, [0, 7, 8, 9, 10, 0]);
    }

    #[test]
    fn masked_load_zeroes_unselected_lanes() {
        let data = [1, 2, 3];
        let tail = M4::index_in_range(0, 3);
        let v = V4::from_slice_masked(&data, 0, &tail).unwrap();
        assert_eq!(v.to_array(), [1, 2, 3, 0]);
        // a full mask over the short buffer faults
        assert!(V4::from_slice_masked(&data, 0, &M4::splat(true)).is_err());
    }

    #[test]
    fn offset_in_range_hint_skips_nothing_observable() {
        let data = [1, 2, 3, 4, 5];
        let m = M4::from_fn(|i| i != 1);
        let plain = V4::from_slice_masked(&data, 1, &m).unwrap();
        let hinted = V4::from_slice_masked_hinted(&data, 1, &m, true).unwrap();
        assert_eq!(plain, hinted);
        assert_eq!(hinted.to_array(), [2, 0, 4, 5]);

        let mut a = [0; 5];
        let mut b = [0; 5];
        plain.write_to_slice_masked(&mut a, 1, &m).unwrap();
        plain
            .write_to_slice_masked_hinted(&mut b, 1, &m, true)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn masked_store_merges_into_destination() {
        let v = V4::from_array([10, 20, 30, 40]);
        let mut out = [1, 2, 3];
        let tail = M4::index_in_range(0, 3);
        v.write_to_slice_masked(&mut out, 0, &tail).unwrap();
        assert_eq!(out, [10, 20, 30]);

        let mut partial = [0; 4];
        let odd = M4::from_fn(|i| i % 2 == 1);
        v.write_to_slice_masked(&mut partial, 0, &odd).unwrap();
        assert_eq!(partial, [0, 20, 0, 40]);

        let mut short = [7, 7];
        assert!(v.write_to_slice_masked(&mut short, 0, &odd).is_err());
        assert_eq!(short, [7, 7]);
    }

    #[test]
    fn gather_follows_the_index_map() {
        let data = [100, 101, 102, 103, 104, 105];
        let map = [3, 0, 3, 1];
        let v = V4::gather(&data, 2, &map, 0).unwrap();
        assert_eq!(v.to_array(), [105, 102, 105, 103]);

        // any out-of-range effective index faults before any lane is read
        let bad = [3, 0, 9, 1];
        assert!(matches!(
            V4::gather(&data, 2, &bad, 0),
            Err(Error::IndexOutOfRange { index: 11, .. })
        ));
        // a mask excuses the offending lane
        let m = M4::from_fn(|i| i != 2);
        let v = V4::gather_masked(&data, 2, &bad, 0, &m).unwrap();
        assert_eq!(v.to_array(), [105, 102, 0, 103]);

        // the map slice itself is bounds-checked
        assert!(matches!(
            V4::gather(&data, 0, &map, 1),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn scatter_is_all_or_nothing() {
        let v = V4::from_array([10, 20, 30, 40]);
        let mut out = [0; 6];
        v.scatter(&mut out, 1, &[4, 0, 2, 1], 0).unwrap();
        assert_eq!(out, [0, 20, 40, 30, 0, 10]);

        let mut untouched = [0; 6];
        assert!(v.scatter(&mut untouched, 1, &[4, 0, 9, 1], 0).is_err());
        assert_eq!(untouched, [0; 6]);

        // duplicate indices: the highest lane wins
        let mut dup = [0; 2];
        v.scatter(&mut dup, 0, &[0, 0, 1, 1], 0).unwrap();
        assert_eq!(dup, [20, 40]);
    }

    #[test]
    fn byte_transfers_respect_order() {
        let v = Vector::<u16, 4>::from_array([0x1122, 0x3344, 0x5566, 0x7788]);
        let mut buf = [0u8; 10];
        v.write_to_bytes(&mut buf, 1, ByteOrder::BigEndian).unwrap();
        assert_eq!(&buf[1..5], &[0x11, 0x22, 0x33, 0x44]);
        let back = Vector::<u16, 4>::from_bytes(&buf, 1, ByteOrder::BigEndian).unwrap();
        assert_eq!(back, v);
        let flipped = Vector::<u16, 4>::from_bytes(&buf, 1, ByteOrder::LittleEndian).unwrap();
        assert_eq!(flipped.as_array()[0], 0x2211);

        assert!(v.write_to_bytes(&mut buf, 3, ByteOrder::LittleEndian).is_err());
        assert!(Vector::<u16, 4>::from_bytes(&buf, 3, ByteOrder::LittleEndian).is_err());
    }

    #[test]
    fn masked_byte_transfers_are_lane_granular() {
        let src = [1u8, 0, 2, 0, 3, 0];
        let m = Mask::<u16, 4>::index_in_range(0, 3);
        let v = Vector::<u16, 4>::from_bytes_masked(&src, 0, ByteOrder::LittleEndian, &m).unwrap();
        assert_eq!(v.to_array(), [1, 2, 3, 0]);
        assert!(Vector::<u16, 4>::from_bytes_masked(
            &src,
            0,
            ByteOrder::LittleEndian,
            &Mask::splat(true)
        )
        .is_err());

        let mut dst = [0xffu8; 6];
        v.write_to_bytes_masked(&mut dst, 0, ByteOrder::LittleEndian, &m)
            .unwrap();
        assert_eq!(dst, [1, 0, 2, 0, 3, 0]);
    }

    #[test]
    fn bool_slice_roundtrip() {
        let flags = [true, false, false, true, true];
        let m = M4::from_bool_slice(&flags, 1).unwrap();
        assert_eq!(m.to_array(), [false, false, true, true]);
        assert!(M4::from_bool_slice(&flags, 2).is_err());

        let mut out = [false; 5];
        m.write_to_bool_slice(&mut out, 0).unwrap();
        assert_eq!(out, [false, false, true, true, false]);
        assert!(m.write_to_bool_slice(&mut out, 2).is_err());
    }

    #[test]
    fn masked_bool_transfers() {
        let flags = [true, true, true];
        let tail = M4::index_in_range(0, 3);
        let m = M4::from_bool_slice_masked(&flags, 0, &tail).unwrap();
        assert_eq!(m.to_array(), [true, true, true, false]);
        assert!(M4::from_bool_slice_masked(&flags, 0, &M4::splat(true)).is_err());

        let mut out = [false; 3];
        m.write_to_bool_slice_masked(&mut out, 0, &tail).unwrap();
        assert_eq!(out, [true, true, true]);
        assert!(m
            .write_to_bool_slice_masked(&mut out, 0, &M4::splat(true))
            .is_err());
    }

    #[test]
    fn native_order_matches_the_host() {
        #[cfg(target_endian = "little")]
        assert_eq!(ByteOrder::native(), ByteOrder::LittleEndian);
        #[cfg(target_endian = "big")]
        assert_eq!(ByteOrder::native(), ByteOrder::BigEndian);
    }
}
