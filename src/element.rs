//! Lane element types and their per-lane reference semantics.
//!
//! Every opcode in [`crate::ops`] bottoms out in one of the `apply_*`
//! methods here. These scalar definitions are the portable ground truth the
//! acceleration backend must reproduce bit-for-bit; an opcode a type cannot
//! realize returns `None` and surfaces as `UnsupportedOperation` at the
//! vector entry point.

use crate::memory::ByteOrder;
use crate::ops::{Associative, Binary, Comparison, Ternary, Test, Unary};

mod private {
    pub trait Sealed {}
}

/// A scalar type usable as one lane of a vector, mask or shuffle.
pub trait Element:
    private::Sealed + Copy + PartialEq + PartialOrd + core::fmt::Debug + Send + Sync + 'static
{
    /// Unsigned integer carrying the lane's raw bit pattern.
    type Bits: Element;
    /// Same-width signed integral counterpart, used to materialize shuffle
    /// indices and mask lanes as vectors.
    type Int: Element;

    const BITS: u32;
    const BYTES: usize;
    const NAME: &'static str;
    const IS_FLOAT: bool;
    const IS_SIGNED: bool;
    const ZERO: Self;
    const ONE: Self;

    fn to_bits(self) -> Self::Bits;
    fn from_bits(bits: Self::Bits) -> Self;

    /// Numeric cast to/from a wide accumulator, `as`-cast semantics.
    fn to_i64(self) -> i64;
    fn from_i64(v: i64) -> Self;

    /// All-ones bit pattern for a set mask lane, all-zero otherwise.
    fn from_mask_lane(set: bool) -> Self;

    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn lane_min(self, rhs: Self) -> Self;
    fn lane_max(self, rhs: Self) -> Self;

    /// Writes exactly [`Self::BYTES`] bytes at the start of `out`.
    fn write_bytes(self, out: &mut [u8], order: ByteOrder);
    /// Reads exactly [`Self::BYTES`] bytes from the start of `src`.
    fn read_bytes(src: &[u8], order: ByteOrder) -> Self;

    fn apply_unary(op: Unary, a: Self) -> Option<Self>;
    fn apply_binary(op: Binary, a: Self, b: Self) -> Option<Self>;
    /// Shift with a scalar amount, reduced modulo [`Self::BITS`].
    fn apply_shift(op: Binary, a: Self, amount: u32) -> Option<Self>;
    fn apply_ternary(op: Ternary, a: Self, b: Self, c: Self) -> Option<Self>;
    fn test(op: Test, a: Self) -> Option<bool>;
    /// Identity element substituted for masked-out lanes in a reduction.
    fn assoc_identity(op: Associative) -> Option<Self>;

    fn compare(op: Comparison, a: Self, b: Self) -> bool {
        match op {
            Comparison::Eq => a == b,
            Comparison::Ne => a != b,
            Comparison::Lt => a < b,
            Comparison::Le => a <= b,
            Comparison::Gt => a > b,
            Comparison::Ge => a >= b,
        }
    }
}

/// Lanewise element conversion with `as`-cast semantics: integer widening
/// and truncating narrowing, saturating float-to-int, exactness-losing
/// int-to-float. Drives [`crate::Vector::convert_shape`].
pub trait LaneCast<S: Element>: Element {
    fn cast_from(source: S) -> Self;
}

macro_rules! impl_byte_io {
    () => {
        fn write_bytes(self, out: &mut [u8], order: ByteOrder) {
            match order {
                ByteOrder::LittleEndian => out[..Self::BYTES].copy_from_slice(&self.to_le_bytes()),
                ByteOrder::BigEndian => out[..Self::BYTES].copy_from_slice(&self.to_be_bytes()),
            }
        }

        fn read_bytes(src: &[u8], order: ByteOrder) -> Self {
            let mut b = [0u8; Self::BYTES];
            b.copy_from_slice(&src[..Self::BYTES]);
            match order {
                ByteOrder::LittleEndian => Self::from_le_bytes(b),
                ByteOrder::BigEndian => Self::from_be_bytes(b),
            }
        }
    };
}

macro_rules! impl_int_common {
    ($t:ty, $bits:ty) => {
        fn to_bits(self) -> $bits {
            self as $bits
        }

        fn from_bits(bits: $bits) -> Self {
            bits as $t
        }

        fn to_i64(self) -> i64 {
            self as i64
        }

        fn from_i64(v: i64) -> Self {
            v as $t
        }

        fn from_mask_lane(set: bool) -> Self {
            if set {
                !0
            } else {
                0
            }
        }

        fn wrapping_add(self, rhs: Self) -> Self {
            <$t>::wrapping_add(self, rhs)
        }

        fn wrapping_sub(self, rhs: Self) -> Self {
            <$t>::wrapping_sub(self, rhs)
        }

        fn wrapping_mul(self, rhs: Self) -> Self {
            <$t>::wrapping_mul(self, rhs)
        }

        fn lane_min(self, rhs: Self) -> Self {
            core::cmp::Ord::min(self, rhs)
        }

        fn lane_max(self, rhs: Self) -> Self {
            core::cmp::Ord::max(self, rhs)
        }

        impl_byte_io!();

        fn apply_binary(op: Binary, a: Self, b: Self) -> Option<Self> {
            Some(match op {
                Binary::Add => a.wrapping_add(b),
                Binary::Sub => a.wrapping_sub(b),
                Binary::Mul => a.wrapping_mul(b),
                Binary::Min => core::cmp::Ord::min(a, b),
                Binary::Max => core::cmp::Ord::max(a, b),
                Binary::And => a & b,
                Binary::Or => a | b,
                Binary::Xor => a ^ b,
                // shifts take a scalar amount, not a vector operand
                Binary::Shl | Binary::AShr | Binary::LShr => return None,
            })
        }

        fn apply_shift(op: Binary, a: Self, amount: u32) -> Option<Self> {
            let amt = amount % Self::BITS;
            Some(match op {
                Binary::Shl => a.wrapping_shl(amt),
                Binary::AShr => a.wrapping_shr(amt),
                Binary::LShr => ((a as $bits) >> amt) as $t,
                _ => return None,
            })
        }

        fn apply_ternary(op: Ternary, a: Self, b: Self, c: Self) -> Option<Self> {
            match op {
                Ternary::BitwiseBlend => Some((a & !c) | (b & c)),
                Ternary::MulAdd => None,
            }
        }

        fn assoc_identity(op: Associative) -> Option<Self> {
            Some(match op {
                Associative::Add => 0,
                Associative::Mul => 1,
                Associative::Min => <$t>::MAX,
                Associative::Max => <$t>::MIN,
                Associative::And => !0,
                Associative::Or => 0,
                Associative::Xor => 0,
            })
        }
    };
}

macro_rules! impl_signed {
    ($($t:ty => ($bits:ty, $name:literal)),* $(,)?) => {
        $(
            impl private::Sealed for $t {}

            impl Element for $t {
                type Bits = $bits;
                type Int = $t;

                const BITS: u32 = <$t>::BITS;
                const BYTES: usize = core::mem::size_of::<$t>();
                const NAME: &'static str = $name;
                const IS_FLOAT: bool = false;
                const IS_SIGNED: bool = true;
                const ZERO: Self = 0;
                const ONE: Self = 1;

                impl_int_common!($t, $bits);

                fn apply_unary(op: Unary, a: Self) -> Option<Self> {
                    match op {
                        Unary::Neg => Some(a.wrapping_neg()),
                        Unary::Abs => Some(a.wrapping_abs()),
                        Unary::Not => Some(!a),
                        Unary::Sqrt => None,
                    }
                }

                fn test(op: Test, a: Self) -> Option<bool> {
                    match op {
                        Test::IsNegative => Some(a < 0),
                        Test::IsZero => Some(a == 0),
                        Test::IsFinite | Test::IsNan => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($t:ty => ($int:ty, $name:literal)),* $(,)?) => {
        $(
            impl private::Sealed for $t {}

            impl Element for $t {
                type Bits = $t;
                type Int = $int;

                const BITS: u32 = <$t>::BITS;
                const BYTES: usize = core::mem::size_of::<$t>();
                const NAME: &'static str = $name;
                const IS_FLOAT: bool = false;
                const IS_SIGNED: bool = false;
                const ZERO: Self = 0;
                const ONE: Self = 1;

                impl_int_common!($t, $t);

                fn apply_unary(op: Unary, a: Self) -> Option<Self> {
                    match op {
                        Unary::Neg => Some(a.wrapping_neg()),
                        Unary::Abs => Some(a),
                        Unary::Not => Some(!a),
                        Unary::Sqrt => None,
                    }
                }

                fn test(op: Test, a: Self) -> Option<bool> {
                    match op {
                        Test::IsNegative => Some(false),
                        Test::IsZero => Some(a == 0),
                        Test::IsFinite | Test::IsNan => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($t:ty => ($bits:ty, $int:ty, $name:literal)),* $(,)?) => {
        $(
            impl private::Sealed for $t {}

            impl Element for $t {
                type Bits = $bits;
                type Int = $int;

                const BITS: u32 = (core::mem::size_of::<$t>() * 8) as u32;
                const BYTES: usize = core::mem::size_of::<$t>();
                const NAME: &'static str = $name;
                const IS_FLOAT: bool = true;
                const IS_SIGNED: bool = true;
                const ZERO: Self = 0.0;
                const ONE: Self = 1.0;

                fn to_bits(self) -> $bits {
                    <$t>::to_bits(self)
                }

                fn from_bits(bits: $bits) -> Self {
                    <$t>::from_bits(bits)
                }

                fn to_i64(self) -> i64 {
                    self as i64
                }

                fn from_i64(v: i64) -> Self {
                    v as $t
                }

                fn from_mask_lane(set: bool) -> Self {
                    // all-ones bit pattern, matching the integral encoding
                    if set {
                        <$t>::from_bits(<$bits>::MAX)
                    } else {
                        0.0
                    }
                }

                fn wrapping_add(self, rhs: Self) -> Self {
                    self + rhs
                }

                fn wrapping_sub(self, rhs: Self) -> Self {
                    self - rhs
                }

                fn wrapping_mul(self, rhs: Self) -> Self {
                    self * rhs
                }

                fn lane_min(self, rhs: Self) -> Self {
                    <$t>::min(self, rhs)
                }

                fn lane_max(self, rhs: Self) -> Self {
                    <$t>::max(self, rhs)
                }

                impl_byte_io!();

                fn apply_unary(op: Unary, a: Self) -> Option<Self> {
                    match op {
                        Unary::Neg => Some(-a),
                        Unary::Abs => Some(a.abs()),
                        Unary::Sqrt => Some(a.sqrt()),
                        Unary::Not => None,
                    }
                }

                fn apply_binary(op: Binary, a: Self, b: Self) -> Option<Self> {
                    Some(match op {
                        Binary::Add => a + b,
                        Binary::Sub => a - b,
                        Binary::Mul => a * b,
                        Binary::Min => <$t>::min(a, b),
                        Binary::Max => <$t>::max(a, b),
                        _ => return None,
                    })
                }

                fn apply_shift(_op: Binary, _a: Self, _amount: u32) -> Option<Self> {
                    None
                }

                fn apply_ternary(op: Ternary, a: Self, b: Self, c: Self) -> Option<Self> {
                    match op {
                        Ternary::MulAdd => Some(a.mul_add(b, c)),
                        Ternary::BitwiseBlend => None,
                    }
                }

                fn test(op: Test, a: Self) -> Option<bool> {
                    Some(match op {
                        Test::IsNegative => a.is_sign_negative(),
                        Test::IsZero => a == 0.0,
                        Test::IsFinite => a.is_finite(),
                        Test::IsNan => a.is_nan(),
                    })
                }

                fn assoc_identity(op: Associative) -> Option<Self> {
                    match op {
                        Associative::Add => Some(0.0),
                        Associative::Mul => Some(1.0),
                        Associative::Min => Some(<$t>::INFINITY),
                        Associative::Max => Some(<$t>::NEG_INFINITY),
                        Associative::And | Associative::Or | Associative::Xor => None,
                    }
                }
            }
        )*
    };
}

impl_signed! {
    i8 => (u8, "i8"),
    i16 => (u16, "i16"),
    i32 => (u32, "i32"),
    i64 => (u64, "i64"),
}

impl_unsigned! {
    u8 => (i8, "u8"),
    u16 => (i16, "u16"),
    u32 => (i32, "u32"),
    u64 => (i64, "u64"),
}

impl_float! {
    f32 => (u32, i32, "f32"),
    f64 => (u64, i64, "f64"),
}

macro_rules! impl_cast_from {
    ($from:ty => $($to:ty),*) => {
        $(
            impl LaneCast<$from> for $to {
                #[inline]
                fn cast_from(source: $from) -> $to {
                    source as $to
                }
            }
        )*
    };
}

macro_rules! impl_cast_all {
    ($($from:ty),*) => {
        $(impl_cast_from!($from => i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);)*
    };
}

impl_cast_all!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_amount_reduced_modulo_bit_width() {
        assert_eq!(i8::apply_shift(Binary::Shl, 1, 11), Some(8));
        assert_eq!(u32::apply_shift(Binary::LShr, 0x8000_0000, 63), Some(1));
        assert_eq!(i8::apply_shift(Binary::AShr, -128, 7), Some(-1));
        assert_eq!(u8::apply_shift(Binary::AShr, 0x80, 7), Some(1));
    }

    #[test]
    fn logical_shift_ignores_sign() {
        assert_eq!(i8::apply_shift(Binary::LShr, -1, 4), Some(0x0f));
    }

    #[test]
    fn int_opcodes_rejected_for_floats() {
        assert_eq!(f32::apply_binary(Binary::And, 1.0, 2.0), None);
        assert_eq!(f64::apply_shift(Binary::Shl, 1.0, 1), None);
        assert_eq!(f32::apply_ternary(Ternary::BitwiseBlend, 0.0, 0.0, 0.0), None);
        assert_eq!(i32::apply_unary(Unary::Sqrt, 4), None);
    }

    #[test]
    fn byte_io_roundtrip_both_orders() {
        let mut buf = [0u8; 8];
        0x1234_5678_u32.write_bytes(&mut buf, ByteOrder::LittleEndian);
        assert_eq!(&buf[..4], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(u32::read_bytes(&buf, ByteOrder::LittleEndian), 0x1234_5678);

        (-2.5f64).write_bytes(&mut buf, ByteOrder::BigEndian);
        assert_eq!(f64::read_bytes(&buf, ByteOrder::BigEndian), -2.5);
    }

    #[test]
    fn mask_lane_encoding() {
        assert_eq!(i16::from_mask_lane(true), -1);
        assert_eq!(u8::from_mask_lane(true), 0xff);
        assert_eq!(f32::from_mask_lane(true).to_bits(), u32::MAX);
        assert_eq!(f32::from_mask_lane(false), 0.0);
    }

    #[test]
    fn cast_follows_as_semantics() {
        assert_eq!(<i8 as LaneCast<i32>>::cast_from(0x1_80), -128);
        assert_eq!(<f32 as LaneCast<i32>>::cast_from(-3), -3.0);
        assert_eq!(<i32 as LaneCast<f64>>::cast_from(1e12), i32::MAX);
    }
}
