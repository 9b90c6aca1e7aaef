//! Statically-specialized SIMD lane vectors.
//!
//! A [`Vector<E, N>`] holds `N` lanes of element type `E`; both are fixed
//! at the type level, so every shape monomorphizes into its own
//! specialized code and shape agreement between operands is checked by the
//! compiler. Around the vector type sit [`Mask`] (per-lane booleans),
//! [`Shuffle`] (per-lane source-index permutations) and [`Species`] (the
//! factory and metadata handle for one shape).
//!
//! Every operation is defined by a portable per-lane fallback and may be
//! accelerated by the active hardware backend; backends are selected at
//! compile time and can never change observable results, only speed. See
//! [`Backend`] for the protocol.
//!
//! # Example
//!
//! Strip-mined loop with a tail mask instead of scalar cleanup:
//!
//! ```
//! use lanevec::{Binary, Species, Vector};
//!
//! # fn main() -> lanevec::Result<()> {
//! let xs = [1.0f32, 2.0, 3.0, 4.0, 5.0];
//! let ys = [10.0f32, 20.0, 30.0, 40.0, 50.0];
//! let mut out = [0.0f32; 5];
//!
//! let sp = Species::<f32, 4>::new()?;
//! let mut i = 0;
//! while i < xs.len() {
//!     let m = sp.index_in_range(i, xs.len());
//!     let a = Vector::from_slice_masked(&xs, i, &m)?;
//!     let b = Vector::from_slice_masked(&ys, i, &m)?;
//!     let sum = a.lanewise_binary(Binary::Add, b, Some(&m))?;
//!     sum.write_to_slice_masked(&mut out, i, &m)?;
//!     i += sp.lane_count();
//! }
//! assert_eq!(out, [11.0, 22.0, 33.0, 44.0, 55.0]);
//! # Ok(())
//! # }
//! ```
#![allow(non_camel_case_types)]

mod backend;
mod element;
mod error;
mod mask;
mod memory;
mod ops;
mod shuffle;
mod species;
mod vector;

pub use crate::backend::{Backend, Portable};
#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
pub use crate::backend::Sse2;
pub use crate::element::{Element, LaneCast};
pub use crate::error::{Error, Result};
pub use crate::mask::Mask;
pub use crate::memory::ByteOrder;
pub use crate::ops::{Associative, Binary, Comparison, Ternary, Test, Unary};
pub use crate::shuffle::Shuffle;
pub use crate::species::{Species, SpeciesDescriptor, SUPPORTED_VECTOR_BITS};
pub use crate::vector::Vector;

// Aliases for the shapes with a hardware register width, named
// `<element>x<lanes>` like the target ISA mnemonics.

pub type i8x8 = Vector<i8, 8>;
pub type i8x16 = Vector<i8, 16>;
pub type i8x32 = Vector<i8, 32>;
pub type i8x64 = Vector<i8, 64>;
pub type u8x8 = Vector<u8, 8>;
pub type u8x16 = Vector<u8, 16>;
pub type u8x32 = Vector<u8, 32>;
pub type u8x64 = Vector<u8, 64>;
pub type i16x4 = Vector<i16, 4>;
pub type i16x8 = Vector<i16, 8>;
pub type i16x16 = Vector<i16, 16>;
pub type i16x32 = Vector<i16, 32>;
pub type u16x4 = Vector<u16, 4>;
pub type u16x8 = Vector<u16, 8>;
pub type u16x16 = Vector<u16, 16>;
pub type u16x32 = Vector<u16, 32>;
pub type i32x2 = Vector<i32, 2>;
pub type i32x4 = Vector<i32, 4>;
pub type i32x8 = Vector<i32, 8>;
pub type i32x16 = Vector<i32, 16>;
pub type u32x2 = Vector<u32, 2>;
pub type u32x4 = Vector<u32, 4>;
pub type u32x8 = Vector<u32, 8>;
pub type u32x16 = Vector<u32, 16>;
pub type i64x2 = Vector<i64, 2>;
pub type i64x4 = Vector<i64, 4>;
pub type i64x8 = Vector<i64, 8>;
pub type u64x2 = Vector<u64, 2>;
pub type u64x4 = Vector<u64, 4>;
pub type u64x8 = Vector<u64, 8>;
pub type f32x2 = Vector<f32, 2>;
pub type f32x4 = Vector<f32, 4>;
pub type f32x8 = Vector<f32, 8>;
pub type f32x16 = Vector<f32, 16>;
pub type f64x2 = Vector<f64, 2>;
pub type f64x4 = Vector<f64, 4>;
pub type f64x8 = Vector<f64, 8>;

pub type m8x16 = Mask<i8, 16>;
pub type m8x32 = Mask<i8, 32>;
pub type m16x8 = Mask<i16, 8>;
pub type m16x16 = Mask<i16, 16>;
pub type m32x4 = Mask<i32, 4>;
pub type m32x8 = Mask<i32, 8>;
pub type m64x2 = Mask<i64, 2>;
pub type m64x4 = Mask<i64, 4>;
