//! Faults raised by the lane-vector algebra.
//!
//! Every error here is local, synchronous and non-recoverable: it is raised
//! at the offending call, nothing is retried and no operation is partially
//! applied. Shape and bounds violations always fault rather than wrap or
//! clamp, except where wrapping is the documented semantics (shuffle index
//! wrapping, shift-amount modulo reduction).

use thiserror::Error;

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Operand geometry disagrees with what the operation requires, e.g. a
    /// shape conversion between bit sizes where neither divides the other.
    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// A lane index, shuffle index or part number outside its valid range.
    #[error("{context}: index {index} out of range [{low}, {high})")]
    IndexOutOfRange {
        context: &'static str,
        index: i64,
        low: i64,
        high: i64,
    },

    /// A memory transfer would touch storage outside the backing buffer.
    #[error("{context}: offset {offset} with {touched} touched elements exceeds buffer length {len}")]
    OutOfBounds {
        context: &'static str,
        offset: usize,
        touched: usize,
        len: usize,
    },

    /// The requested (element type, lane count) pair is not one of the
    /// supported hardware vector widths.
    #[error("unsupported vector shape: {lanes} lanes of {element} ({bits} bits)")]
    UnsupportedShape {
        element: &'static str,
        lanes: usize,
        bits: u64,
    },

    /// An opcode the element type cannot realize, or a query whose result
    /// does not fit its carrier (e.g. packing more lanes than fit a 64-bit
    /// bitset).
    #[error("operation `{op}` is not defined for element type {element}")]
    UnsupportedOperation {
        op: &'static str,
        element: &'static str,
    },
}

impl Error {
    #[cold]
    pub(crate) fn shape_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Error::ShapeMismatch {
            context,
            expected,
            found,
        }
    }

    #[cold]
    pub(crate) fn index_out_of_range(
        context: &'static str,
        index: i64,
        low: i64,
        high: i64,
    ) -> Self {
        Error::IndexOutOfRange {
            context,
            index,
            low,
            high,
        }
    }

    #[cold]
    pub(crate) fn out_of_bounds(
        context: &'static str,
        offset: usize,
        touched: usize,
        len: usize,
    ) -> Self {
        Error::OutOfBounds {
            context,
            offset,
            touched,
            len,
        }
    }

    #[cold]
    pub(crate) fn unsupported_shape(element: &'static str, lanes: usize, bits: u64) -> Self {
        Error::UnsupportedShape {
            element,
            lanes,
            bits,
        }
    }

    #[cold]
    pub(crate) fn unsupported_operation(op: &'static str, element: &'static str) -> Self {
        Error::UnsupportedOperation { op, element }
    }
}
