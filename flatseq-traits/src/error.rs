//! Error taxonomy shared by every sequence operation.

/// Errors raised by sequence access, views, and the operations built on them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeqError {
    /// A position fell outside the addressable window of a sequence.
    ///
    /// `len` is `None` when the sequence does not know its own length.
    #[error("position {index} out of range (length {len:?})")]
    OutOfRange { index: isize, len: Option<usize> },

    /// An argument can never be valid (empty broadcast pattern, zero group size, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Element count implied by a target shape differs from the source.
    #[error("shape mismatch: target shape {shape:?} holds {expected} elements, source has {actual}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// The backing store could not provide the requested number of elements.
    #[error("allocation of {requested} elements failed")]
    Allocation { requested: usize },
}

impl SeqError {
    #[inline]
    pub(crate) fn out_of_range(index: usize, len: Option<usize>) -> Self {
        SeqError::OutOfRange {
            index: isize::try_from(index).unwrap_or(isize::MAX),
            len,
        }
    }
}

/// Result type for sequence operations.
pub type Result<T> = std::result::Result<T, SeqError>;
