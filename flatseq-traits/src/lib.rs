//! Shared traits for the flatseq ecosystem.
//!
//! This crate defines the element-level half of the backing-store protocol:
//! the capability traits every indexable container implements, plus the error
//! type they report. Host crates can depend on `flatseq-traits` alone to make
//! their own buffers (FFI memory, userdata blocks, ...) usable as sequences
//! without orphan rule violations.
//!
//! Positions are 1-based throughout.

pub mod error;
pub mod scalar;
pub mod seq;

pub use error::{Result, SeqError};
pub use scalar::Scalar;
pub use seq::{checked_offset, shared, Array, Seq, SeqMut, Shared};
