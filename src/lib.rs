//! Zero-copy sequences, views and numeric kernels over flat buffers.
//!
//! Everything in this crate addresses elements through three primitives,
//! `get`, `set` and `length`, defined by the [`Seq`]/[`SeqMut`] traits in
//! `flatseq-traits`. Plain slices and vectors implement them, and so does
//! every [`View`], so kernels run unchanged over raw storage, composed views
//! and host-provided buffers. Positions are 1-based.
//!
//! # Core Types
//!
//! - [`Seq`] / [`SeqMut`] / [`Array`]: read, write and growth capabilities
//! - [`View`]: slice, stride, interleave and reverse projections of a backing
//!   sequence; views nest and never copy
//! - [`Constant`]: a broadcast operand, either [`Uniform`] or
//!   a cycled [`Pattern`]
//! - [`BackingStore`]: the allocation, bulk copy and growth strategy, with
//!   [`NativeStore`] (`Vec<T>`) and [`PodStore`] (byte buffers)
//! - [`SeqOps`]: the operation front end bound to one strategy
//!
//! # Calling Convention
//!
//! Each operation comes as an allocating form `op(...)` returning a fresh
//! array and an in-place form `op_into(..., dest, dest_index)` writing into
//! `dest` from `dest_index` (default 1), growing it first when needed. See
//! [`ex`] for the aliasing rules.
//!
//! # Example
//!
//! ```rust
//! use flatseq::{view, Seq, SeqMut, SeqOps};
//!
//! // Interleaved xyzw records.
//! let mut data = vec![1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0];
//!
//! let ops = SeqOps::native();
//! let xs = view::stride(&data, 1, 4, 2).unwrap();
//! assert_eq!(xs.values().unwrap(), vec![1.0, 4.0]);
//!
//! // Scale the xyz channels in place through an interleaved view.
//! let mut xyz = view::interleave(&mut data, 1, 3, 4, 6).unwrap();
//! let scaled = ops.mul_constant(&xyz, 1, 6, &flatseq::Uniform(2.0)).unwrap();
//! ops.copy_into(&scaled, 1, 6, &mut xyz, None).unwrap();
//! xyz.set(1, -1.0).unwrap();
//! assert_eq!(xyz.get(6).unwrap(), 12.0);
//! assert_eq!(data, vec![-1.0, 4.0, 6.0, 0.0, 8.0, 10.0, 12.0, 0.0]);
//! ```

pub mod broadcast;
pub mod display;
pub mod ex;
pub mod linalg;
pub mod ops;
pub mod pod;
pub mod reshape;
pub mod store;
pub mod view;

// ============================================================================
// Capability traits and errors
// ============================================================================
pub use flatseq_traits::{
    checked_offset, shared, Array, Result, Scalar, Seq, SeqError, SeqMut, Shared,
};

// ============================================================================
// Views
// ============================================================================
pub use view::{Transform, View};

// ============================================================================
// Backing stores
// ============================================================================
pub use pod::{PodBuffer, PodStore};
pub use store::{BackingStore, NativeStore};

// ============================================================================
// Operations
// ============================================================================
pub use broadcast::{Constant, Pattern, Uniform};
pub use ex::{fold, SeqOps};
pub use linalg::trace;
pub use ops::{distance, dot, length, length_squared, sum};

// ============================================================================
// Reshape and formatting
// ============================================================================
pub use display::{display, Formatted};
pub use reshape::{flatten, reshape, reshape_seq, Nested, Shape};
