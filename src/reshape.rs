//! Conversion between flat sequences and nested arrays.
//!
//! A [`Nested`] value is either a leaf element or a list of nested values.
//! Its flat form is the depth-first, left-to-right list of its leaves, which
//! is also the row-major layout of a rectangular nesting.
//!
//! ```rust
//! use flatseq::reshape::{flatten, reshape, Nested};
//!
//! let flat = Nested::from(vec![1, 2, 3, 4, 5, 6]);
//! let grid = reshape(&flat, &[2, 3]).unwrap();
//! assert_eq!(grid.shape().unwrap().as_slice(), &[2, 3]);
//! assert_eq!(flatten(&grid), vec![1, 2, 3, 4, 5, 6]);
//! ```

use flatseq_traits::{Seq, SeqMut};
use smallvec::SmallVec;

use crate::ex::SeqOps;
use crate::store::{check_window, BackingStore};
use crate::{Result, SeqError};

/// Dimension sizes, outermost first.
pub type Shape = SmallVec<[usize; 4]>;

/// A nested array of `T`.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    Leaf(T),
    List(Vec<Nested<T>>),
}

impl<T> From<Vec<T>> for Nested<T> {
    /// A one-level list of leaves.
    fn from(values: Vec<T>) -> Self {
        Nested::List(values.into_iter().map(Nested::Leaf).collect())
    }
}

impl<T: Copy> Nested<T> {
    /// Number of leaf elements.
    pub fn leaf_count(&self) -> usize {
        match self {
            Nested::Leaf(_) => 1,
            Nested::List(items) => items.iter().map(Nested::leaf_count).sum(),
        }
    }

    /// Rectangular shape of this nesting. A leaf has the empty shape.
    ///
    /// # Errors
    /// Returns [`SeqError::ShapeMismatch`] if siblings disagree on their shape.
    pub fn shape(&self) -> Result<Shape> {
        let items = match self {
            Nested::Leaf(_) => return Ok(Shape::new()),
            Nested::List(items) => items,
        };
        let mut shape = Shape::new();
        shape.push(items.len());
        let Some((first, rest)) = items.split_first() else {
            return Ok(shape);
        };
        let inner = first.shape()?;
        for item in rest {
            let other = item.shape()?;
            if other != inner {
                shape.extend_from_slice(&inner);
                return Err(SeqError::ShapeMismatch {
                    expected: inner.iter().product(),
                    actual: item.leaf_count(),
                    shape: shape.to_vec(),
                });
            }
        }
        shape.extend_from_slice(&inner);
        Ok(shape)
    }

    fn for_each_leaf<F>(&self, f: &mut F) -> Result<()>
    where
        F: FnMut(T) -> Result<()>,
    {
        match self {
            Nested::Leaf(v) => f(*v),
            Nested::List(items) => items.iter().try_for_each(|item| item.for_each_leaf(f)),
        }
    }

    fn push_leaves(&self, out: &mut Vec<T>) {
        match self {
            Nested::Leaf(v) => out.push(*v),
            Nested::List(items) => items.iter().for_each(|item| item.push_leaves(out)),
        }
    }
}

/// Leaves of `nested`, depth first.
pub fn flatten<T: Copy>(nested: &Nested<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(nested.leaf_count());
    nested.push_leaves(&mut out);
    out
}

fn element_count(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(SeqError::InvalidArgument("shape element count overflows"))
}

fn check_count(shape: &[usize], actual: usize) -> Result<()> {
    let expected = element_count(shape)?;
    if expected != actual {
        return Err(SeqError::ShapeMismatch {
            shape: shape.to_vec(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn build<S: Seq + ?Sized>(src: &S, pos: &mut usize, shape: &[usize]) -> Result<Nested<S::Elem>> {
    match shape.split_first() {
        None => {
            let v = src.get(*pos)?;
            *pos = pos.saturating_add(1);
            Ok(Nested::Leaf(v))
        }
        Some((&n, rest)) => (0..n)
            .map(|_| build(src, pos, rest))
            .collect::<Result<Vec<_>>>()
            .map(Nested::List),
    }
}

/// Carve the flat window `src[index..index + count]` into nested lists of `shape`.
///
/// An empty `shape` yields a single leaf; a one-element shape yields a flat list.
///
/// # Errors
/// Returns [`SeqError::ShapeMismatch`] if `shape` does not hold exactly
/// `count` elements.
pub fn reshape_seq<S: Seq + ?Sized>(
    src: &S,
    index: usize,
    count: usize,
    shape: &[usize],
) -> Result<Nested<S::Elem>> {
    check_count(shape, count)?;
    check_window(src, index, count)?;
    let mut pos = index;
    build(src, &mut pos, shape)
}

/// Regroup the leaves of `src` into `shape`.
///
/// # Errors
/// Returns [`SeqError::ShapeMismatch`] if the leaf count differs from the
/// element count of `shape`.
pub fn reshape<T: Copy>(src: &Nested<T>, shape: &[usize]) -> Result<Nested<T>> {
    check_count(shape, src.leaf_count())?;
    let flat = flatten(src);
    reshape_seq(flat.as_slice(), 1, flat.len(), shape)
}

impl<B> SeqOps<B> {
    /// Write the leaves of `nested` into `dest`, depth first.
    pub fn flatten_into<T, SD>(
        &self,
        nested: &Nested<T>,
        dest: &mut SD,
        dest_index: Option<usize>,
    ) -> Result<()>
    where
        T: Copy,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        let mut pos = self.prepare_dest(dest, dest_index, nested.leaf_count())?;
        nested.for_each_leaf(&mut |v| {
            dest.set(pos, v)?;
            pos = pos.saturating_add(1);
            Ok(())
        })
    }

    /// Write the row-major layout of `reshape(src, shape)` into `dest`.
    ///
    /// # Errors
    /// Returns [`SeqError::ShapeMismatch`] before touching `dest` if the leaf
    /// count differs from the element count of `shape`.
    pub fn reshape_into<T, SD>(
        &self,
        src: &Nested<T>,
        shape: &[usize],
        dest: &mut SD,
        dest_index: Option<usize>,
    ) -> Result<()>
    where
        T: Copy,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        check_count(shape, src.leaf_count())?;
        self.flatten_into(src, dest, dest_index)
    }
}
