//! Constant operands for broadcasting operations.
//!
//! A constant operand is combined with every element of a larger sequence.
//! It is either a [`Uniform`] value, used unchanged at every position, or a
//! [`Pattern`] of `g` elements that repeats: position `i` of the larger
//! sequence pairs with pattern element `((i - 1) mod g) + 1`. `g` does not
//! have to divide the larger length.
//!
//! # Example
//!
//! ```rust
//! use flatseq::broadcast::{Constant, Pattern, Uniform};
//!
//! let c = [10, 20];
//! let pattern = Pattern::new(&c).unwrap();
//! assert_eq!(pattern.resolve(3).unwrap(), 10);
//! assert_eq!(pattern.resolve(4).unwrap(), 20);
//! assert_eq!(Uniform(5).resolve(99).unwrap(), 5);
//! ```

use flatseq_traits::Seq;

use crate::{Result, SeqError};

/// Per-position value of a constant operand.
///
/// Implementations must be O(1) per call.
pub trait Constant<T> {
    /// Value to combine with position `i` (1-based) of the larger operand.
    fn resolve(&self, i: usize) -> Result<T>;
}

/// A single value broadcast to every position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform<T>(pub T);

impl<T: Copy> Constant<T> for Uniform<T> {
    #[inline]
    fn resolve(&self, _i: usize) -> Result<T> {
        Ok(self.0)
    }
}

/// A short sequence cycled over the larger operand.
#[derive(Debug, Clone)]
pub struct Pattern<S> {
    seq: S,
    index: usize,
    group: usize,
}

impl<S: Seq> Pattern<S> {
    /// Cycle over all of `seq`.
    ///
    /// # Errors
    /// Returns [`SeqError::InvalidArgument`] if `seq` is empty or its length
    /// is unknown.
    pub fn new(seq: S) -> Result<Self> {
        let group = seq
            .length()
            .ok_or(SeqError::InvalidArgument("pattern length is unknown"))?;
        Self::window(seq, 1, group)
    }

    /// Cycle over the `count` elements of `seq` starting at `index`.
    ///
    /// # Errors
    /// Returns [`SeqError::InvalidArgument`] if `count` is zero.
    pub fn window(seq: S, index: usize, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(SeqError::InvalidArgument("cannot cycle an empty pattern"));
        }
        Ok(Self {
            seq,
            index,
            group: count,
        })
    }

    /// Number of elements in one repetition.
    #[inline]
    pub fn group_len(&self) -> usize {
        self.group
    }
}

impl<S: Seq> Constant<S::Elem> for Pattern<S> {
    #[inline]
    fn resolve(&self, i: usize) -> Result<S::Elem> {
        if i == 0 {
            return Err(SeqError::OutOfRange { index: 0, len: None });
        }
        let pos = self
            .index
            .checked_add((i - 1) % self.group)
            .ok_or(SeqError::OutOfRange {
                index: isize::MAX,
                len: self.seq.length(),
            })?;
        self.seq.get(pos)
    }
}

impl<T, C: Constant<T> + ?Sized> Constant<T> for &C {
    #[inline]
    fn resolve(&self, i: usize) -> Result<T> {
        (**self).resolve(i)
    }
}

/// Free-function form of [`Constant::resolve`].
#[inline]
pub fn resolve<T, C: Constant<T> + ?Sized>(c: &C, i: usize) -> Result<T> {
    c.resolve(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view;

    #[test]
    fn test_uniform_is_constant() {
        let c = Uniform(2.5);
        for i in 1..10 {
            assert_eq!(c.resolve(i).unwrap(), 2.5);
        }
    }

    #[test]
    fn test_pattern_cycles_when_group_does_not_divide() {
        let c = vec![1, 2, 3];
        let p = Pattern::new(&c).unwrap();
        let got: Vec<i32> = (1..=7).map(|i| p.resolve(i).unwrap()).collect();
        assert_eq!(got, vec![1, 2, 3, 1, 2, 3, 1]);
    }

    #[test]
    fn test_pattern_window() {
        let c = [0, 10, 20, 0];
        let p = Pattern::window(&c, 2, 2).unwrap();
        assert_eq!(p.group_len(), 2);
        assert_eq!(resolve(&p, 1).unwrap(), 10);
        assert_eq!(resolve(&p, 4).unwrap(), 20);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let empty: Vec<f64> = Vec::new();
        assert_eq!(
            Pattern::new(&empty).err(),
            Some(SeqError::InvalidArgument("cannot cycle an empty pattern"))
        );
    }

    #[test]
    fn test_pattern_over_view() {
        let xyzw = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let xs = view::stride(&xyzw, 1, 4, 2).unwrap();
        let p = Pattern::new(xs).unwrap();
        assert_eq!(p.resolve(3).unwrap(), 1);
        assert_eq!(p.resolve(2).unwrap(), 5);
    }
}
