//! Zero-copy views over sequences.
//!
//! A [`View`] owns no storage. It holds a backing sequence, an index
//! [`Transform`] and a logical length; every read and write is forwarded to
//! the backing sequence. Views compose by nesting: passing a view as the
//! source of another view constructor stacks the transforms.
//!
//! Key properties:
//! - Construction never copies and never scans the backing store
//! - Out-of-range positions fail lazily, at `get`/`set` time
//! - `View<&S>` reads, `View<&mut S>` reads and writes, and `View<Shared<T>>`
//!   lets several views write to the same buffer at once
//!
//! # Example
//! ```rust
//! use flatseq::{view, Seq, SeqMut};
//!
//! let mut data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let odd = view::stride(&data, 1, 2, 3).unwrap();
//! assert_eq!(odd.values().unwrap(), vec![1.0, 3.0, 5.0]);
//!
//! let mut odd = view::stride(&mut data, 1, 2, 3).unwrap();
//! odd.set(2, 30.0).unwrap();
//! assert_eq!(data[2], 30.0);
//! ```

use flatseq_traits::{Seq, SeqMut};

use crate::{Result, SeqError};

/// Index transform from logical view positions to backing positions.
///
/// All positions are 1-based. Backing positions are signed so a transform
/// can walk below the start of the backing sequence; such positions are
/// reported as out of range when accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// `i -> base + i - 1`
    Slice { base: usize },
    /// `i -> base + (i - 1) * stride`
    Stride { base: usize, stride: isize },
    /// `i -> base + ((i - 1) / group_size) * stride + (i - 1) % group_size`
    Interleave {
        base: usize,
        group_size: usize,
        stride: isize,
    },
    /// `i -> base + count - i`
    Reverse { base: usize, count: usize },
}

impl Transform {
    /// Backing position for logical position `i` (1-based), or `None` when
    /// the position does not fit in an `isize`.
    #[inline]
    pub fn backing_index(&self, i: usize) -> Option<isize> {
        let i = isize::try_from(i).ok()?;
        let k = i.checked_sub(1)?;
        match *self {
            Transform::Slice { base } => isize::try_from(base).ok()?.checked_add(k),
            Transform::Stride { base, stride } => {
                isize::try_from(base).ok()?.checked_add(k.checked_mul(stride)?)
            }
            Transform::Interleave {
                base,
                group_size,
                stride,
            } => {
                let g = isize::try_from(group_size).ok()?;
                let group = k.checked_div(g)?.checked_mul(stride)?;
                isize::try_from(base)
                    .ok()?
                    .checked_add(group)?
                    .checked_add(k.checked_rem(g)?)
            }
            Transform::Reverse { base, count } => isize::try_from(base.checked_add(count)?)
                .ok()?
                .checked_sub(i),
        }
    }

    /// Backing range `[start, end)` (0-based) when the transform is a unit-step walk.
    #[inline]
    fn contiguous_window(&self, count: usize) -> Option<std::ops::Range<usize>> {
        match *self {
            Transform::Slice { base } | Transform::Stride { base, stride: 1 } if base >= 1 => {
                Some(base - 1..(base - 1).checked_add(count)?)
            }
            _ => None,
        }
    }
}

/// A non-owning sequence mapping logical positions onto a backing sequence.
///
/// # Type Parameters
/// - `S`: The backing sequence, typically `&Vec<T>`, `&mut [T]`,
///   `Shared<T>`, or another `View`
#[derive(Debug, Clone)]
pub struct View<S> {
    src: S,
    transform: Transform,
    count: usize,
}

impl<S> View<S> {
    /// Create a view from an explicit transform.
    ///
    /// The transform is not validated against the backing sequence.
    #[inline]
    pub fn new(src: S, transform: Transform, count: usize) -> Self {
        Self {
            src,
            transform,
            count,
        }
    }

    /// Logical number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// The backing sequence.
    #[inline]
    pub fn get_ref(&self) -> &S {
        &self.src
    }

    /// Release the backing sequence.
    #[inline]
    pub fn into_inner(self) -> S {
        self.src
    }

    /// Map a logical position to a backing position, checking both ends
    /// that can be checked without querying the backing store.
    #[inline]
    fn resolve(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.count {
            return Err(SeqError::OutOfRange {
                index: index as isize,
                len: Some(self.count),
            });
        }
        // Unrepresentable positions lie past anything the backing store holds.
        let j = self
            .transform
            .backing_index(index)
            .ok_or(SeqError::OutOfRange {
                index: isize::MAX,
                len: None,
            })?;
        if j < 1 {
            return Err(SeqError::OutOfRange {
                index: j,
                len: None,
            });
        }
        Ok(j as usize)
    }
}

impl<S: Seq> View<S> {
    /// Read every logical element in order.
    pub fn values(&self) -> Result<Vec<S::Elem>> {
        Seq::to_vec(self, 1, self.count)
    }
}

impl<S: Seq> Seq for View<S> {
    type Elem = S::Elem;

    #[inline]
    fn get(&self, index: usize) -> Result<S::Elem> {
        let j = self.resolve(index)?;
        self.src.get(j)
    }

    #[inline]
    fn length(&self) -> Option<usize> {
        Some(self.count)
    }

    fn as_contiguous(&self) -> Option<&[S::Elem]> {
        let window = self.transform.contiguous_window(self.count)?;
        self.src.as_contiguous()?.get(window)
    }
}

impl<S: SeqMut> SeqMut for View<S> {
    #[inline]
    fn set(&mut self, index: usize, value: S::Elem) -> Result<()> {
        let j = self.resolve(index)?;
        self.src.set(j, value)
    }

    fn as_contiguous_mut(&mut self) -> Option<&mut [S::Elem]> {
        let window = self.transform.contiguous_window(self.count)?;
        self.src.as_contiguous_mut()?.get_mut(window)
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// View `count` consecutive elements starting at backing position `index`.
///
/// Position `i` of the view addresses `src[index + i - 1]`.
#[inline]
pub fn slice<S: Seq>(src: S, index: usize, count: usize) -> View<S> {
    View::new(src, Transform::Slice { base: index }, count)
}

/// View every `stride`-th element starting at `index`.
///
/// Negative strides walk backward from `index`.
///
/// # Errors
/// Returns [`SeqError::InvalidArgument`] if `stride` is zero.
pub fn stride<S: Seq>(src: S, index: usize, stride: isize, count: usize) -> Result<View<S>> {
    if stride == 0 {
        return Err(SeqError::InvalidArgument("stride must be non-zero"));
    }
    Ok(View::new(
        src,
        Transform::Stride {
            base: index,
            stride,
        },
        count,
    ))
}

/// Gather groups of `group_size` consecutive elements whose starts are
/// `stride` backing positions apart.
///
/// Typical use is pulling one record field out of interleaved data, e.g.
/// the XY pair of each XYZW record is `interleave(src, 1, 2, 4, 2 * n)`.
/// `count` need not be a multiple of `group_size`; the last group is then
/// partial.
///
/// # Errors
/// Returns [`SeqError::InvalidArgument`] if `group_size` is zero.
pub fn interleave<S: Seq>(
    src: S,
    index: usize,
    group_size: usize,
    stride: isize,
    count: usize,
) -> Result<View<S>> {
    if group_size == 0 {
        return Err(SeqError::InvalidArgument("interleave group size must be at least 1"));
    }
    Ok(View::new(
        src,
        Transform::Interleave {
            base: index,
            group_size,
            stride,
        },
        count,
    ))
}

/// Reverse the whole of `src`.
///
/// # Errors
/// Returns [`SeqError::InvalidArgument`] if `src` does not know its length;
/// use [`reverse_range`] with an explicit window instead.
pub fn reverse<S: Seq>(src: S) -> Result<View<S>> {
    let count = src
        .length()
        .ok_or(SeqError::InvalidArgument("reverse of a sequence with unknown length"))?;
    Ok(reverse_range(src, 1, count))
}

/// Reverse the `count` elements starting at `index`.
#[inline]
pub fn reverse_range<S: Seq>(src: S, index: usize, count: usize) -> View<S> {
    View::new(src, Transform::Reverse { base: index, count }, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatseq_traits::shared;

    #[test]
    fn test_stride_projection_and_write() {
        let mut a = vec![1, 2, 3, 4, 5, 6];
        let v = stride(&a, 1, 2, 3).unwrap();
        assert_eq!(v.values().unwrap(), vec![1, 3, 5]);

        let mut v = stride(&mut a, 1, 2, 3).unwrap();
        v.set(2, 30).unwrap();
        assert_eq!(a, vec![1, 2, 30, 4, 5, 6]);
    }

    #[test]
    fn test_interleave_gathers_groups() {
        let a = vec![1, 2, 9, 9, 5, 6, 9, 9];
        let v = interleave(&a, 1, 2, 4, 4).unwrap();
        assert_eq!(v.values().unwrap(), vec![1, 2, 5, 6]);
    }

    #[test]
    fn test_interleave_partial_last_group() {
        let a = vec![1, 2, 3, 0, 4, 5, 6, 0, 7];
        let v = interleave(&a, 1, 3, 4, 7).unwrap();
        assert_eq!(v.values().unwrap(), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_reverse_whole_and_window() {
        let a = [1, 2, 3, 4, 5];
        assert_eq!(reverse(&a).unwrap().values().unwrap(), vec![5, 4, 3, 2, 1]);
        assert_eq!(reverse_range(&a, 2, 3).values().unwrap(), vec![4, 3, 2]);
    }

    #[test]
    fn test_stride_minus_one_matches_reverse() {
        let a: Vec<i32> = (1..=6).collect();
        let backward = stride(&a, 6, -1, 6).unwrap();
        let reversed = reverse_range(&a, 1, 6);
        assert_eq!(backward.values().unwrap(), reversed.values().unwrap());
    }

    #[test]
    fn test_stride_over_reverse_composes() {
        let a: Vec<i32> = (1..=8).collect();
        let r = reverse(&a).unwrap();
        let every_other = stride(&r, 1, 2, 4).unwrap();
        assert_eq!(every_other.values().unwrap(), vec![8, 6, 4, 2]);
    }

    #[test]
    fn test_slice_of_slice() {
        let a: Vec<i32> = (1..=10).collect();
        let outer = slice(&a, 3, 6);
        let inner = slice(&outer, 2, 3);
        assert_eq!(inner.values().unwrap(), vec![4, 5, 6]);
        assert_eq!(inner.length(), Some(3));
    }

    #[test]
    fn test_range_errors_are_lazy() {
        let a = vec![1.0, 2.0, 3.0];
        // Construction succeeds even though the view overruns its source.
        let v = slice(&a, 2, 5);
        assert_eq!(v.get(2).unwrap(), 3.0);
        assert_eq!(
            v.get(3),
            Err(SeqError::OutOfRange {
                index: 4,
                len: Some(3)
            })
        );
        assert_eq!(
            v.get(6),
            Err(SeqError::OutOfRange {
                index: 6,
                len: Some(5)
            })
        );

        let back = stride(&a, 1, -1, 2).unwrap();
        assert_eq!(back.get(1).unwrap(), 1.0);
        assert_eq!(
            back.get(2),
            Err(SeqError::OutOfRange {
                index: 0,
                len: None
            })
        );
    }

    #[test]
    fn test_invalid_arguments() {
        let a = [0u8; 4];
        assert!(matches!(
            stride(&a, 1, 0, 2),
            Err(SeqError::InvalidArgument(_))
        ));
        assert!(matches!(
            interleave(&a, 1, 0, 2, 2),
            Err(SeqError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unrepresentable_positions_are_out_of_range() {
        let mut a = vec![1, 2, 3];
        let past_end = SeqError::OutOfRange {
            index: isize::MAX,
            len: None,
        };

        let far = stride(&a, 1, isize::MAX, 3).unwrap();
        assert_eq!(far.get(1).unwrap(), 1);
        assert_eq!(far.get(2), Err(past_end.clone()));
        assert_eq!(far.get(3), Err(past_end.clone()));

        assert_eq!(reverse_range(&a, usize::MAX, 2).get(1), Err(past_end.clone()));
        assert_eq!(slice(&a, usize::MAX, 2).get(1), Err(past_end.clone()));
        assert!(slice(&a, usize::MAX, 2).as_contiguous().is_none());

        let unchecked = Transform::Interleave {
            base: 1,
            group_size: 0,
            stride: 2,
        };
        assert_eq!(View::new(&a, unchecked, 2).get(1), Err(past_end.clone()));

        let mut wild = stride(&mut a, 2, isize::MIN, 2).unwrap();
        assert!(matches!(
            wild.set(2, 0),
            Err(SeqError::OutOfRange { len: None, .. })
        ));
        assert_eq!(a, vec![1, 2, 3]);
    }

    #[test]
    fn test_aliasing_views_share_writes() {
        let mut buf = [0, 0, 0, 0, 0, 0];
        let cells = shared(&mut buf);
        let mut evens = stride(cells, 2, 2, 3).unwrap();
        let everything = slice(cells, 1, 6);

        evens.set(1, 7).unwrap();
        evens.set(3, 9).unwrap();
        assert_eq!(everything.values().unwrap(), vec![0, 7, 0, 0, 0, 9]);
        assert_eq!(buf, [0, 7, 0, 0, 0, 9]);
    }

    #[test]
    fn test_slice_view_is_contiguous() {
        let a: Vec<f32> = (0..8).map(|x| x as f32).collect();
        let v = slice(&a, 3, 4);
        assert_eq!(v.as_contiguous(), Some(&a[2..6]));

        let s = stride(&a, 1, 2, 4).unwrap();
        assert!(s.as_contiguous().is_none());

        // Overrunning windows do not claim contiguity.
        let over = slice(&a, 6, 4);
        assert!(over.as_contiguous().is_none());
    }

    #[test]
    fn test_view_cannot_grow() {
        let mut a = vec![1, 2, 3, 4];
        let mut v = slice(&mut a, 1, 2);
        assert!(v.grow_to(2).is_ok());
        assert!(v.grow_to(3).is_err());
    }
}
