//! Sequence capability traits and their native implementations.
//!
//! A sequence is a finite, 1-indexed list of `Copy` elements reached only
//! through [`Seq::get`], [`SeqMut::set`] and [`Seq::length`]. Three
//! capability levels exist:
//!
//! - [`Seq`]: readable. Length may be unknown; callers then address it through
//!   explicit `(index, count)` windows.
//! - [`SeqMut`]: writable.
//! - [`Array`]: writable with an intrinsic length and support for growth.
//!
//! [`Shared`] is the shared-mutable buffer: it is `Copy`, so many readers and
//! writers may hold it over the same storage at once. Use [`shared`] to obtain
//! one from an ordinary slice.

use std::cell::Cell;
use std::fmt;

use crate::error::{Result, SeqError};

/// Convert a 1-based position into a 0-based offset, checking it against `len`.
#[inline]
pub fn checked_offset(index: usize, len: usize) -> Result<usize> {
    if index == 0 || index > len {
        return Err(SeqError::out_of_range(index, Some(len)));
    }
    Ok(index - 1)
}

/// Position `k` steps past `index`.
#[inline]
fn step(index: usize, k: usize) -> Result<usize> {
    index
        .checked_add(k)
        .ok_or(SeqError::out_of_range(usize::MAX, None))
}

/// Readable sequence.
pub trait Seq {
    /// Element type.
    type Elem: Copy;

    /// Read the element at 1-based position `index`.
    fn get(&self, index: usize) -> Result<Self::Elem>;

    /// Number of addressable elements, or `None` if the sequence does not know it.
    fn length(&self) -> Option<usize>;

    /// Whether this sequence owns growable storage.
    #[inline]
    fn is_array(&self) -> bool {
        false
    }

    /// The whole sequence as one contiguous slice, if it is laid out that way.
    ///
    /// Bulk operations use this for `copy_from_slice` fast paths.
    #[inline]
    fn as_contiguous(&self) -> Option<&[Self::Elem]> {
        None
    }

    /// Fill `out` with the elements starting at `index`.
    fn get_into(&self, index: usize, out: &mut [Self::Elem]) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        if let Some(src) = self.as_contiguous() {
            let start = checked_offset(index, src.len())?;
            let end = start + out.len();
            if end > src.len() {
                return Err(SeqError::out_of_range(index + out.len() - 1, Some(src.len())));
            }
            out.copy_from_slice(&src[start..end]);
            return Ok(());
        }
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.get(step(index, k)?)?;
        }
        Ok(())
    }

    /// Read `N` consecutive elements starting at `index`.
    fn get_n<const N: usize>(&self, index: usize) -> Result<[Self::Elem; N]>
    where
        Self: Sized,
        Self::Elem: Default,
    {
        let mut out = [Self::Elem::default(); N];
        self.get_into(index, &mut out)?;
        Ok(out)
    }

    /// Collect `count` elements starting at `index`.
    fn to_vec(&self, index: usize, count: usize) -> Result<Vec<Self::Elem>> {
        (0..count).map(|k| self.get(step(index, k)?)).collect()
    }
}

/// Writable sequence.
pub trait SeqMut: Seq {
    /// Write `value` at 1-based position `index`.
    fn set(&mut self, index: usize, value: Self::Elem) -> Result<()>;

    /// Mutable counterpart of [`Seq::as_contiguous`].
    #[inline]
    fn as_contiguous_mut(&mut self) -> Option<&mut [Self::Elem]> {
        None
    }

    /// Make positions `1..=len` addressable.
    ///
    /// Fixed-size sequences succeed only if they are already long enough;
    /// sequences of unknown length trust the caller.
    fn grow_to(&mut self, len: usize) -> Result<()> {
        match self.length() {
            Some(n) if n < len => Err(SeqError::out_of_range(len, Some(n))),
            _ => Ok(()),
        }
    }

    /// Write `values` to consecutive positions starting at `index`.
    fn set_from(&mut self, index: usize, values: &[Self::Elem]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        if let Some(dst) = self.as_contiguous_mut() {
            let start = checked_offset(index, dst.len())?;
            let end = start + values.len();
            if end > dst.len() {
                return Err(SeqError::out_of_range(
                    index + values.len() - 1,
                    Some(dst.len()),
                ));
            }
            dst[start..end].copy_from_slice(values);
            return Ok(());
        }
        for (k, &v) in values.iter().enumerate() {
            self.set(step(index, k)?, v)?;
        }
        Ok(())
    }
}

/// Growable sequence with an intrinsic length.
pub trait Array: SeqMut {
    /// Current number of elements.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reinterpret an exclusive buffer as a shared-mutable one.
///
/// The returned handle may be copied freely, so several views and an
/// element-wise destination can address the same storage.
#[inline]
pub fn shared<T>(buf: &mut [T]) -> Shared<'_, T> {
    Shared(Cell::from_mut(buf).as_slice_of_cells())
}

// ============================================================================
// Slices and fixed arrays
// ============================================================================

impl<T: Copy> Seq for [T] {
    type Elem = T;

    #[inline]
    fn get(&self, index: usize) -> Result<T> {
        Ok(self[checked_offset(index, self.len())?])
    }

    #[inline]
    fn length(&self) -> Option<usize> {
        Some(self.len())
    }

    #[inline]
    fn as_contiguous(&self) -> Option<&[T]> {
        Some(self)
    }
}

impl<T: Copy> SeqMut for [T] {
    #[inline]
    fn set(&mut self, index: usize, value: T) -> Result<()> {
        let offset = checked_offset(index, self.len())?;
        self[offset] = value;
        Ok(())
    }

    #[inline]
    fn as_contiguous_mut(&mut self) -> Option<&mut [T]> {
        Some(self)
    }
}

impl<T: Copy, const N: usize> Seq for [T; N] {
    type Elem = T;

    #[inline]
    fn get(&self, index: usize) -> Result<T> {
        Seq::get(self.as_slice(), index)
    }

    #[inline]
    fn length(&self) -> Option<usize> {
        Some(N)
    }

    #[inline]
    fn as_contiguous(&self) -> Option<&[T]> {
        Some(self.as_slice())
    }
}

impl<T: Copy, const N: usize> SeqMut for [T; N] {
    #[inline]
    fn set(&mut self, index: usize, value: T) -> Result<()> {
        SeqMut::set(self.as_mut_slice(), index, value)
    }

    #[inline]
    fn as_contiguous_mut(&mut self) -> Option<&mut [T]> {
        Some(self.as_mut_slice())
    }
}

// ============================================================================
// Vec: the native growable array
// ============================================================================

impl<T: Copy> Seq for Vec<T> {
    type Elem = T;

    #[inline]
    fn get(&self, index: usize) -> Result<T> {
        Seq::get(self.as_slice(), index)
    }

    #[inline]
    fn length(&self) -> Option<usize> {
        Some(self.len())
    }

    #[inline]
    fn is_array(&self) -> bool {
        true
    }

    #[inline]
    fn as_contiguous(&self) -> Option<&[T]> {
        Some(self.as_slice())
    }
}

impl<T: Copy + Default> SeqMut for Vec<T> {
    #[inline]
    fn set(&mut self, index: usize, value: T) -> Result<()> {
        SeqMut::set(self.as_mut_slice(), index, value)
    }

    #[inline]
    fn as_contiguous_mut(&mut self) -> Option<&mut [T]> {
        Some(self.as_mut_slice())
    }

    fn grow_to(&mut self, len: usize) -> Result<()> {
        if len <= Vec::len(self) {
            return Ok(());
        }
        self.try_reserve_exact(len - Vec::len(self))
            .map_err(|_| SeqError::Allocation { requested: len })?;
        self.resize(len, T::default());
        Ok(())
    }
}

impl<T: Copy + Default> Array for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

// ============================================================================
// Shared-mutable cells
// ============================================================================

/// Copyable handle to a buffer of cells, created by [`shared`].
///
/// Writes through one copy are visible through every other copy. `Cell` is
/// `!Sync`, so the handle never leaves the thread that created it.
pub struct Shared<'a, T>(&'a [Cell<T>]);

impl<T> Clone for Shared<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Shared<'_, T> {}

impl<T: Copy + fmt::Debug> fmt::Debug for Shared<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.0).finish()
    }
}

impl<'a, T> Shared<'a, T> {
    /// Wrap cells that are already shared.
    #[inline]
    pub fn from_cells(cells: &'a [Cell<T>]) -> Self {
        Shared(cells)
    }

    #[inline]
    pub fn as_cells(&self) -> &'a [Cell<T>] {
        self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Copy> Seq for Shared<'_, T> {
    type Elem = T;

    #[inline]
    fn get(&self, index: usize) -> Result<T> {
        Ok(self.0[checked_offset(index, self.0.len())?].get())
    }

    #[inline]
    fn length(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

impl<T: Copy> SeqMut for Shared<'_, T> {
    #[inline]
    fn set(&mut self, index: usize, value: T) -> Result<()> {
        self.0[checked_offset(index, self.0.len())?].set(value);
        Ok(())
    }
}

// ============================================================================
// Forwarding through references
// ============================================================================

impl<S: Seq + ?Sized> Seq for &S {
    type Elem = S::Elem;

    #[inline]
    fn get(&self, index: usize) -> Result<S::Elem> {
        (**self).get(index)
    }

    #[inline]
    fn length(&self) -> Option<usize> {
        (**self).length()
    }

    #[inline]
    fn is_array(&self) -> bool {
        (**self).is_array()
    }

    #[inline]
    fn as_contiguous(&self) -> Option<&[S::Elem]> {
        (**self).as_contiguous()
    }
}

impl<S: Seq + ?Sized> Seq for &mut S {
    type Elem = S::Elem;

    #[inline]
    fn get(&self, index: usize) -> Result<S::Elem> {
        (**self).get(index)
    }

    #[inline]
    fn length(&self) -> Option<usize> {
        (**self).length()
    }

    #[inline]
    fn is_array(&self) -> bool {
        (**self).is_array()
    }

    #[inline]
    fn as_contiguous(&self) -> Option<&[S::Elem]> {
        (**self).as_contiguous()
    }
}

impl<S: SeqMut + ?Sized> SeqMut for &mut S {
    #[inline]
    fn set(&mut self, index: usize, value: S::Elem) -> Result<()> {
        (**self).set(index, value)
    }

    #[inline]
    fn as_contiguous_mut(&mut self) -> Option<&mut [S::Elem]> {
        (**self).as_contiguous_mut()
    }

    #[inline]
    fn grow_to(&mut self, len: usize) -> Result<()> {
        (**self).grow_to(len)
    }
}

impl<A: Array + ?Sized> Array for &mut A {
    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }
}
