//! Backing-store strategies.
//!
//! A [`BackingStore`] decides how fresh arrays are allocated, how bulk copies
//! run, and how destinations grow. Operations receive the strategy by value
//! (see [`SeqOps`](crate::SeqOps)) instead of consulting global state, so a
//! host embedding this crate against its own buffer type swaps one value.
//!
//! Default method bodies only assume element-wise `get`/`set`/`length`, with a
//! `copy_from_slice` fast path whenever both sides expose contiguous memory.

use flatseq_traits::{checked_offset, Array, Seq, SeqMut};

use crate::{Result, SeqError};

/// Check that `[index, index + count - 1]` lies inside `src` when its length is known.
///
/// Sequences of unknown length trust the caller-supplied window, as long as
/// its last position is representable.
pub(crate) fn check_window<S: Seq + ?Sized>(src: &S, index: usize, count: usize) -> Result<()> {
    if index == 0 {
        return Err(SeqError::OutOfRange {
            index: 0,
            len: src.length(),
        });
    }
    if count == 0 {
        return Ok(());
    }
    let Some(last) = index.checked_add(count - 1) else {
        return Err(SeqError::OutOfRange {
            index: isize::MAX,
            len: src.length(),
        });
    };
    match src.length() {
        Some(len) if last > len => Err(SeqError::OutOfRange {
            index: isize::try_from(last).unwrap_or(isize::MAX),
            len: Some(len),
        }),
        _ => Ok(()),
    }
}

fn window_error(index: usize, count: usize, len: usize) -> SeqError {
    let last = index.saturating_add(count).saturating_sub(1);
    SeqError::OutOfRange {
        index: isize::try_from(last).unwrap_or(isize::MAX),
        len: Some(len),
    }
}

/// The `count` elements of `slice` starting at 1-based `index`.
pub(crate) fn window<T>(slice: &[T], index: usize, count: usize) -> Result<&[T]> {
    if count == 0 {
        return Ok(&[]);
    }
    let start = checked_offset(index, slice.len())?;
    start
        .checked_add(count)
        .and_then(|end| slice.get(start..end))
        .ok_or_else(|| window_error(index, count, slice.len()))
}

/// Mutable form of [`window`].
pub(crate) fn window_mut<T>(slice: &mut [T], index: usize, count: usize) -> Result<&mut [T]> {
    if count == 0 {
        return Ok(&mut []);
    }
    let len = slice.len();
    let start = checked_offset(index, len)?;
    start
        .checked_add(count)
        .and_then(|end| slice.get_mut(start..end))
        .ok_or_else(|| window_error(index, count, len))
}

/// Allocation, bulk copy and growth hooks for one element type.
pub trait BackingStore<T: Copy> {
    /// Array type produced by [`new_array`](Self::new_array).
    type Array: Array<Elem = T>;

    /// Whether `seq` is a growable array rather than a fixed window.
    #[inline]
    fn is_array<S: Seq<Elem = T> + ?Sized>(&self, seq: &S) -> bool {
        seq.is_array()
    }

    /// Allocate a fresh array of `length` default-initialized elements.
    ///
    /// # Errors
    /// Returns [`SeqError::Allocation`] if the memory cannot be obtained.
    fn new_array(&self, length: usize) -> Result<Self::Array>;

    /// Copy `src[src_index..src_index + src_count]` into a fresh array.
    fn copy_array<S: Seq<Elem = T> + ?Sized>(
        &self,
        src: &S,
        src_index: usize,
        src_count: usize,
    ) -> Result<Self::Array> {
        let mut out = self.new_array(src_count)?;
        self.copy_array_into(src, src_index, src_count, &mut out, 1)?;
        Ok(out)
    }

    /// Copy `src_count` elements from `src` into `dest` starting at `dest_index`,
    /// growing `dest` first if needed.
    ///
    /// # Errors
    /// Returns [`SeqError::OutOfRange`] if the source window exceeds a source
    /// of known length, or if `dest` is too short and cannot grow.
    fn copy_array_into<S, D>(
        &self,
        src: &S,
        src_index: usize,
        src_count: usize,
        dest: &mut D,
        dest_index: usize,
    ) -> Result<()>
    where
        S: Seq<Elem = T> + ?Sized,
        D: SeqMut<Elem = T> + ?Sized,
    {
        check_window(src, src_index, src_count)?;
        self.grow_array(dest, dest_index, src_count)?;
        if src_count == 0 {
            return Ok(());
        }

        if let Some(src_slice) = src.as_contiguous() {
            let src_part = window(src_slice, src_index, src_count)?;
            if let Some(dst_slice) = dest.as_contiguous_mut() {
                let dst_part = window_mut(dst_slice, dest_index, src_count)?;
                log::trace!("copy_array_into: contiguous fast path count={src_count}");
                dst_part.copy_from_slice(src_part);
                return Ok(());
            }
            return dest.set_from(dest_index, src_part);
        }

        for k in 0..src_count {
            dest.set(dest_index + k, src.get(src_index + k)?)?;
        }
        Ok(())
    }

    /// Make `dest` addressable over `[dest_index, dest_index + dest_count - 1]`.
    ///
    /// A no-op when `dest` is already long enough; repeated calls with the
    /// same arguments leave existing elements untouched.
    fn grow_array<D: SeqMut<Elem = T> + ?Sized>(
        &self,
        dest: &mut D,
        dest_index: usize,
        dest_count: usize,
    ) -> Result<()> {
        if dest_index == 0 {
            return Err(SeqError::OutOfRange {
                index: 0,
                len: dest.length(),
            });
        }
        let Some(needed) = (dest_index - 1).checked_add(dest_count) else {
            return Err(SeqError::OutOfRange {
                index: isize::MAX,
                len: dest.length(),
            });
        };
        match dest.length() {
            Some(len) if len >= needed => Ok(()),
            before => {
                log::trace!("grow_array: {before:?} -> {needed}");
                dest.grow_to(needed)
            }
        }
    }
}

/// The default strategy: arrays are `Vec<T>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeStore;

impl<T: Copy + Default> BackingStore<T> for NativeStore {
    type Array = Vec<T>;

    fn new_array(&self, length: usize) -> Result<Vec<T>> {
        let mut out = Vec::new();
        if out.try_reserve_exact(length).is_err() {
            log::debug!("new_array: allocation of {length} elements failed");
            return Err(SeqError::Allocation { requested: length });
        }
        out.resize(length, T::default());
        Ok(out)
    }
}
