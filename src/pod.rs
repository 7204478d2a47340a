//! Byte-backed arrays for plain-old-data elements.
//!
//! [`PodBuffer`] stores its elements as raw bytes, the way a buffer handed
//! over from a host or an FFI boundary usually arrives. Elements are decoded
//! with unaligned reads, so the byte vector needs no particular alignment.
//! When it does happen to be aligned for `T`, the buffer also exposes itself
//! as a typed slice and bulk copies go through `copy_from_slice`.
//!
//! [`PodStore`] is the matching [`BackingStore`] strategy.

use std::marker::PhantomData;
use std::mem::size_of;

use bytemuck::Pod;
use flatseq_traits::{checked_offset, Array, Seq, SeqMut};

use crate::store::{check_window, window, BackingStore};
use crate::{Result, SeqError};

/// Growable array of `T` stored as bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct PodBuffer<T: Pod> {
    bytes: Vec<u8>,
    _elem: PhantomData<T>,
}

impl<T: Pod> std::fmt::Debug for PodBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PodBuffer")
            .field("len", &self.elem_count())
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl<T: Pod> Default for PodBuffer<T> {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            _elem: PhantomData,
        }
    }
}

impl<T: Pod> PodBuffer<T> {
    /// Wrap existing bytes.
    ///
    /// # Errors
    /// Returns [`SeqError::InvalidArgument`] if the byte count is not a
    /// multiple of `size_of::<T>()`.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if size_of::<T>() == 0 || bytes.len() % size_of::<T>() != 0 {
            return Err(SeqError::InvalidArgument(
                "byte length is not a multiple of the element size",
            ));
        }
        Ok(Self {
            bytes,
            _elem: PhantomData,
        })
    }

    /// Encode a typed slice.
    pub fn from_slice(values: &[T]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(values).to_vec(),
            _elem: PhantomData,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    fn elem_count(&self) -> usize {
        self.bytes.len() / size_of::<T>()
    }

    #[inline]
    fn byte_range(&self, index: usize) -> Result<std::ops::Range<usize>> {
        let offset = checked_offset(index, self.elem_count())?;
        let start = offset * size_of::<T>();
        Ok(start..start + size_of::<T>())
    }
}

impl<T: Pod> Seq for PodBuffer<T> {
    type Elem = T;

    #[inline]
    fn get(&self, index: usize) -> Result<T> {
        let range = self.byte_range(index)?;
        Ok(bytemuck::pod_read_unaligned(&self.bytes[range]))
    }

    #[inline]
    fn length(&self) -> Option<usize> {
        Some(self.elem_count())
    }

    #[inline]
    fn is_array(&self) -> bool {
        true
    }

    #[inline]
    fn as_contiguous(&self) -> Option<&[T]> {
        bytemuck::try_cast_slice(&self.bytes).ok()
    }
}

impl<T: Pod> SeqMut for PodBuffer<T> {
    #[inline]
    fn set(&mut self, index: usize, value: T) -> Result<()> {
        let range = self.byte_range(index)?;
        self.bytes[range].copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    #[inline]
    fn as_contiguous_mut(&mut self) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(&mut self.bytes).ok()
    }

    fn grow_to(&mut self, len: usize) -> Result<()> {
        let have = self.elem_count();
        if len <= have {
            return Ok(());
        }
        let new_bytes = len
            .checked_mul(size_of::<T>())
            .ok_or(SeqError::Allocation { requested: len })?;
        self.bytes
            .try_reserve_exact(new_bytes - self.bytes.len())
            .map_err(|_| SeqError::Allocation { requested: len })?;
        self.bytes.resize(new_bytes, 0);
        Ok(())
    }
}

impl<T: Pod> Array for PodBuffer<T> {
    #[inline]
    fn len(&self) -> usize {
        self.elem_count()
    }
}

/// Strategy allocating [`PodBuffer`] arrays.
///
/// Copies out of contiguous sources are single byte copies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PodStore;

impl<T: Pod> BackingStore<T> for PodStore {
    type Array = PodBuffer<T>;

    fn new_array(&self, length: usize) -> Result<PodBuffer<T>> {
        let mut out = PodBuffer::default();
        out.grow_to(length).map_err(|err| {
            log::debug!("new_array: pod allocation of {length} elements failed");
            err
        })?;
        Ok(out)
    }

    fn copy_array<S: Seq<Elem = T> + ?Sized>(
        &self,
        src: &S,
        src_index: usize,
        src_count: usize,
    ) -> Result<PodBuffer<T>> {
        check_window(src, src_index, src_count)?;
        if let Some(slice) = src.as_contiguous() {
            log::trace!("copy_array: pod byte copy count={src_count}");
            return Ok(PodBuffer::from_slice(window(slice, src_index, src_count)?));
        }
        let mut out = self.new_array(src_count)?;
        self.copy_array_into(src, src_index, src_count, &mut out, 1)?;
        Ok(out)
    }
}
