//! The two-shape calling convention shared by every numeric operation.
//!
//! Each operation exists in two forms on [`SeqOps`]:
//!
//! - **Allocating**: `op(a, a_index, a_count, ...)` returns a fresh array of
//!   the operation's output length, obtained from the bound
//!   [`BackingStore`].
//! - **In-place**: `op_into(a, a_index, a_count, ..., dest, dest_index)`
//!   writes the results into `dest` starting at `dest_index` (`None` means
//!   position 1), growing `dest` first through the store's growth hook.
//!
//! The allocating form is always the in-place form applied to a new array.
//!
//! # Aliasing
//!
//! Element-wise operations (map, zip, constant broadcast) compute output
//! position `k` from input position `k` only, so `dest` may alias a source at
//! the same offset. Build such aliases from a shared-mutable buffer
//! (see [`shared`](flatseq_traits::shared)).
//! Operations that read several source positions per output (matrix
//! products, transposes, cross products) require `dest` not to overlap any
//! source; overlap is not detected and the result is unspecified.

use flatseq_traits::{Seq, SeqMut};

use crate::broadcast::Constant;
use crate::store::{check_window, window, window_mut, BackingStore, NativeStore};
use crate::Result;

/// Operation front end bound to one backing-store strategy.
///
/// # Example
/// ```rust
/// use flatseq::SeqOps;
///
/// let ops = SeqOps::native();
/// let a = vec![1.0, 2.0, 3.0];
/// let b = vec![10.0, 20.0, 30.0];
/// let sum = ops.add(&a, 1, 3, &b, 1).unwrap();
/// assert_eq!(sum, vec![11.0, 22.0, 33.0]);
///
/// let mut dest = vec![0.0; 1];
/// ops.add_into(&a, 2, 2, &b, 2, &mut dest, Some(2)).unwrap();
/// assert_eq!(dest, vec![0.0, 22.0, 33.0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SeqOps<B = NativeStore> {
    store: B,
}

impl SeqOps<NativeStore> {
    /// Operations allocating `Vec<T>` arrays.
    #[inline]
    pub fn native() -> Self {
        Self { store: NativeStore }
    }
}

impl<B> SeqOps<B> {
    /// Bind a custom backing-store strategy.
    #[inline]
    pub fn with_store(store: B) -> Self {
        Self { store }
    }

    #[inline]
    pub fn store(&self) -> &B {
        &self.store
    }

    /// Allocate `len` elements and hand them to `fill`.
    #[inline]
    pub(crate) fn alloc_with<T, F>(&self, len: usize, fill: F) -> Result<B::Array>
    where
        T: Copy,
        B: BackingStore<T>,
        F: FnOnce(&mut B::Array) -> Result<()>,
    {
        let mut out = self.store.new_array(len)?;
        fill(&mut out)?;
        Ok(out)
    }

    /// Prepare `dest` for `count` outputs and return the resolved start position.
    #[inline]
    pub(crate) fn prepare_dest<T, SD>(
        &self,
        dest: &mut SD,
        dest_index: Option<usize>,
        count: usize,
    ) -> Result<usize>
    where
        T: Copy,
        B: BackingStore<T>,
        SD: SeqMut<Elem = T> + ?Sized,
    {
        let di = dest_index.unwrap_or(1);
        self.store.grow_array(dest, di, count)?;
        Ok(di)
    }

    // ========================================================================
    // Copy
    // ========================================================================

    /// Copy a window of `a` into a fresh array.
    pub fn copy<T, SA>(&self, a: &SA, a_index: usize, a_count: usize) -> Result<B::Array>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        self.store.copy_array(a, a_index, a_count)
    }

    /// Copy a window of `a` into `dest`.
    pub fn copy_into<T, SA, SD>(
        &self,
        a: &SA,
        a_index: usize,
        a_count: usize,
        dest: &mut SD,
        dest_index: Option<usize>,
    ) -> Result<()>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        self.store
            .copy_array_into(a, a_index, a_count, dest, dest_index.unwrap_or(1))
    }

    // ========================================================================
    // Map
    // ========================================================================

    /// Apply `f` to each element of a window of `a`.
    pub fn map<T, SA, F>(&self, a: &SA, a_index: usize, a_count: usize, f: F) -> Result<B::Array>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        B: BackingStore<T>,
        F: FnMut(T) -> T,
    {
        self.alloc_with::<T, _>(a_count, |out| self.map_into(a, a_index, a_count, out, None, f))
    }

    /// In-place form of [`map`](Self::map).
    pub fn map_into<T, SA, SD, F>(
        &self,
        a: &SA,
        a_index: usize,
        a_count: usize,
        dest: &mut SD,
        dest_index: Option<usize>,
        mut f: F,
    ) -> Result<()>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
        F: FnMut(T) -> T,
    {
        check_window(a, a_index, a_count)?;
        let di = self.prepare_dest(dest, dest_index, a_count)?;
        if a_count == 0 {
            return Ok(());
        }

        if let (Some(src), Some(dst)) = (a.as_contiguous(), dest.as_contiguous_mut()) {
            let src = window(src, a_index, a_count)?;
            let dst = window_mut(dst, di, a_count)?;
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = f(s);
            }
            return Ok(());
        }

        for k in 0..a_count {
            let v = f(a.get(a_index + k)?);
            dest.set(di + k, v)?;
        }
        Ok(())
    }

    // ========================================================================
    // Zip (two same-length windows)
    // ========================================================================

    /// Combine windows of `a` and `b` position by position.
    pub fn zip<T, SA, SB, F>(
        &self,
        a: &SA,
        a_index: usize,
        a_count: usize,
        b: &SB,
        b_index: usize,
        f: F,
    ) -> Result<B::Array>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        SB: Seq<Elem = T> + ?Sized,
        B: BackingStore<T>,
        F: FnMut(T, T) -> T,
    {
        self.alloc_with::<T, _>(a_count, |out| {
            self.zip_into(a, a_index, a_count, b, b_index, out, None, f)
        })
    }

    /// In-place form of [`zip`](Self::zip).
    #[allow(clippy::too_many_arguments)]
    pub fn zip_into<T, SA, SB, SD, F>(
        &self,
        a: &SA,
        a_index: usize,
        a_count: usize,
        b: &SB,
        b_index: usize,
        dest: &mut SD,
        dest_index: Option<usize>,
        mut f: F,
    ) -> Result<()>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        SB: Seq<Elem = T> + ?Sized,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
        F: FnMut(T, T) -> T,
    {
        check_window(a, a_index, a_count)?;
        check_window(b, b_index, a_count)?;
        let di = self.prepare_dest(dest, dest_index, a_count)?;
        if a_count == 0 {
            return Ok(());
        }

        if let (Some(sa), Some(sb), Some(dst)) =
            (a.as_contiguous(), b.as_contiguous(), dest.as_contiguous_mut())
        {
            let sa = window(sa, a_index, a_count)?;
            let sb = window(sb, b_index, a_count)?;
            let dst = window_mut(dst, di, a_count)?;
            for ((d, &x), &y) in dst.iter_mut().zip(sa).zip(sb) {
                *d = f(x, y);
            }
            return Ok(());
        }

        for k in 0..a_count {
            let v = f(a.get(a_index + k)?, b.get(b_index + k)?);
            dest.set(di + k, v)?;
        }
        Ok(())
    }

    // ========================================================================
    // Constant broadcast
    // ========================================================================

    /// Combine a window of `a` with a scalar or cycled pattern.
    pub fn zip_constant<T, SA, C, F>(
        &self,
        a: &SA,
        a_index: usize,
        a_count: usize,
        c: &C,
        f: F,
    ) -> Result<B::Array>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        C: Constant<T> + ?Sized,
        B: BackingStore<T>,
        F: FnMut(T, T) -> T,
    {
        self.alloc_with::<T, _>(a_count, |out| {
            self.zip_constant_into(a, a_index, a_count, c, out, None, f)
        })
    }

    /// In-place form of [`zip_constant`](Self::zip_constant).
    ///
    /// Position `k` of the window (1-based) pairs with `c.resolve(k)`.
    #[allow(clippy::too_many_arguments)]
    pub fn zip_constant_into<T, SA, C, SD, F>(
        &self,
        a: &SA,
        a_index: usize,
        a_count: usize,
        c: &C,
        dest: &mut SD,
        dest_index: Option<usize>,
        mut f: F,
    ) -> Result<()>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        C: Constant<T> + ?Sized,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
        F: FnMut(T, T) -> T,
    {
        check_window(a, a_index, a_count)?;
        let di = self.prepare_dest(dest, dest_index, a_count)?;
        for k in 0..a_count {
            let v = f(a.get(a_index + k)?, c.resolve(k + 1)?);
            dest.set(di + k, v)?;
        }
        Ok(())
    }
}

/// Left fold over a window of `a`.
pub fn fold<T, SA, F>(a: &SA, a_index: usize, a_count: usize, init: T, mut f: F) -> Result<T>
where
    T: Copy,
    SA: Seq<Elem = T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    check_window(a, a_index, a_count)?;
    if a_count == 0 {
        return Ok(init);
    }
    if let Some(src) = a.as_contiguous() {
        return Ok(window(src, a_index, a_count)?
            .iter()
            .fold(init, |acc, &x| f(acc, x)));
    }
    let mut acc = init;
    for k in 0..a_count {
        acc = f(acc, a.get(a_index + k)?);
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::{Pattern, Uniform};
    use crate::pod::PodStore;
    use crate::view;
    use flatseq_traits::shared;

    #[test]
    fn test_map_allocates_output_length() {
        let ops = SeqOps::native();
        let a = vec![1, 2, 3, 4, 5];
        let out = ops.map(&a, 2, 3, |x| x * 10).unwrap();
        assert_eq!(out, vec![20, 30, 40]);
    }

    #[test]
    fn test_map_into_default_position_and_growth() {
        let ops = SeqOps::native();
        let a = [1.0, 2.0];
        let mut dest: Vec<f64> = Vec::new();
        ops.map_into(&a, 1, 2, &mut dest, None, |x| -x).unwrap();
        assert_eq!(dest, vec![-1.0, -2.0]);

        ops.map_into(&a, 1, 2, &mut dest, Some(4), |x| x).unwrap();
        assert_eq!(dest, vec![-1.0, -2.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_zip_through_views() {
        let ops = SeqOps::native();
        let xyzw = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let xs = view::stride(&xyzw, 1, 4, 2).unwrap();
        let ws = view::stride(&xyzw, 4, 4, 2).unwrap();
        let out = ops.zip(&xs, 1, 2, &ws, 1, |x, w| x * w).unwrap();
        assert_eq!(out, vec![4, 40]);
    }

    #[test]
    fn test_zip_into_view_destination() {
        let ops = SeqOps::native();
        let a = [1, 2];
        let b = [10, 20];
        let mut buf = vec![0; 6];
        let mut tail = view::reverse(&mut buf).unwrap();
        ops.zip_into(&a, 1, 2, &b, 1, &mut tail, None, |x, y| x + y)
            .unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0, 22, 11]);
    }

    #[test]
    fn test_zip_rejects_short_operand() {
        let ops = SeqOps::native();
        let a = [1, 2, 3];
        let b = [1, 2];
        assert!(ops.zip(&a, 1, 3, &b, 1, |x, y| x + y).is_err());
    }

    #[test]
    fn test_zip_constant_scalar_and_pattern() {
        let ops = SeqOps::native();
        let a = vec![1, 2, 3, 4, 5];
        let out = ops
            .zip_constant(&a, 1, 5, &Uniform(100), |x, c| x + c)
            .unwrap();
        assert_eq!(out, vec![101, 102, 103, 104, 105]);

        let c = [10, 20];
        let out = ops
            .zip_constant(&a, 1, 5, &Pattern::new(&c).unwrap(), |x, c| x * c)
            .unwrap();
        assert_eq!(out, vec![10, 40, 30, 80, 50]);
    }

    #[test]
    fn test_elementwise_dest_may_alias_source() {
        let ops = SeqOps::native();
        let mut buf = [1, 2, 3, 4];
        let cells = shared(&mut buf);
        let mut dest = cells;
        ops.map_into(&cells, 1, 4, &mut dest, None, |x| x * x).unwrap();
        assert_eq!(buf, [1, 4, 9, 16]);
    }

    #[test]
    fn test_allocating_matches_into_form() {
        let ops = SeqOps::native();
        let a: Vec<f64> = (1..=6).map(f64::from).collect();
        let b: Vec<f64> = (1..=6).map(|x| f64::from(x) * 0.5).collect();
        let allocated = ops.zip(&a, 1, 6, &b, 1, |x, y| x - y).unwrap();
        let mut buffer = vec![0.0; 6];
        ops.zip_into(&a, 1, 6, &b, 1, &mut buffer, None, |x, y| x - y)
            .unwrap();
        assert_eq!(allocated, buffer);
    }

    #[test]
    fn test_custom_store() {
        let ops = SeqOps::with_store(PodStore);
        let a = vec![1u32, 2, 3];
        let out = ops.map(&a, 1, 3, |x| x + 1).unwrap();
        assert_eq!(out.to_vec(1, 3).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_fold() {
        let a = vec![1, 2, 3, 4];
        assert_eq!(fold(&a, 2, 3, 0, |acc, x| acc + x).unwrap(), 9);
        let r = view::reverse(&a).unwrap();
        assert_eq!(fold(&r, 1, 4, 0, |acc, x| acc * 10 + x).unwrap(), 4321);
    }
}
