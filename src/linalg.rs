//! Small dense linear algebra over flat sequences.
//!
//! Matrices are stored row-major in a flat window: element `(i, j)` of an
//! `rows x cols` matrix starting at position `index` lives at
//! `index + i * cols + j` (all 0-based `i`, `j`).
//!
//! These kernels read several source positions per output position, so the
//! destination must not overlap any source (see [`ex`](crate::ex)).

use flatseq_traits::{Scalar, Seq, SeqMut};

use crate::ex::SeqOps;
use crate::store::{check_window, BackingStore};
use crate::{Result, SeqError};

/// Element count of a `rows x cols` matrix.
fn matrix_len(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or(SeqError::InvalidArgument("matrix dimensions overflow usize"))
}

impl<B> SeqOps<B> {
    /// 3D cross product. Always produces three elements.
    pub fn cross<T, SA, SB>(&self, a: &SA, a_index: usize, b: &SB, b_index: usize) -> Result<B::Array>
    where
        T: Scalar,
        SA: Seq<Elem = T> + ?Sized,
        SB: Seq<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        self.alloc_with::<T, _>(3, |out| self.cross_into(a, a_index, b, b_index, out, None))
    }

    /// In-place form of [`cross`](Self::cross).
    pub fn cross_into<T, SA, SB, SD>(
        &self,
        a: &SA,
        a_index: usize,
        b: &SB,
        b_index: usize,
        dest: &mut SD,
        dest_index: Option<usize>,
    ) -> Result<()>
    where
        T: Scalar,
        SA: Seq<Elem = T> + ?Sized,
        SB: Seq<Elem = T> + ?Sized,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        let mut u = [T::zero(); 3];
        let mut v = [T::zero(); 3];
        a.get_into(a_index, &mut u)?;
        b.get_into(b_index, &mut v)?;
        let di = self.prepare_dest(dest, dest_index, 3)?;
        dest.set(di, u[1] * v[2] - u[2] * v[1])?;
        dest.set(di + 1, u[2] * v[0] - u[0] * v[2])?;
        dest.set(di + 2, u[0] * v[1] - u[1] * v[0])
    }

    /// Matrix product of an `m x n` matrix and an `n x p` matrix.
    ///
    /// Produces an `m x p` matrix. A column vector is the `p == 1` case.
    #[allow(clippy::too_many_arguments)]
    pub fn matmul<T, SA, SB>(
        &self,
        a: &SA,
        a_index: usize,
        m: usize,
        n: usize,
        b: &SB,
        b_index: usize,
        p: usize,
    ) -> Result<B::Array>
    where
        T: Scalar,
        SA: Seq<Elem = T> + ?Sized,
        SB: Seq<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        self.alloc_with::<T, _>(matrix_len(m, p)?, |out| {
            self.matmul_into(a, a_index, m, n, b, b_index, p, out, None)
        })
    }

    /// In-place form of [`matmul`](Self::matmul).
    ///
    /// `dest` must not overlap `a` or `b`.
    #[allow(clippy::too_many_arguments)]
    pub fn matmul_into<T, SA, SB, SD>(
        &self,
        a: &SA,
        a_index: usize,
        m: usize,
        n: usize,
        b: &SB,
        b_index: usize,
        p: usize,
        dest: &mut SD,
        dest_index: Option<usize>,
    ) -> Result<()>
    where
        T: Scalar,
        SA: Seq<Elem = T> + ?Sized,
        SB: Seq<Elem = T> + ?Sized,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        check_window(a, a_index, matrix_len(m, n)?)?;
        check_window(b, b_index, matrix_len(n, p)?)?;
        let di = self.prepare_dest(dest, dest_index, matrix_len(m, p)?)?;

        let mut row = vec![T::zero(); n];
        for i in 0..m {
            a.get_into(a_index + i * n, &mut row)?;
            for j in 0..p {
                let mut acc = T::zero();
                for (k, &x) in row.iter().enumerate() {
                    acc = acc + x * b.get(b_index + k * p + j)?;
                }
                dest.set(di + i * p + j, acc)?;
            }
        }
        Ok(())
    }

    /// Transpose a `rows x cols` matrix into a `cols x rows` one.
    pub fn transpose<T, SA>(&self, a: &SA, a_index: usize, rows: usize, cols: usize) -> Result<B::Array>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        self.alloc_with::<T, _>(matrix_len(rows, cols)?, |out| {
            self.transpose_into(a, a_index, rows, cols, out, None)
        })
    }

    /// In-place form of [`transpose`](Self::transpose).
    ///
    /// `dest` must not overlap `a`.
    pub fn transpose_into<T, SA, SD>(
        &self,
        a: &SA,
        a_index: usize,
        rows: usize,
        cols: usize,
        dest: &mut SD,
        dest_index: Option<usize>,
    ) -> Result<()>
    where
        T: Copy,
        SA: Seq<Elem = T> + ?Sized,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        let len = matrix_len(rows, cols)?;
        check_window(a, a_index, len)?;
        let di = self.prepare_dest(dest, dest_index, len)?;
        for i in 0..rows {
            for j in 0..cols {
                dest.set(di + j * rows + i, a.get(a_index + i * cols + j)?)?;
            }
        }
        Ok(())
    }

    /// `n x n` identity matrix.
    pub fn identity<T>(&self, n: usize) -> Result<B::Array>
    where
        T: Scalar,
        B: BackingStore<T>,
    {
        self.alloc_with::<T, _>(matrix_len(n, n)?, |out| self.identity_into(n, out, None))
    }

    /// In-place form of [`identity`](Self::identity). Overwrites all `n * n` positions.
    pub fn identity_into<T, SD>(&self, n: usize, dest: &mut SD, dest_index: Option<usize>) -> Result<()>
    where
        T: Scalar,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        let di = self.prepare_dest(dest, dest_index, matrix_len(n, n)?)?;
        for i in 0..n {
            for j in 0..n {
                let v = if i == j { T::one() } else { T::zero() };
                dest.set(di + i * n + j, v)?;
            }
        }
        Ok(())
    }
}

/// Sum of the diagonal of an `n x n` matrix.
pub fn trace<T, SA>(a: &SA, a_index: usize, n: usize) -> Result<T>
where
    T: Scalar,
    SA: Seq<Elem = T> + ?Sized,
{
    check_window(a, a_index, matrix_len(n, n)?)?;
    let mut acc = T::zero();
    for i in 0..n {
        acc = acc + a.get(a_index + i * (n + 1))?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view;
    use approx::assert_relative_eq;

    #[test]
    fn test_cross_basis() {
        let ops = SeqOps::native();
        let x = [1.0, 0.0, 0.0];
        let y = [0.0, 1.0, 0.0];
        assert_eq!(ops.cross(&x, 1, &y, 1).unwrap(), vec![0.0, 0.0, 1.0]);
        assert_eq!(ops.cross(&y, 1, &x, 1).unwrap(), vec![0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_cross_from_packed_records() {
        // Two xyz vectors packed back to back.
        let ops = SeqOps::native();
        let packed = vec![2, 3, 4, 5, 6, 7];
        let mut dest = vec![0; 5];
        ops.cross_into(&packed, 1, &packed, 4, &mut dest, Some(2)).unwrap();
        assert_eq!(dest, vec![0, -3, 6, -3, 0]);
    }

    #[test]
    fn test_matmul_2x3_3x2() {
        let ops = SeqOps::native();
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let c = ops.matmul(&a, 1, 2, 3, &b, 1, 2).unwrap();
        assert_eq!(c, vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_matmul_identity_and_vector() {
        let ops = SeqOps::native();
        let m: Vec<f64> = (1..=16).map(f64::from).collect();
        let id = ops.identity::<f64>(4).unwrap();
        assert_eq!(ops.matmul(&m, 1, 4, 4, &id, 1, 4).unwrap(), m);

        let v = [1.0, 0.0, 0.0, 1.0];
        let mv = ops.matmul(&m, 1, 4, 4, &v, 1, 1).unwrap();
        assert_eq!(mv, vec![5.0, 13.0, 21.0, 29.0]);
    }

    #[test]
    fn test_gram_matrix_and_trace() {
        let ops = SeqOps::native();
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let at = ops.transpose(&a, 1, 2, 2).unwrap();
        let ata = ops.matmul(&at, 1, 2, 2, &a, 1, 2).unwrap();
        assert_eq!(ata, vec![10.0, 14.0, 14.0, 20.0]);
        assert_relative_eq!(trace(&ata, 1, 2).unwrap(), 30.0);
    }

    #[test]
    fn test_transpose_rectangular() {
        let ops = SeqOps::native();
        let a = vec![1, 2, 3, 4, 5, 6];
        assert_eq!(ops.transpose(&a, 1, 2, 3).unwrap(), vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_transpose_into_reverse_view() {
        let ops = SeqOps::native();
        let a = vec![1, 2, 3, 4];
        let mut out = vec![0; 4];
        let mut rev = view::reverse(&mut out).unwrap();
        ops.transpose_into(&a, 1, 2, 2, &mut rev, None).unwrap();
        assert_eq!(out, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_matmul_short_input_fails() {
        let ops = SeqOps::native();
        let a = vec![1.0; 5];
        let b = vec![1.0; 6];
        assert!(ops.matmul(&a, 1, 2, 3, &b, 1, 2).is_err());
    }

    #[test]
    fn test_matmul_with_empty_inner_dimension_is_zero() {
        let ops = SeqOps::native();
        let empty: Vec<f64> = Vec::new();
        assert_eq!(ops.matmul(&empty, 1, 2, 0, &empty, 1, 2).unwrap(), vec![0.0; 4]);

        let mut dest = vec![9.0; 3];
        ops.matmul_into(&empty, 1, 1, 0, &empty, 1, 2, &mut dest, Some(2))
            .unwrap();
        assert_eq!(dest, vec![9.0, 0.0, 0.0]);
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let ops = SeqOps::native();
        let a = vec![1.0; 4];
        assert_eq!(
            ops.transpose(&a, 1, usize::MAX, 2),
            Err(SeqError::InvalidArgument("matrix dimensions overflow usize"))
        );
        assert!(ops.matmul(&a, 1, 2, usize::MAX, &a, 1, 2).is_err());
        assert!(trace(&a, 1, usize::MAX).is_err());
        assert_relative_eq!(trace(&a, 1, 2).unwrap(), 2.0);
    }
}
