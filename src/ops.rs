//! Element-wise kernels and reductions.
//!
//! Every kernel reads and writes only through [`Seq`]/[`SeqMut`], so it runs
//! unchanged over vectors, slices, views, shared cells and custom buffers.
//! Kernels with an output come in the allocating/in-place pair described in
//! [`ex`](crate::ex); reductions return a scalar.

use flatseq_traits::{Scalar, Seq, SeqMut};
use num_traits::{Float, Signed};
use std::ops::Neg;

use crate::broadcast::Constant;
use crate::ex::{fold, SeqOps};
use crate::store::{check_window, BackingStore};
use crate::Result;

/// Generate an allocating/in-place pair over two same-length windows.
macro_rules! zip_kernel {
    ($(#[$doc:meta])* $name:ident, $name_into:ident, [$($bound:tt)+], |$x:ident, $y:ident| $body:expr) => {
        $(#[$doc])*
        pub fn $name<T, SA, SB>(
            &self,
            a: &SA,
            a_index: usize,
            a_count: usize,
            b: &SB,
            b_index: usize,
        ) -> Result<B::Array>
        where
            T: $($bound)+,
            SA: Seq<Elem = T> + ?Sized,
            SB: Seq<Elem = T> + ?Sized,
            B: BackingStore<T>,
        {
            self.zip(a, a_index, a_count, b, b_index, |$x: T, $y: T| $body)
        }

        #[doc = concat!("In-place form of [`", stringify!($name), "`](Self::", stringify!($name), ").")]
        #[allow(clippy::too_many_arguments)]
        pub fn $name_into<T, SA, SB, SD>(
            &self,
            a: &SA,
            a_index: usize,
            a_count: usize,
            b: &SB,
            b_index: usize,
            dest: &mut SD,
            dest_index: Option<usize>,
        ) -> Result<()>
        where
            T: $($bound)+,
            SA: Seq<Elem = T> + ?Sized,
            SB: Seq<Elem = T> + ?Sized,
            SD: SeqMut<Elem = T> + ?Sized,
            B: BackingStore<T>,
        {
            self.zip_into(a, a_index, a_count, b, b_index, dest, dest_index, |$x: T, $y: T| $body)
        }
    };
}

/// Generate an allocating/in-place pair combining a window with a constant operand.
macro_rules! constant_kernel {
    ($(#[$doc:meta])* $name:ident, $name_into:ident, [$($bound:tt)+], |$x:ident, $c:ident| $body:expr) => {
        $(#[$doc])*
        pub fn $name<T, SA, C>(
            &self,
            a: &SA,
            a_index: usize,
            a_count: usize,
            c: &C,
        ) -> Result<B::Array>
        where
            T: $($bound)+,
            SA: Seq<Elem = T> + ?Sized,
            C: Constant<T> + ?Sized,
            B: BackingStore<T>,
        {
            self.zip_constant(a, a_index, a_count, c, |$x: T, $c: T| $body)
        }

        #[doc = concat!("In-place form of [`", stringify!($name), "`](Self::", stringify!($name), ").")]
        pub fn $name_into<T, SA, C, SD>(
            &self,
            a: &SA,
            a_index: usize,
            a_count: usize,
            c: &C,
            dest: &mut SD,
            dest_index: Option<usize>,
        ) -> Result<()>
        where
            T: $($bound)+,
            SA: Seq<Elem = T> + ?Sized,
            C: Constant<T> + ?Sized,
            SD: SeqMut<Elem = T> + ?Sized,
            B: BackingStore<T>,
        {
            self.zip_constant_into(a, a_index, a_count, c, dest, dest_index, |$x: T, $c: T| $body)
        }
    };
}

/// Generate an allocating/in-place pair over one window.
macro_rules! unary_kernel {
    ($(#[$doc:meta])* $name:ident, $name_into:ident, [$($bound:tt)+], |$x:ident| $body:expr) => {
        $(#[$doc])*
        pub fn $name<T, SA>(&self, a: &SA, a_index: usize, a_count: usize) -> Result<B::Array>
        where
            T: $($bound)+,
            SA: Seq<Elem = T> + ?Sized,
            B: BackingStore<T>,
        {
            self.map(a, a_index, a_count, |$x: T| $body)
        }

        #[doc = concat!("In-place form of [`", stringify!($name), "`](Self::", stringify!($name), ").")]
        pub fn $name_into<T, SA, SD>(
            &self,
            a: &SA,
            a_index: usize,
            a_count: usize,
            dest: &mut SD,
            dest_index: Option<usize>,
        ) -> Result<()>
        where
            T: $($bound)+,
            SA: Seq<Elem = T> + ?Sized,
            SD: SeqMut<Elem = T> + ?Sized,
            B: BackingStore<T>,
        {
            self.map_into(a, a_index, a_count, dest, dest_index, |$x: T| $body)
        }
    };
}

impl<B> SeqOps<B> {
    zip_kernel!(
        /// Element-wise `a + b`.
        add, add_into, [Scalar], |x, y| x + y
    );
    zip_kernel!(
        /// Element-wise `a - b`.
        sub, sub_into, [Scalar], |x, y| x - y
    );
    zip_kernel!(
        /// Element-wise `a * b`.
        mul, mul_into, [Scalar], |x, y| x * y
    );
    zip_kernel!(
        /// Element-wise `a / b`.
        div, div_into, [Scalar], |x, y| x / y
    );
    zip_kernel!(
        /// Element-wise minimum.
        min, min_into, [Scalar + PartialOrd], |x, y| if y < x { y } else { x }
    );
    zip_kernel!(
        /// Element-wise maximum.
        max, max_into, [Scalar + PartialOrd], |x, y| if y > x { y } else { x }
    );

    constant_kernel!(
        /// `a + c` with `c` a scalar or cycled pattern.
        ///
        /// ```rust
        /// use flatseq::{broadcast::Pattern, SeqOps};
        ///
        /// let a = vec![1, 2, 3, 4];
        /// let c = vec![10, 20];
        /// let out = SeqOps::native()
        ///     .add_constant(&a, 1, 4, &Pattern::new(&c).unwrap())
        ///     .unwrap();
        /// assert_eq!(out, vec![11, 22, 13, 24]);
        /// ```
        add_constant, add_constant_into, [Scalar], |x, c| x + c
    );
    constant_kernel!(
        /// `a - c` with `c` a scalar or cycled pattern.
        sub_constant, sub_constant_into, [Scalar], |x, c| x - c
    );
    constant_kernel!(
        /// `a * c` with `c` a scalar or cycled pattern.
        mul_constant, mul_constant_into, [Scalar], |x, c| x * c
    );
    constant_kernel!(
        /// `a / c` with `c` a scalar or cycled pattern.
        div_constant, div_constant_into, [Scalar], |x, c| x / c
    );
    constant_kernel!(
        /// Clamp from above by `c`.
        min_constant, min_constant_into, [Scalar + PartialOrd], |x, c| if c < x { c } else { x }
    );
    constant_kernel!(
        /// Clamp from below by `c`.
        max_constant, max_constant_into, [Scalar + PartialOrd], |x, c| if c > x { c } else { x }
    );

    unary_kernel!(
        /// Element-wise negation.
        negate, negate_into, [Scalar + Neg<Output = T>], |x| -x
    );
    unary_kernel!(
        /// Element-wise absolute value.
        abs, abs_into, [Scalar + Signed], |x| x.abs()
    );

    /// Linear interpolation `a + (b - a) * t`.
    pub fn lerp<T, SA, SB>(
        &self,
        a: &SA,
        a_index: usize,
        a_count: usize,
        b: &SB,
        b_index: usize,
        t: T,
    ) -> Result<B::Array>
    where
        T: Scalar,
        SA: Seq<Elem = T> + ?Sized,
        SB: Seq<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        self.zip(a, a_index, a_count, b, b_index, |x, y| x + (y - x) * t)
    }

    /// In-place form of [`lerp`](Self::lerp).
    #[allow(clippy::too_many_arguments)]
    pub fn lerp_into<T, SA, SB, SD>(
        &self,
        a: &SA,
        a_index: usize,
        a_count: usize,
        b: &SB,
        b_index: usize,
        t: T,
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
        self.zip_into(a, a_index, a_count, b, b_index, dest, dest_index, |x, y| {
            x + (y - x) * t
        })
    }

    /// Scale a window to unit length.
    ///
    /// A zero-length window normalizes to zeros rather than NaN.
    pub fn normalize<T, SA>(&self, a: &SA, a_index: usize, a_count: usize) -> Result<B::Array>
    where
        T: Scalar + Float,
        SA: Seq<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        self.alloc_with::<T, _>(a_count, |out| {
            self.normalize_into(a, a_index, a_count, out, None)
        })
    }

    /// In-place form of [`normalize`](Self::normalize).
    pub fn normalize_into<T, SA, SD>(
        &self,
        a: &SA,
        a_index: usize,
        a_count: usize,
        dest: &mut SD,
        dest_index: Option<usize>,
    ) -> Result<()>
    where
        T: Scalar + Float,
        SA: Seq<Elem = T> + ?Sized,
        SD: SeqMut<Elem = T> + ?Sized,
        B: BackingStore<T>,
    {
        let len = length(a, a_index, a_count)?;
        if len.is_zero() {
            return self.map_into(a, a_index, a_count, dest, dest_index, |_| T::zero());
        }
        self.map_into(a, a_index, a_count, dest, dest_index, |x| x / len)
    }
}

// ============================================================================
// Reductions
// ============================================================================

/// Sum of a window.
pub fn sum<T, SA>(a: &SA, a_index: usize, a_count: usize) -> Result<T>
where
    T: Scalar,
    SA: Seq<Elem = T> + ?Sized,
{
    fold(a, a_index, a_count, T::zero(), |acc, x| acc + x)
}

/// Inner product of two same-length windows.
pub fn dot<T, SA, SB>(a: &SA, a_index: usize, a_count: usize, b: &SB, b_index: usize) -> Result<T>
where
    T: Scalar,
    SA: Seq<Elem = T> + ?Sized,
    SB: Seq<Elem = T> + ?Sized,
{
    check_window(a, a_index, a_count)?;
    check_window(b, b_index, a_count)?;
    let mut acc = T::zero();
    for k in 0..a_count {
        acc = acc + a.get(a_index + k)? * b.get(b_index + k)?;
    }
    Ok(acc)
}

/// Squared Euclidean length of a window.
pub fn length_squared<T, SA>(a: &SA, a_index: usize, a_count: usize) -> Result<T>
where
    T: Scalar,
    SA: Seq<Elem = T> + ?Sized,
{
    fold(a, a_index, a_count, T::zero(), |acc, x| acc + x * x)
}

/// Euclidean length of a window.
pub fn length<T, SA>(a: &SA, a_index: usize, a_count: usize) -> Result<T>
where
    T: Scalar + Float,
    SA: Seq<Elem = T> + ?Sized,
{
    Ok(length_squared(a, a_index, a_count)?.sqrt())
}

/// Euclidean distance between two same-length windows.
pub fn distance<T, SA, SB>(
    a: &SA,
    a_index: usize,
    a_count: usize,
    b: &SB,
    b_index: usize,
) -> Result<T>
where
    T: Scalar + Float,
    SA: Seq<Elem = T> + ?Sized,
    SB: Seq<Elem = T> + ?Sized,
{
    check_window(a, a_index, a_count)?;
    check_window(b, b_index, a_count)?;
    let mut acc = T::zero();
    for k in 0..a_count {
        let d = a.get(a_index + k)? - b.get(b_index + k)?;
        acc = acc + d * d;
    }
    Ok(acc.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::{Pattern, Uniform};
    use crate::view;
    use approx::assert_relative_eq;
    use flatseq_traits::shared;
    use num_complex::Complex64;

    #[test]
    fn test_arithmetic() {
        let ops = SeqOps::native();
        let a = vec![6.0, 8.0, 10.0];
        let b = vec![2.0, 4.0, 5.0];
        assert_eq!(ops.add(&a, 1, 3, &b, 1).unwrap(), vec![8.0, 12.0, 15.0]);
        assert_eq!(ops.sub(&a, 1, 3, &b, 1).unwrap(), vec![4.0, 4.0, 5.0]);
        assert_eq!(ops.mul(&a, 1, 3, &b, 1).unwrap(), vec![12.0, 32.0, 50.0]);
        assert_eq!(ops.div(&a, 1, 3, &b, 1).unwrap(), vec![3.0, 2.0, 2.0]);
    }

    #[test]
    fn test_min_max() {
        let ops = SeqOps::native();
        let a = [1, 5, 3];
        let b = [4, 2, 3];
        assert_eq!(ops.min(&a, 1, 3, &b, 1).unwrap(), vec![1, 2, 3]);
        assert_eq!(ops.max(&a, 1, 3, &b, 1).unwrap(), vec![4, 5, 3]);
        assert_eq!(
            ops.max_constant(&a, 1, 3, &Uniform(2)).unwrap(),
            vec![2, 5, 3]
        );
        assert_eq!(
            ops.min_constant(&a, 1, 3, &Uniform(2)).unwrap(),
            vec![1, 2, 2]
        );
    }

    #[test]
    fn test_add_constant_pattern() {
        let ops = SeqOps::native();
        let a = vec![1, 2, 3, 4];
        let c = vec![10, 20];
        let out = ops
            .add_constant(&a, 1, 4, &Pattern::new(&c).unwrap())
            .unwrap();
        assert_eq!(out, vec![11, 22, 13, 24]);
    }

    #[test]
    fn test_mul_constant_into_channel() {
        // Scale only the w channel of two xyzw records.
        let ops = SeqOps::native();
        let mut records = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let ws = view::stride(&records, 4, 4, 2).unwrap().values().unwrap();
        let mut w_view = view::stride(&mut records, 4, 4, 2).unwrap();
        ops.mul_constant_into(&ws, 1, 2, &Uniform(0.5), &mut w_view, None)
            .unwrap();
        assert_eq!(records, vec![1.0, 2.0, 3.0, 2.0, 5.0, 6.0, 7.0, 4.0]);
    }

    #[test]
    fn test_sub_and_div_constant() {
        let ops = SeqOps::native();
        let a = vec![10.0, 20.0, 30.0];
        assert_eq!(
            ops.sub_constant(&a, 1, 3, &Uniform(10.0)).unwrap(),
            vec![0.0, 10.0, 20.0]
        );
        let c = [10.0, 5.0];
        assert_eq!(
            ops.div_constant(&a, 1, 3, &Pattern::new(&c).unwrap())
                .unwrap(),
            vec![1.0, 4.0, 3.0]
        );
    }

    #[test]
    fn test_empty_pattern_fails() {
        let c: [i32; 0] = [];
        assert!(Pattern::new(&c).is_err());
    }

    #[test]
    fn test_unary() {
        let ops = SeqOps::native();
        let a = vec![-1, 2, -3];
        assert_eq!(ops.negate(&a, 1, 3).unwrap(), vec![1, -2, 3]);
        assert_eq!(ops.abs(&a, 1, 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_in_place_add_on_shared_buffer() {
        let ops = SeqOps::native();
        let mut buf = [1.0, 2.0, 3.0];
        let delta = [0.5, 0.5, 0.5];
        let cells = shared(&mut buf);
        let mut dest = cells;
        ops.add_into(&cells, 1, 3, &delta, 1, &mut dest, None).unwrap();
        assert_eq!(buf, [1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_lerp() {
        let ops = SeqOps::native();
        let a = [0.0, 10.0];
        let b = [10.0, 20.0];
        assert_eq!(ops.lerp(&a, 1, 2, &b, 1, 0.25).unwrap(), vec![2.5, 12.5]);

        let mut dest: Vec<f64> = Vec::new();
        ops.lerp_into(&a, 1, 2, &b, 1, 1.0, &mut dest, None).unwrap();
        assert_eq!(dest, vec![10.0, 20.0]);
    }

    #[test]
    fn test_normalize() {
        let ops = SeqOps::native();
        let v = vec![3.0, 0.0, 4.0];
        let n = ops.normalize(&v, 1, 3).unwrap();
        assert_relative_eq!(n[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(n[2], 0.8, epsilon = 1e-12);
        assert_relative_eq!(length(&n, 1, 3).unwrap(), 1.0, epsilon = 1e-12);

        let zero = vec![0.0f32; 3];
        assert_eq!(ops.normalize(&zero, 1, 3).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn test_reductions() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0];
        assert_eq!(sum(&a, 1, 3).unwrap(), 6.0);
        assert_eq!(dot(&a, 1, 3, &b, 1).unwrap(), 32.0);
        assert_eq!(length_squared(&a, 1, 3).unwrap(), 14.0);
        assert_relative_eq!(distance(&a, 1, 3, &b, 1).unwrap(), 27.0f64.sqrt());
        assert!(dot(&a, 2, 3, &b, 1).is_err());
    }

    #[test]
    fn test_complex_elements() {
        let ops = SeqOps::native();
        let a = vec![Complex64::new(1.0, 1.0), Complex64::new(0.0, 2.0)];
        let b = vec![Complex64::new(2.0, 0.0), Complex64::new(0.0, 1.0)];
        let out = ops.mul(&a, 1, 2, &b, 1).unwrap();
        assert_eq!(out, vec![Complex64::new(2.0, 2.0), Complex64::new(-2.0, 0.0)]);
        assert_eq!(sum(&out, 1, 2).unwrap(), Complex64::new(0.0, 2.0));
    }
}
