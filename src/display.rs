//! Text rendering of sequence windows.

use std::fmt;

use flatseq_traits::Seq;

/// `Display` adapter over a window of a sequence.
///
/// Elements are read with `get` while formatting; a read failure surfaces as
/// [`fmt::Error`].
///
/// ```rust
/// use flatseq::display;
///
/// let m = vec![1.0, 0.5, 0.26, 2.0];
/// assert_eq!(display(&m, 1, 4).precision(1).to_string(), "[1.0, 0.5, 0.3, 2.0]");
/// assert_eq!(display(&m, 1, 4).columns(2).to_string(), "[1, 0.5]\n[0.26, 2]");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Formatted<'a, S: ?Sized> {
    seq: &'a S,
    index: usize,
    count: usize,
    precision: Option<usize>,
    columns: Option<usize>,
}

/// Format `count` elements of `seq` starting at `index`.
pub fn display<S: Seq + ?Sized>(seq: &S, index: usize, count: usize) -> Formatted<'_, S> {
    Formatted {
        seq,
        index,
        count,
        precision: None,
        columns: None,
    }
}

impl<'a, S: ?Sized> Formatted<'a, S> {
    /// Print every element with `digits` digits after the decimal point.
    pub fn precision(mut self, digits: usize) -> Self {
        self.precision = Some(digits);
        self
    }

    /// Break the output into rows of `n` elements, one row per line.
    ///
    /// Zero leaves the output on a single line.
    pub fn columns(mut self, n: usize) -> Self {
        self.columns = (n > 0).then_some(n);
        self
    }

    fn row(&self, f: &mut fmt::Formatter<'_>, start: usize, len: usize) -> fmt::Result
    where
        S: Seq,
        S::Elem: fmt::Display,
    {
        f.write_str("[")?;
        for k in 0..len {
            if k > 0 {
                f.write_str(", ")?;
            }
            let pos = start.checked_add(k).ok_or(fmt::Error)?;
            let v = self.seq.get(pos).map_err(|_| fmt::Error)?;
            match self.precision {
                Some(p) => write!(f, "{v:.p$}")?,
                None => write!(f, "{v}")?,
            }
        }
        f.write_str("]")
    }
}

impl<'a, S> fmt::Display for Formatted<'a, S>
where
    S: Seq + ?Sized,
    S::Elem: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(cols) = self.columns else {
            return self.row(f, self.index, self.count);
        };
        if self.count == 0 {
            return f.write_str("[]");
        }
        let mut done = 0;
        while done < self.count {
            if done > 0 {
                f.write_str("\n")?;
            }
            let len = cols.min(self.count - done);
            self.row(f, self.index.checked_add(done).ok_or(fmt::Error)?, len)?;
            done += len;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view;

    #[test]
    fn test_plain() {
        let a = vec![1, 2, 3];
        assert_eq!(display(&a, 1, 3).to_string(), "[1, 2, 3]");
        assert_eq!(display(&a, 2, 0).to_string(), "[]");
    }

    #[test]
    fn test_matrix_rows_with_partial_tail() {
        let a: Vec<i32> = (1..=5).collect();
        assert_eq!(display(&a, 1, 5).columns(2).to_string(), "[1, 2]\n[3, 4]\n[5]");
        assert_eq!(display(&a, 1, 5).columns(0).to_string(), "[1, 2, 3, 4, 5]");
    }

    #[test]
    fn test_through_view() {
        let a = vec![0.126, 9.0, 0.5, 9.0];
        let evens = view::stride(&a, 1, 2, 2).unwrap();
        assert_eq!(display(&evens, 1, 2).precision(2).to_string(), "[0.13, 0.50]");
    }

    #[test]
    fn test_out_of_range_is_fmt_error() {
        use std::fmt::Write;
        let a = [1, 2];
        let mut s = String::new();
        assert!(write!(s, "{}", display(&a, 2, 2)).is_err());
    }
}
