//! Element bounds for the numeric kernels.

/// Shared trait bounds for elements the numeric kernels can combine.
///
/// Orderings are not required, so complex numbers qualify; kernels that
/// compare (`min`, `max`, `abs`) add `PartialOrd` or `Signed` on their own.
pub trait Scalar: Copy + Default + PartialEq + num_traits::Num {}

impl<T> Scalar for T where T: Copy + Default + PartialEq + num_traits::Num {}
