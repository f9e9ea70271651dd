//! Abstract Linear Operators and Adjoints
//!
//! A [`LinearOperator`] maps vectors of length `dimension_in` to vectors of
//! length `dimension_out` and knows how to apply its adjoint. Shapes are
//! checked eagerly: applying an operator to a vector of the wrong length
//! fails with [`Error::DimensionMismatch`](crate::Error::DimensionMismatch)
//! before any arithmetic is done.
//!
//! The [`Adjoint`] trait gives every operator an `adj()` view, so that
//! $`L^*`$ can be passed wherever an operator is expected.

mod adjoint;
pub use adjoint::*;
mod composition;
pub use composition::*;
mod matrix;
pub use matrix::*;

use std::fmt;
use std::marker::PhantomData;

use ndarray::prelude::*;
use ndarray::{Data, NdFloat, RawDataClone};

use crate::error::{check_dim, Result};

/// A linear map between finite dimensional vector spaces
pub trait LinearOperator {
    type Elem: NdFloat;

    /// Length of the vectors this operator accepts
    fn dimension_in(&self) -> usize;

    /// Length of the vectors this operator produces
    fn dimension_out(&self) -> usize;

    /// Computes $`Lx`$
    fn apply(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Array1<Self::Elem>>;

    /// Computes $`L^*x`$
    fn apply_adjoint(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Array1<Self::Elem>>;

    /// Whether $`L = L^*`$.
    ///
    /// This is only a hint: when `true`, [`apply_adjoint`](Self::apply_adjoint)
    /// must agree with [`apply`](Self::apply), and implementations may
    /// short-cut to it. Returning `false` is always safe.
    fn is_self_adjoint(&self) -> bool {
        false
    }
}

impl<'a, T> LinearOperator for &'a T
where
    T: LinearOperator + ?Sized,
{
    type Elem = T::Elem;

    #[inline]
    fn dimension_in(&self) -> usize {
        (**self).dimension_in()
    }

    #[inline]
    fn dimension_out(&self) -> usize {
        (**self).dimension_out()
    }

    #[inline]
    fn apply(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Array1<Self::Elem>> {
        (**self).apply(x)
    }

    #[inline]
    fn apply_adjoint(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Array1<Self::Elem>> {
        (**self).apply_adjoint(x)
    }

    #[inline]
    fn is_self_adjoint(&self) -> bool {
        (**self).is_self_adjoint()
    }
}

pub trait Adjoint<'a> {
    type Output: LinearOperator;
    fn adj(&'a self) -> Self::Output;
}

/// The identity map on vectors of length `dim`
#[derive(Debug, Clone, Copy)]
pub struct Identity<A> {
    dim: usize,
    phantom: PhantomData<A>,
}

impl<A> Identity<A> {
    #[must_use]
    pub fn new(dim: usize) -> Identity<A> {
        Identity {
            dim,
            phantom: PhantomData,
        }
    }
}

impl<A: NdFloat> LinearOperator for Identity<A> {
    type Elem = A;

    fn dimension_in(&self) -> usize {
        self.dim
    }

    fn dimension_out(&self) -> usize {
        self.dim
    }

    #[inline]
    fn apply(&self, x: ArrayView1<'_, A>) -> Result<Array1<A>> {
        check_dim("identity input", self.dim, x.len())?;
        Ok(x.to_owned())
    }

    #[inline]
    fn apply_adjoint(&self, x: ArrayView1<'_, A>) -> Result<Array1<A>> {
        self.apply(x)
    }

    fn is_self_adjoint(&self) -> bool {
        true
    }
}

impl<'a, A: 'a + NdFloat> Adjoint<'a> for Identity<A> {
    type Output = &'a Identity<A>;

    fn adj(&'a self) -> Self::Output {
        self
    }
}

/// Elementwise scaling $`x \mapsto \mathrm{diag}(d)\,x`$
pub struct Diagonal<S>
where
    S: Data,
{
    diag: ArrayBase<S, Ix1>,
}

impl<S: Data> Diagonal<S> {
    pub fn new(diag: ArrayBase<S, Ix1>) -> Diagonal<S> {
        Diagonal { diag }
    }

    pub fn diag(&self) -> &ArrayBase<S, Ix1> {
        &self.diag
    }
}

impl<A, S> fmt::Debug for Diagonal<S>
where
    A: fmt::Debug,
    S: Data<Elem = A>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagonal").field("diag", &self.diag).finish()
    }
}

impl<S> Clone for Diagonal<S>
where
    S: Data + RawDataClone,
{
    fn clone(&self) -> Self {
        Diagonal {
            diag: self.diag.clone(),
        }
    }
}

impl<A, S> LinearOperator for Diagonal<S>
where
    A: NdFloat,
    S: Data<Elem = A>,
{
    type Elem = A;

    fn dimension_in(&self) -> usize {
        self.diag.len()
    }

    fn dimension_out(&self) -> usize {
        self.diag.len()
    }

    fn apply(&self, x: ArrayView1<'_, A>) -> Result<Array1<A>> {
        check_dim("diagonal input", self.diag.len(), x.len())?;
        Ok(&self.diag * &x)
    }

    fn apply_adjoint(&self, x: ArrayView1<'_, A>) -> Result<Array1<A>> {
        self.apply(x)
    }

    fn is_self_adjoint(&self) -> bool {
        true
    }
}

impl<'a, A, S> Adjoint<'a> for Diagonal<S>
where
    A: 'a + NdFloat,
    S: 'a + Data<Elem = A>,
{
    type Output = &'a Diagonal<S>;

    fn adj(&'a self) -> Self::Output {
        self
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn diagonal_adj() {
        let d = array![1., 2., 3., 4.];
        let D = Diagonal::new(d.view());
        assert!(D.is_self_adjoint());
        assert_eq!(D.adj().apply(array![1., 1., 1., 1.].view()).unwrap(), d);
    }

    #[test]
    fn identity() {
        let I = Identity::new(4);
        let d = array![1., 2., 3., 4.];

        assert_eq!(I.apply(d.view()).unwrap(), d);
        assert_eq!(I.adj().apply(d.view()).unwrap(), d);
        assert_eq!(I.apply_adjoint(d.view()).unwrap(), d);
    }

    #[test]
    fn wrong_length_is_rejected_before_applying() {
        let I = Identity::<f64>::new(3);
        let err = I.apply(array![1., 2.].view()).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn references_are_operators() {
        fn out_dim(op: impl LinearOperator) -> usize {
            op.dimension_out()
        }
        let D = Diagonal::new(array![1., 2.]);
        assert_eq!(out_dim(&D), 2);
        assert_eq!(out_dim(&&D), 2);
    }

    #[test]
    fn diagonal_clone_and_debug() {
        let d = array![1., -2.];
        let D = Diagonal::new(d.view()).clone();
        assert_eq!(D.apply(array![3., 1.].view()).unwrap(), array![3., -2.]);
        assert!(format!("{:?}", D).starts_with("Diagonal"));

        let E = Diagonal::new(d.clone()).clone();
        assert_eq!(E.diag(), &d);
    }
}
