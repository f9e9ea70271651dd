use ndarray::prelude::*;

use super::{Adjoint, LinearOperator};
use crate::error::Result;

/// The adjoint $`T^*`$ of a borrowed operator $`T`$
///
/// Forward and adjoint application are swapped, and so are the declared
/// input and output dimensions. Wrapping twice gives back an operator that
/// behaves exactly like `T`; [`Adjoint::adj`] on an `OpAdjoint` skips the
/// double wrapper and returns `T` itself.
#[derive(Debug)]
pub struct OpAdjoint<'a, T: ?Sized> {
    inner: &'a T,
}

impl<'a, T: ?Sized> OpAdjoint<'a, T> {
    pub fn new(inner: &'a T) -> Self {
        OpAdjoint { inner }
    }

    pub fn inner(&self) -> &'a T {
        self.inner
    }
}

impl<'a, T: ?Sized> Clone for OpAdjoint<'a, T> {
    fn clone(&self) -> Self {
        OpAdjoint { inner: self.inner }
    }
}

impl<'a, T: ?Sized> Copy for OpAdjoint<'a, T> {}

impl<'a, T> LinearOperator for OpAdjoint<'a, T>
where
    T: LinearOperator + ?Sized,
{
    type Elem = T::Elem;

    fn dimension_in(&self) -> usize {
        self.inner.dimension_out()
    }

    fn dimension_out(&self) -> usize {
        self.inner.dimension_in()
    }

    fn apply(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Array1<Self::Elem>> {
        self.inner.apply_adjoint(x)
    }

    fn apply_adjoint(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Array1<Self::Elem>> {
        self.inner.apply(x)
    }

    fn is_self_adjoint(&self) -> bool {
        self.inner.is_self_adjoint()
    }
}

impl<'a, 'b, T> Adjoint<'a> for OpAdjoint<'b, T>
where
    T: LinearOperator + ?Sized,
{
    type Output = &'b T;

    fn adj(&'a self) -> Self::Output {
        self.inner
    }
}
