use std::marker::PhantomData;

use ndarray::prelude::*;
use ndarray::NdFloat;

use super::{Capabilities, Function};
use crate::error::Result;

/// The zero function, $`g \equiv 0`$
///
/// Smooth with zero gradient, and its proximal operator is the identity for
/// every step size. Useful as the regularizer of an unconstrained problem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zero<A> {
    phantom: PhantomData<A>,
}

impl<A> Zero<A> {
    #[must_use]
    pub fn new() -> Zero<A> {
        Zero {
            phantom: PhantomData,
        }
    }
}

impl<A: NdFloat> Function for Zero<A> {
    type Elem = A;

    fn capabilities(&self) -> Capabilities {
        Capabilities::new("Zero")
            .with_value()
            .with_gradient()
            .with_prox()
    }

    fn value(&self, _x: ArrayView1<'_, A>) -> Result<A> {
        Ok(A::zero())
    }

    fn value_and_gradient(&self, x: ArrayView1<'_, A>) -> Result<(A, Array1<A>)> {
        Ok((A::zero(), Array1::zeros(x.raw_dim())))
    }

    fn prox(&self, x: ArrayView1<'_, A>, _gamma: A) -> Result<Array1<A>> {
        Ok(x.to_owned())
    }

    fn prox_with_value(&self, x: ArrayView1<'_, A>, _gamma: A) -> Result<(Array1<A>, A)> {
        Ok((x.to_owned(), A::zero()))
    }
}
