use ndarray::prelude::*;

use super::{Adjoint, LinearOperator, OpAdjoint};
use crate::error::{check_dim, Result};

/// The composition $`T = A \circ B`$ of two borrowed operators
///
/// ```math
/// Tx = A(Bx), \qquad T^*x = B^*(A^*x)
/// ```
///
/// The composition is reported self-adjoint only when both operands are.
/// That is sufficient, not necessary, so some self-adjoint compositions
/// will take the general adjoint path.
#[derive(Debug)]
pub struct OpComposition<'a, P: ?Sized, Q: ?Sized> {
    outer: &'a P,
    inner: &'a Q,
}

impl<'a, P, Q> OpComposition<'a, P, Q>
where
    P: LinearOperator + ?Sized,
    Q: LinearOperator<Elem = P::Elem> + ?Sized,
{
    /// Builds `outer ∘ inner`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::DimensionMismatch`](crate::Error::DimensionMismatch)
    /// unless `outer.dimension_in() == inner.dimension_out()`.
    pub fn new(outer: &'a P, inner: &'a Q) -> Result<Self> {
        check_dim(
            "operator composition",
            outer.dimension_in(),
            inner.dimension_out(),
        )?;
        Ok(OpComposition { outer, inner })
    }
}

impl<'a, P, Q> LinearOperator for OpComposition<'a, P, Q>
where
    P: LinearOperator + ?Sized,
    Q: LinearOperator<Elem = P::Elem> + ?Sized,
{
    type Elem = P::Elem;

    fn dimension_in(&self) -> usize {
        self.inner.dimension_in()
    }

    fn dimension_out(&self) -> usize {
        self.outer.dimension_out()
    }

    fn apply(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Array1<Self::Elem>> {
        let bx = self.inner.apply(x)?;
        self.outer.apply(bx.view())
    }

    fn apply_adjoint(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Array1<Self::Elem>> {
        let astar_x = self.outer.apply_adjoint(x)?;
        self.inner.apply_adjoint(astar_x.view())
    }

    fn is_self_adjoint(&self) -> bool {
        self.outer.is_self_adjoint() && self.inner.is_self_adjoint()
    }
}

impl<'a, 'b: 'a, P, Q> Adjoint<'a> for OpComposition<'b, P, Q>
where
    P: 'a + LinearOperator + ?Sized,
    Q: 'a + LinearOperator<Elem = P::Elem> + ?Sized,
{
    type Output = OpAdjoint<'a, Self>;

    fn adj(&'a self) -> Self::Output {
        OpAdjoint::new(self)
    }
}
