use std::fmt;

use ndarray::prelude::*;
use ndarray::{Data, NdFloat, RawDataClone};

use super::{Adjoint, LinearOperator, OpAdjoint};
use crate::error::{check_dim, Result};

/// A linear operator backed by a dense matrix, $`x \mapsto Ax`$
///
/// Whether the operator is self-adjoint is decided once, at construction,
/// by an exact symmetry check on `A`. A symmetric matrix never has its
/// transpose taken.
pub struct MatrixOperator<S>
where
    S: Data,
{
    matrix: ArrayBase<S, Ix2>,
    self_adjoint: bool,
}

impl<A, S> MatrixOperator<S>
where
    A: NdFloat,
    S: Data<Elem = A>,
{
    pub fn new(matrix: ArrayBase<S, Ix2>) -> MatrixOperator<S> {
        let self_adjoint = is_symmetric(&matrix);
        MatrixOperator {
            matrix,
            self_adjoint,
        }
    }

    pub fn matrix(&self) -> &ArrayBase<S, Ix2> {
        &self.matrix
    }
}

impl<A, S> fmt::Debug for MatrixOperator<S>
where
    A: fmt::Debug,
    S: Data<Elem = A>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixOperator")
            .field("matrix", &self.matrix)
            .field("self_adjoint", &self.self_adjoint)
            .finish()
    }
}

impl<S> Clone for MatrixOperator<S>
where
    S: Data + RawDataClone,
{
    fn clone(&self) -> Self {
        MatrixOperator {
            matrix: self.matrix.clone(),
            self_adjoint: self.self_adjoint,
        }
    }
}

fn is_symmetric<A, S>(a: &ArrayBase<S, Ix2>) -> bool
where
    A: NdFloat,
    S: Data<Elem = A>,
{
    a.is_square() && a.indexed_iter().all(|((i, j), &v)| j <= i || a[[j, i]] == v)
}

impl<A, S> LinearOperator for MatrixOperator<S>
where
    A: NdFloat,
    S: Data<Elem = A>,
{
    type Elem = A;

    fn dimension_in(&self) -> usize {
        self.matrix.ncols()
    }

    fn dimension_out(&self) -> usize {
        self.matrix.nrows()
    }

    fn apply(&self, x: ArrayView1<'_, A>) -> Result<Array1<A>> {
        check_dim("matrix operator input", self.matrix.ncols(), x.len())?;
        Ok(self.matrix.dot(&x))
    }

    fn apply_adjoint(&self, x: ArrayView1<'_, A>) -> Result<Array1<A>> {
        if self.self_adjoint {
            return self.apply(x);
        }
        check_dim("matrix operator adjoint input", self.matrix.nrows(), x.len())?;
        Ok(self.matrix.t().dot(&x))
    }

    fn is_self_adjoint(&self) -> bool {
        self.self_adjoint
    }
}

impl<'a, A, S> Adjoint<'a> for MatrixOperator<S>
where
    A: 'a + NdFloat,
    S: 'a + Data<Elem = A>,
{
    type Output = OpAdjoint<'a, MatrixOperator<S>>;

    fn adj(&'a self) -> Self::Output {
        OpAdjoint::new(self)
    }
}
