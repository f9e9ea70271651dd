use std::cell::OnceCell;

use log::debug;
use ndarray::prelude::*;

use super::{Capabilities, Category, Function};
use crate::error::{check_dim, Result};
use crate::linsys::Cholesky;

/// The quadratic $`f(x) = \frac12 x^\top Q x + q^\top x`$
///
/// ```math
/// \nabla f(x) = Qx + q, \qquad
/// f^*(y) = \tfrac12 (y - q)^\top Q^{-1} (y - q), \qquad
/// \nabla f^*(y) = Q^{-1}(y - q)
/// ```
///
/// The conjugate is only meaningful for symmetric positive definite $`Q`$.
/// The Cholesky factor of $`Q`$ is computed on the first conjugate
/// evaluation and reused afterwards; a matrix that cannot be factorized
/// makes every conjugate evaluation fail with a solver error, while value and
/// gradient keep working. No proximal operator is provided.
///
/// Unlike the generic functions of this module, `Quadratic` is `f64` only,
/// because the factorization is done by [`Cholesky`].
#[derive(Debug)]
pub struct Quadratic {
    hessian: Array2<f64>,
    linear: Option<Array1<f64>>,
    factor: OnceCell<Cholesky>,
}

impl Quadratic {
    /// $`\frac12 x^\top Q x`$
    ///
    /// # Errors
    ///
    /// Fails with a dimension mismatch if `q_mat` is not square.
    pub fn new(q_mat: Array2<f64>) -> Result<Quadratic> {
        check_dim("quadratic form", q_mat.nrows(), q_mat.ncols())?;
        Ok(Quadratic {
            hessian: q_mat,
            linear: None,
            factor: OnceCell::new(),
        })
    }

    /// $`\frac12 x^\top Q x + q^\top x`$
    pub fn with_linear(q_mat: Array2<f64>, q: Array1<f64>) -> Result<Quadratic> {
        let mut quad = Quadratic::new(q_mat)?;
        check_dim("quadratic linear term", quad.dim(), q.len())?;
        quad.linear = Some(q);
        Ok(quad)
    }

    pub fn dim(&self) -> usize {
        self.hessian.nrows()
    }

    pub fn hessian(&self) -> &Array2<f64> {
        &self.hessian
    }

    pub fn linear(&self) -> Option<&Array1<f64>> {
        self.linear.as_ref()
    }

    fn cholesky(&self) -> Result<&Cholesky> {
        if let Some(factor) = self.factor.get() {
            return Ok(factor);
        }
        debug!("factorizing quadratic of dimension {}", self.dim());
        let factor = Cholesky::factorize(&self.hessian)?;
        Ok(self.factor.get_or_init(|| factor))
    }
}

impl Function for Quadratic {
    type Elem = f64;

    fn capabilities(&self) -> Capabilities {
        Capabilities::new("Quadratic")
            .with_value()
            .with_gradient()
            .with_conjugate_value()
            .with_conjugate_gradient()
            .in_category(Category::Quadratic)
    }

    fn value(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
        self.value_and_gradient(x).map(|(f, _)| f)
    }

    fn value_and_gradient(&self, x: ArrayView1<'_, f64>) -> Result<(f64, Array1<f64>)> {
        check_dim("quadratic argument", self.dim(), x.len())?;
        let qx = self.hessian.dot(&x);
        let mut f = 0.5 * x.dot(&qx);
        let mut grad = qx;
        if let Some(q) = &self.linear {
            f += q.dot(&x);
            grad += q;
        }
        Ok((f, grad))
    }

    fn conjugate_value(&self, y: ArrayView1<'_, f64>) -> Result<f64> {
        self.conjugate_value_and_gradient(y).map(|(f, _)| f)
    }

    fn conjugate_value_and_gradient(&self, y: ArrayView1<'_, f64>) -> Result<(f64, Array1<f64>)> {
        check_dim("quadratic conjugate argument", self.dim(), y.len())?;
        let shifted = match &self.linear {
            Some(q) => &y - q,
            None => y.to_owned(),
        };
        let grad = self.cholesky()?.solve(&shifted)?;
        Ok((0.5 * shifted.dot(&grad), grad))
    }
}
