use log::debug;
use ndarray::prelude::*;

use super::{Capabilities, Category, Function};
use crate::error::{check_dim, Error, Result};
use crate::linsys::Cholesky;

/// Shift added to the diagonal of $`FF^\top`$ before it is factorized
pub const DEFAULT_REGULARIZATION: f64 = 1e-12;

/// Weighted squared distance to `p`, restricted to an affine subspace
///
/// ```math
/// f(x) = \sum_i \frac{w_i}{2}(x_i - p_i)^2 + \delta_{\{x : Ax = b\}}(x)
/// ```
///
/// Only the conjugate is available. With $`W = \mathrm{diag}(w)`$ and
/// $`\sigma = W^{-1}y + p`$, the maximizer of $`\langle y, x\rangle - f(x)`$ is
/// ```math
/// x^\star = \sigma - W^{-1}A^\top\lambda, \qquad
/// (AW^{-1}A^\top)\lambda = A\sigma - b,
/// ```
/// and $`\nabla f^*(y) = x^\star`$. The system matrix is
/// $`FF^\top + \epsilon I`$ with $`F = AW^{-1/2}`$, factorized once at
/// construction, which also makes this function `f64` only.
#[derive(Debug)]
pub struct QuadraticLossOverAffine {
    a: Array2<f64>,
    b: Array1<f64>,
    w: Array1<f64>,
    p: Array1<f64>,
    factor: Cholesky,
}

impl QuadraticLossOverAffine {
    pub fn new(
        a: Array2<f64>,
        b: Array1<f64>,
        w: Array1<f64>,
        p: Array1<f64>,
    ) -> Result<QuadraticLossOverAffine> {
        QuadraticLossOverAffine::with_regularization(a, b, w, p, DEFAULT_REGULARIZATION)
    }

    /// # Errors
    ///
    /// - dimension mismatch if `b` does not match the rows of `a`, or `w`, `p`
    ///   do not match its columns
    /// - invalid parameter if a weight is not strictly positive or
    ///   `epsilon` is negative
    /// - solver failure if $`FF^\top + \epsilon I`$ cannot be factorized
    pub fn with_regularization(
        a: Array2<f64>,
        b: Array1<f64>,
        w: Array1<f64>,
        p: Array1<f64>,
        epsilon: f64,
    ) -> Result<QuadraticLossOverAffine> {
        check_dim("affine constraint rhs", a.nrows(), b.len())?;
        check_dim("loss weights", a.ncols(), w.len())?;
        check_dim("loss target", a.ncols(), p.len())?;
        if !w.iter().all(|&wi| wi > 0.) {
            return Err(Error::InvalidParameter("loss weights must be positive"));
        }
        if !(epsilon >= 0.) {
            return Err(Error::InvalidParameter("regularization must be non-negative"));
        }

        let w_inv_sqrt = w.mapv(|wi| 1. / wi.sqrt());
        let f = &a * &w_inv_sqrt;
        let factor = Cholesky::factorize_gram(&f, epsilon)?;
        debug!(
            "affine-constrained loss with {} constraints in dimension {}",
            a.nrows(),
            a.ncols()
        );
        Ok(QuadraticLossOverAffine { a, b, w, p, factor })
    }
}

impl Function for QuadraticLossOverAffine {
    type Elem = f64;

    fn capabilities(&self) -> Capabilities {
        Capabilities::new("QuadraticLossOverAffine")
            .with_conjugate_value()
            .with_conjugate_gradient()
            .in_category(Category::ConjugateQuadratic)
    }

    fn conjugate_value(&self, y: ArrayView1<'_, f64>) -> Result<f64> {
        self.conjugate_value_and_gradient(y).map(|(f, _)| f)
    }

    fn conjugate_value_and_gradient(&self, y: ArrayView1<'_, f64>) -> Result<(f64, Array1<f64>)> {
        check_dim("affine loss conjugate argument", self.w.len(), y.len())?;
        let sigma = &y / &self.w + &self.p;
        let h = self.a.dot(&sigma) - &self.b;
        let lambda = self.factor.solve(&h)?;
        let x = sigma - &(self.a.t().dot(&lambda) / &self.w);

        let r = &x - &self.p;
        let loss = 0.5 * (&self.w * &r).dot(&r);
        Ok((y.dot(&x) - loss, x))
    }
}
