//! Factorize-then-solve for symmetric positive definite systems
//!
//! Functions whose conjugate needs $`Q^{-1}y`$ keep a [`Cholesky`] factor
//! around and reuse it for every right-hand side. The factorization itself
//! is done by `faer`'s dense $`LL^\top`$ decomposition.

use faer::linalg::solvers::{Llt, Solve};
use faer::{Col, Mat, Side};
use log::debug;
use ndarray::prelude::*;
use ndarray::Data;

use crate::error::{check_dim, Error, Result};

/// A Cholesky factor $`Q = LL^\top`$ of a symmetric positive definite matrix
///
/// Only `f64` is supported, since the factorization is done by `faer`.
pub struct Cholesky {
    factor: Llt<f64>,
    dim: usize,
}

impl Cholesky {
    /// Factorizes `q`. Only the lower triangle is read.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `q` is not square and
    /// [`Error::SolverFailure`] if `q` is not numerically positive definite,
    /// that is if a squared pivot falls below
    /// $`n\,\epsilon\max_i |q_{ii}|`$.
    pub fn factorize<S>(q: &ArrayBase<S, Ix2>) -> Result<Cholesky>
    where
        S: Data<Elem = f64>,
    {
        let dim = q.nrows();
        check_dim("cholesky factorization", dim, q.ncols())?;
        let mat = Mat::<f64>::from_fn(dim, dim, |i, j| q[[i, j]]);
        let factor = mat
            .as_ref()
            .llt(Side::Lower)
            .map_err(|err| Error::SolverFailure(format!("cholesky factorization: {}", err)))?;

        // faer only rejects pivots that are not positive; roundoff pivots of a
        // singular matrix slip through, so compare against the diagonal scale
        let scale = q.diag().iter().fold(0., |m: f64, d| m.max(d.abs()));
        let tol = dim as f64 * f64::EPSILON * scale;
        let l = factor.L();
        if let Some(i) = (0..dim).find(|&i| l[(i, i)] * l[(i, i)] <= tol) {
            return Err(Error::SolverFailure(format!(
                "cholesky factorization: pivot {} is below {:e}",
                i, tol
            )));
        }
        debug!("factorized {}x{} positive definite matrix", dim, dim);
        Ok(Cholesky { factor, dim })
    }

    /// Factorizes $`FF^\top + \epsilon I`$ without forming $`F^\top`$ explicitly
    pub fn factorize_gram<S>(f: &ArrayBase<S, Ix2>, epsilon: f64) -> Result<Cholesky>
    where
        S: Data<Elem = f64>,
    {
        let mut gram = f.dot(&f.t());
        gram.diag_mut().mapv_inplace(|d| d + epsilon);
        Cholesky::factorize(&gram)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Solves $`Qx = b`$
    pub fn solve<S>(&self, b: &ArrayBase<S, Ix1>) -> Result<Array1<f64>>
    where
        S: Data<Elem = f64>,
    {
        check_dim("cholesky solve", self.dim, b.len())?;
        let mut rhs = Col::<f64>::from_fn(self.dim, |i| b[i]);
        self.factor.solve_in_place(&mut rhs);
        let x = Array1::from_shape_fn(self.dim, |i| rhs[i]);
        if x.iter().all(|v| v.is_finite()) {
            Ok(x)
        } else {
            Err(Error::SolverFailure(
                "cholesky solve produced non-finite entries".to_string(),
            ))
        }
    }
}

impl std::fmt::Debug for Cholesky {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cholesky").field("dim", &self.dim).finish()
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn solves_spd_system() {
        let Q = array![
            [7., 2., -2., -1.],
            [2., 3., 0., -1.],
            [-2., 0., 3., -1.],
            [-1., -1., -1., 1.]
        ];
        let chol = Cholesky::factorize(&Q).unwrap();
        let x = chol.solve(&array![-1., 1., 1., 1.]).unwrap();
        assert_abs_diff_eq!(x, array![3., 3., 7., 14.], epsilon = 1e-10);
        assert_abs_diff_eq!(Q.dot(&x), array![-1., 1., 1., 1.], epsilon = 1e-10);
    }

    #[test]
    fn indefinite_matrix_is_a_solver_failure() {
        let Q = array![[1., 2.], [2., 1.]];
        assert!(matches!(
            Cholesky::factorize(&Q),
            Err(Error::SolverFailure(_))
        ));
    }

    #[test]
    fn singular_matrix_is_rejected_at_any_scale() {
        for &s in &[1., 2., 3., 10.] {
            let Q = array![[s, s], [s, s]];
            assert!(matches!(
                Cholesky::factorize(&Q),
                Err(Error::SolverFailure(_))
            ));
        }
        let Q = array![[4., 2., 2.], [2., 5., 3.], [2., 3., 2.]];
        assert!(Cholesky::factorize(&Q).is_err());
    }

    #[test]
    fn gram_with_regularization() {
        let F = array![[1., 0., 1.], [0., 2., 0.]];
        let chol = Cholesky::factorize_gram(&F, 0.0).unwrap();
        assert_eq!(chol.dim(), 2);
        let x = chol.solve(&array![2., 4.]).unwrap();
        assert_abs_diff_eq!(x, array![1., 1.], epsilon = 1e-12);
        assert!(chol.solve(&array![1., 2., 3.]).is_err());
    }
}
