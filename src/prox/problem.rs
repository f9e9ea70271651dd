use ndarray::prelude::*;
use ndarray::NdFloat;

use crate::function::Function;
use crate::linop::LinearOperator;

/// A borrowed plant term $`f(Lx + d)`$
///
/// A missing operator means $`L = I`$ and a missing offset means $`d = 0`$.
pub struct Plant<'a, A> {
    pub function: &'a dyn Function<Elem = A>,
    pub operator: Option<&'a dyn LinearOperator<Elem = A>>,
    pub offset: Option<ArrayView1<'a, A>>,
}

impl<'a, A> Clone for Plant<'a, A> {
    fn clone(&self) -> Self {
        Plant {
            function: self.function,
            operator: self.operator,
            offset: self.offset.clone(),
        }
    }
}

/// The composite objective
/// ```math
/// F(x) = f_1(L_1 x + d_1) + f_2(L_2 x + d_2) + \langle l, x\rangle + g(x)
/// ```
///
/// Every term is borrowed; the problem owns nothing and computes nothing.
/// Only `g` is required, and it must provide a proximal operator for the
/// envelope to be evaluated. An operator or offset given without its
/// function is ignored.
///
/// Shapes are not checked here. A problem whose terms disagree in dimension
/// is accepted, and the mismatch is reported by the
/// [`FBCache`](super::FBCache) the first time the offending term is used.
pub struct FBProblem<'a, A> {
    f1: Option<Plant<'a, A>>,
    f2: Option<Plant<'a, A>>,
    lin: Option<ArrayView1<'a, A>>,
    g: &'a dyn Function<Elem = A>,
}

impl<'a, A> Clone for FBProblem<'a, A> {
    fn clone(&self) -> Self {
        FBProblem {
            f1: self.f1.clone(),
            f2: self.f2.clone(),
            lin: self.lin.clone(),
            g: self.g,
        }
    }
}

fn plant<'a, A>(
    function: Option<&'a dyn Function<Elem = A>>,
    operator: Option<&'a dyn LinearOperator<Elem = A>>,
    offset: Option<ArrayView1<'a, A>>,
) -> Option<Plant<'a, A>> {
    function.map(|function| Plant {
        function,
        operator,
        offset,
    })
}

impl<'a, A: NdFloat> FBProblem<'a, A> {
    /// Problem with two plant terms and a linear term
    #[allow(non_snake_case, clippy::too_many_arguments)]
    pub fn new(
        f1: Option<&'a dyn Function<Elem = A>>,
        L1: Option<&'a dyn LinearOperator<Elem = A>>,
        d1: Option<ArrayView1<'a, A>>,
        f2: Option<&'a dyn Function<Elem = A>>,
        L2: Option<&'a dyn LinearOperator<Elem = A>>,
        d2: Option<ArrayView1<'a, A>>,
        lin: Option<ArrayView1<'a, A>>,
        g: &'a dyn Function<Elem = A>,
    ) -> FBProblem<'a, A> {
        FBProblem {
            f1: plant(f1, L1, d1),
            f2: plant(f2, L2, d2),
            lin,
            g,
        }
    }

    /// $`f(Lx + d) + g(x)`$
    #[allow(non_snake_case)]
    pub fn with_plant(
        f: &'a dyn Function<Elem = A>,
        L: Option<&'a dyn LinearOperator<Elem = A>>,
        d: Option<ArrayView1<'a, A>>,
        g: &'a dyn Function<Elem = A>,
    ) -> FBProblem<'a, A> {
        FBProblem::new(Some(f), L, d, None, None, None, None, g)
    }

    /// $`f(x) + g(x)`$
    pub fn composite(
        f: &'a dyn Function<Elem = A>,
        g: &'a dyn Function<Elem = A>,
    ) -> FBProblem<'a, A> {
        FBProblem::with_plant(f, None, None, g)
    }

    /// Starts a problem with regularizer `g` and no other term
    pub fn builder(g: &'a dyn Function<Elem = A>) -> FBProblemBuilder<'a, A> {
        FBProblemBuilder {
            problem: FBProblem {
                f1: None,
                f2: None,
                lin: None,
                g,
            },
        }
    }

    pub fn f1(&self) -> Option<&'a dyn Function<Elem = A>> {
        self.f1.as_ref().map(|p| p.function)
    }

    #[allow(non_snake_case)]
    pub fn L1(&self) -> Option<&'a dyn LinearOperator<Elem = A>> {
        self.f1.as_ref().and_then(|p| p.operator)
    }

    pub fn d1(&self) -> Option<ArrayView1<'a, A>> {
        self.f1.as_ref().and_then(|p| p.offset.clone())
    }

    pub fn f2(&self) -> Option<&'a dyn Function<Elem = A>> {
        self.f2.as_ref().map(|p| p.function)
    }

    #[allow(non_snake_case)]
    pub fn L2(&self) -> Option<&'a dyn LinearOperator<Elem = A>> {
        self.f2.as_ref().and_then(|p| p.operator)
    }

    pub fn d2(&self) -> Option<ArrayView1<'a, A>> {
        self.f2.as_ref().and_then(|p| p.offset.clone())
    }

    pub fn lin(&self) -> Option<ArrayView1<'a, A>> {
        self.lin.clone()
    }

    pub fn g(&self) -> &'a dyn Function<Elem = A> {
        self.g
    }

    pub(crate) fn plant1(&self) -> Option<&Plant<'a, A>> {
        self.f1.as_ref()
    }

    pub(crate) fn plant2(&self) -> Option<&Plant<'a, A>> {
        self.f2.as_ref()
    }
}

/// Assembles an [`FBProblem`] one term at a time
pub struct FBProblemBuilder<'a, A> {
    problem: FBProblem<'a, A>,
}

impl<'a, A: NdFloat> FBProblemBuilder<'a, A> {
    #[allow(non_snake_case)]
    pub fn f1(
        mut self,
        f: &'a dyn Function<Elem = A>,
        L: Option<&'a dyn LinearOperator<Elem = A>>,
        d: Option<ArrayView1<'a, A>>,
    ) -> Self {
        self.problem.f1 = plant(Some(f), L, d);
        self
    }

    #[allow(non_snake_case)]
    pub fn f2(
        mut self,
        f: &'a dyn Function<Elem = A>,
        L: Option<&'a dyn LinearOperator<Elem = A>>,
        d: Option<ArrayView1<'a, A>>,
    ) -> Self {
        self.problem.f2 = plant(Some(f), L, d);
        self
    }

    pub fn lin(mut self, lin: ArrayView1<'a, A>) -> Self {
        self.problem.lin = Some(lin);
        self
    }

    pub fn build(self) -> FBProblem<'a, A> {
        self.problem
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{IndBall2, Quadratic, Zero};
    use crate::linop::MatrixOperator;

    #[test]
    fn operator_without_function_is_dropped() {
        let g = Zero::<f64>::new();
        let L = MatrixOperator::new(Array2::<f64>::eye(2));
        let d = array![1., 1.];
        let problem = FBProblem::new(None, Some(&L), Some(d.view()), None, None, None, None, &g);
        assert!(problem.f1().is_none());
        assert!(problem.L1().is_none());
        assert!(problem.d1().is_none());
    }

    #[test]
    fn construction_shapes() {
        let f = Quadratic::new(Array2::eye(3)).unwrap();
        let g = IndBall2::new(1.).unwrap();
        let L = MatrixOperator::new(array![[1., 0., 0.], [0., 1., 1.]]);
        let d = array![0.5, -0.5];

        let bare = FBProblem::composite(&f, &g);
        assert!(bare.f1().is_some() && bare.L1().is_none() && bare.f2().is_none());
        assert_eq!(bare.g().capabilities().name(), "IndBall2");

        let plant = FBProblem::with_plant(&f, Some(&L), Some(d.view()), &g);
        assert_eq!(plant.L1().map(|L| L.dimension_out()), Some(2));
        assert_eq!(plant.d1(), Some(d.view()));
        assert!(plant.lin().is_none());
    }

    #[test]
    fn mismatched_terms_are_accepted() {
        // checked by the cache, not here
        let f = Quadratic::new(Array2::eye(3)).unwrap();
        let g = Zero::<f64>::new();
        let lin = array![1., 2.];
        let problem = FBProblem::builder(&g)
            .f1(&f, None, None)
            .f2(&f, None, None)
            .lin(lin.view())
            .build();
        assert!(problem.f2().is_some());
        assert_eq!(problem.lin().map(|l| l.len()), Some(2));
    }
}
