use log::{debug, trace, warn};
use ndarray::prelude::*;
use ndarray::NdFloat;

use super::problem::{FBProblem, Plant};
use crate::error::{check_dim, Error, Operation, Result};

/// The stages of an [`FBCache`], in the order they depend on each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// $`f(x)`$, independent of the step size
    Objective,
    /// $`\nabla f(x)`$ and $`y = x - \gamma\nabla f(x)`$
    ForwardStep,
    /// $`z = \mathrm{prox}_{\gamma g}(y)`$, $`g(z)`$ and the residual $`x - z`$
    ForwardBackwardStep,
    /// $`\varphi_\gamma(x)`$
    Envelope,
    /// $`\nabla\varphi_\gamma(x)`$, not available yet
    EnvelopeGradient,
}

fn check_gamma<A: NdFloat>(gamma: A) -> Result<()> {
    if gamma > A::zero() {
        Ok(())
    } else {
        Err(Error::InvalidParameter("step size must be positive"))
    }
}

fn logged<T>(stage: Stage, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        warn!("{:?} stage failed: {}", stage, err);
    }
    result
}

/// Length of $`Lx + d`$ as declared by the plant, before anything is applied
fn residual_len<A: NdFloat>(plant: Option<&Plant<'_, A>>, x_len: usize) -> usize {
    match plant {
        Some(Plant {
            operator: Some(op), ..
        }) => op.dimension_out(),
        Some(Plant {
            offset: Some(d), ..
        }) => d.len(),
        _ => x_len,
    }
}

/// Writes $`Lx + d`$ into `res`
fn plant_residual<A: NdFloat>(
    plant: &Plant<'_, A>,
    x: ArrayView1<'_, A>,
    res: &mut Array1<A>,
) -> Result<()> {
    match plant.operator {
        Some(op) => {
            let lx = op.apply(x)?;
            check_dim("plant operator output", res.len(), lx.len())?;
            res.assign(&lx);
        }
        None => {
            check_dim("plant residual", res.len(), x.len())?;
            res.assign(&x);
        }
    }
    if let Some(d) = &plant.offset {
        check_dim("plant offset", res.len(), d.len())?;
        *res += d;
    }
    Ok(())
}

/// Adds $`L^* v`$ to `out`
fn add_pulled_back<A: NdFloat>(
    plant: &Plant<'_, A>,
    v: ArrayView1<'_, A>,
    out: &mut Array1<A>,
) -> Result<()> {
    match plant.operator {
        Some(op) => {
            let back = op.apply_adjoint(v)?;
            check_dim("plant operator adjoint output", out.len(), back.len())?;
            *out += &back;
        }
        None => {
            check_dim("plant gradient", out.len(), v.len())?;
            *out += &v;
        }
    }
    Ok(())
}

/// Incremental evaluation of the forward-backward envelope at a fixed point
///
/// For the problem $`F = f + g`$ with smooth part
/// $`f(x) = f_1(L_1x + d_1) + f_2(L_2x + d_2) + \langle l, x\rangle`$,
/// the cache computes
/// ```math
/// y = x - \gamma\nabla f(x), \qquad
/// z = \mathrm{prox}_{\gamma g}(y), \qquad
/// \varphi_\gamma(x) = f(x) + g(z) - \langle x - z, \nabla f(x)\rangle
///     + \frac{1}{2\gamma}\|x - z\|_2^2
/// ```
/// one [`Stage`] at a time, and only recomputes what a new step size
/// invalidates. The objective and the smooth gradient do not depend on
/// $`\gamma`$ and are computed at most once. The forward point, the proximal
/// point and the envelope each remember the $`\gamma`$ they were computed
/// at, compared by exact equality.
///
/// The point and the problem are borrowed for the lifetime of the cache; a
/// new point needs a new cache. Shapes are checked when a term is first
/// used, and a stage that fails stays stale so that the next request retries
/// it.
///
/// Parameters
/// ----------
/// `problem`: the terms of $`F`$, `g` must provide a proximal operator
/// `x`: the point of evaluation
/// `gamma`: initial step size, reported by [`gamma`](FBCache::gamma) until a
/// forward step is taken
pub struct FBCache<'a, A> {
    problem: &'a FBProblem<'a, A>,
    x: ArrayView1<'a, A>,
    gamma: A,

    res1: Array1<A>,
    res2: Array1<A>,
    gradf1: Array1<A>,
    gradf2: Array1<A>,
    gradf: Array1<A>,
    y: Array1<A>,
    z: Array1<A>,
    fpr: Array1<A>,

    f1x: A,
    f2x: A,
    linx: A,
    fx: A,
    gz: A,
    fpr_sq: A,
    fbe: A,

    eval_f: bool,
    forward: Option<A>,
    prox: Option<A>,
    eval_fbe: Option<A>,
}

impl<'a, A: NdFloat> FBCache<'a, A> {
    /// # Errors
    ///
    /// Fails with an invalid parameter if `gamma` is not positive. Term
    /// shapes are only checked by the stages.
    pub fn new(problem: &'a FBProblem<'a, A>, x: ArrayView1<'a, A>, gamma: A) -> Result<Self> {
        check_gamma(gamma)?;
        let n = x.len();
        let m1 = residual_len(problem.plant1(), n);
        let m2 = residual_len(problem.plant2(), n);
        debug!(
            "envelope cache for a point of dimension {} (residuals {}, {}), gamma = {}",
            n, m1, m2, gamma
        );
        Ok(FBCache {
            problem,
            x,
            gamma,
            res1: Array1::zeros(m1),
            res2: Array1::zeros(m2),
            gradf1: Array1::zeros(m1),
            gradf2: Array1::zeros(m2),
            gradf: Array1::zeros(n),
            y: Array1::zeros(n),
            z: Array1::zeros(n),
            fpr: Array1::zeros(n),
            f1x: A::zero(),
            f2x: A::zero(),
            linx: A::zero(),
            fx: A::zero(),
            gz: A::zero(),
            fpr_sq: A::zero(),
            fbe: A::zero(),
            eval_f: false,
            forward: None,
            prox: None,
            eval_fbe: None,
        })
    }

    pub fn problem(&self) -> &'a FBProblem<'a, A> {
        self.problem
    }

    pub fn point(&self) -> ArrayView1<'a, A> {
        self.x.clone()
    }

    /// Step size of the most recent forward step
    pub fn gamma(&self) -> A {
        self.gamma
    }

    /// Whether `stage` holds a result for `gamma`.
    ///
    /// `gamma` is ignored for [`Stage::Objective`].
    /// [`Stage::EnvelopeGradient`] is never fresh.
    pub fn is_fresh(&self, stage: Stage, gamma: A) -> bool {
        match stage {
            Stage::Objective => self.eval_f,
            Stage::ForwardStep => self.forward == Some(gamma),
            Stage::ForwardBackwardStep => self.prox == Some(gamma),
            Stage::Envelope => self.eval_fbe == Some(gamma),
            Stage::EnvelopeGradient => false,
        }
    }

    /// Computes $`f(x)`$ and $`\nabla f_1(L_1x + d_1)`$ unless already done.
    pub fn update_eval_f(&mut self) -> Result<()> {
        if self.eval_f {
            trace!("objective: cached");
            return Ok(());
        }
        trace!("objective: evaluating");
        logged(Stage::Objective, self.eval_f_uncached())?;
        self.eval_f = true;
        Ok(())
    }

    fn eval_f_uncached(&mut self) -> Result<()> {
        let problem = self.problem;
        let mut fx = A::zero();

        if let Some(p1) = problem.plant1() {
            plant_residual(p1, self.x.view(), &mut self.res1)?;
            let (f1x, gradf1) = p1.function.value_and_gradient(self.res1.view())?;
            check_dim("first plant gradient", self.res1.len(), gradf1.len())?;
            self.gradf1.assign(&gradf1);
            self.f1x = f1x;
            fx += f1x;
        }

        if let Some(p2) = problem.plant2() {
            plant_residual(p2, self.x.view(), &mut self.res2)?;
            self.f2x = p2.function.value(self.res2.view())?;
            fx += self.f2x;
        }

        if let Some(lin) = problem.lin() {
            check_dim("linear term", self.x.len(), lin.len())?;
            self.linx = lin.dot(&self.x);
            fx += self.linx;
        }

        self.fx = fx;
        Ok(())
    }

    /// Computes $`y = x - \gamma\nabla f(x)`$.
    ///
    /// The smooth gradient is assembled on the first call only; later calls
    /// with a different `gamma` just move $`y`$ along it.
    pub fn update_forward_step(&mut self, gamma: A) -> Result<()> {
        check_gamma(gamma)?;
        if self.forward == Some(gamma) {
            trace!("forward step: cached at gamma = {}", gamma);
            return Ok(());
        }
        self.update_eval_f()?;
        if self.forward.is_none() {
            trace!("forward step: assembling gradient");
            logged(Stage::ForwardStep, self.assemble_gradient())?;
        }
        trace!("forward step: gamma = {}", gamma);
        self.y.assign(&self.x);
        self.y.scaled_add(-gamma, &self.gradf);
        self.gamma = gamma;
        self.forward = Some(gamma);
        Ok(())
    }

    fn assemble_gradient(&mut self) -> Result<()> {
        let problem = self.problem;
        self.gradf.fill(A::zero());

        if let Some(p1) = problem.plant1() {
            add_pulled_back(p1, self.gradf1.view(), &mut self.gradf)?;
        }

        if let Some(p2) = problem.plant2() {
            let (_, gradf2) = p2.function.value_and_gradient(self.res2.view())?;
            check_dim("second plant gradient", self.res2.len(), gradf2.len())?;
            self.gradf2.assign(&gradf2);
            add_pulled_back(p2, self.gradf2.view(), &mut self.gradf)?;
        }

        if let Some(lin) = problem.lin() {
            self.gradf += &lin;
        }
        Ok(())
    }

    /// Computes $`z = \mathrm{prox}_{\gamma g}(y)`$, $`g(z)`$ and the
    /// fixed-point residual $`x - z`$.
    pub fn update_forward_backward_step(&mut self, gamma: A) -> Result<()> {
        self.update_forward_step(gamma)?;
        if self.prox == Some(gamma) {
            trace!("proximal step: cached at gamma = {}", gamma);
        } else {
            trace!("proximal step: gamma = {}", gamma);
            let (z, gz) = logged(
                Stage::ForwardBackwardStep,
                self.problem.g().prox_with_value(self.y.view(), gamma),
            )?;
            logged(
                Stage::ForwardBackwardStep,
                check_dim("proximal point", self.x.len(), z.len()),
            )?;
            self.z.assign(&z);
            self.gz = gz;
            self.prox = Some(gamma);
        }
        self.fpr.assign(&self.x);
        self.fpr -= &self.z;
        self.fpr_sq = self.fpr.dot(&self.fpr);
        Ok(())
    }

    /// Computes the envelope value $`\varphi_\gamma(x)`$.
    pub fn update_eval_fbe(&mut self, gamma: A) -> Result<()> {
        check_gamma(gamma)?;
        if self.eval_fbe == Some(gamma) {
            trace!("envelope: cached at gamma = {}", gamma);
            return Ok(());
        }
        self.update_forward_backward_step(gamma)?;
        trace!("envelope: gamma = {}", gamma);
        self.fbe =
            self.fx + self.gz - self.fpr.dot(&self.gradf) + self.fpr_sq / (gamma + gamma);
        self.eval_fbe = Some(gamma);
        Ok(())
    }

    /// Brings the proximal step up to date for `gamma`, then fails: the
    /// envelope gradient is not available.
    pub fn update_grad_fbe(&mut self, gamma: A) -> Result<()> {
        self.grad_fbe(gamma).map(drop)
    }

    /// $`f(x)`$
    pub fn objective(&mut self) -> Result<A> {
        self.update_eval_f()?;
        Ok(self.fx)
    }

    /// $`f_1(L_1x + d_1)`$, zero without a first plant term
    pub fn f1_value(&mut self) -> Result<A> {
        self.update_eval_f()?;
        Ok(self.f1x)
    }

    /// $`f_2(L_2x + d_2)`$, zero without a second plant term
    pub fn f2_value(&mut self) -> Result<A> {
        self.update_eval_f()?;
        Ok(self.f2x)
    }

    /// $`\langle l, x\rangle`$, zero without a linear term
    pub fn linear_value(&mut self) -> Result<A> {
        self.update_eval_f()?;
        Ok(self.linx)
    }

    /// $`\nabla f(x)`$, assembled at the current step size if not yet built
    pub fn gradient(&mut self) -> Result<ArrayView1<'_, A>> {
        if self.forward.is_none() {
            self.update_forward_step(self.gamma)?;
        }
        Ok(self.gradf.view())
    }

    /// $`y = x - \gamma\nabla f(x)`$
    pub fn forward_point(&mut self, gamma: A) -> Result<ArrayView1<'_, A>> {
        self.update_forward_step(gamma)?;
        Ok(self.y.view())
    }

    /// $`z = \mathrm{prox}_{\gamma g}(x - \gamma\nabla f(x))`$
    pub fn forward_backward_point(&mut self, gamma: A) -> Result<ArrayView1<'_, A>> {
        self.update_forward_backward_step(gamma)?;
        Ok(self.z.view())
    }

    /// $`x - z`$
    pub fn fixed_point_residual(&mut self, gamma: A) -> Result<ArrayView1<'_, A>> {
        self.update_forward_backward_step(gamma)?;
        Ok(self.fpr.view())
    }

    /// $`\|x - z\|_2^2`$
    pub fn fpr_squared_norm(&mut self, gamma: A) -> Result<A> {
        self.update_forward_backward_step(gamma)?;
        Ok(self.fpr_sq)
    }

    /// $`g(z)`$
    pub fn g_at_prox(&mut self, gamma: A) -> Result<A> {
        self.update_forward_backward_step(gamma)?;
        Ok(self.gz)
    }

    /// $`\varphi_\gamma(x)`$
    pub fn fbe(&mut self, gamma: A) -> Result<A> {
        self.update_eval_fbe(gamma)?;
        Ok(self.fbe)
    }

    /// $`\nabla\varphi_\gamma(x)`$, always an
    /// [`Error::UndefinedOperation`] for now
    pub fn grad_fbe(&mut self, gamma: A) -> Result<Array1<A>> {
        self.update_forward_backward_step(gamma)?;
        Err(Error::undefined("FBCache", Operation::FbeGradient))
    }
}


#[allow(non_snake_case)]
#[cfg(all(rustc_nightly, test))]
mod bench {
    use super::*;
    use crate::function::{IndBall2, Quadratic};
    use test::Bencher;

    #[bench]
    fn envelope_at_two_step_sizes(b: &mut Bencher) {
        let n = 64;
        let Q = Array2::<f64>::eye(n) * 2.;
        let f = Quadratic::new(Q).unwrap();
        let g = IndBall2::new(1.).unwrap();
        let problem = FBProblem::composite(&f, &g);
        let x = Array1::<f64>::ones(n);
        b.iter(|| {
            let mut cache = FBCache::new(&problem, x.view(), 0.1).unwrap();
            cache.fbe(0.1).unwrap() + cache.fbe(0.05).unwrap()
        });
    }
}
