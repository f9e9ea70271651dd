//! Forward-Backward Splitting for Composite Functions consisting of
//! smooth _f_ and non-smooth prox-friendly _g_
//!
//! A forward-backward step at $`x`$ with step size $`\gamma`$ is a gradient
//! step on _f_ followed by a proximal step on _g_,
//! ```math
//! T_\gamma(x) = \mathrm{prox}_{\gamma g}(x - \gamma\nabla f(x)).
//! ```
//! Its fixed points are the minimizers of $`f + g`$. The forward-backward
//! envelope $`\varphi_\gamma`$ is a real-valued surrogate of $`f + g`$ with
//! the same minimizers, which a solver can use for line searches and
//! stopping tests.
//!
//! [`FBProblem`] describes the terms, and [`FBCache`] evaluates the steps and
//! the envelope at a single point, reusing everything a change of step size
//! does not invalidate.

mod problem;
pub use problem::*;

mod cache;
pub use cache::*;
