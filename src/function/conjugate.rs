use ndarray::prelude::*;

use super::{Capabilities, Function};
use crate::error::Result;

/// The Fenchel conjugate $`h^*`$ of a borrowed convex function $`h`$
///
/// Value and conjugate value trade places, as do the two gradients, so
/// `Conjugate::new(&Conjugate::new(&h))` behaves like `h` again. Convexity
/// of `h` is assumed and not checked.
///
/// The proximal operator uses the Moreau decomposition in its unit-step form,
/// ```math
/// \mathrm{prox}_{h^*}(x, \gamma) = x - \mathrm{prox}_h(x, \gamma),
/// ```
/// with `γ` handed unchanged to `h`. This matches the exact identity
/// $`\mathrm{prox}_{\gamma h^*}(x) = x - \gamma\,\mathrm{prox}_{h/\gamma}(x/\gamma)`$
/// only for $`\gamma = 1`$.
#[derive(Debug)]
pub struct Conjugate<'a, F: ?Sized> {
    inner: &'a F,
}

impl<'a, F: ?Sized> Conjugate<'a, F> {
    pub fn new(inner: &'a F) -> Self {
        Conjugate { inner }
    }

    pub fn inner(&self) -> &'a F {
        self.inner
    }
}

impl<'a, F: ?Sized> Clone for Conjugate<'a, F> {
    fn clone(&self) -> Self {
        Conjugate { inner: self.inner }
    }
}

impl<'a, F: ?Sized> Copy for Conjugate<'a, F> {}

impl<'a, F> Function for Conjugate<'a, F>
where
    F: Function + ?Sized,
{
    type Elem = F::Elem;

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities().conjugated("Conjugate")
    }

    fn value(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Self::Elem> {
        self.inner.conjugate_value(x)
    }

    fn value_and_gradient(
        &self,
        x: ArrayView1<'_, Self::Elem>,
    ) -> Result<(Self::Elem, Array1<Self::Elem>)> {
        self.inner.conjugate_value_and_gradient(x)
    }

    fn conjugate_value(&self, y: ArrayView1<'_, Self::Elem>) -> Result<Self::Elem> {
        self.inner.value(y)
    }

    fn conjugate_value_and_gradient(
        &self,
        y: ArrayView1<'_, Self::Elem>,
    ) -> Result<(Self::Elem, Array1<Self::Elem>)> {
        self.inner.value_and_gradient(y)
    }

    fn prox(&self, x: ArrayView1<'_, Self::Elem>, gamma: Self::Elem) -> Result<Array1<Self::Elem>> {
        let p = self.inner.prox(x, gamma)?;
        Ok(&x - &p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{Category, IndBall2, Quadratic};
    use crate::{Error, Operation};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// $`\frac12\|x\|^2`$, its own conjugate, with $`\mathrm{prox}(x, \gamma) = x / (1 + \gamma)`$
    struct HalfSquaredNorm;

    impl Function for HalfSquaredNorm {
        type Elem = f64;

        fn capabilities(&self) -> Capabilities {
            Capabilities::new("HalfSquaredNorm")
                .with_value()
                .with_prox()
        }

        fn value(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
            Ok(0.5 * x.dot(&x))
        }

        fn conjugate_value(&self, y: ArrayView1<'_, f64>) -> Result<f64> {
            Ok(0.5 * y.dot(&y))
        }

        fn prox(&self, x: ArrayView1<'_, f64>, gamma: f64) -> Result<Array1<f64>> {
            Ok(&x / (1. + gamma))
        }
    }

    fn spd() -> Array2<f64> {
        array![[4., 1.], [1., 3.]]
    }

    #[test]
    fn swaps_value_and_conjugate() {
        let quad = Quadratic::with_linear(spd(), array![1., -1.]).unwrap();
        let conj = Conjugate::new(&quad);
        let y = array![0.5, 2.];

        assert_relative_eq!(
            conj.value(y.view()).unwrap(),
            quad.conjugate_value(y.view()).unwrap(),
            max_relative = 1e-12
        );
        let (f, g) = conj.value_and_gradient(y.view()).unwrap();
        let (fs, gs) = quad.conjugate_value_and_gradient(y.view()).unwrap();
        assert_relative_eq!(f, fs, max_relative = 1e-12);
        assert_abs_diff_eq!(g, gs, epsilon = 1e-12);

        let (f, g) = conj.conjugate_value_and_gradient(y.view()).unwrap();
        let (fq, gq) = quad.value_and_gradient(y.view()).unwrap();
        assert_eq!(f, fq);
        assert_eq!(g, gq);
        assert_eq!(conj.conjugate_value(y.view()).unwrap(), fq);
    }

    #[test]
    fn double_conjugate_is_the_original() {
        let quad = Quadratic::new(spd()).unwrap();
        let conj = Conjugate::new(&quad);
        let back = Conjugate::new(&conj);
        let x = array![1., 2.];
        assert_eq!(back.value(x.view()).unwrap(), quad.value(x.view()).unwrap());
        assert_eq!(
            back.capabilities().defines_value(),
            quad.capabilities().defines_value()
        );
    }

    #[test]
    fn capabilities_are_swapped() {
        let ball = IndBall2::new(1.).unwrap();
        let caps = Conjugate::new(&ball).capabilities();
        assert_eq!(caps.name(), "Conjugate");
        assert!(caps.defines_prox());
        assert!(!caps.defines_value());
        assert_eq!(caps.categories(), &[Category::Conjugate]);

        let quad = Quadratic::new(spd()).unwrap();
        let caps = Conjugate::new(&quad).capabilities();
        assert!(caps.defines_value() && caps.defines_gradient());
        assert!(caps.defines_conjugate_value() && caps.defines_conjugate_gradient());
        assert!(!caps.defines_prox());
    }

    #[test]
    fn undefined_operations_carry_through() {
        let quad = Quadratic::new(spd()).unwrap();
        let conj = Conjugate::new(&quad);
        assert_eq!(
            conj.prox(array![0., 0.].view(), 1.).unwrap_err(),
            Error::UndefinedOperation {
                name: "Quadratic",
                operation: Operation::Prox
            }
        );

        let ball = IndBall2::new(1.).unwrap();
        assert!(Conjugate::new(&ball).value(array![0., 0.].view()).is_err());
    }

    #[test]
    fn prox_of_ball_conjugate_is_moreau_remainder() {
        // the conjugate of the unit ball indicator is the 2-norm, whose prox
        // at unit step is block soft thresholding
        let ball = IndBall2::new(1.).unwrap();
        let norm = Conjugate::new(&ball);
        let p = norm.prox(array![3., 4.].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![2.4, 3.2], epsilon = 1e-12);

        let p = norm.prox(array![0.3, 0.4].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![0., 0.], epsilon = 1e-12);
    }

    #[test]
    fn prox_does_not_rescale_the_step() {
        let h = HalfSquaredNorm;
        let conj = Conjugate::new(&h);
        let x = array![3., -6.];

        // unit step agrees with the Moreau identity
        let p = conj.prox(x.view(), 1.).unwrap();
        assert_abs_diff_eq!(p, &x / 2., epsilon = 1e-12);

        // other steps give x - x / (1 + γ), not x / (1 + γ)
        let gamma = 0.5;
        let p = conj.prox(x.view(), gamma).unwrap();
        assert_abs_diff_eq!(p, &x * (gamma / (1. + gamma)), epsilon = 1e-12);
        assert!((p[0] - x[0] / (1. + gamma)).abs() > 1e-3);

        let (p, v) = conj.prox_with_value(x.view(), gamma).unwrap();
        assert_relative_eq!(v, 0.5 * p.dot(&p), max_relative = 1e-12);
    }
}
