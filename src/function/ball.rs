use ndarray::prelude::*;
use ndarray::NdFloat;
use num_traits::Float;

use super::{Capabilities, Category, Function};
use crate::error::{check_dim, Error, Result};

/// Indicator of the Euclidean ball $`\{x : \|x - c\|_2 \leq \rho\}`$
///
/// Only the proximal operator (the projection onto the ball) is provided.
/// The projection does not depend on the step size, and the indicator is
/// zero at every projected point.
#[derive(Debug, Clone)]
pub struct IndBall2<A> {
    radius: A,
    center: Option<Array1<A>>,
}

fn check_radius<A: NdFloat>(radius: A) -> Result<()> {
    if radius >= A::zero() {
        Ok(())
    } else {
        Err(Error::InvalidParameter("ball radius must be non-negative"))
    }
}

impl<A: NdFloat> IndBall2<A> {
    /// Ball of radius `radius` centred at the origin
    pub fn new(radius: A) -> Result<IndBall2<A>> {
        check_radius(radius)?;
        Ok(IndBall2 {
            radius,
            center: None,
        })
    }

    /// Ball of radius `radius` centred at `center`
    pub fn with_center(radius: A, center: Array1<A>) -> Result<IndBall2<A>> {
        check_radius(radius)?;
        Ok(IndBall2 {
            radius,
            center: Some(center),
        })
    }

    pub fn radius(&self) -> A {
        self.radius
    }

    pub fn center(&self) -> Option<&Array1<A>> {
        self.center.as_ref()
    }
}

impl<A: NdFloat> Default for IndBall2<A> {
    fn default() -> Self {
        IndBall2 {
            radius: A::one(),
            center: None,
        }
    }
}

impl<A: NdFloat> Function for IndBall2<A> {
    type Elem = A;

    fn capabilities(&self) -> Capabilities {
        Capabilities::new("IndBall2")
            .with_prox()
            .in_category(Category::Indicator)
    }

    fn prox(&self, x: ArrayView1<'_, A>, _gamma: A) -> Result<Array1<A>> {
        let offset = match &self.center {
            Some(c) => {
                check_dim("ball center", c.len(), x.len())?;
                &x - c
            }
            None => x.to_owned(),
        };
        let dist = Float::sqrt(offset.dot(&offset));
        if dist <= self.radius {
            return Ok(x.to_owned());
        }
        let mut p = offset * (self.radius / dist);
        if let Some(c) = &self.center {
            p += c;
        }
        Ok(p)
    }

    fn prox_with_value(&self, x: ArrayView1<'_, A>, gamma: A) -> Result<(Array1<A>, A)> {
        Ok((self.prox(x, gamma)?, A::zero()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn inside_is_fixed() {
        let ball = IndBall2::new(2.).unwrap();
        let x = array![1., -1., 0.5];
        let (p, f) = ball.prox_with_value(x.view(), 0.3).unwrap();
        assert_eq!(p, x);
        assert_eq!(f, 0.);
    }

    #[test]
    fn outside_is_projected() {
        let ball = IndBall2::new(1.).unwrap();
        let p = ball.prox(array![3., 4.].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![0.6, 0.8], epsilon = 1e-12);
    }

    #[test]
    fn projection_around_a_center() {
        let c = array![1., 1.];
        let ball = IndBall2::with_center(2., c.clone()).unwrap();
        let x = array![1., 5.];
        let (p, f) = ball.prox_with_value(x.view(), 10.).unwrap();
        assert_abs_diff_eq!(p, array![1., 3.], epsilon = 1e-12);
        assert_eq!(f, 0.);

        let inside = array![2., 0.];
        assert_eq!(ball.prox(inside.view(), 1.).unwrap(), inside);

        let d = &ball.prox(array![-7., 13.].view(), 1.).unwrap() - &c;
        assert_abs_diff_eq!(d.dot(&d).sqrt(), 2., epsilon = 1e-12);
    }

    #[test]
    fn zero_radius_collapses_to_center() {
        let ball = IndBall2::with_center(0., array![1., 2.]).unwrap();
        let p = ball.prox(array![4., -2.].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![1., 2.], epsilon = 1e-12);
    }

    #[test]
    fn negative_radius_is_rejected() {
        assert_eq!(
            IndBall2::new(-1.).unwrap_err(),
            Error::InvalidParameter("ball radius must be non-negative")
        );
        assert!(IndBall2::with_center(-0.5, array![0.]).is_err());
    }

    #[test]
    fn only_prox_is_advertised() {
        let ball = IndBall2::<f64>::default();
        let caps = ball.capabilities();
        assert!(caps.defines_prox());
        assert!(!caps.defines_value());
        assert_eq!(caps.categories(), &[Category::Indicator]);
        assert!(ball.value(array![0., 0.].view()).is_err());
        assert!(IndBall2::with_center(1., array![0., 0.])
            .unwrap()
            .prox(array![1., 2., 3.].view(), 1.)
            .is_err());
    }
}
