//! Convex Functions with Optional Capabilities
//!
//! A term of a composite objective may be smooth, proximable, or only known
//! through its Fenchel conjugate. Every [`Function`] implements the subset
//! of
//! - value $`f(x)`$ and gradient $`\nabla f(x)`$,
//! - conjugate value $`f^*(y) = \sup_x \langle y, x\rangle - f(x)`$ and its gradient,
//! - proximal operator
//!   $`\mathrm{prox}_{\gamma f}(v) = \mathrm{arg}\!\min_u f(u) + \frac{1}{2\gamma}\|u - v\|_2^2`$
//!
//! that it can evaluate, and advertises that subset through its
//! [`Capabilities`]. Every other operation falls through to a default that
//! returns [`Error::UndefinedOperation`], so callers never need to know the
//! concrete type behind a `&dyn Function`.

mod ball;
pub use ball::*;
mod conjugate;
pub use conjugate::*;
mod quadratic;
pub use quadratic::*;
mod quadratic_affine;
pub use quadratic_affine::*;
mod zero;
pub use zero::*;

use ndarray::prelude::*;
use ndarray::NdFloat;

use crate::error::{Error, Operation, Result};

/// Super-categories a function may belong to.
///
/// These are tags for introspection and documentation; nothing in this
/// crate dispatches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Quadratic,
    ConjugateQuadratic,
    Indicator,
    Conjugate,
}

/// Which optional operations a [`Function`] implements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    name: &'static str,
    value: bool,
    gradient: bool,
    conjugate_value: bool,
    conjugate_gradient: bool,
    prox: bool,
    categories: Vec<Category>,
}

impl Capabilities {
    /// A descriptor with no operations defined
    #[must_use]
    pub fn new(name: &'static str) -> Capabilities {
        Capabilities {
            name,
            value: false,
            gradient: false,
            conjugate_value: false,
            conjugate_gradient: false,
            prox: false,
            categories: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self) -> Self {
        self.value = true;
        self
    }

    #[must_use]
    pub fn with_gradient(mut self) -> Self {
        self.gradient = true;
        self
    }

    #[must_use]
    pub fn with_conjugate_value(mut self) -> Self {
        self.conjugate_value = true;
        self
    }

    #[must_use]
    pub fn with_conjugate_gradient(mut self) -> Self {
        self.conjugate_gradient = true;
        self
    }

    #[must_use]
    pub fn with_prox(mut self) -> Self {
        self.prox = true;
        self
    }

    #[must_use]
    pub fn in_category(mut self, category: Category) -> Self {
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self
    }

    /// The descriptor of $`f^*`$ given the descriptor of $`f`$.
    ///
    /// Value and conjugate value trade places, as do the two gradients.
    /// Prox support is kept as is.
    #[must_use]
    pub fn conjugated(&self, name: &'static str) -> Capabilities {
        Capabilities {
            name,
            value: self.conjugate_value,
            gradient: self.conjugate_gradient,
            conjugate_value: self.value,
            conjugate_gradient: self.gradient,
            prox: self.prox,
            categories: vec![Category::Conjugate],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn defines_value(&self) -> bool {
        self.value
    }

    pub fn defines_gradient(&self) -> bool {
        self.gradient
    }

    pub fn defines_conjugate_value(&self) -> bool {
        self.conjugate_value
    }

    pub fn defines_conjugate_gradient(&self) -> bool {
        self.conjugate_gradient
    }

    pub fn defines_prox(&self) -> bool {
        self.prox
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Whether `operation` is implemented.
    pub fn supports(&self, operation: Operation) -> bool {
        match operation {
            Operation::Value => self.value,
            Operation::Gradient => self.gradient,
            Operation::ConjugateValue => self.conjugate_value,
            Operation::ConjugateGradient => self.conjugate_gradient,
            Operation::Prox => self.prox,
            Operation::FbeGradient => false,
        }
    }
}

/// A convex function of a vector
///
/// Only [`capabilities`](Function::capabilities) is required. The remaining
/// methods default to [`Error::UndefinedOperation`], except
/// [`prox_with_value`](Function::prox_with_value), which defaults to
/// [`prox`](Function::prox) followed by [`value`](Function::value).
pub trait Function {
    type Elem: NdFloat;

    fn capabilities(&self) -> Capabilities;

    /// $`f(x)`$
    fn value(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Self::Elem> {
        let _ = x;
        Err(undefined(self, Operation::Value))
    }

    /// $`(f(x), \nabla f(x))`$
    fn value_and_gradient(
        &self,
        x: ArrayView1<'_, Self::Elem>,
    ) -> Result<(Self::Elem, Array1<Self::Elem>)> {
        let _ = x;
        Err(undefined(self, Operation::Gradient))
    }

    /// $`f^*(y)`$
    fn conjugate_value(&self, y: ArrayView1<'_, Self::Elem>) -> Result<Self::Elem> {
        let _ = y;
        Err(undefined(self, Operation::ConjugateValue))
    }

    /// $`(f^*(y), \nabla f^*(y))`$
    fn conjugate_value_and_gradient(
        &self,
        y: ArrayView1<'_, Self::Elem>,
    ) -> Result<(Self::Elem, Array1<Self::Elem>)> {
        let _ = y;
        Err(undefined(self, Operation::ConjugateGradient))
    }

    /// $`\mathrm{prox}_{\gamma f}(x)`$ for $`\gamma > 0`$
    fn prox(&self, x: ArrayView1<'_, Self::Elem>, gamma: Self::Elem) -> Result<Array1<Self::Elem>> {
        let _ = (x, gamma);
        Err(undefined(self, Operation::Prox))
    }

    /// $`(p, f(p))`$ where $`p = \mathrm{prox}_{\gamma f}(x)`$
    fn prox_with_value(
        &self,
        x: ArrayView1<'_, Self::Elem>,
        gamma: Self::Elem,
    ) -> Result<(Array1<Self::Elem>, Self::Elem)> {
        let p = self.prox(x, gamma)?;
        let fp = self.value(p.view())?;
        Ok((p, fp))
    }
}

fn undefined<F: Function + ?Sized>(f: &F, operation: Operation) -> Error {
    Error::undefined(f.capabilities().name(), operation)
}

impl<'a, F> Function for &'a F
where
    F: Function + ?Sized,
{
    type Elem = F::Elem;

    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn value(&self, x: ArrayView1<'_, Self::Elem>) -> Result<Self::Elem> {
        (**self).value(x)
    }

    fn value_and_gradient(
        &self,
        x: ArrayView1<'_, Self::Elem>,
    ) -> Result<(Self::Elem, Array1<Self::Elem>)> {
        (**self).value_and_gradient(x)
    }

    fn conjugate_value(&self, y: ArrayView1<'_, Self::Elem>) -> Result<Self::Elem> {
        (**self).conjugate_value(y)
    }

    fn conjugate_value_and_gradient(
        &self,
        y: ArrayView1<'_, Self::Elem>,
    ) -> Result<(Self::Elem, Array1<Self::Elem>)> {
        (**self).conjugate_value_and_gradient(y)
    }

    fn prox(&self, x: ArrayView1<'_, Self::Elem>, gamma: Self::Elem) -> Result<Array1<Self::Elem>> {
        (**self).prox(x, gamma)
    }

    fn prox_with_value(
        &self,
        x: ArrayView1<'_, Self::Elem>,
        gamma: Self::Elem,
    ) -> Result<(Array1<Self::Elem>, Self::Elem)> {
        (**self).prox_with_value(x, gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl Function for Nothing {
        type Elem = f64;

        fn capabilities(&self) -> Capabilities {
            Capabilities::new("Nothing")
        }
    }

    #[test]
    fn defaults_are_undefined() {
        let f = Nothing;
        let x = array![1., 2.];
        let expect = |op| Err::<(), _>(Error::undefined("Nothing", op));

        assert_eq!(f.value(x.view()).map(|_| ()), expect(Operation::Value));
        assert_eq!(
            f.value_and_gradient(x.view()).map(|_| ()),
            expect(Operation::Gradient)
        );
        assert_eq!(
            f.conjugate_value(x.view()).map(|_| ()),
            expect(Operation::ConjugateValue)
        );
        assert_eq!(
            f.conjugate_value_and_gradient(x.view()).map(|_| ()),
            expect(Operation::ConjugateGradient)
        );
        assert_eq!(f.prox(x.view(), 1.).map(|_| ()), expect(Operation::Prox));
        assert_eq!(
            f.prox_with_value(x.view(), 1.).map(|_| ()),
            expect(Operation::Prox)
        );
    }

    #[test]
    fn capabilities_builder_and_swap() {
        let caps = Capabilities::new("Thing")
            .with_value()
            .with_gradient()
            .with_prox()
            .in_category(Category::Quadratic)
            .in_category(Category::Quadratic);
        assert!(caps.supports(Operation::Value));
        assert!(caps.supports(Operation::Gradient));
        assert!(!caps.supports(Operation::ConjugateValue));
        assert!(!caps.supports(Operation::FbeGradient));
        assert_eq!(caps.categories(), &[Category::Quadratic]);

        let conj = caps.conjugated("Conjugate");
        assert_eq!(conj.name(), "Conjugate");
        assert!(!conj.defines_value());
        assert!(!conj.defines_gradient());
        assert!(conj.defines_conjugate_value());
        assert!(conj.defines_conjugate_gradient());
        assert!(conj.defines_prox());
        assert_eq!(conj.conjugated("Twice").defines_value(), caps.defines_value());
    }

    #[test]
    fn trait_objects_dispatch() {
        let f: &dyn Function<Elem = f64> = &Nothing;
        assert_eq!(f.capabilities().name(), "Nothing");
        assert!(f.value(array![0.].view()).is_err());
    }
}
