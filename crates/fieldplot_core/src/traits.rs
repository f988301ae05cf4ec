use crate::vector::Vector2D;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;
use std::sync::Arc;

/// A trait for types that can be used as scalars by the integrators.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A continuous system `dx/dt = f(t, x)` driven by one of the steppers in
/// [`crate::solvers`].
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the right-hand side into `out`.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// A fixed-step integrator.
///
/// Implementations update `state` and `t` in place. A negative `dt` runs the
/// same update rule backward.
pub trait Steppable<T: Scalar> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}

/// A real function of one parameter, `t -> f(t)`.
///
/// Parametric curves hold two of these. Implementations must be pure: the
/// plotter re-evaluates them on every frame.
pub trait ScalarFunction {
    fn evaluate(&self, t: f64) -> f64;
}

/// A planar vector field, `(x, y) -> Vector2D`.
///
/// Combinators in [`crate::field`] wrap existing fields in new
/// implementations of this trait instead of mutating them.
pub trait Field2D {
    fn evaluate(&self, x: f64, y: f64) -> Vector2D;
}

impl<F: ScalarFunction + ?Sized> ScalarFunction for &F {
    fn evaluate(&self, t: f64) -> f64 {
        (**self).evaluate(t)
    }
}

impl<F: ScalarFunction + ?Sized> ScalarFunction for Box<F> {
    fn evaluate(&self, t: f64) -> f64 {
        (**self).evaluate(t)
    }
}

impl<F: ScalarFunction + ?Sized> ScalarFunction for Arc<F> {
    fn evaluate(&self, t: f64) -> f64 {
        (**self).evaluate(t)
    }
}

impl<F: Field2D + ?Sized> Field2D for &F {
    fn evaluate(&self, x: f64, y: f64) -> Vector2D {
        (**self).evaluate(x, y)
    }
}

impl<F: Field2D + ?Sized> Field2D for Box<F> {
    fn evaluate(&self, x: f64, y: f64) -> Vector2D {
        (**self).evaluate(x, y)
    }
}

impl<F: Field2D + ?Sized> Field2D for Arc<F> {
    fn evaluate(&self, x: f64, y: f64) -> Vector2D {
        (**self).evaluate(x, y)
    }
}
