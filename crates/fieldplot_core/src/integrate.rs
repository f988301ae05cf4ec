//! Fixed-step integrators that turn fields and differential equations into
//! polylines in plot coordinates.
//!
//! Nothing here is adaptive. Step sizes and iteration budgets are fixed by
//! the caller, and degenerate samples (NaN, infinities) are passed through
//! for the drawing layer to deal with.

use crate::field::multiply;
use crate::solvers::{ForwardEuler, SemiImplicitEuler};
use crate::traits::{DynamicalSystem, Field2D, Steppable};
use crate::vector::Vector2D;

/// Most steps any tracer takes per call. Larger requests are clamped.
pub const MAX_STEPS: usize = 100_000;

/// The direction field of `field`: every sample normalized to length 1.
///
/// Stepping this with forward Euler traces a streamline at uniform speed
/// regardless of the field's strength.
pub struct DirectionField<F> {
    pub field: F,
}

impl<F: Field2D> DynamicalSystem<f64> for DirectionField<F> {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let direction = self.field.evaluate(x[0], x[1]).unit_vector();
        out[0] = direction.x;
        out[1] = direction.y;
    }
}

/// Traces a field line from `seed` by taking `steps` forward Euler steps of
/// length `step_factor` along the normalized field.
///
/// The returned polyline starts at `seed` and has `steps + 1` points, with
/// `steps` clamped to [`MAX_STEPS`]. Once a step lands on a zero of the
/// field the remaining points are NaN.
pub fn trace_field_line<F: Field2D>(
    field: F,
    seed: Vector2D,
    step_factor: f64,
    steps: usize,
) -> Vec<Vector2D> {
    let steps = steps.min(MAX_STEPS);
    let system = DirectionField { field };
    let mut solver = ForwardEuler::new(2);
    let mut t = 0.0;
    let mut state = [seed.x, seed.y];

    let mut points = Vec::with_capacity(steps + 1);
    points.push(seed);
    for _ in 0..steps {
        solver.step(&system, &mut t, &mut state, step_factor);
        points.push(Vector2D::new(state[0], state[1]));
    }
    points
}

/// Traces the full streamline through `seed`: once along the field and once
/// along the negated field.
pub fn trace_bidirectional_field_line<F: Field2D>(
    field: F,
    seed: Vector2D,
    step_factor: f64,
    steps: usize,
) -> [Vec<Vector2D>; 2] {
    let forward = trace_field_line(&field, seed, step_factor, steps);
    let backward = trace_field_line(multiply(&field, -1.0), seed, step_factor, steps);
    [forward, backward]
}

/// `y'' = f(y, y')` written as the first-order system `[y, y']`.
pub struct SecondOrderSystem<F> {
    pub acceleration: F,
}

impl<F> DynamicalSystem<f64> for SecondOrderSystem<F>
where
    F: Fn(f64, f64) -> f64,
{
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        out[0] = x[1];
        out[1] = (self.acceleration)(x[0], x[1]);
    }
}

/// Step size and step count for [`trace_second_order`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondOrderConfig {
    pub dx: f64,
    pub steps: usize,
}

impl Default for SecondOrderConfig {
    fn default() -> Self {
        Self {
            dx: 0.05,
            steps: 1000,
        }
    }
}

/// The two halves of a trajectory through an initial condition, as `(x, y)`
/// points. Both start at `(0, y0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondOrderTrajectory {
    pub forward: Vec<Vector2D>,
    pub backward: Vec<Vector2D>,
}

/// Integrates `y'' = f(y, y')` from `y(0) = y0`, `y'(0) = y_prime0` with
/// semi-implicit Euler, once toward positive x and once toward negative x.
/// `config.steps` is clamped to [`MAX_STEPS`].
pub fn trace_second_order<F>(
    acceleration: F,
    y0: f64,
    y_prime0: f64,
    config: SecondOrderConfig,
) -> SecondOrderTrajectory
where
    F: Fn(f64, f64) -> f64,
{
    let system = SecondOrderSystem { acceleration };
    let steps = config.steps.min(MAX_STEPS);
    let walk = |dx: f64| {
        let mut solver = SemiImplicitEuler::new(2);
        let mut x = 0.0;
        let mut state = [y0, y_prime0];
        let mut points = Vec::with_capacity(steps + 1);
        points.push(Vector2D::new(x, state[0]));
        for _ in 0..steps {
            solver.step(&system, &mut x, &mut state, dx);
            points.push(Vector2D::new(x, state[0]));
        }
        points
    };

    SecondOrderTrajectory {
        forward: walk(config.dx),
        backward: walk(-config.dx),
    }
}
