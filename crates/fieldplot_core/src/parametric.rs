use crate::traits::ScalarFunction;
use crate::vector::Vector2D;
use std::fmt;
use std::sync::Arc;

pub type SharedScalar = Arc<dyn ScalarFunction>;

/// Upper bound on interior samples taken from one curve per frame.
pub const MAX_SAMPLES: usize = 1_000_000;

/// Adapts a closure into a [`ScalarFunction`].
#[derive(Clone, Copy)]
pub struct FnScalar<F>(pub F);

impl<F> ScalarFunction for FnScalar<F>
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, t: f64) -> f64 {
        (self.0)(t)
    }
}

/// A planar curve given by `x(t)` and `y(t)`.
#[derive(Clone)]
pub struct ParametricFunction {
    pub x: SharedScalar,
    pub y: SharedScalar,
}

impl ParametricFunction {
    pub fn new(x: impl ScalarFunction + 'static, y: impl ScalarFunction + 'static) -> Self {
        Self {
            x: Arc::new(x),
            y: Arc::new(y),
        }
    }

    pub fn from_fns(
        x: impl Fn(f64) -> f64 + 'static,
        y: impl Fn(f64) -> f64 + 'static,
    ) -> Self {
        Self::new(FnScalar(x), FnScalar(y))
    }

    pub fn point(&self, t: f64) -> Vector2D {
        Vector2D::new(self.x.evaluate(t), self.y.evaluate(t))
    }

    /// True when both coordinate functions are the same shared handles.
    pub fn same_functions(&self, other: &ParametricFunction) -> bool {
        Arc::ptr_eq(&self.x, &other.x) && Arc::ptr_eq(&self.y, &other.y)
    }
}

impl fmt::Debug for ParametricFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParametricFunction").finish_non_exhaustive()
    }
}

/// How one parametric curve is sampled: from `start` to `end` in steps of
/// `step`.
#[derive(Debug, Clone)]
pub struct ParametricFunctionParams {
    pub p: ParametricFunction,
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl ParametricFunctionParams {
    pub fn new(p: ParametricFunction, start: f64, end: f64, step: f64) -> Self {
        Self {
            p,
            start,
            end,
            step,
        }
    }

    /// Inverted or empty ranges and a zero step draw nothing.
    pub fn is_drawable(&self) -> bool {
        !(self.start >= self.end || self.step == 0.0)
    }

    /// Samples the curve in plot coordinates.
    ///
    /// Returns `None` when the range is not drawable. Otherwise the first
    /// point is `p(start)`, followed by `p(start + k * step)` while
    /// `t <= end`, and the last point is always exactly `p(end)` even when
    /// `step` does not divide the range. Sampling stops early once `step`
    /// is too small to move `t`, or after [`MAX_SAMPLES`] points.
    pub fn sample(&self) -> Option<Vec<Vector2D>> {
        if !self.is_drawable() {
            return None;
        }

        let mut points = vec![self.p.point(self.start)];
        // A negative step never reaches `end`; it would only walk away from it.
        if self.step > 0.0 {
            let mut t = self.start + self.step;
            while t <= self.end && points.len() < MAX_SAMPLES {
                points.push(self.p.point(t));
                let next = t + self.step;
                // Below the precision of `t` the step no longer advances it.
                if next <= t {
                    break;
                }
                t = next;
            }
        }
        points.push(self.p.point(self.end));
        Some(points)
    }

    /// True when `other` samples the same functions over the same range.
    pub fn same_as(&self, other: &ParametricFunctionParams) -> bool {
        self.p.same_functions(&other.p)
            && self.start == other.start
            && self.end == other.end
            && self.step == other.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn parabola() -> ParametricFunction {
        ParametricFunction::from_fns(|t| t, |t| t * t)
    }

    #[test]
    fn inverted_range_is_not_sampled() {
        let params = ParametricFunctionParams::new(parabola(), 5.0, 1.0, 0.1);
        assert!(params.sample().is_none());
    }

    #[test]
    fn empty_range_is_not_sampled() {
        let params = ParametricFunctionParams::new(parabola(), 2.0, 2.0, 0.1);
        assert!(params.sample().is_none());
    }

    #[test]
    fn zero_step_is_not_sampled() {
        let params = ParametricFunctionParams::new(parabola(), 0.0, 3.0, 0.0);
        assert!(params.sample().is_none());
    }

    #[test]
    fn sampling_ends_exactly_at_end_when_step_does_not_divide_range() {
        let params = ParametricFunctionParams::new(parabola(), 0.0, 1.0, 0.3);
        let points = params.sample().expect("range should be drawable");

        // start, 0.3, 0.6, 0.9, then the exact endpoint.
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Vector2D::new(0.0, 0.0));
        assert!((points[3].x - 0.9).abs() < 1e-12);
        assert_eq!(*points.last().expect("endpoint"), Vector2D::new(1.0, 1.0));
    }

    #[test]
    fn negative_step_draws_only_the_endpoints() {
        let params = ParametricFunctionParams::new(parabola(), 0.0, 1.0, -0.5);
        let points = params.sample().expect("negative step is still drawable");
        assert_eq!(points, vec![Vector2D::new(0.0, 0.0), Vector2D::new(1.0, 1.0)]);
    }

    #[test]
    fn step_below_float_precision_stops_instead_of_spinning() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = calls.clone();
        let p = ParametricFunction::from_fns(
            move |t| {
                counter.set(counter.get() + 1);
                t
            },
            |t| t,
        );
        let params = ParametricFunctionParams::new(p, 1e17, 1e17 + 100.0, 1.0);
        assert_eq!(params.start + params.step, params.start);

        let points = params.sample().expect("range is drawable");
        assert!(calls.get() <= 102, "evaluated x(t) {} times", calls.get());
        assert_eq!(points.last().map(|p| p.x), Some(1e17 + 100.0));
    }

    #[test]
    fn sample_count_is_capped() {
        let params = ParametricFunctionParams::new(parabola(), 0.0, 1.0, 1e-9);
        let points = params.sample().expect("range is drawable");
        assert_eq!(points.len(), MAX_SAMPLES + 1);
        assert_eq!(*points.last().expect("endpoint"), Vector2D::new(1.0, 1.0));
    }

    #[test]
    fn same_as_compares_handles_and_range() {
        let a = ParametricFunctionParams::new(parabola(), 0.0, 1.0, 0.1);
        let b = a.clone();
        assert!(a.same_as(&b));

        let rebuilt = ParametricFunctionParams::new(parabola(), 0.0, 1.0, 0.1);
        assert!(!a.same_as(&rebuilt));

        let mut moved = a.clone();
        moved.end = 2.0;
        assert!(!a.same_as(&moved));
    }
}
