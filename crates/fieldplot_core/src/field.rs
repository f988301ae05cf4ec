//! Vector fields and the combinators that build new fields from old ones.
//!
//! Combinators never evaluate or mutate their sources up front. Each one is
//! a small struct implementing [`Field2D`] that holds the fields it was built
//! from, so a composite can still be inspected after construction:
//!
//! ```
//! use fieldplot_core::field::{add, charge_field, subtract};
//! use fieldplot_core::traits::Field2D;
//!
//! let dipole = subtract(charge_field(1.0, -1.0, 0.0), charge_field(1.0, 1.0, 0.0));
//! let v = dipole.evaluate(0.0, 0.0);
//! assert!(v.x > 0.0);
//!
//! let doubled = add(charge_field(1.0, 0.0, 0.0), charge_field(1.0, 0.0, 0.0));
//! assert!((doubled.evaluate(1.0, 0.0).x - 2.0).abs() < 1e-12);
//! ```

use crate::traits::Field2D;
use crate::vector::Vector2D;
use std::sync::Arc;

/// A type-erased field that can be shared between configurations.
pub type SharedField = Arc<dyn Field2D>;

/// Adapts a closure into a [`Field2D`].
#[derive(Clone, Copy)]
pub struct FnField<F>(pub F);

impl<F> Field2D for FnField<F>
where
    F: Fn(f64, f64) -> Vector2D,
{
    fn evaluate(&self, x: f64, y: f64) -> Vector2D {
        (self.0)(x, y)
    }
}

/// The same vector everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantField(pub Vector2D);

impl Field2D for ConstantField {
    fn evaluate(&self, _x: f64, _y: f64) -> Vector2D {
        self.0
    }
}

/// Pointwise sum of two fields. Built by [`add`] and [`subtract`].
#[derive(Debug, Clone, Copy)]
pub struct FieldSum<F, G> {
    pub first: F,
    pub second: G,
}

impl<F: Field2D, G: Field2D> Field2D for FieldSum<F, G> {
    fn evaluate(&self, x: f64, y: f64) -> Vector2D {
        self.first.evaluate(x, y).plus(self.second.evaluate(x, y))
    }
}

/// A field scaled by a constant. Built by [`multiply`].
#[derive(Debug, Clone, Copy)]
pub struct ScaledField<F> {
    pub field: F,
    pub factor: f64,
}

impl<F: Field2D> Field2D for ScaledField<F> {
    fn evaluate(&self, x: f64, y: f64) -> Vector2D {
        self.field.evaluate(x, y).times(self.factor)
    }
}

/// Electric field of a point charge `q` at `(xa, ya)`, electric constant
/// ignored: `v * q / |v|^2` with `v` the offset from the charge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeField {
    pub charge: f64,
    pub x: f64,
    pub y: f64,
}

impl Field2D for ChargeField {
    fn evaluate(&self, x: f64, y: f64) -> Vector2D {
        let v = Vector2D::new(x - self.x, y - self.y);
        let magnitude = v.magnitude();
        let q = self.charge;
        // NaN at the charge itself.
        v.transform_both(|c| c * q / (magnitude * magnitude))
    }
}

pub fn charge_field(charge: f64, x: f64, y: f64) -> ChargeField {
    ChargeField { charge, x, y }
}

/// `add(f, g)(x, y) = f(x, y) + g(x, y)`
pub fn add<F: Field2D, G: Field2D>(f: F, g: G) -> FieldSum<F, G> {
    FieldSum {
        first: f,
        second: g,
    }
}

/// `subtract(f, g) = add(f, multiply(g, -1))`
pub fn subtract<F: Field2D, G: Field2D>(f: F, g: G) -> FieldSum<F, ScaledField<G>> {
    add(f, multiply(g, -1.0))
}

/// `multiply(f, a)(x, y) = f(x, y) * a`
pub fn multiply<F: Field2D>(f: F, factor: f64) -> ScaledField<F> {
    ScaledField { field: f, factor }
}
