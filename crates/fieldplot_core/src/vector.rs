use serde::{Deserialize, Serialize};

/// An immutable vector on the Euclidean plane.
///
/// Every operation returns a new vector; nothing here mutates in place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Applies `f` to the x component and `g` to the y component.
    ///
    /// All other arithmetic on `Vector2D` is expressed through this.
    pub fn transform(&self, f: impl Fn(f64) -> f64, g: impl Fn(f64) -> f64) -> Vector2D {
        Vector2D::new(f(self.x), g(self.y))
    }

    /// Applies the same function to both components.
    pub fn transform_both(&self, f: impl Fn(f64) -> f64) -> Vector2D {
        self.transform(&f, &f)
    }

    /// Same direction, magnitude 1.
    ///
    /// The zero vector has no direction; its components come back as NaN.
    pub fn unit_vector(&self) -> Vector2D {
        let magnitude = self.magnitude();
        self.transform_both(|c| c / magnitude)
    }

    pub fn times(&self, a: f64) -> Vector2D {
        self.transform_both(|c| c * a)
    }

    pub fn plus(&self, v: Vector2D) -> Vector2D {
        self.transform(|x| x + v.x, |y| y + v.y)
    }

    pub fn minus(&self, v: Vector2D) -> Vector2D {
        self.plus(v.times(-1.0))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Vector2D {
    fn from((x, y): (f64, f64)) -> Self {
        Vector2D::new(x, y)
    }
}

impl From<Vector2D> for (f64, f64) {
    fn from(v: Vector2D) -> Self {
        (v.x, v.y)
    }
}
