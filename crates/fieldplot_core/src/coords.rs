use serde::{Deserialize, Serialize};

/// The drawing surface every component renders against.
///
/// `width` and `height` are logical pixels; the device surface is
/// `pixel_scale` times larger in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderTarget {
    pub width: f64,
    pub height: f64,
    pub pixel_scale: f64,
}

impl RenderTarget {
    pub const fn new(width: f64, height: f64, pixel_scale: f64) -> Self {
        Self {
            width,
            height,
            pixel_scale,
        }
    }

    /// Size of the backing buffer in device pixels.
    pub fn device_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_scale).round() as u32,
            (self.height * self.pixel_scale).round() as u32,
        )
    }
}

impl Default for RenderTarget {
    /// 600 x 460 logical pixels at 4x oversampling.
    fn default() -> Self {
        Self::new(600.0, 460.0, 4.0)
    }
}

/// Axis-aligned box in plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Affine map between plot coordinates and screen pixels.
///
/// `origin_x` / `origin_y` are the pixel offsets of plot `(0, 0)` measured
/// from the bottom-left corner, and `unit` is the number of pixels per plot
/// unit. Screen Y grows downward, so the Y map flips around the target
/// height.
///
/// A `unit` of 0 yields infinities and NaN from the inverse maps; callers
/// are expected to check before drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSystem {
    origin_x: f64,
    origin_y: f64,
    unit: f64,
    target: RenderTarget,
}

impl CoordinateSystem {
    pub fn new(origin_x: f64, origin_y: f64, unit: f64, target: RenderTarget) -> Self {
        Self {
            origin_x,
            origin_y,
            unit,
            target,
        }
    }

    /// Plot origin at the centre of `target`.
    pub fn centered(target: RenderTarget, unit: f64) -> Self {
        Self::new(target.width / 2.0, target.height / 2.0, unit, target)
    }

    pub fn origin_x(&self) -> f64 {
        self.origin_x
    }

    pub fn origin_y(&self) -> f64 {
        self.origin_y
    }

    pub fn unit(&self) -> f64 {
        self.unit
    }

    pub fn target(&self) -> RenderTarget {
        self.target
    }

    pub fn to_screen_x(&self, px: f64) -> f64 {
        self.unit * px + self.origin_x
    }

    pub fn to_screen_y(&self, py: f64) -> f64 {
        self.target.height - (self.unit * py + self.origin_y)
    }

    pub fn to_plot_x(&self, sx: f64) -> f64 {
        (sx - self.origin_x) / self.unit
    }

    pub fn to_plot_y(&self, sy: f64) -> f64 {
        (self.target.height - sy - self.origin_y) / self.unit
    }

    pub fn to_screen(&self, px: f64, py: f64) -> (f64, f64) {
        (self.to_screen_x(px), self.to_screen_y(py))
    }

    pub fn to_plot(&self, sx: f64, sy: f64) -> (f64, f64) {
        (self.to_plot_x(sx), self.to_plot_y(sy))
    }

    /// Same origin and target, different zoom.
    pub fn with_unit(&self, unit: f64) -> Self {
        Self { unit, ..*self }
    }

    /// The part of the plane currently on screen, from the inverse map of
    /// the surface corners.
    pub fn visible_bounds(&self) -> PlotBounds {
        let left = self.to_plot_x(0.0);
        let right = self.to_plot_x(self.target.width);
        let bottom = self.to_plot_y(self.target.height);
        let top = self.to_plot_y(0.0);
        PlotBounds {
            min_x: left.min(right),
            min_y: bottom.min(top),
            max_x: left.max(right),
            max_y: bottom.max(top),
        }
    }
}
