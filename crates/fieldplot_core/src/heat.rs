//! Explicit finite-difference stepper for the 1D heat equation `u_t = u_xx`.
//!
//! Samples are keyed by `round(x * precision)` so that lookups at computed
//! positions like `x + 2h` hit the same slot the table was filled with.
//!
//! There is no stability guard: with `dt` too large for the grid spacing the
//! scheme diverges, exactly as the explicit update dictates.

use crate::vector::Vector2D;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatConfig {
    /// First sampled x (inclusive).
    pub start: f64,
    /// End of the sampled range (exclusive).
    pub end: f64,
    /// Grid spacing `h`.
    pub resolution: f64,
    /// Scale used to turn x into an integer key.
    pub precision: f64,
    /// Time step applied per tick.
    pub dt: f64,
    /// Wall-clock period between ticks, for hosts that drive the stepper
    /// from a timer.
    pub tick_interval: Duration,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            start: -3.0,
            end: 3.0,
            resolution: 0.0005,
            precision: 100_000.0,
            dt: 0.001,
            tick_interval: Duration::from_millis(100),
        }
    }
}

/// A dense table of `u(x)` advanced one explicit Euler step per tick.
#[derive(Debug, Clone)]
pub struct HeatEquation {
    config: HeatConfig,
    start_key: i64,
    stride: i64,
    values: Vec<f64>,
    ticks: u64,
}

impl HeatEquation {
    /// Fills the table from `initial` over `[start, end)`.
    pub fn new(config: HeatConfig, initial: impl Fn(f64) -> f64) -> Self {
        let stride = key_for(config.resolution, config.precision)
            .unwrap_or(1)
            .max(1);
        let (start_key, len) = match (
            key_for(config.start, config.precision),
            key_for(config.end, config.precision),
        ) {
            (Some(start), Some(end)) if end > start => {
                (start, ((end - start + stride - 1) / stride) as usize)
            }
            (Some(start), _) => (start, 0),
            _ => (0, 0),
        };

        let values = (0..len)
            .map(|i| initial((start_key + i as i64 * stride) as f64 / config.precision))
            .collect();

        log::debug!("heat table initialised with {len} samples");

        Self {
            config,
            start_key,
            stride,
            values,
            ticks: 0,
        }
    }

    /// The demo profile `2 * exp(-4 x^2)`.
    pub fn gaussian(config: HeatConfig) -> Self {
        Self::new(config, |x| 2.0 * (-4.0 * x * x).exp())
    }

    pub fn config(&self) -> &HeatConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of steps taken so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// `u(x)`, if `x` lands on a sample of the table.
    pub fn value_at(&self, x: f64) -> Option<f64> {
        let offset = key_for(x, self.config.precision)? - self.start_key;
        if offset < 0 || offset % self.stride != 0 {
            return None;
        }
        self.values.get((offset / self.stride) as usize).copied()
    }

    /// Forward-shifted second difference at sample `x`:
    /// `((u(x+2h) - u(x+h)) / h - (u(x+h) - u(x)) / h) / h`.
    ///
    /// `None` when the stencil runs off the end of the table.
    pub fn laplacian(&self, x: f64) -> Option<f64> {
        let h = self.config.resolution;
        let u0 = self.value_at(x)?;
        let u1 = self.value_at(x + h)?;
        let u2 = self.value_at(x + 2.0 * h)?;
        let ddx1 = (u1 - u0) / h;
        let ddx2 = (u2 - u1) / h;
        Some((ddx2 - ddx1) / h)
    }

    /// Advances every sample by one explicit step computed from the current
    /// table. Samples whose stencil leaves the table keep their value.
    pub fn step(&mut self) {
        let dt = self.config.dt;
        let next: Vec<f64> = (0..self.values.len())
            .map(|i| {
                let x = self.x_at(i);
                match self.laplacian(x) {
                    Some(lap) => self.values[i] + lap * dt,
                    None => self.values[i],
                }
            })
            .collect();
        self.values = next;
        self.ticks += 1;
    }

    /// The current profile as `(x, u(x))` points, left to right.
    pub fn samples(&self) -> Vec<Vector2D> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &u)| Vector2D::new(self.x_at(i), u))
            .collect()
    }

    fn x_at(&self, index: usize) -> f64 {
        (self.start_key + index as i64 * self.stride) as f64 / self.config.precision
    }
}

/// Largest key magnitude; every key in range is an exact integer in `f64`.
const MAX_KEY: f64 = 9_007_199_254_740_992.0;

/// `None` for non-finite positions and ones too far out to key exactly.
fn key_for(x: f64, precision: f64) -> Option<i64> {
    let scaled = (x * precision).round();
    (scaled.is_finite() && scaled.abs() <= MAX_KEY).then_some(scaled as i64)
}
