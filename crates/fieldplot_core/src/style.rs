use crate::commands::Color;
use serde::{Deserialize, Serialize};

/// How long a quiver arrow is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowLength {
    /// Every arrow is `vector_length` pixels.
    #[default]
    Fixed,
    /// `vector_length * log10(|v| + 1) * 2` pixels, so stronger regions
    /// draw longer arrows.
    LogMagnitude,
}

impl ArrowLength {
    /// Arrow length in pixels for a field value of magnitude `magnitude`.
    pub fn pixels(self, vector_length: f64, magnitude: f64) -> f64 {
        match self {
            ArrowLength::Fixed => vector_length,
            ArrowLength::LogMagnitude => vector_length * (magnitude + 1.0).log10() * 2.0,
        }
    }
}

/// Visual constants for a plot. Every field has a default, so a partial
/// JSON object is a valid style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlotStyle {
    pub line_width: f64,
    pub tick_color: Color,
    /// Tick half-length in pixels.
    pub tick_size: f64,
    pub grid_color: Color,
    pub point_color: Color,
    pub point_radius: f64,
    /// Base quiver arrow length in pixels.
    pub vector_length: f64,
    pub arrow_length: ArrowLength,
    /// Field-line step length, in plot units, when a field does not set one.
    pub field_line_step_factor: f64,
    /// Field-line step count when a field does not set one.
    pub field_line_steps: usize,
}

impl PlotStyle {
    /// Distance between quiver samples, in pixels.
    pub fn quiver_spacing(&self) -> f64 {
        self.vector_length * 1.5
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            tick_color: Color::TICK,
            tick_size: 5.0,
            grid_color: Color::GRID,
            point_color: Color::POINT,
            point_radius: 4.0,
            vector_length: 10.0,
            arrow_length: ArrowLength::Fixed,
            field_line_step_factor: 0.1,
            field_line_steps: 100,
        }
    }
}
