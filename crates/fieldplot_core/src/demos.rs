//! State behind the bundled visualizations. Each demo turns its own inputs
//! into a [`PlotConfig`]; hosts only forward events and redraw.

use crate::coords::CoordinateSystem;
use crate::equation_engine::{evaluate_constant, CompiledExpression};
use crate::field::SharedField;
use crate::heat::{HeatConfig, HeatEquation};
use crate::input::zoom_to_unit;
use crate::integrate::{trace_second_order, SecondOrderConfig};
use crate::plotter::{PlotConfig, SharedCallback, VectorFieldParams};
use crate::presets::FieldPreset;
use crate::render::Frame;
use anyhow::Result;
use std::sync::Arc;

/// Point charges with a field line through the pointer.
pub struct ElectricDemo {
    preset: FieldPreset,
    field: SharedField,
    unit: f64,
    length_factor: f64,
    pointer: (f64, f64),
}

impl ElectricDemo {
    pub const DEFAULT_UNIT: f64 = 80.0;
    pub const DEFAULT_LENGTH_FACTOR: f64 = 0.25;

    pub fn new(preset: FieldPreset) -> Self {
        Self {
            preset,
            field: preset.field(),
            unit: Self::DEFAULT_UNIT,
            length_factor: Self::DEFAULT_LENGTH_FACTOR,
            pointer: (1.0, 1.0),
        }
    }

    pub fn preset(&self) -> FieldPreset {
        self.preset
    }

    pub fn unit(&self) -> f64 {
        self.unit
    }

    pub fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    pub fn set_preset(&mut self, preset: FieldPreset) {
        if preset != self.preset {
            self.preset = preset;
            self.field = preset.field();
        }
    }

    /// Zoom slider in `[0, 1]`.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.unit = zoom_to_unit(zoom);
    }

    /// Field-line length slider, clamped to `[0, 1]`. NaN is ignored.
    pub fn set_length_factor(&mut self, length_factor: f64) {
        if !length_factor.is_nan() {
            self.length_factor = length_factor.clamp(0.0, 1.0);
        }
    }

    pub fn length_factor(&self) -> f64 {
        self.length_factor
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
    }

    /// `100 + 1000 * length_factor` steps per direction.
    pub fn field_line_steps(&self) -> usize {
        (100.0 + self.length_factor * 1000.0).round() as usize
    }

    pub fn config(&self) -> PlotConfig {
        let field = VectorFieldParams::shared(self.field.clone())
            .with_field_lines([self.pointer])
            .with_steps(self.field_line_steps());
        PlotConfig {
            vector_fields: vec![Some(field)],
            plot_points: vec![self.pointer],
            unit: Some(self.unit),
            ..PlotConfig::default()
        }
    }
}

impl Default for ElectricDemo {
    fn default() -> Self {
        Self::new(FieldPreset::default())
    }
}

/// The heat equation on `[-3, 3)`, advanced by a host timer.
pub struct HeatDemo {
    heat: HeatEquation,
}

impl HeatDemo {
    pub const UNIT: f64 = 60.0;

    pub fn new(config: HeatConfig) -> Self {
        Self {
            heat: HeatEquation::gaussian(config),
        }
    }

    pub fn heat(&self) -> &HeatEquation {
        &self.heat
    }

    pub fn tick(&mut self) {
        self.heat.step();
    }

    /// Draws the current profile as a single curve.
    pub fn config(&self) -> PlotConfig {
        let samples = Arc::new(self.heat.samples());
        let draw_profile: SharedCallback =
            Arc::new(move |frame: &mut Frame, cs: &CoordinateSystem| frame.polyline(cs, &samples));
        PlotConfig {
            unit: Some(Self::UNIT),
            drawing_callbacks: vec![draw_profile],
            ..PlotConfig::default()
        }
    }
}

impl Default for HeatDemo {
    fn default() -> Self {
        Self::new(HeatConfig::default())
    }
}

/// `y'' = f(y, y')` with an editable right-hand side and `y(0)`.
pub struct OdeDemo {
    rhs: Arc<CompiledExpression>,
    y0: f64,
    y_prime0: f64,
    integration: SecondOrderConfig,
    unit: Option<f64>,
}

impl OdeDemo {
    pub const DEFAULT_RHS: &'static str = "-y";

    /// Variables available to the right-hand side, in evaluation order.
    pub const VARIABLES: [&'static str; 2] = ["y", "yp"];

    pub fn new(rhs: &str, y0: f64) -> Result<Self> {
        Ok(Self {
            rhs: Arc::new(CompiledExpression::compile(rhs, &Self::VARIABLES)?),
            y0,
            y_prime0: 0.0,
            integration: SecondOrderConfig::default(),
            unit: None,
        })
    }

    pub fn rhs(&self) -> &str {
        self.rhs.source()
    }

    pub fn y0(&self) -> f64 {
        self.y0
    }

    /// Replaces `f(y, y')`. On error the previous right-hand side stays.
    pub fn set_rhs(&mut self, text: &str) -> Result<()> {
        let rhs = CompiledExpression::compile(text, &Self::VARIABLES)?;
        self.rhs = Arc::new(rhs);
        Ok(())
    }

    pub fn set_y0(&mut self, y0: f64) {
        self.y0 = y0;
    }

    /// Reads `y(0)` from text, falling back to 0 for anything unreadable.
    pub fn set_y0_text(&mut self, text: &str) {
        self.y0 = evaluate_constant(text).unwrap_or_else(|err| {
            log::warn!("y(0) = {text:?} is not a number, using 0: {err:#}");
            0.0
        });
    }

    pub fn set_integration(&mut self, integration: SecondOrderConfig) {
        self.integration = integration;
    }

    pub fn set_unit(&mut self, unit: Option<f64>) {
        self.unit = unit;
    }

    /// Draws the trajectory through `(0, y0)` in both directions.
    pub fn config(&self) -> PlotConfig {
        let rhs = self.rhs.clone();
        let (y0, y_prime0, integration) = (self.y0, self.y_prime0, self.integration);
        let draw_solution: SharedCallback =
            Arc::new(move |frame: &mut Frame, cs: &CoordinateSystem| {
                let trajectory =
                    trace_second_order(|y, yp| rhs.eval(&[y, yp]), y0, y_prime0, integration);
                frame.polyline(cs, &trajectory.forward);
                frame.polyline(cs, &trajectory.backward);
            });
        PlotConfig {
            unit: self.unit,
            drawing_callbacks: vec![draw_solution],
            ..PlotConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::DrawCommand;
    use crate::coords::RenderTarget;
    use crate::field::ConstantField;
    use crate::integrate::MAX_STEPS;
    use crate::plotter::Plotter;
    use crate::style::PlotStyle;
    use crate::vector::Vector2D;

    fn run_callbacks(config: &PlotConfig) -> Frame {
        let cs = CoordinateSystem::centered(RenderTarget::default(), config.unit_or_default());
        let mut frame = Frame::new();
        for callback in &config.drawing_callbacks {
            callback.draw(&mut frame, &cs);
        }
        frame
    }

    #[test]
    fn electric_defaults_follow_the_pointer() {
        let mut demo = ElectricDemo::default();
        assert_eq!(demo.field_line_steps(), 350);

        demo.pointer_moved(-2.0, 0.5);
        let config = demo.config();
        assert_eq!(config.unit, Some(80.0));
        assert_eq!(config.plot_points, vec![(-2.0, 0.5)]);
        let field = config.vector_fields[0].as_ref().expect("one field");
        assert_eq!(field.field_lines, vec![(-2.0, 0.5)]);
        assert_eq!(field.field_line_steps, Some(350));
        assert_eq!(field.field_line_step_size, None);
    }

    #[test]
    fn electric_sliders_and_presets() {
        let mut demo = ElectricDemo::default();
        demo.set_zoom(0.5);
        assert_eq!(demo.unit(), 400.0);
        demo.set_length_factor(1.0);
        assert_eq!(demo.field_line_steps(), 1100);

        let before = demo.config();
        demo.set_preset(FieldPreset::Single);
        assert!(before.diff(&demo.config()).is_empty());

        demo.set_preset(FieldPreset::Dipole);
        assert_eq!(demo.preset(), FieldPreset::Dipole);
        assert_eq!(
            before.diff(&demo.config()),
            vec![crate::plotter::ConfigChange::VectorFields]
        );
    }

    #[test]
    fn length_factor_outside_the_slider_is_clamped() {
        let mut demo = ElectricDemo::default();
        demo.set_length_factor(f64::INFINITY);
        assert_eq!(demo.field_line_steps(), 1100);
        demo.set_length_factor(f64::NAN);
        assert_eq!(demo.length_factor(), 1.0);
        demo.set_length_factor(-5.0);
        assert_eq!(demo.field_line_steps(), 100);

        demo.set_length_factor(f64::INFINITY);
        let commands = Plotter::with_config(demo.config()).draw().expect("frame");
        assert!(!commands.is_empty());
    }

    #[test]
    fn huge_style_step_count_is_clamped_when_drawing() {
        let style = PlotStyle {
            field_line_steps: usize::MAX,
            ..PlotStyle::default()
        };
        let line_count = |seeds: Vec<(f64, f64)>| {
            let field = VectorFieldParams::new(ConstantField(Vector2D::new(1.0, 0.0)))
                .with_field_lines(seeds);
            let plotter = Plotter::new(
                RenderTarget::default(),
                style.clone(),
                PlotConfig {
                    vector_fields: vec![Some(field)],
                    ..PlotConfig::default()
                },
            );
            plotter
                .draw()
                .expect("frame")
                .iter()
                .filter(|c| matches!(c, DrawCommand::LineTo { .. }))
                .count()
        };
        let arrows_only = line_count(Vec::new());
        let with_line = line_count(vec![(0.0, 0.0)]);
        assert!(with_line - arrows_only <= 2 * (MAX_STEPS + 1));
    }

    #[test]
    fn electric_frame_stays_finite_with_pointer_on_a_charge() {
        let mut demo = ElectricDemo::new(FieldPreset::Single);
        demo.pointer_moved(0.0, 0.0);
        let commands = Plotter::with_config(demo.config()).draw().expect("frame");
        assert!(commands.iter().all(|c| match *c {
            DrawCommand::MoveTo { x, y } | DrawCommand::LineTo { x, y } => {
                x.is_finite() && y.is_finite()
            }
            _ => true,
        }));
    }

    #[test]
    fn heat_profile_is_one_curve_through_every_sample() {
        let mut demo = HeatDemo::default();
        demo.tick();
        assert_eq!(demo.heat().ticks(), 1);

        let config = demo.config();
        assert_eq!(config.unit, Some(60.0));
        let frame = run_callbacks(&config);
        // begin + move + 11999 lines + stroke
        assert_eq!(frame.len(), 12_002);
    }

    #[test]
    fn ode_draws_both_halves_of_the_trajectory() {
        let demo = OdeDemo::new(OdeDemo::DEFAULT_RHS, 1.0).expect("default rhs compiles");
        let frame = run_callbacks(&demo.config());
        let strokes = frame
            .commands()
            .iter()
            .filter(|c| **c == DrawCommand::Stroke)
            .count();
        assert_eq!(strokes, 2);
        // Both halves start at (0, y0) = (0, 1) -> (300, 210).
        assert_eq!(frame.commands()[1], DrawCommand::MoveTo { x: 300.0, y: 210.0 });
    }

    #[test]
    fn ode_keeps_previous_rhs_on_error() {
        let mut demo = OdeDemo::new("-y", 1.0).expect("compiles");
        assert!(demo.set_rhs("-y +").is_err());
        assert_eq!(demo.rhs(), "-y");
        demo.set_rhs("-y - 0.1yp").expect("compiles");
        assert_eq!(demo.rhs(), "-y - 0.1yp");
        assert!(OdeDemo::new("x", 1.0).is_err());
    }

    #[test]
    fn ode_initial_value_text_falls_back_to_zero() {
        let mut demo = OdeDemo::new("-y", 1.0).expect("compiles");
        demo.set_y0_text("2pi");
        assert!((demo.y0() - 2.0 * std::f64::consts::PI).abs() < 1e-12);
        demo.set_y0_text("abc");
        assert_eq!(demo.y0(), 0.0);
    }
}
