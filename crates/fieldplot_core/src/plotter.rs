//! The render cycle: configuration in, a complete frame of draw commands out.
//!
//! A [`Plotter`] re-executes the whole frame on every draw. Nothing is
//! cached between frames, so the output depends only on the current
//! configuration and coordinate system.
//!
//! Draw order, back to front:
//!
//! 1. clear the surface and set the line width
//! 2. axes (two unit ticks, then the x and y axis lines)
//! 3. parametric curves, in registration order
//! 4. vector fields: quiver, then bidirectional field lines
//! 5. plot points
//! 6. drawing callbacks

use crate::commands::DrawCommand;
use crate::coords::{CoordinateSystem, RenderTarget};
use crate::field::SharedField;
use crate::integrate::trace_bidirectional_field_line;
use crate::parametric::ParametricFunctionParams;
use crate::render::Frame;
use crate::style::PlotStyle;
use crate::traits::Field2D;
use crate::vector::Vector2D;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Pixels per plot unit when a configuration does not set one.
pub const DEFAULT_UNIT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlotterError {
    #[error("plotter has no surface attached")]
    NotAttached,
    #[error("plotter is already attached to a surface")]
    AlreadyAttached,
}

/// Extra drawing run after everything else, with the live coordinate
/// system.
pub trait DrawingCallback {
    fn draw(&self, frame: &mut Frame, cs: &CoordinateSystem);
}

impl<F> DrawingCallback for F
where
    F: Fn(&mut Frame, &CoordinateSystem),
{
    fn draw(&self, frame: &mut Frame, cs: &CoordinateSystem) {
        self(frame, cs)
    }
}

pub type SharedCallback = Arc<dyn DrawingCallback>;

/// Receives pointer positions in plot coordinates.
pub type PointerCallback = Arc<dyn Fn(f64, f64)>;

/// A field to draw as a quiver, plus the seeds of its field lines.
#[derive(Clone)]
pub struct VectorFieldParams {
    pub field: SharedField,
    pub field_lines: Vec<(f64, f64)>,
    /// Field-line step length in plot units; the style default when absent.
    pub field_line_step_size: Option<f64>,
    /// Field-line step count; the style default when absent.
    pub field_line_steps: Option<usize>,
}

impl VectorFieldParams {
    pub fn new(field: impl Field2D + 'static) -> Self {
        Self::shared(Arc::new(field))
    }

    pub fn shared(field: SharedField) -> Self {
        Self {
            field,
            field_lines: Vec::new(),
            field_line_step_size: None,
            field_line_steps: None,
        }
    }

    pub fn with_field_lines(mut self, seeds: impl IntoIterator<Item = (f64, f64)>) -> Self {
        self.field_lines = seeds.into_iter().collect();
        self
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.field_line_step_size = Some(step_size);
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.field_line_steps = Some(steps);
        self
    }

    /// True when `other` draws the same field with the same lines.
    pub fn same_as(&self, other: &VectorFieldParams) -> bool {
        Arc::ptr_eq(&self.field, &other.field)
            && self.field_lines == other.field_lines
            && self.field_line_step_size == other.field_line_step_size
            && self.field_line_steps == other.field_line_steps
    }
}

impl fmt::Debug for VectorFieldParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorFieldParams")
            .field("field_lines", &self.field_lines)
            .field("field_line_step_size", &self.field_line_step_size)
            .field("field_line_steps", &self.field_line_steps)
            .finish_non_exhaustive()
    }
}

/// Everything a plot shows. Any subset may be given; the rest stays empty.
///
/// `None` entries in the curve and field lists are placeholders for inputs
/// that currently have nothing valid to draw.
#[derive(Clone, Default)]
pub struct PlotConfig {
    pub parametric_functions: Vec<Option<ParametricFunctionParams>>,
    pub vector_fields: Vec<Option<VectorFieldParams>>,
    /// Pixels per plot unit; [`DEFAULT_UNIT`] when absent.
    pub unit: Option<f64>,
    pub plot_points: Vec<(f64, f64)>,
    pub drawing_callbacks: Vec<SharedCallback>,
    pub on_pointer_move: Option<PointerCallback>,
}

impl PlotConfig {
    pub fn unit_or_default(&self) -> f64 {
        self.unit.unwrap_or(DEFAULT_UNIT)
    }

    /// What differs between `self` (previous) and `next`.
    pub fn diff(&self, next: &PlotConfig) -> Vec<ConfigChange> {
        let mut changes = Vec::new();

        let curves_same = same_list(
            &self.parametric_functions,
            &next.parametric_functions,
            ParametricFunctionParams::same_as,
        );
        if !curves_same {
            changes.push(ConfigChange::ParametricFunctions);
        }
        if !same_list(&self.vector_fields, &next.vector_fields, VectorFieldParams::same_as) {
            changes.push(ConfigChange::VectorFields);
        }
        let (from, to) = (self.unit_or_default(), next.unit_or_default());
        if from != to && !(from.is_nan() && to.is_nan()) {
            changes.push(ConfigChange::Unit { from, to });
        }
        if self.plot_points != next.plot_points {
            changes.push(ConfigChange::PlotPoints);
        }
        let callbacks_same = self.drawing_callbacks.len() == next.drawing_callbacks.len()
            && self
                .drawing_callbacks
                .iter()
                .zip(&next.drawing_callbacks)
                .all(|(a, b)| Arc::ptr_eq(a, b));
        if !callbacks_same {
            changes.push(ConfigChange::DrawingCallbacks);
        }
        let pointer_same = match (&self.on_pointer_move, &next.on_pointer_move) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        if !pointer_same {
            changes.push(ConfigChange::PointerCallback);
        }

        changes
    }
}

fn same_list<T>(a: &[Option<T>], b: &[Option<T>], same: impl Fn(&T, &T) -> bool) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|pair| match pair {
            (None, None) => true,
            (Some(x), Some(y)) => same(x, y),
            _ => false,
        })
}

impl fmt::Debug for PlotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotConfig")
            .field("parametric_functions", &self.parametric_functions)
            .field("vector_fields", &self.vector_fields)
            .field("unit", &self.unit)
            .field("plot_points", &self.plot_points)
            .field("drawing_callbacks", &self.drawing_callbacks.len())
            .field("on_pointer_move", &self.on_pointer_move.is_some())
            .finish()
    }
}

/// One difference between two consecutive configurations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigChange {
    ParametricFunctions,
    VectorFields,
    Unit { from: f64, to: f64 },
    PlotPoints,
    DrawingCallbacks,
    PointerCallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Ready,
}

/// Owns the coordinate system and configuration, and turns them into frames.
pub struct Plotter {
    style: PlotStyle,
    cs: CoordinateSystem,
    config: PlotConfig,
    phase: Phase,
}

impl Plotter {
    /// A plotter centred on `target`. No surface is attached yet.
    pub fn new(target: RenderTarget, style: PlotStyle, config: PlotConfig) -> Self {
        let cs = CoordinateSystem::centered(target, config.unit_or_default());
        Self {
            style,
            cs,
            config,
            phase: Phase::Uninitialized,
        }
    }

    /// Reference surface and default style.
    pub fn with_config(config: PlotConfig) -> Self {
        Self::new(RenderTarget::default(), PlotStyle::default(), config)
    }

    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.cs
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn style(&self) -> &PlotStyle {
        &self.style
    }

    pub fn target(&self) -> RenderTarget {
        self.cs.target()
    }

    pub fn is_attached(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Binds the plotter to its surface. Returns the one-time oversampling
    /// scale followed by the first frame.
    pub fn attach(&mut self) -> Result<Vec<DrawCommand>, PlotterError> {
        if self.phase == Phase::Ready {
            return Err(PlotterError::AlreadyAttached);
        }
        self.phase = Phase::Ready;

        let scale = self.cs.target().pixel_scale;
        let mut commands = vec![DrawCommand::Scale { x: scale, y: scale }];
        commands.extend(self.draw().unwrap_or_default());
        log::debug!("plotter attached, first frame has {} commands", commands.len());
        Ok(commands)
    }

    /// The current frame for an attached plotter. `Ok(None)` means the
    /// previous frame should stay on screen.
    pub fn redraw(&self) -> Result<Option<Vec<DrawCommand>>, PlotterError> {
        match self.phase {
            Phase::Uninitialized => Err(PlotterError::NotAttached),
            Phase::Ready => Ok(self.draw()),
        }
    }

    /// Replaces the configuration and reports what changed. A unit change
    /// rescales the coordinate system around the same origin.
    pub fn set_config(&mut self, next: PlotConfig) -> Vec<ConfigChange> {
        let changes = self.config.diff(&next);
        for change in &changes {
            if let ConfigChange::Unit { from, to } = *change {
                log::debug!("unit changed from {from} to {to}");
                self.cs = self.cs.with_unit(to);
            }
        }
        if !changes.is_empty() {
            log::debug!("configuration changed: {changes:?}");
        }
        self.config = next;
        changes
    }

    /// Maps a pointer position in surface pixels to plot coordinates and
    /// forwards it to the configured pointer callback.
    pub fn pointer_moved(&self, sx: f64, sy: f64) -> (f64, f64) {
        let (x, y) = self.cs.to_plot(sx, sy);
        if let Some(callback) = &self.config.on_pointer_move {
            callback(x, y);
        }
        (x, y)
    }

    /// Builds a complete frame from the current state.
    ///
    /// Returns `None` when the unit is exactly 0: nothing can be mapped, so
    /// nothing is drawn and the surface keeps its previous frame.
    pub fn draw(&self) -> Option<Vec<DrawCommand>> {
        if self.cs.unit() == 0.0 {
            log::debug!("unit is 0, skipping draw");
            return None;
        }

        let target = self.cs.target();
        let mut frame = Frame::new();
        frame.clear_rect(0.0, 0.0, target.width, target.height);
        frame.set_line_width(self.style.line_width);

        self.draw_axes(&mut frame);

        for params in self.config.parametric_functions.iter().flatten() {
            self.draw_parametric_curve(&mut frame, params);
        }

        for field in self.config.vector_fields.iter().flatten() {
            self.draw_vector_field(&mut frame, &field.field);
            let step_size = field
                .field_line_step_size
                .unwrap_or(self.style.field_line_step_factor);
            let steps = field.field_line_steps.unwrap_or(self.style.field_line_steps);
            for &(x, y) in &field.field_lines {
                self.draw_bidirectional_field_line(
                    &mut frame,
                    &field.field,
                    Vector2D::new(x, y),
                    step_size,
                    steps,
                );
            }
        }

        frame.save();
        frame.set_fill_color(self.style.point_color);
        for &(x, y) in &self.config.plot_points {
            let (sx, sy) = self.cs.to_screen(x, y);
            frame.disc(sx, sy, self.style.point_radius);
        }
        frame.restore();

        for callback in &self.config.drawing_callbacks {
            callback.draw(&mut frame, &self.cs);
        }

        Some(frame.into_commands())
    }

    fn draw_axes(&self, frame: &mut Frame) {
        let cs = &self.cs;
        let target = cs.target();
        let tick = self.style.tick_size;

        frame.save();

        frame.set_stroke_color(self.style.tick_color);
        let (x1, y0) = cs.to_screen(1.0, 0.0);
        closed_segment(frame, (x1, y0 - tick), (x1, y0 + tick));
        let (x0, y1) = cs.to_screen(0.0, 1.0);
        closed_segment(frame, (x0 - tick, y1), (x0 + tick, y1));

        frame.set_stroke_color(self.style.grid_color);
        let (x0, y0) = cs.to_screen(0.0, 0.0);
        closed_segment(frame, (0.0, y0), (target.width, y0));
        closed_segment(frame, (x0, 0.0), (x0, target.height));

        frame.restore();
    }

    fn draw_parametric_curve(&self, frame: &mut Frame, params: &ParametricFunctionParams) {
        if let Some(points) = params.sample() {
            frame.polyline(&self.cs, &points);
        }
    }

    /// One arrow every `1.5 * vector_length` pixels across the visible area.
    fn draw_vector_field(&self, frame: &mut Frame, field: &SharedField) {
        let cs = &self.cs;
        let bounds = cs.visible_bounds();
        let step = self.style.quiver_spacing() / cs.unit().abs();
        if !(step.is_finite() && step > 0.0) {
            return;
        }

        let mut x = bounds.min_x;
        while x <= bounds.max_x {
            let mut y = bounds.min_y;
            while y <= bounds.max_y {
                self.draw_vector(frame, field.evaluate(x, y), x, y);
                y += step;
            }
            x += step;
        }
    }

    /// An arrow from plot `(x, y)` along `v`. Screen y grows downward, so
    /// the y component is subtracted.
    fn draw_vector(&self, frame: &mut Frame, v: Vector2D, x: f64, y: f64) {
        let direction = v.unit_vector();
        if !direction.is_finite() {
            return;
        }
        let length = self
            .style
            .arrow_length
            .pixels(self.style.vector_length, v.magnitude());
        let (sx, sy) = self.cs.to_screen(x, y);
        frame.segment(
            (sx, sy),
            (sx + direction.x * length, sy - direction.y * length),
        );
    }

    fn draw_bidirectional_field_line(
        &self,
        frame: &mut Frame,
        field: &SharedField,
        seed: Vector2D,
        step_size: f64,
        steps: usize,
    ) {
        let [forward, backward] = trace_bidirectional_field_line(field, seed, step_size, steps);
        frame.polyline(&self.cs, &forward);
        frame.polyline(&self.cs, &backward);
    }
}

fn closed_segment(frame: &mut Frame, from: (f64, f64), to: (f64, f64)) {
    frame.begin_path();
    frame.move_to(from.0, from.1);
    frame.line_to(to.0, to.1);
    frame.close_path();
    frame.stroke();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Color;
    use crate::field::{charge_field, subtract, ConstantField, FnField};
    use crate::parametric::ParametricFunction;
    use crate::render::{replay, RecordingSurface};
    use crate::style::ArrowLength;
    use std::cell::Cell;
    use std::rc::Rc;

    fn strokes(commands: &[DrawCommand]) -> usize {
        commands.iter().filter(|c| **c == DrawCommand::Stroke).count()
    }

    fn all_coordinates_finite(commands: &[DrawCommand]) -> bool {
        commands.iter().all(|c| match *c {
            DrawCommand::MoveTo { x, y } | DrawCommand::LineTo { x, y } => {
                x.is_finite() && y.is_finite()
            }
            _ => true,
        })
    }

    fn attached(config: PlotConfig) -> Plotter {
        let mut plotter = Plotter::with_config(config);
        plotter.attach().expect("first attach succeeds");
        plotter
    }

    #[test]
    fn attach_scales_once_then_draws() {
        let mut plotter = Plotter::with_config(PlotConfig::default());
        let commands = plotter.attach().expect("first attach succeeds");
        assert_eq!(commands[0], DrawCommand::Scale { x: 4.0, y: 4.0 });
        assert_eq!(
            commands[1],
            DrawCommand::ClearRect {
                x: 0.0,
                y: 0.0,
                width: 600.0,
                height: 460.0
            }
        );
        assert_eq!(commands[2], DrawCommand::SetLineWidth { width: 2.0 });

        let frame = plotter.redraw().expect("attached").expect("unit is non-zero");
        assert!(!frame.contains(&DrawCommand::Scale { x: 4.0, y: 4.0 }));
        assert_eq!(plotter.attach(), Err(PlotterError::AlreadyAttached));
    }

    #[test]
    fn redraw_requires_a_surface() {
        let plotter = Plotter::with_config(PlotConfig::default());
        assert_eq!(plotter.redraw(), Err(PlotterError::NotAttached));
        assert!(plotter.draw().is_some(), "pure draw does not need a surface");
    }

    #[test]
    fn axes_are_ticks_then_grid_lines() {
        let plotter = Plotter::with_config(PlotConfig::default());
        let commands = plotter.draw().expect("frame");
        let axes = &commands[2..];
        assert_eq!(axes[0], DrawCommand::Save);
        assert_eq!(axes[1], DrawCommand::SetStrokeColor { color: Color::TICK });
        assert_eq!(axes[3], DrawCommand::MoveTo { x: 320.0, y: 225.0 });
        assert_eq!(axes[4], DrawCommand::LineTo { x: 320.0, y: 235.0 });
        assert_eq!(axes[8], DrawCommand::MoveTo { x: 295.0, y: 210.0 });
        assert_eq!(axes[9], DrawCommand::LineTo { x: 305.0, y: 210.0 });
        assert_eq!(axes[12], DrawCommand::SetStrokeColor { color: Color::GRID });
        assert_eq!(axes[14], DrawCommand::MoveTo { x: 0.0, y: 230.0 });
        assert_eq!(axes[15], DrawCommand::LineTo { x: 600.0, y: 230.0 });
        assert_eq!(axes[19], DrawCommand::MoveTo { x: 300.0, y: 0.0 });
        assert_eq!(axes[20], DrawCommand::LineTo { x: 300.0, y: 460.0 });
        assert_eq!(axes[23], DrawCommand::Restore);
    }

    #[test]
    fn zero_unit_keeps_the_previous_frame() {
        let mut plotter = attached(PlotConfig {
            plot_points: vec![(1.0, 1.0)],
            ..PlotConfig::default()
        });
        let mut surface = RecordingSurface::new();
        replay(&plotter.draw().expect("frame"), &mut surface);
        let before = surface.calls.clone();

        let changes = plotter.set_config(PlotConfig {
            unit: Some(0.0),
            plot_points: vec![(1.0, 1.0)],
            ..PlotConfig::default()
        });
        assert_eq!(changes, vec![ConfigChange::Unit { from: 20.0, to: 0.0 }]);

        let frame = plotter.redraw().expect("attached");
        assert!(frame.is_none());
        if let Some(commands) = frame {
            replay(&commands, &mut surface);
        }
        assert_eq!(surface.calls, before);
    }

    #[test]
    fn attaching_at_zero_unit_only_scales() {
        let mut plotter = Plotter::with_config(PlotConfig {
            unit: Some(0.0),
            ..PlotConfig::default()
        });
        let commands = plotter.attach().expect("first attach succeeds");
        assert_eq!(commands, vec![DrawCommand::Scale { x: 4.0, y: 4.0 }]);
    }

    #[test]
    fn unit_change_preserves_origin() {
        let mut plotter = Plotter::with_config(PlotConfig::default());
        let origin = plotter.coordinate_system().to_screen(0.0, 0.0);
        plotter.set_config(PlotConfig {
            unit: Some(80.0),
            ..PlotConfig::default()
        });
        assert_eq!(plotter.coordinate_system().unit(), 80.0);
        assert_eq!(plotter.coordinate_system().to_screen(0.0, 0.0), origin);
        assert_eq!(plotter.coordinate_system().to_screen_x(1.0), 380.0);
    }

    #[test]
    fn unchanged_config_reports_nothing() {
        let curve = ParametricFunctionParams::new(
            ParametricFunction::from_fns(|t| t, |t| t),
            0.0,
            1.0,
            0.1,
        );
        let callback: SharedCallback = Arc::new(|_: &mut Frame, _: &CoordinateSystem| {});
        let config = PlotConfig {
            parametric_functions: vec![Some(curve), None],
            drawing_callbacks: vec![callback],
            ..PlotConfig::default()
        };
        let mut plotter = Plotter::with_config(config.clone());
        assert!(plotter.set_config(config.clone()).is_empty());

        let mut moved = config;
        moved.plot_points.push((0.0, 0.0));
        moved.parametric_functions.pop();
        assert_eq!(
            plotter.set_config(moved),
            vec![ConfigChange::ParametricFunctions, ConfigChange::PlotPoints]
        );
    }

    #[test]
    fn curves_skip_empty_slots_and_end_exactly_at_end() {
        let line = ParametricFunctionParams::new(
            ParametricFunction::from_fns(|t| t, |t| t),
            0.0,
            1.0,
            0.3,
        );
        let plotter = Plotter::with_config(PlotConfig {
            parametric_functions: vec![None, Some(line)],
            ..PlotConfig::default()
        });
        let commands = plotter.draw().expect("frame");
        assert_eq!(strokes(&commands), 4 + 1);

        let last_line = commands
            .iter()
            .rev()
            .find(|c| matches!(c, DrawCommand::LineTo { .. }))
            .expect("curve has segments");
        assert_eq!(*last_line, DrawCommand::LineTo { x: 320.0, y: 210.0 });
    }

    #[test]
    fn undrawable_curves_emit_nothing() {
        let p = ParametricFunction::from_fns(|t| t, |t| t);
        let plotter = Plotter::with_config(PlotConfig {
            parametric_functions: vec![
                Some(ParametricFunctionParams::new(p.clone(), 1.0, 1.0, 0.1)),
                Some(ParametricFunctionParams::new(p.clone(), 2.0, 1.0, 0.1)),
                Some(ParametricFunctionParams::new(p, 0.0, 1.0, 0.0)),
            ],
            ..PlotConfig::default()
        });
        assert_eq!(strokes(&plotter.draw().expect("frame")), 4);
    }

    #[test]
    fn quiver_covers_the_visible_grid() {
        // At 15 px per unit the spacing is exactly one plot unit:
        // x in [-20, 20] gives 41 columns, y in [-15.33, 15.33] gives 31 rows.
        let plotter = Plotter::with_config(PlotConfig {
            unit: Some(15.0),
            vector_fields: vec![Some(VectorFieldParams::new(ConstantField(Vector2D::new(
                3.0, 4.0,
            ))))],
            ..PlotConfig::default()
        });
        let commands = plotter.draw().expect("frame");
        assert_eq!(strokes(&commands), 4 + 41 * 31);

        // Axes take commands 2..26; the first arrow follows.
        let arrow = match (&commands[27], &commands[28]) {
            (DrawCommand::MoveTo { x: x0, y: y0 }, DrawCommand::LineTo { x: x1, y: y1 }) => {
                (x1 - x0, y1 - y0)
            }
            other => panic!("expected an arrow, got {other:?}"),
        };
        assert!((arrow.0 - 6.0).abs() < 1e-9);
        assert!((arrow.1 + 8.0).abs() < 1e-9);
    }

    #[test]
    fn quiver_omits_degenerate_samples() {
        let plotter = Plotter::with_config(PlotConfig {
            vector_fields: vec![Some(VectorFieldParams::new(ConstantField(Vector2D::ZERO)))],
            ..PlotConfig::default()
        });
        let commands = plotter.draw().expect("frame");
        assert_eq!(strokes(&commands), 4);
        assert!(all_coordinates_finite(&commands));
    }

    #[test]
    fn log_magnitude_arrows_scale_with_strength() {
        let style = PlotStyle {
            arrow_length: ArrowLength::LogMagnitude,
            ..PlotStyle::default()
        };
        let plotter = Plotter::new(
            RenderTarget::default(),
            style,
            PlotConfig {
                unit: Some(15.0),
                vector_fields: vec![Some(VectorFieldParams::new(ConstantField(Vector2D::new(
                    9.0, 0.0,
                ))))],
                ..PlotConfig::default()
            },
        );
        let commands = plotter.draw().expect("frame");
        let lengths: Vec<f64> = commands[26..]
            .windows(2)
            .filter_map(|w| match (&w[0], &w[1]) {
                (DrawCommand::MoveTo { x: x0, y: y0 }, DrawCommand::LineTo { x: x1, y: y1 })
                    if y0 == y1 =>
                {
                    Some(x1 - x0)
                }
                _ => None,
            })
            .collect();
        assert!(!lengths.is_empty());
        assert!(lengths.iter().all(|l| (l - 20.0).abs() < 1e-9));
    }

    #[test]
    fn field_lines_never_emit_non_finite_coordinates() {
        let dipole = subtract(charge_field(1.0, -1.0, 0.0), charge_field(1.0, 1.0, 0.0));
        let plotter = Plotter::with_config(PlotConfig {
            vector_fields: vec![Some(
                VectorFieldParams::new(dipole)
                    .with_field_lines([(1.0, 0.0), (0.0, 0.5), (-1.0, 0.0)])
                    .with_steps(500),
            )],
            ..PlotConfig::default()
        });
        let commands = plotter.draw().expect("frame");
        assert!(all_coordinates_finite(&commands));
    }

    #[test]
    fn field_lines_use_configured_step() {
        let field = VectorFieldParams::new(FnField(|_: f64, _: f64| Vector2D::new(1.0, 0.0)))
            .with_field_lines([(0.0, 0.0)])
            .with_step_size(0.5)
            .with_steps(2);
        // Field lines sit between the quiver and the (empty) point block.
        let plotter = Plotter::with_config(PlotConfig {
            vector_fields: vec![Some(field)],
            ..PlotConfig::default()
        });
        let commands = plotter.draw().expect("frame");
        let tail = &commands[commands.len() - 13..commands.len() - 3];
        assert_eq!(
            tail,
            &[
                DrawCommand::BeginPath,
                DrawCommand::MoveTo { x: 300.0, y: 230.0 },
                DrawCommand::LineTo { x: 310.0, y: 230.0 },
                DrawCommand::LineTo { x: 320.0, y: 230.0 },
                DrawCommand::Stroke,
                DrawCommand::BeginPath,
                DrawCommand::MoveTo { x: 300.0, y: 230.0 },
                DrawCommand::LineTo { x: 290.0, y: 230.0 },
                DrawCommand::LineTo { x: 280.0, y: 230.0 },
                DrawCommand::Stroke,
            ]
        );
    }

    #[test]
    fn points_then_callbacks_come_last() {
        let seen_unit = Rc::new(Cell::new(0.0));
        let seen = seen_unit.clone();
        let callback: SharedCallback = Arc::new(move |frame: &mut Frame, cs: &CoordinateSystem| {
            seen.set(cs.unit());
            frame.set_line_width(7.0);
        });
        let plotter = Plotter::with_config(PlotConfig {
            plot_points: vec![(0.0, 0.0)],
            drawing_callbacks: vec![callback],
            ..PlotConfig::default()
        });
        let commands = plotter.draw().expect("frame");
        let n = commands.len();
        assert_eq!(commands[n - 1], DrawCommand::SetLineWidth { width: 7.0 });
        assert_eq!(commands[n - 2], DrawCommand::Restore);
        assert_eq!(commands[n - 3], DrawCommand::Fill);
        assert_eq!(
            commands[n - 4],
            DrawCommand::Arc {
                x: 300.0,
                y: 230.0,
                radius: 4.0,
                start_angle: 0.0,
                end_angle: std::f64::consts::TAU,
            }
        );
        assert_eq!(seen_unit.get(), 20.0);
    }

    #[test]
    fn pointer_moves_are_reported_in_plot_coordinates() {
        let last = Rc::new(Cell::new((f64::NAN, f64::NAN)));
        let sink = last.clone();
        let callback: PointerCallback = Arc::new(move |x: f64, y: f64| sink.set((x, y)));
        let plotter = Plotter::with_config(PlotConfig {
            on_pointer_move: Some(callback),
            ..PlotConfig::default()
        });
        assert_eq!(plotter.pointer_moved(320.0, 210.0), (1.0, 1.0));
        assert_eq!(last.get(), (1.0, 1.0));
    }
}
