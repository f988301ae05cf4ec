//! Recording frames and replaying them onto a drawing surface.
//!
//! This module provides:
//! - [`Frame`], the recorder the plotter and drawing callbacks write into
//! - [`Surface`], implemented by anything that can execute draw commands
//! - [`replay`] to dispatch a recorded frame onto a surface
//! - [`RecordingSurface`], a surface that logs every call (headless hosts
//!   and tests)

use crate::commands::{Color, DrawCommand};
use crate::coords::CoordinateSystem;
use crate::vector::Vector2D;
use std::f64::consts::TAU;

/// Something that can execute draw commands, e.g. a canvas 2D context.
///
/// Path commands accumulate into the current path until `stroke` or `fill`.
pub trait Surface {
    /// Scale the coordinate system. Applied once, before the first frame.
    fn scale(&mut self, sx: f64, sy: f64);

    /// Clear a rectangle to transparent.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Push the current graphics state.
    fn save(&mut self);

    /// Pop the graphics state pushed by the matching `save`.
    fn restore(&mut self);

    fn set_line_width(&mut self, width: f64);

    fn set_stroke_color(&mut self, color: Color);

    fn set_fill_color(&mut self, color: Color);

    /// Start a new, empty path.
    fn begin_path(&mut self);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64);

    fn close_path(&mut self);

    fn stroke(&mut self);

    fn fill(&mut self);
}

/// Dispatches `commands` onto `surface` in order.
pub fn replay<S: Surface + ?Sized>(commands: &[DrawCommand], surface: &mut S) {
    for command in commands {
        match *command {
            DrawCommand::Scale { x, y } => surface.scale(x, y),
            DrawCommand::ClearRect {
                x,
                y,
                width,
                height,
            } => surface.clear_rect(x, y, width, height),
            DrawCommand::Save => surface.save(),
            DrawCommand::Restore => surface.restore(),
            DrawCommand::SetLineWidth { width } => surface.set_line_width(width),
            DrawCommand::SetStrokeColor { color } => surface.set_stroke_color(color),
            DrawCommand::SetFillColor { color } => surface.set_fill_color(color),
            DrawCommand::BeginPath => surface.begin_path(),
            DrawCommand::MoveTo { x, y } => surface.move_to(x, y),
            DrawCommand::LineTo { x, y } => surface.line_to(x, y),
            DrawCommand::Arc {
                x,
                y,
                radius,
                start_angle,
                end_angle,
            } => surface.arc(x, y, radius, start_angle, end_angle),
            DrawCommand::ClosePath => surface.close_path(),
            DrawCommand::Stroke => surface.stroke(),
            DrawCommand::Fill => surface.fill(),
        }
    }
}

/// An in-progress frame. Screen-space methods take logical pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    pub fn save(&mut self) {
        self.push(DrawCommand::Save);
    }

    pub fn restore(&mut self) {
        self.push(DrawCommand::Restore);
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.push(DrawCommand::SetLineWidth { width });
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.push(DrawCommand::SetStrokeColor { color });
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.push(DrawCommand::SetFillColor { color });
    }

    pub fn begin_path(&mut self) {
        self.push(DrawCommand::BeginPath);
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::LineTo { x, y });
    }

    pub fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        self.push(DrawCommand::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
        });
    }

    pub fn close_path(&mut self) {
        self.push(DrawCommand::ClosePath);
    }

    pub fn stroke(&mut self) {
        self.push(DrawCommand::Stroke);
    }

    pub fn fill(&mut self) {
        self.push(DrawCommand::Fill);
    }

    /// Strokes a single segment between two screen points.
    pub fn segment(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.begin_path();
        self.move_to(from.0, from.1);
        self.line_to(to.0, to.1);
        self.stroke();
    }

    /// Fills a full circle centred on a screen point.
    pub fn disc(&mut self, x: f64, y: f64, radius: f64) {
        self.begin_path();
        self.arc(x, y, radius, 0.0, TAU);
        self.fill();
    }

    /// Strokes `points` (plot coordinates) as one path.
    ///
    /// Points that map to non-finite pixels are skipped and the path resumes
    /// with a `MoveTo` at the next finite point. Nothing is emitted when no
    /// point is finite.
    pub fn polyline(&mut self, cs: &CoordinateSystem, points: &[Vector2D]) {
        let mut pen_down = false;
        let mut started = false;
        for p in points {
            let (sx, sy) = cs.to_screen(p.x, p.y);
            if !(sx.is_finite() && sy.is_finite()) {
                pen_down = false;
                continue;
            }
            if !started {
                self.begin_path();
                started = true;
            }
            if pen_down {
                self.line_to(sx, sy);
            } else {
                self.move_to(sx, sy);
                pen_down = true;
            }
        }
        if started {
            self.stroke();
        }
    }
}

/// A [`Surface`] that records each call as text, in the order received.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub calls: Vec<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `stroke()` and `fill()` calls so far.
    pub fn paint_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| c.as_str() == "stroke()" || c.as_str() == "fill()")
            .count()
    }
}

impl Surface for RecordingSurface {
    fn scale(&mut self, sx: f64, sy: f64) {
        self.calls.push(format!("scale({sx}, {sy})"));
    }
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.calls
            .push(format!("clear_rect({x}, {y}, {width}, {height})"));
    }
    fn save(&mut self) {
        self.calls.push("save()".into());
    }
    fn restore(&mut self) {
        self.calls.push("restore()".into());
    }
    fn set_line_width(&mut self, width: f64) {
        self.calls.push(format!("set_line_width({width})"));
    }
    fn set_stroke_color(&mut self, color: Color) {
        self.calls.push(format!("set_stroke_color({color})"));
    }
    fn set_fill_color(&mut self, color: Color) {
        self.calls.push(format!("set_fill_color({color})"));
    }
    fn begin_path(&mut self) {
        self.calls.push("begin_path()".into());
    }
    fn move_to(&mut self, x: f64, y: f64) {
        self.calls.push(format!("move_to({x}, {y})"));
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.calls.push(format!("line_to({x}, {y})"));
    }
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        self.calls
            .push(format!("arc({x}, {y}, {radius}, {start_angle}, {end_angle})"));
    }
    fn close_path(&mut self) {
        self.calls.push("close_path()".into());
    }
    fn stroke(&mut self) {
        self.calls.push("stroke()".into());
    }
    fn fill(&mut self) {
        self.calls.push("fill()".into());
    }
}
