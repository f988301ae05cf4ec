//! Adapters between free-text form fields and plot configuration.
//!
//! The adapter keeps the last snapshot of the form and diffs every new
//! snapshot against it. A changed zoom and a changed function are reported
//! as separate events so the host can rescale without recompiling, and a
//! text field that fails to compile reports "no function" instead of an
//! error.

use crate::equation_engine::{evaluate_constant, CompiledExpression};
use crate::parametric::{ParametricFunction, ParametricFunctionParams};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pixels per plot unit for a zoom slider position in `[0, 1]`.
pub fn zoom_to_unit(zoom: f64) -> f64 {
    zoom * zoom * 1600.0
}

/// The raw contents of the parametric-curve form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParametricForm {
    pub x: String,
    pub y: String,
    pub start: String,
    pub end: String,
    pub step: String,
    pub zoom: f64,
}

impl Default for ParametricForm {
    fn default() -> Self {
        Self {
            x: "cos(7t)".to_string(),
            y: "sin(11t)".to_string(),
            start: "0".to_string(),
            end: "2pi".to_string(),
            step: "0.001".to_string(),
            zoom: 0.112,
        }
    }
}

impl ParametricForm {
    fn same_function_text(&self, other: &ParametricForm) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.start == other.start
            && self.end == other.end
            && self.step == other.step
    }

    /// Compiles the form into curve parameters.
    pub fn compile(&self) -> Result<ParametricFunctionParams> {
        let x = CompiledExpression::compile(&self.x, &["t"])
            .with_context(|| format!("x(t) = {}", self.x))?;
        let y = CompiledExpression::compile(&self.y, &["t"])
            .with_context(|| format!("y(t) = {}", self.y))?;
        let start = evaluate_constant(&self.start).context("start of range")?;
        let end = evaluate_constant(&self.end).context("end of range")?;
        let step = evaluate_constant(&self.step).context("step size")?;
        Ok(ParametricFunctionParams::new(
            ParametricFunction::new(x, y),
            start,
            end,
            step,
        ))
    }

    /// Like [`compile`](Self::compile), but a bad field means "no function".
    pub fn params(&self) -> Option<ParametricFunctionParams> {
        match self.compile() {
            Ok(params) => Some(params),
            Err(err) => {
                log::warn!("rejected parametric input: {err:#}");
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    /// The curve changed; `None` when the form does not describe one.
    FunctionChanged(Option<ParametricFunctionParams>),
    /// The zoom slider moved; carries the new unit in pixels.
    ZoomChanged(f64),
}

/// Diffs successive [`ParametricForm`] snapshots into [`InputEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct ParametricInput {
    form: ParametricForm,
}

impl ParametricInput {
    pub fn new(form: ParametricForm) -> Self {
        Self { form }
    }

    pub fn form(&self) -> &ParametricForm {
        &self.form
    }

    /// Events describing the current snapshot from scratch.
    pub fn initial_events(&self) -> Vec<InputEvent> {
        vec![
            InputEvent::ZoomChanged(zoom_to_unit(self.form.zoom)),
            InputEvent::FunctionChanged(self.form.params()),
        ]
    }

    /// Replaces the snapshot. Zoom changes are reported before function
    /// changes; identical snapshots produce no events.
    pub fn update(&mut self, next: ParametricForm) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if next.zoom != self.form.zoom {
            events.push(InputEvent::ZoomChanged(zoom_to_unit(next.zoom)));
        }
        if !next.same_function_text(&self.form) {
            events.push(InputEvent::FunctionChanged(next.params()));
        }
        self.form = next;
        events
    }
}

/// Holds back a value until no newer value has arrived for `delay`.
///
/// Time is supplied by the host as the duration since any fixed point, so
/// the same code runs against `performance.now()` in a browser and a fake
/// clock in tests.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> Debouncer<T> {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(250);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the wait.
    pub fn push(&mut self, value: T, now: Duration) {
        self.pending = Some((value, now + self.delay));
    }

    /// The pending value, once its wait has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        let due = matches!(&self.pending, Some((_, due)) if now >= *due);
        if due {
            self.flush()
        } else {
            None
        }
    }

    /// The pending value, regardless of time.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}
