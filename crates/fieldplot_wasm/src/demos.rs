//! The four bundled visualizations as JavaScript classes.

use crate::canvas::CanvasPlotter;
use crate::{duration_from_ms, init, parse_style, to_js};
use anyhow::Context;
use fieldplot_core::demos::{ElectricDemo, HeatDemo, OdeDemo};
use fieldplot_core::input::{Debouncer, InputEvent, ParametricForm, ParametricInput};
use fieldplot_core::plotter::PlotConfig;
use fieldplot_core::presets::FieldPreset;
use js_sys::Float64Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent};

/// A parametric curve typed into a form.
#[wasm_bindgen]
pub struct WasmParametricPlot {
    canvas: CanvasPlotter,
    input: ParametricInput,
    pending: Debouncer<ParametricForm>,
    config: PlotConfig,
}

#[wasm_bindgen]
impl WasmParametricPlot {
    /// Starts from the default form (`cos(7t)`, `sin(11t)` over `[0, 2pi]`).
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, style: JsValue) -> Result<WasmParametricPlot, JsValue> {
        init();
        let input = ParametricInput::default();
        let mut config = PlotConfig::default();
        apply_events(&mut config, input.initial_events());
        let canvas = CanvasPlotter::bind(canvas, parse_style(style)?, config.clone())?;
        Ok(WasmParametricPlot {
            canvas,
            input,
            pending: Debouncer::default(),
            config,
        })
    }

    /// Queues a form snapshot; it applies once no newer one arrives for
    /// the debounce delay. `now_ms` is `performance.now()`.
    pub fn input(&mut self, form: JsValue, now_ms: f64) -> Result<(), JsValue> {
        let form: ParametricForm = serde_wasm_bindgen::from_value(form).map_err(to_js)?;
        self.pending.push(form, duration_from_ms(now_ms));
        Ok(())
    }

    /// Applies the queued snapshot if its delay has passed. Returns whether
    /// anything was applied.
    pub fn poll(&mut self, now_ms: f64) -> Result<bool, JsValue> {
        match self.pending.poll(duration_from_ms(now_ms)) {
            Some(form) => self.apply_form(form).map(|()| true),
            None => Ok(false),
        }
    }

    /// Applies a form snapshot immediately, discarding anything queued.
    pub fn apply(&mut self, form: JsValue) -> Result<(), JsValue> {
        let form: ParametricForm = serde_wasm_bindgen::from_value(form).map_err(to_js)?;
        self.pending.flush();
        self.apply_form(form)
    }

    /// Whether the current form describes a drawable curve.
    pub fn has_function(&self) -> bool {
        self.config.parametric_functions.iter().any(Option::is_some)
    }

    pub fn frame(&self) -> Result<JsValue, JsValue> {
        self.canvas.frame_js()
    }
}

impl WasmParametricPlot {
    fn apply_form(&mut self, form: ParametricForm) -> Result<(), JsValue> {
        let events = self.input.update(form);
        if events.is_empty() {
            return Ok(());
        }
        apply_events(&mut self.config, events);
        self.canvas.set_config(self.config.clone())
    }
}

fn apply_events(config: &mut PlotConfig, events: Vec<InputEvent>) {
    for event in events {
        match event {
            InputEvent::ZoomChanged(unit) => config.unit = Some(unit),
            InputEvent::FunctionChanged(params) => config.parametric_functions = vec![params],
        }
    }
}

#[derive(Serialize)]
struct PresetOption {
    name: &'static str,
    label: &'static str,
}

/// The electric-field presets as `[{ name, label }]`, in menu order.
#[wasm_bindgen]
pub fn field_presets() -> Result<JsValue, JsValue> {
    let options: Vec<PresetOption> = FieldPreset::ALL
        .into_iter()
        .map(|preset| PresetOption {
            name: preset.name(),
            label: preset.label(),
        })
        .collect();
    serde_wasm_bindgen::to_value(&options).map_err(to_js)
}

/// Point-charge fields with a field line through the pointer.
#[wasm_bindgen]
pub struct WasmElectricPlot {
    canvas: CanvasPlotter,
    demo: ElectricDemo,
}

#[wasm_bindgen]
impl WasmElectricPlot {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, style: JsValue) -> Result<WasmElectricPlot, JsValue> {
        init();
        let demo = ElectricDemo::default();
        let canvas = CanvasPlotter::bind(canvas, parse_style(style)?, demo.config())?;
        Ok(WasmElectricPlot { canvas, demo })
    }

    /// One of `single`, `dipole`, `double`, `imbalancedDipole`.
    pub fn set_preset(&mut self, name: &str) -> Result<(), JsValue> {
        let preset: FieldPreset = name
            .parse()
            .context("electric field preset")
            .map_err(to_js)?;
        self.demo.set_preset(preset);
        self.refresh()
    }

    pub fn preset(&self) -> String {
        self.demo.preset().name().to_string()
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), JsValue> {
        self.demo.set_zoom(zoom);
        self.refresh()
    }

    pub fn set_length_factor(&mut self, length_factor: f64) -> Result<(), JsValue> {
        self.demo.set_length_factor(length_factor);
        self.refresh()
    }

    /// Forward `mousemove` events from the canvas here.
    pub fn mouse_move(&mut self, event: &MouseEvent) -> Result<(), JsValue> {
        let (x, y) = self.canvas.pointer(event);
        self.demo.pointer_moved(x, y);
        self.refresh()
    }

    pub fn frame(&self) -> Result<JsValue, JsValue> {
        self.canvas.frame_js()
    }

    fn refresh(&mut self) -> Result<(), JsValue> {
        self.canvas.set_config(self.demo.config())
    }
}

/// `y'' = f(y, y')` integrated both ways from `(0, y0)`.
#[wasm_bindgen]
pub struct WasmOdePlot {
    canvas: CanvasPlotter,
    demo: OdeDemo,
}

#[wasm_bindgen]
impl WasmOdePlot {
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        style: JsValue,
        rhs: &str,
        y0: f64,
    ) -> Result<WasmOdePlot, JsValue> {
        init();
        let demo = OdeDemo::new(rhs, y0).map_err(to_js)?;
        let canvas = CanvasPlotter::bind(canvas, parse_style(style)?, demo.config())?;
        Ok(WasmOdePlot { canvas, demo })
    }

    /// Right-hand side in `y` and `yp`. On error the old one keeps drawing.
    pub fn set_rhs(&mut self, rhs: &str) -> Result<(), JsValue> {
        self.demo.set_rhs(rhs).map_err(to_js)?;
        self.refresh()
    }

    /// Initial value as typed; unreadable text counts as 0.
    pub fn set_y0(&mut self, text: &str) -> Result<(), JsValue> {
        self.demo.set_y0_text(text);
        self.refresh()
    }

    pub fn y0(&self) -> f64 {
        self.demo.y0()
    }

    pub fn frame(&self) -> Result<JsValue, JsValue> {
        self.canvas.frame_js()
    }

    fn refresh(&mut self) -> Result<(), JsValue> {
        self.canvas.set_config(self.demo.config())
    }
}

/// The heat equation, advanced by a JavaScript timer.
#[wasm_bindgen]
pub struct WasmHeatPlot {
    canvas: CanvasPlotter,
    demo: HeatDemo,
}

#[wasm_bindgen]
impl WasmHeatPlot {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, style: JsValue) -> Result<WasmHeatPlot, JsValue> {
        init();
        let demo = HeatDemo::default();
        let canvas = CanvasPlotter::bind(canvas, parse_style(style)?, demo.config())?;
        Ok(WasmHeatPlot { canvas, demo })
    }

    /// Suggested `setInterval` period in milliseconds.
    pub fn tick_interval_ms(&self) -> f64 {
        self.demo.heat().config().tick_interval.as_secs_f64() * 1000.0
    }

    /// Advances one time step and redraws.
    pub fn tick(&mut self) -> Result<(), JsValue> {
        self.demo.tick();
        self.canvas.set_config(self.demo.config())
    }

    pub fn ticks(&self) -> f64 {
        self.demo.heat().ticks() as f64
    }

    /// The current profile as interleaved `x, u(x)` pairs.
    pub fn profile(&self) -> Float64Array {
        let flat: Vec<f64> = self
            .demo
            .heat()
            .samples()
            .into_iter()
            .flat_map(|p| [p.x, p.y])
            .collect();
        Float64Array::from(flat.as_slice())
    }

    pub fn frame(&self) -> Result<JsValue, JsValue> {
        self.canvas.frame_js()
    }
}
