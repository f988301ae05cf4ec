//! WASM bridge exposing the fieldplot demos to JavaScript.
//!
//! Each demo owns one `<canvas>` for its whole life. JavaScript forwards
//! form input, slider values, pointer events and timer ticks; the demo
//! updates its core state and replays the resulting frame onto the canvas.

mod canvas;
mod demos;
mod logger;

pub use canvas::{CanvasPlotter, CanvasSurface};
pub use demos::{field_presets, WasmElectricPlot, WasmHeatPlot, WasmOdePlot, WasmParametricPlot};

use fieldplot_core::style::PlotStyle;
use std::fmt::Display;
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// Installs the panic hook and console logger. Safe to call repeatedly.
pub(crate) fn init() {
    console_error_panic_hook::set_once();
    logger::init();
}

pub(crate) fn to_js(err: impl Display) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

/// `undefined` and `null` select the default style; anything else must
/// deserialize as a (possibly partial) [`PlotStyle`].
pub(crate) fn parse_style(value: JsValue) -> Result<PlotStyle, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(PlotStyle::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(to_js)
}

/// Host timestamps (`performance.now()`) to the debouncer clock. Negative
/// or non-finite readings clamp to zero.
pub(crate) fn duration_from_ms(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_default()
}
