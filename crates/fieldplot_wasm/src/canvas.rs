//! A [`Plotter`] bound to a browser canvas.

use crate::to_js;
use fieldplot_core::commands::Color;
use fieldplot_core::coords::RenderTarget;
use fieldplot_core::plotter::{PlotConfig, Plotter};
use fieldplot_core::render::{replay, Surface};
use fieldplot_core::style::PlotStyle;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

/// Executes draw commands on a canvas 2D context.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Surface for CanvasSurface {
    fn scale(&mut self, sx: f64, sy: f64) {
        if let Err(err) = self.ctx.scale(sx, sy) {
            log::warn!("canvas scale failed: {err:?}");
        }
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
    }

    fn set_fill_color(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        if let Err(err) = self.ctx.arc(x, y, radius, start_angle, end_angle) {
            log::warn!("canvas arc failed: {err:?}");
        }
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }
}

/// Owns the canvas, its context and the plotter drawing into it.
pub struct CanvasPlotter {
    canvas: HtmlCanvasElement,
    surface: CanvasSurface,
    plotter: Plotter,
}

impl CanvasPlotter {
    /// Sizes `canvas` for the reference target (logical CSS size, oversampled
    /// backing store), attaches the plotter and draws the first frame.
    pub fn bind(
        canvas: HtmlCanvasElement,
        style: PlotStyle,
        config: PlotConfig,
    ) -> Result<CanvasPlotter, JsValue> {
        let target = RenderTarget::default();
        let (device_width, device_height) = target.device_size();
        canvas.set_width(device_width);
        canvas.set_height(device_height);
        let css = canvas.style();
        css.set_property("width", &format!("{}px", target.width))?;
        css.set_property("height", &format!("{}px", target.height))?;

        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        let mut surface = CanvasSurface::new(ctx);

        let mut plotter = Plotter::new(target, style, config);
        let first = plotter.attach().map_err(to_js)?;
        replay(&first, &mut surface);

        Ok(CanvasPlotter {
            canvas,
            surface,
            plotter,
        })
    }

    pub fn plotter(&self) -> &Plotter {
        &self.plotter
    }

    /// Applies `config` and redraws.
    pub fn set_config(&mut self, config: PlotConfig) -> Result<(), JsValue> {
        self.plotter.set_config(config);
        self.redraw()
    }

    pub fn redraw(&mut self) -> Result<(), JsValue> {
        if let Some(frame) = self.plotter.redraw().map_err(to_js)? {
            replay(&frame, &mut self.surface);
        }
        Ok(())
    }

    /// Plot coordinates under a `mousemove` event, measured from the
    /// canvas's top-left corner.
    pub fn pointer(&self, event: &MouseEvent) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        self.plotter.pointer_moved(
            f64::from(event.client_x()) - rect.left(),
            f64::from(event.client_y()) - rect.top(),
        )
    }

    /// The current frame as plain JS objects, for inspection and tests.
    pub fn frame_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.plotter.draw()).map_err(to_js)
    }
}
