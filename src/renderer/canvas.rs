//! `CanvasRenderingContext2d` surface

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::Surface;

const LABEL_FONT: &str = "bold 16px Montserrat";

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// Look a canvas up by element id
    pub fn by_id(id: &str) -> Result<Self, JsValue> {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .ok_or_else(|| JsValue::from_str(&format!("missing canvas #{id}")))?
            .dyn_into::<HtmlCanvasElement>()?;
        Self::new(canvas)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(x as f64, y as f64, radius as f64, 0.0, std::f64::consts::TAU);
        self.ctx.fill();
        self.ctx.close_path();
    }

    fn fill_rotated_text(&mut self, text: &str, x: f32, y: f32, angle: f32, color: &str) {
        self.ctx.save();
        let _ = self.ctx.translate(x as f64, y as f64);
        let _ = self.ctx.rotate(angle as f64);
        self.ctx.set_font(LABEL_FONT);
        self.ctx.set_fill_style_str(color);
        let _ = self.ctx.fill_text(text, 0.0, 0.0);
        self.ctx.restore();
    }

    fn fill_rotated_square(&mut self, cx: f32, cy: f32, size: f32, angle: f32, color: &str) {
        self.ctx.save();
        let _ = self.ctx.translate(cx as f64, cy as f64);
        let _ = self.ctx.rotate(angle as f64);
        self.ctx.set_fill_style_str(color);
        let half = size as f64 / 2.0;
        self.ctx.fill_rect(-half, -half, size as f64, size as f64);
        self.ctx.restore();
    }
}
