//! Render targets for the particle simulator.
//!
//! The simulator only knows about filled circles and rotated rectangles, so the
//! browser canvas and the test recorder share one small trait.

use std::f64::consts::TAU;

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub trait Surface {
    /// Wipe the whole drawing area before a frame.
    fn clear(&mut self);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &str, alpha: f64);
    /// Rectangle of `w` x `h` centred on (x, y), rotated by `rotation` radians.
    #[allow(clippy::too_many_arguments)]
    fn fill_rotated_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rotation: f64, color: &str, alpha: f64);
    /// Pixel dimensions changed; re-read by the simulator via `resize`.
    fn resize(&mut self, _width: f64, _height: f64) {}
}

/// Canvas 2D surface.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self { canvas, ctx }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &str, alpha: f64) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0));
        self.ctx.begin_path();
        self.ctx.arc(x, y, radius, 0.0, TAU).ok();
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
        self.ctx.set_global_alpha(1.0);
    }

    fn fill_rotated_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rotation: f64, color: &str, alpha: f64) {
        self.ctx.save();
        self.ctx.translate(x, y).ok();
        self.ctx.rotate(rotation).ok();
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0));
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(-w / 2.0, -h / 2.0, w, h);
        self.ctx.restore();
        self.ctx.set_global_alpha(1.0);
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
    }
}

/// A single draw call captured by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Circle { x: f64, y: f64, radius: f64, color: String, alpha: f64 },
    Rect { x: f64, y: f64, w: f64, h: f64, rotation: f64, color: String, alpha: f64 },
}

/// Headless surface that records draw calls; used by native tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    pub size: Option<(f64, f64)>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls since the most recent `clear`.
    pub fn last_frame(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::Clear))
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.ops[start..]
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &str, alpha: f64) {
        self.ops.push(DrawOp::Circle { x, y, radius, color: color.to_string(), alpha });
    }

    fn fill_rotated_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rotation: f64, color: &str, alpha: f64) {
        self.ops.push(DrawOp::Rect { x, y, w, h, rotation, color: color.to_string(), alpha });
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.size = Some((width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_frame_starts_after_latest_clear() {
        let mut s = RecordingSurface::new();
        s.fill_circle(1.0, 1.0, 1.0, "#fff", 1.0);
        s.clear();
        s.fill_rotated_rect(2.0, 2.0, 4.0, 2.0, 0.5, "#000", 0.5);
        assert_eq!(s.last_frame().len(), 1);
        assert!(matches!(s.last_frame()[0], DrawOp::Rect { .. }));
    }
}
