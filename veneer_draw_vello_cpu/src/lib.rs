// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vello CPU backend for the Veneer draw contract.
//!
//! Lowers the contract's primitives onto the sparse-strips
//! [`vello_cpu::RenderContext`]. The render context is rebuilt for every
//! redraw (its command stream is frame-scoped); the persistent surface is
//! the front RGBA8 buffer that [`DrawCanvas::flush`] renders into, which
//! the embedding window system blits on screen.
//!
//! Text has no native engine on this backend: it is synthesized from the
//! embedded bitmap face into an RGBA buffer and drawn as an image paint.
//! Wrap, ellipsis, and rotation are therefore unsupported here, as is
//! image scaling (native size only) — documented capability gaps.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use kurbo::PathEl;
use peniko::{
    Blob, ColorStop, Extend, Fill, Gradient, GradientKind, ImageAlphaType, ImageData, ImageFormat,
    ImageSampler, LinearGradientPosition,
};
use vello_cpu::kurbo::{Affine as CpuAffine, BezPath as CpuBezPath, Rect, Stroke};
use vello_cpu::{
    Image as CpuImage, ImageSource, Pixmap, RenderContext, RenderMode, RenderSettings,
};

use veneer_draw::{
    BitmapFont, ClipRect, ClipRegion, ClipTracker, Color, DrawCanvas, DrawStyle, FontDesc,
    GradientDir, HAlign, ImageBits, TextFlags, path,
};

/// The persistent per-widget state: dimensions plus the front buffer the
/// flushed frame is rendered into.
#[derive(Clone, Debug, Default)]
pub struct VelloCpuTarget {
    width: i32,
    height: i32,
    /// Straight-alpha RGBA8 front buffer, refreshed on flush.
    front: Vec<u8>,
}

impl VelloCpuTarget {
    /// Bind to a drawable of the given size. Returns `None` when the size
    /// is non-positive or exceeds the renderer's 16-bit surface limit.
    pub fn new(width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 || width > i32::from(u16::MAX) || height > i32::from(u16::MAX)
        {
            return None;
        }
        Some(Self {
            width,
            height,
            front: Vec::new(),
        })
    }

    /// Current size of the bound drawable.
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// The visible surface as straight-alpha RGBA8 bytes; empty until the
    /// first flush.
    pub fn front(&self) -> &[u8] {
        &self.front
    }
}

/// A draw canvas lowering onto a frame-scoped [`RenderContext`].
pub struct VelloCpuCanvas<'t> {
    target: &'t mut VelloCpuTarget,
    ctx: RenderContext,
    clip: ClipTracker,
    layer_pushed: bool,
}

impl core::fmt::Debug for VelloCpuCanvas<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("VelloCpuCanvas { .. }")
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "dimensions are validated against the u16 surface limit at target creation"
)]
fn dim_u16(v: i32) -> u16 {
    v as u16
}

/// Bridge a contract-built path into the renderer's kurbo types.
fn to_cpu_path(p: &kurbo::BezPath) -> CpuBezPath {
    let mut out = CpuBezPath::new();
    for el in p.elements() {
        match *el {
            PathEl::MoveTo(pt) => out.move_to((pt.x, pt.y)),
            PathEl::LineTo(pt) => out.line_to((pt.x, pt.y)),
            PathEl::QuadTo(c, pt) => out.quad_to((c.x, c.y), (pt.x, pt.y)),
            PathEl::CurveTo(c1, c2, pt) => out.curve_to((c1.x, c1.y), (c2.x, c2.y), (pt.x, pt.y)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn to_peniko_color(color: Color) -> peniko::Color {
    let [r, g, b, a] = color.to_rgba8();
    peniko::Color::from_rgba8(r, g, b, a)
}

fn stroke_for(style: DrawStyle, line_width: i32) -> Stroke {
    let mut stroke = Stroke::new(f64::from(line_width.max(1)));
    if let Some(pattern) = style.dash_pattern() {
        stroke.dash_pattern = pattern.iter().copied().collect();
        stroke.dash_offset = 0.0;
    }
    stroke
}

impl<'t> VelloCpuCanvas<'t> {
    /// Bind a canvas to the target's current size with a fresh render
    /// context.
    pub fn new(target: &'t mut VelloCpuTarget) -> Self {
        let settings = RenderSettings {
            // Stay on the u8 pipeline so output is stable across feature
            // unification in the workspace.
            render_mode: RenderMode::OptimizeSpeed,
            ..RenderSettings::default()
        };
        let ctx = RenderContext::new_with(dim_u16(target.width), dim_u16(target.height), settings);
        Self {
            target,
            ctx,
            clip: ClipTracker::new(),
            layer_pushed: false,
        }
    }

    /// Re-apply the tracked clip as a renderer layer.
    fn apply_clip(&mut self) {
        if self.layer_pushed {
            self.ctx.pop_layer();
            self.layer_pushed = false;
        }
        let rect = match self.clip.region(self.target.width, self.target.height) {
            ClipRegion::Full => return,
            // A zero-area clip path suppresses everything drawn below it.
            ClipRegion::Empty => ClipRect::ZERO,
            ClipRegion::Rect(r) => r,
        };
        let mut p = CpuBezPath::new();
        p.move_to((f64::from(rect.x1), f64::from(rect.y1)));
        p.line_to((f64::from(rect.x2), f64::from(rect.y1)));
        p.line_to((f64::from(rect.x2), f64::from(rect.y2)));
        p.line_to((f64::from(rect.x1), f64::from(rect.y2)));
        p.close_path();
        self.ctx.push_layer(Some(&p), None, None, None, None);
        self.layer_pushed = true;
    }

    fn fill_path(&mut self, p: &kurbo::BezPath, color: Color) {
        self.ctx.set_fill_rule(Fill::EvenOdd);
        self.ctx.set_paint(to_peniko_color(color));
        self.ctx.fill_path(&to_cpu_path(p));
    }

    fn stroke_path(&mut self, p: &kurbo::BezPath, color: Color, style: DrawStyle, line_width: i32) {
        self.ctx.set_paint(to_peniko_color(color));
        self.ctx.set_stroke(stroke_for(style, line_width));
        self.ctx.stroke_path(&to_cpu_path(p));
    }

    /// Draw straight-alpha RGBA8 pixels as an image paint at `(x, y)`.
    fn blit_rgba(&mut self, pixels: Vec<u8>, w: u32, h: u32, x: i32, y: i32) {
        if w == 0 || h == 0 {
            return;
        }
        let image_data = ImageData {
            data: Blob::from(pixels),
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            width: w,
            height: h,
        };
        let source = ImageSource::from_peniko_image_data(&image_data);
        let image_paint = CpuImage {
            image: source,
            sampler: ImageSampler::default(),
        };
        self.ctx
            .set_transform(CpuAffine::translate((f64::from(x), f64::from(y))));
        self.ctx.set_paint(image_paint);
        let rect = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        self.ctx.fill_rect(&rect);
        self.ctx.set_transform(CpuAffine::IDENTITY);
    }
}

impl DrawCanvas for VelloCpuCanvas<'_> {
    fn description(&self) -> &'static str {
        "VELLOCPU"
    }

    fn size(&self) -> (i32, i32) {
        self.target.size()
    }

    fn update_size(&mut self, width: i32, height: i32) {
        if (width, height) == self.target.size() || width <= 0 || height <= 0 {
            return;
        }
        if width > i32::from(u16::MAX) || height > i32::from(u16::MAX) {
            return;
        }
        self.target.width = width;
        self.target.height = height;
        self.target.front.clear();
        let settings = RenderSettings {
            render_mode: RenderMode::OptimizeSpeed,
            ..RenderSettings::default()
        };
        self.ctx = RenderContext::new_with(dim_u16(width), dim_u16(height), settings);
        self.layer_pushed = false;
        self.apply_clip();
    }

    fn set_clip_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.clip.set(x1, y1, x2, y2);
        self.apply_clip();
    }

    fn reset_clip(&mut self) {
        self.clip.reset();
        self.apply_clip();
    }

    fn clip_rect(&self) -> ClipRect {
        self.clip.get()
    }

    fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        style: DrawStyle,
        line_width: i32,
    ) {
        let ((x1, y1), (x2, y2)) = if (x1, y1) <= (x2, y2) {
            ((x1, y1), (x2, y2))
        } else {
            ((x2, y2), (x1, y1))
        };
        let mut p = kurbo::BezPath::new();
        // Land on pixel centers so 1px lines stay crisp.
        p.move_to((f64::from(x1) + 0.5, f64::from(y1) + 0.5));
        p.line_to((f64::from(x2) + 0.5, f64::from(y2) + 0.5));
        let style = if style.is_fill() { DrawStyle::Stroke } else { style };
        self.stroke_path(&p, color, style, line_width);
    }

    fn draw_rect(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        style: DrawStyle,
        line_width: i32,
    ) {
        if style.is_fill() {
            let r = path::fill_rect(x1, y1, x2, y2);
            self.ctx.set_fill_rule(Fill::EvenOdd);
            self.ctx.set_paint(to_peniko_color(color));
            self.ctx
                .fill_rect(&Rect::new(r.x0, r.y0, r.x1, r.y1));
        } else {
            let r = path::stroke_rect(x1, y1, x2, y2);
            let mut p = kurbo::BezPath::new();
            p.move_to((r.x0, r.y0));
            p.line_to((r.x1, r.y0));
            p.line_to((r.x1, r.y1));
            p.line_to((r.x0, r.y1));
            p.close_path();
            self.stroke_path(&p, color, style, line_width);
        }
    }

    fn draw_arc(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        a1: f64,
        a2: f64,
        color: Color,
        style: DrawStyle,
        line_width: i32,
    ) {
        let (a1, a2) = if a1 <= a2 { (a1, a2) } else { (a2, a1) };
        let p = path::arc(x1, y1, x2, y2, a1, a2, style.is_fill());
        if style.is_fill() {
            self.fill_path(&p, color);
        } else {
            self.stroke_path(&p, color, style, line_width);
        }
    }

    fn draw_polygon(
        &mut self,
        points: &[(i32, i32)],
        color: Color,
        style: DrawStyle,
        line_width: i32,
    ) {
        if points.len() < 2 {
            return;
        }
        let p = path::polygon(points, style.is_fill());
        if style.is_fill() {
            self.fill_path(&p, color);
        } else {
            self.stroke_path(&p, color, style, line_width);
        }
    }

    fn draw_rounded_rect(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        radius: i32,
        color: Color,
        style: DrawStyle,
        line_width: i32,
    ) {
        let p = path::rounded_rect(x1, y1, x2, y2, radius);
        if style.is_fill() {
            self.fill_path(&p, color);
        } else {
            self.stroke_path(&p, color, style, line_width);
        }
    }

    fn draw_bezier(
        &mut self,
        x1: i32,
        y1: i32,
        cx1: i32,
        cy1: i32,
        cx2: i32,
        cy2: i32,
        x2: i32,
        y2: i32,
        color: Color,
        style: DrawStyle,
        line_width: i32,
    ) {
        let p = path::cubic(x1, y1, cx1, cy1, cx2, cy2, x2, y2);
        let style = if style.is_fill() { DrawStyle::Stroke } else { style };
        self.stroke_path(&p, color, style, line_width);
    }

    fn draw_quad_bezier(
        &mut self,
        x1: i32,
        y1: i32,
        cx: i32,
        cy: i32,
        x2: i32,
        y2: i32,
        color: Color,
        style: DrawStyle,
        line_width: i32,
    ) {
        let p = path::quadratic(x1, y1, cx, cy, x2, y2);
        let style = if style.is_fill() { DrawStyle::Stroke } else { style };
        self.stroke_path(&p, color, style, line_width);
    }

    fn draw_gradient(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        from: Color,
        to: Color,
        dir: GradientDir,
    ) {
        let r = path::fill_rect(x1, y1, x2, y2);
        let (start, end) = match dir {
            GradientDir::Horizontal => (
                kurbo::Point::new(r.x0, r.y0),
                kurbo::Point::new(r.x1, r.y0),
            ),
            GradientDir::Vertical => (
                kurbo::Point::new(r.x0, r.y0),
                kurbo::Point::new(r.x0, r.y1),
            ),
        };
        let stops = [
            ColorStop::from((0.0, to_peniko_color(from))),
            ColorStop::from((1.0, to_peniko_color(to))),
        ];
        let gradient = Gradient {
            kind: GradientKind::Linear(LinearGradientPosition::new(start, end)),
            extend: Extend::Pad,
            stops: stops.as_slice().into(),
            ..Gradient::default()
        };
        self.ctx.set_paint(gradient);
        self.ctx.fill_rect(&Rect::new(r.x0, r.y0, r.x1, r.y1));
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color,
        font: &FontDesc,
        flags: TextFlags,
        _orientation: f64,
    ) {
        // Rotation is not supported on the synthesized-text path.
        if text.is_empty() {
            return;
        }
        let scale = BitmapFont::scale_for(font);
        let mask = BitmapFont::render_mask(text, scale, flags.halign());
        let (tw, th) = (mask.width, mask.height);
        if tw <= 0 || th <= 0 {
            return;
        }
        let bw = if w > 0 { w } else { tw };
        let bh = if h > 0 { h } else { th };
        let ox = x + match flags.halign() {
            HAlign::Left => 0,
            HAlign::Center => (bw - tw) / 2,
            HAlign::Right => bw - tw,
        };
        let oy = y + if flags.contains(TextFlags::LAYOUT_CENTER) {
            (bh - th) / 2
        } else {
            0
        };
        let [r, g, b, a] = color.to_rgba8();
        let mut pixels = Vec::with_capacity(mask.coverage.len() * 4);
        for &cov in &mask.coverage {
            if cov == 0 {
                pixels.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                pixels.extend_from_slice(&[r, g, b, a]);
            }
        }
        let saved = flags.contains(TextFlags::CLIP).then(|| self.clip.get());
        if let Some(prev) = saved {
            let bbox = ClipRect::new(x, y, x + bw, y + bh);
            let clip = if prev.is_zero() { bbox } else { prev.intersect(bbox) };
            self.set_clip_rect(clip.x1, clip.y1, clip.x2, clip.y2);
        }
        self.blit_rgba(
            pixels,
            u32::try_from(tw).unwrap_or(0),
            u32::try_from(th).unwrap_or(0),
            ox,
            oy,
        );
        if let Some(prev) = saved {
            if prev.is_zero() {
                self.reset_clip();
            } else {
                self.set_clip_rect(prev.x1, prev.y1, prev.x2, prev.y2);
            }
        }
    }

    fn text_extents(&self, font: &FontDesc, text: &str) -> (i32, i32) {
        BitmapFont::text_extents(text, BitmapFont::scale_for(font))
    }

    fn draw_image(
        &mut self,
        image: &ImageBits,
        inactive: bool,
        background: Color,
        x: i32,
        y: i32,
        _w: i32,
        _h: i32,
    ) {
        // Native size only; scale requests are ignored on this backend.
        let pixels = image.resolve_rgba8(inactive, background);
        self.blit_rgba(pixels, image.width(), image.height(), x, y);
    }

    fn flush(&mut self) {
        if self.layer_pushed {
            self.ctx.pop_layer();
            self.layer_pushed = false;
        }
        self.clip.reset();
        let mut pixmap = Pixmap::new(dim_u16(self.target.width), dim_u16(self.target.height));
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        let unpremul = pixmap.take_unpremultiplied();
        let mut bytes = Vec::with_capacity(unpremul.len() * 4);
        for p in unpremul {
            bytes.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        self.target.front = bytes;
    }
}
