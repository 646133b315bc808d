// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cairo/Pango backend for the Veneer draw contract.
//!
//! The persistent off-screen buffer is an ARGB32 [`cairo::ImageSurface`]
//! retained on the target across frames and recreated only on resize;
//! each redraw binds a fresh [`cairo::Context`] over it. Primitives
//! become path construction plus fill/stroke calls, with 1-pixel strokes
//! nudged onto pixel centers (the `+0.5` offset) to avoid anti-aliased
//! blur. Text goes through Pango layouts, which makes this one of the
//! two backends with real wrap/ellipsis support. Presenting a frame
//! paints the persistent surface onto the native window context and then
//! explicitly resets that context's clip so no state leaks into the next
//! native paint event.

use veneer_draw::{
    ClipRect, ClipRegion, ClipTracker, Color, DrawCanvas, DrawStyle, FontDesc, GradientDir,
    HAlign, ImageBits, TextFlags, path,
};

use kurbo::PathEl;

/// Persistent per-widget state: the retained ARGB32 image surface.
#[derive(Debug)]
pub struct CairoTarget {
    surface: cairo::ImageSurface,
    width: i32,
    height: i32,
}

impl CairoTarget {
    /// Bind to a drawable of the given size; `None` when the size is not
    /// realized or the surface cannot be allocated.
    pub fn new(width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let surface = match cairo::ImageSurface::create(cairo::Format::ARgb32, width, height) {
            Ok(surface) => surface,
            Err(err) => {
                log::warn!("cairo surface allocation failed ({width}x{height}): {err}");
                return None;
            }
        };
        Some(Self {
            surface,
            width,
            height,
        })
    }

    /// Current size of the bound drawable.
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// The persistent surface holding the last drawn frame.
    pub fn surface(&self) -> &cairo::ImageSurface {
        &self.surface
    }

    /// Paint the persistent surface onto a native window context and
    /// reset that context's clip, so the next native paint event starts
    /// clean.
    pub fn present(&self, dest: &cairo::Context) {
        let _ = dest.set_source_surface(&self.surface, 0.0, 0.0);
        let _ = dest.paint();
        dest.reset_clip();
    }
}

/// A draw canvas painting onto a [`CairoTarget`]'s persistent surface.
#[derive(Debug)]
pub struct CairoCanvas<'t> {
    target: &'t mut CairoTarget,
    ctx: cairo::Context,
    clip: ClipTracker,
}

fn set_source_color(ctx: &cairo::Context, color: Color) {
    ctx.set_source_rgba(
        f64::from(color.red()) / 255.0,
        f64::from(color.green()) / 255.0,
        f64::from(color.blue()) / 255.0,
        f64::from(color.alpha()) / 255.0,
    );
}

fn apply_stroke_style(ctx: &cairo::Context, style: DrawStyle, line_width: i32) {
    ctx.set_line_width(f64::from(line_width.max(1)));
    match style.dash_pattern() {
        Some(pattern) => ctx.set_dash(pattern, 0.0),
        None => ctx.set_dash(&[], 0.0),
    }
}

/// Pango font description string for a descriptor, e.g. `"Sans Bold 12"`
/// or `"Monospace 14px"` for pixel sizes.
fn pango_font_string(font: &FontDesc) -> String {
    let mut parts = vec![font.family.clone()];
    if font.bold {
        parts.push("Bold".to_string());
    }
    if font.italic {
        parts.push("Italic".to_string());
    }
    if font.size < 0 {
        parts.push(format!("{}px", -font.size));
    } else {
        parts.push(format!("{}", font.size));
    }
    parts.join(" ")
}

fn trace_path(ctx: &cairo::Context, p: &kurbo::BezPath) {
    for el in p.elements() {
        match *el {
            PathEl::MoveTo(pt) => ctx.move_to(pt.x, pt.y),
            PathEl::LineTo(pt) => ctx.line_to(pt.x, pt.y),
            PathEl::QuadTo(c, pt) => {
                // Cairo has no quadratic segment; elevate to cubic.
                let (cx, cy) = ctx.current_point().unwrap_or((c.x, c.y));
                let c1 = (cx + 2.0 * (c.x - cx) / 3.0, cy + 2.0 * (c.y - cy) / 3.0);
                let c2 = (pt.x + 2.0 * (c.x - pt.x) / 3.0, pt.y + 2.0 * (c.y - pt.y) / 3.0);
                ctx.curve_to(c1.0, c1.1, c2.0, c2.1, pt.x, pt.y);
            }
            PathEl::CurveTo(c1, c2, pt) => ctx.curve_to(c1.x, c1.y, c2.x, c2.y, pt.x, pt.y),
            PathEl::ClosePath => ctx.close_path(),
        }
    }
}

impl<'t> CairoCanvas<'t> {
    /// Bind a canvas to the target's current size with a fresh context.
    /// Returns `None` if the context cannot be created over the surface.
    pub fn new(target: &'t mut CairoTarget) -> Option<Self> {
        let ctx = match cairo::Context::new(&target.surface) {
            Ok(ctx) => ctx,
            Err(err) => {
                log::warn!("cairo context creation failed: {err}");
                return None;
            }
        };
        ctx.set_antialias(cairo::Antialias::Best);
        ctx.set_fill_rule(cairo::FillRule::EvenOdd);
        Some(Self {
            target,
            ctx,
            clip: ClipTracker::new(),
        })
    }

    fn apply_clip(&self) {
        self.ctx.reset_clip();
        let rect = match self.clip.region(self.target.width, self.target.height) {
            ClipRegion::Full => return,
            ClipRegion::Empty => ClipRect::ZERO,
            ClipRegion::Rect(r) => r,
        };
        self.ctx.rectangle(
            f64::from(rect.x1),
            f64::from(rect.y1),
            f64::from(rect.x2 - rect.x1),
            f64::from(rect.y2 - rect.y1),
        );
        self.ctx.clip();
    }

    fn fill_path(&self, p: &kurbo::BezPath, color: Color) {
        set_source_color(&self.ctx, color);
        trace_path(&self.ctx, p);
        let _ = self.ctx.fill();
    }

    fn stroke_path(&self, p: &kurbo::BezPath, color: Color, style: DrawStyle, line_width: i32) {
        set_source_color(&self.ctx, color);
        apply_stroke_style(&self.ctx, style, line_width);
        trace_path(&self.ctx, p);
        let _ = self.ctx.stroke();
    }

    fn layout_for(&self, font: &FontDesc, text: &str) -> pango::Layout {
        let layout = pangocairo::functions::create_layout(&self.ctx);
        let desc = pango::FontDescription::from_string(&pango_font_string(font));
        layout.set_font_description(Some(&desc));
        layout.set_text(text);
        layout
    }
}

impl DrawCanvas for CairoCanvas<'_> {
    fn description(&self) -> &'static str {
        "CAIRO"
    }

    fn size(&self) -> (i32, i32) {
        self.target.size()
    }

    fn update_size(&mut self, width: i32, height: i32) {
        if (width, height) == self.target.size() || width <= 0 || height <= 0 {
            return;
        }
        let Ok(surface) = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height) else {
            log::warn!("cairo surface reallocation failed ({width}x{height})");
            return;
        };
        let Ok(ctx) = cairo::Context::new(&surface) else {
            return;
        };
        ctx.set_antialias(cairo::Antialias::Best);
        ctx.set_fill_rule(cairo::FillRule::EvenOdd);
        self.target.surface = surface;
        self.target.width = width;
        self.target.height = height;
        self.ctx = ctx;
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
        set_source_color(&self.ctx, color);
        let style = if style.is_fill() { DrawStyle::Stroke } else { style };
        apply_stroke_style(&self.ctx, style, line_width);
        // Pixel-center offset keeps 1px lines from blurring across two
        // device pixels.
        self.ctx.move_to(f64::from(x1) + 0.5, f64::from(y1) + 0.5);
        self.ctx.line_to(f64::from(x2) + 0.5, f64::from(y2) + 0.5);
        let _ = self.ctx.stroke();
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
        set_source_color(&self.ctx, color);
        if style.is_fill() {
            let r = path::fill_rect(x1, y1, x2, y2);
            self.ctx.rectangle(r.x0, r.y0, r.width(), r.height());
            let _ = self.ctx.fill();
        } else {
            let r = path::stroke_rect(x1, y1, x2, y2);
            apply_stroke_style(&self.ctx, style, line_width);
            self.ctx.rectangle(r.x0, r.y0, r.width(), r.height());
            let _ = self.ctx.stroke();
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
        let (x1, x2) = path::ordered(x1, x2);
        let (y1, y2) = path::ordered(y1, y2);
        let (a1, a2) = if a1 <= a2 { (a1, a2) } else { (a2, a1) };
        let cx = (f64::from(x1) + f64::from(x2)) / 2.0;
        let cy = (f64::from(y1) + f64::from(y2)) / 2.0;
        let rx = ((f64::from(x2) - f64::from(x1)) / 2.0).max(0.5);
        let ry = ((f64::from(y2) - f64::from(y1)) / 2.0).max(0.5);
        set_source_color(&self.ctx, color);
        if style.is_fill() {
            self.ctx.move_to(cx, cy);
        }
        // Cairo angles grow clockwise in the y-down device space; the
        // contract is counter-clockwise, so negate and sweep backwards.
        let _ = self.ctx.save();
        self.ctx.translate(cx, cy);
        self.ctx.scale(rx, ry);
        self.ctx
            .arc_negative(0.0, 0.0, 1.0, -a1.to_radians(), -a2.to_radians());
        let _ = self.ctx.restore();
        if style.is_fill() {
            self.ctx.close_path();
            let _ = self.ctx.fill();
        } else {
            apply_stroke_style(&self.ctx, style, line_width);
            let _ = self.ctx.stroke();
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
        let style = if style.is_fill() { DrawStyle::Stroke } else { style };
        let p = path::cubic(x1, y1, cx1, cy1, cx2, cy2, x2, y2);
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
        let style = if style.is_fill() { DrawStyle::Stroke } else { style };
        let p = path::quadratic(x1, y1, cx, cy, x2, y2);
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
        let gradient = match dir {
            GradientDir::Horizontal => cairo::LinearGradient::new(r.x0, r.y0, r.x1, r.y0),
            GradientDir::Vertical => cairo::LinearGradient::new(r.x0, r.y0, r.x0, r.y1),
        };
        for (offset, color) in [(0.0, from), (1.0, to)] {
            gradient.add_color_stop_rgba(
                offset,
                f64::from(color.red()) / 255.0,
                f64::from(color.green()) / 255.0,
                f64::from(color.blue()) / 255.0,
                f64::from(color.alpha()) / 255.0,
            );
        }
        if self.ctx.set_source(&gradient).is_ok() {
            self.ctx.rectangle(r.x0, r.y0, r.width(), r.height());
            let _ = self.ctx.fill();
        }
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
        orientation: f64,
    ) {
        if text.is_empty() {
            return;
        }
        let layout = self.layout_for(font, text);
        if flags.contains(TextFlags::WRAP) && w > 0 {
            layout.set_width(w * pango::SCALE);
            layout.set_wrap(pango::WrapMode::Word);
        } else if flags.contains(TextFlags::ELLIPSIS) && w > 0 {
            layout.set_width(w * pango::SCALE);
            layout.set_ellipsize(pango::EllipsizeMode::End);
        }
        layout.set_alignment(match flags.halign() {
            HAlign::Left => pango::Alignment::Left,
            HAlign::Center => pango::Alignment::Center,
            HAlign::Right => pango::Alignment::Right,
        });
        let (tw, th) = layout.pixel_size();
        let bw = if w > 0 { w } else { tw };
        let bh = if h > 0 { h } else { th };

        let _ = self.ctx.save();
        if orientation != 0.0 {
            self.ctx.translate(f64::from(x), f64::from(y));
            self.ctx.rotate(-orientation.to_radians());
            self.ctx.translate(f64::from(-x), f64::from(-y));
        }
        if flags.contains(TextFlags::CLIP) {
            self.ctx.rectangle(
                f64::from(x),
                f64::from(y),
                f64::from(bw),
                f64::from(bh),
            );
            self.ctx.clip();
        }
        // Alignment inside the box is the layout's job once its width is
        // pinned; otherwise place the natural-size layout ourselves.
        let ox = if layout.width() > 0 {
            x
        } else {
            x + match flags.halign() {
                HAlign::Left => 0,
                HAlign::Center => (bw - tw) / 2,
                HAlign::Right => bw - tw,
            }
        };
        let oy = y + if flags.contains(TextFlags::LAYOUT_CENTER) {
            (bh - th) / 2
        } else {
            0
        };
        set_source_color(&self.ctx, color);
        self.ctx.move_to(f64::from(ox), f64::from(oy));
        pangocairo::functions::show_layout(&self.ctx, &layout);
        let _ = self.ctx.restore();
    }

    fn text_extents(&self, font: &FontDesc, text: &str) -> (i32, i32) {
        if text.is_empty() {
            return (0, 0);
        }
        self.layout_for(font, text).pixel_size()
    }

    fn draw_image(
        &mut self,
        image: &ImageBits,
        inactive: bool,
        background: Color,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) {
        let pixels = image.resolve_rgba8(inactive, background);
        let (iw, ih) = (
            i32::try_from(image.width()).unwrap_or(0),
            i32::try_from(image.height()).unwrap_or(0),
        );
        if iw <= 0 || ih <= 0 {
            return;
        }
        let Ok(mut src) = cairo::ImageSurface::create(cairo::Format::ARgb32, iw, ih) else {
            return;
        };
        let stride = src.stride() as usize;
        {
            let Ok(mut data) = src.data() else { return };
            // ARGB32 is premultiplied, native-endian packed: explicit
            // conversion from the canonical straight-alpha RGBA8.
            for row in 0..ih as usize {
                for col in 0..iw as usize {
                    let s = (row * iw as usize + col) * 4;
                    let a = u32::from(pixels[s + 3]);
                    let premul = |c: u8| (u32::from(c) * a + 127) / 255;
                    let argb =
                        (a << 24) | (premul(pixels[s]) << 16) | (premul(pixels[s + 1]) << 8)
                            | premul(pixels[s + 2]);
                    let d = row * stride + col * 4;
                    data[d..d + 4].copy_from_slice(&argb.to_ne_bytes());
                }
            }
        }
        let _ = self.ctx.save();
        if w > 0 && h > 0 && (w != iw || h != ih) {
            // This backend supports arbitrary scaling.
            self.ctx.translate(f64::from(x), f64::from(y));
            self.ctx
                .scale(f64::from(w) / f64::from(iw), f64::from(h) / f64::from(ih));
            let _ = self.ctx.set_source_surface(&src, 0.0, 0.0);
        } else {
            let _ = self
                .ctx
                .set_source_surface(&src, f64::from(x), f64::from(y));
        }
        let _ = self.ctx.paint();
        let _ = self.ctx.restore();
    }

    fn flush(&mut self) {
        self.ctx.reset_clip();
        self.clip.reset();
        self.target.surface.flush();
    }
}
