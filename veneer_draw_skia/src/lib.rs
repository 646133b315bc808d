// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skia backend for the Veneer draw contract.
//!
//! A thin adapter onto a `skia-safe` raster surface retained across
//! frames — the high-level-painter model: rounded rectangles, Bézier
//! curves, dash path-effects, arbitrary image scaling, and styled text
//! are all native here, so nothing needs to be synthesized. Flush
//! snapshots the backing surface; the embedding widget toolkit schedules
//! a repaint that copies the snapshot to the screen.

use kurbo::PathEl;
use skia_safe as sk;

use veneer_draw::{
    ClipRect, ClipRegion, ClipTracker, Color, DrawCanvas, DrawStyle, FontDesc, GradientDir,
    HAlign, ImageBits, TextFlags, path,
};

/// Persistent per-widget state: the backing raster surface and the last
/// flushed frame awaiting presentation.
pub struct SkiaTarget {
    surface: sk::Surface,
    width: i32,
    height: i32,
    last_frame: Option<sk::Image>,
}

impl std::fmt::Debug for SkiaTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkiaTarget")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("last_frame", &self.last_frame.is_some())
            .finish()
    }
}

impl SkiaTarget {
    /// Bind to a drawable of the given size; `None` when the size is not
    /// realized yet or the surface allocation fails.
    pub fn new(width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let Some(surface) = sk::surfaces::raster_n32_premul((width, height)) else {
            log::warn!("skia raster surface allocation failed ({width}x{height})");
            return None;
        };
        Some(Self {
            surface,
            width,
            height,
            last_frame: None,
        })
    }

    /// Current size of the bound drawable.
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// The last flushed frame, if any redraw has completed yet.
    pub fn last_frame(&self) -> Option<&sk::Image> {
        self.last_frame.as_ref()
    }
}

/// A draw canvas painting onto a [`SkiaTarget`]'s backing surface.
pub struct SkiaCanvas<'t> {
    target: &'t mut SkiaTarget,
    clip: ClipTracker,
    clip_saved: bool,
}

impl std::fmt::Debug for SkiaCanvas<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SkiaCanvas { .. }")
    }
}

fn to_sk_color(color: Color) -> sk::Color {
    sk::Color::from_argb(color.alpha(), color.red(), color.green(), color.blue())
}

fn paint_for(color: Color, style: DrawStyle, line_width: i32) -> sk::Paint {
    let mut paint = sk::Paint::default();
    paint.set_anti_alias(true);
    paint.set_color(to_sk_color(color));
    if style.is_fill() {
        paint.set_style(sk::PaintStyle::Fill);
    } else {
        paint.set_style(sk::PaintStyle::Stroke);
        paint.set_stroke_width(line_width.max(1) as f32);
        if let Some(pattern) = style.dash_pattern() {
            let intervals: Vec<f32> = pattern.iter().map(|&v| v as f32).collect();
            if let Some(effect) = sk::PathEffect::dash(&intervals, 0.0) {
                paint.set_path_effect(effect);
            }
        }
    }
    paint
}

fn to_sk_path(p: &kurbo::BezPath, fill: bool) -> sk::Path {
    let mut out = sk::Path::new();
    for el in p.elements() {
        match *el {
            PathEl::MoveTo(pt) => {
                out.move_to((pt.x as f32, pt.y as f32));
            }
            PathEl::LineTo(pt) => {
                out.line_to((pt.x as f32, pt.y as f32));
            }
            PathEl::QuadTo(c, pt) => {
                out.quad_to((c.x as f32, c.y as f32), (pt.x as f32, pt.y as f32));
            }
            PathEl::CurveTo(c1, c2, pt) => {
                out.cubic_to(
                    (c1.x as f32, c1.y as f32),
                    (c2.x as f32, c2.y as f32),
                    (pt.x as f32, pt.y as f32),
                );
            }
            PathEl::ClosePath => {
                out.close();
            }
        }
    }
    if fill {
        out.set_fill_type(sk::PathFillType::EvenOdd);
    }
    out
}

fn resolve_font(desc: &FontDesc) -> sk::Font {
    let style = sk::FontStyle::new(
        if desc.bold {
            sk::font_style::Weight::BOLD
        } else {
            sk::font_style::Weight::NORMAL
        },
        sk::font_style::Width::NORMAL,
        if desc.italic {
            sk::font_style::Slant::Italic
        } else {
            sk::font_style::Slant::Upright
        },
    );
    let mgr = sk::FontMgr::new();
    let typeface = mgr
        .match_family_style(&desc.family, style)
        .or_else(|| mgr.legacy_make_typeface(None, style))
        .expect("Skia font manager provides a fallback typeface");
    sk::Font::new(typeface, Some(desc.size_px() as f32))
}

/// Greedy line breaking against the measured width; also applies the
/// ellipsis policy. Backends with a native text engine own this logic.
fn layout_lines(
    font: &sk::Font,
    text: &str,
    box_w: i32,
    wrap: bool,
    ellipsis: bool,
) -> Vec<String> {
    let measure = |s: &str| font.measure_str(s, None).0;
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        if wrap && box_w > 0 && measure(raw) > box_w as f32 {
            let mut current = String::new();
            for word in raw.split(' ') {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if !current.is_empty() && measure(&candidate) > box_w as f32 {
                    lines.push(current);
                    current = word.to_string();
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        } else if ellipsis && box_w > 0 && measure(raw) > box_w as f32 {
            let mut cut: String = raw.to_string();
            while !cut.is_empty() && measure(&format!("{cut}…")) > box_w as f32 {
                cut.pop();
            }
            lines.push(format!("{cut}…"));
        } else {
            lines.push(raw.to_string());
        }
    }
    lines
}

impl<'t> SkiaCanvas<'t> {
    /// Bind a canvas to the target's current size.
    pub fn new(target: &'t mut SkiaTarget) -> Self {
        log::trace!("skia canvas bound {}x{}", target.width, target.height);
        Self {
            target,
            clip: ClipTracker::new(),
            clip_saved: false,
        }
    }

    fn apply_clip(&mut self) {
        let canvas = self.target.surface.canvas();
        if self.clip_saved {
            canvas.restore();
            self.clip_saved = false;
        }
        let rect = match self.clip.region(self.target.width, self.target.height) {
            ClipRegion::Full => return,
            ClipRegion::Empty => ClipRect::ZERO,
            ClipRegion::Rect(r) => r,
        };
        canvas.save();
        canvas.clip_rect(
            sk::Rect::new(rect.x1 as f32, rect.y1 as f32, rect.x2 as f32, rect.y2 as f32),
            None,
            true,
        );
        self.clip_saved = true;
    }

    fn draw_path(&mut self, p: &kurbo::BezPath, color: Color, style: DrawStyle, line_width: i32) {
        let paint = paint_for(color, style, line_width);
        let path = to_sk_path(p, style.is_fill());
        self.target.surface.canvas().draw_path(&path, &paint);
    }
}

impl DrawCanvas for SkiaCanvas<'_> {
    fn description(&self) -> &'static str {
        "SKIA"
    }

    fn size(&self) -> (i32, i32) {
        self.target.size()
    }

    fn update_size(&mut self, width: i32, height: i32) {
        if (width, height) == self.target.size() || width <= 0 || height <= 0 {
            return;
        }
        if let Some(surface) = sk::surfaces::raster_n32_premul((width, height)) {
            self.target.surface = surface;
            self.target.width = width;
            self.target.height = height;
            self.target.last_frame = None;
            self.clip_saved = false;
            self.apply_clip();
        } else {
            log::warn!("skia surface reallocation failed ({width}x{height})");
        }
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
        let style = if style.is_fill() { DrawStyle::Stroke } else { style };
        let paint = paint_for(color, style, line_width);
        self.target.surface.canvas().draw_line(
            (x1 as f32 + 0.5, y1 as f32 + 0.5),
            (x2 as f32 + 0.5, y2 as f32 + 0.5),
            &paint,
        );
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
        let r = if style.is_fill() {
            path::fill_rect(x1, y1, x2, y2)
        } else {
            path::stroke_rect(x1, y1, x2, y2)
        };
        let rect = sk::Rect::new(r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32);
        let paint = paint_for(color, style, line_width);
        self.target.surface.canvas().draw_rect(rect, &paint);
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
        let oval = sk::Rect::new(x1 as f32, y1 as f32, x2 as f32, y2 as f32);
        let paint = paint_for(color, style, line_width);
        // Skia sweeps clockwise in the y-down frame; the contract's
        // canonical orientation is counter-clockwise, hence the negation.
        self.target.surface.canvas().draw_arc(
            oval,
            -(a1 as f32),
            -((a2 - a1) as f32),
            style.is_fill(),
            &paint,
        );
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
        self.draw_path(&p, color, style, line_width);
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
        let r = if style.is_fill() {
            path::fill_rect(x1, y1, x2, y2)
        } else {
            path::stroke_rect(x1, y1, x2, y2)
        };
        let rect = sk::Rect::new(r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32);
        let rrect = sk::RRect::new_rect_xy(rect, radius.max(0) as f32, radius.max(0) as f32);
        let paint = paint_for(color, style, line_width);
        self.target.surface.canvas().draw_rrect(rrect, &paint);
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
        self.draw_path(&p, color, style, line_width);
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
        self.draw_path(&p, color, style, line_width);
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
        let rect = sk::Rect::new(r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32);
        let (p0, p1) = match dir {
            GradientDir::Horizontal => (
                sk::Point::new(rect.left, rect.top),
                sk::Point::new(rect.right, rect.top),
            ),
            GradientDir::Vertical => (
                sk::Point::new(rect.left, rect.top),
                sk::Point::new(rect.left, rect.bottom),
            ),
        };
        let colors = [to_sk_color(from), to_sk_color(to)];
        let mut paint = sk::Paint::default();
        paint.set_anti_alias(true);
        if let Some(shader) = sk::Shader::linear_gradient(
            (p0, p1),
            &colors[..],
            None,
            sk::TileMode::Clamp,
            None,
            None,
        ) {
            paint.set_shader(shader);
        } else {
            paint.set_color(to_sk_color(to));
        }
        self.target.surface.canvas().draw_rect(rect, &paint);
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
        let sk_font = resolve_font(font);
        let (spacing, metrics) = sk_font.metrics();
        let lines = layout_lines(
            &sk_font,
            text,
            w,
            flags.contains(TextFlags::WRAP),
            flags.contains(TextFlags::ELLIPSIS),
        );
        let line_count = i32::try_from(lines.len()).unwrap_or(i32::MAX);
        let th = (spacing * line_count as f32).ceil() as i32;
        let tw = lines
            .iter()
            .map(|l| sk_font.measure_str(l, None).0.ceil() as i32)
            .max()
            .unwrap_or(0);
        let bw = if w > 0 { w } else { tw };
        let bh = if h > 0 { h } else { th };

        let canvas = self.target.surface.canvas();
        canvas.save();
        if orientation != 0.0 {
            canvas.rotate(-(orientation as f32), Some(sk::Point::new(x as f32, y as f32)));
        }
        if flags.contains(TextFlags::CLIP) {
            canvas.clip_rect(
                sk::Rect::new(x as f32, y as f32, (x + bw) as f32, (y + bh) as f32),
                None,
                true,
            );
        }
        let mut paint = sk::Paint::default();
        paint.set_anti_alias(true);
        paint.set_color(to_sk_color(color));
        let top = y + if flags.contains(TextFlags::LAYOUT_CENTER) {
            (bh - th) / 2
        } else {
            0
        };
        for (i, line) in lines.iter().enumerate() {
            let lw = sk_font.measure_str(line, None).0;
            let lx = x as f32
                + match flags.halign() {
                    HAlign::Left => 0.0,
                    HAlign::Center => (bw as f32 - lw) / 2.0,
                    HAlign::Right => bw as f32 - lw,
                };
            let baseline = top as f32 + spacing * i as f32 - metrics.ascent;
            canvas.draw_str(line.as_str(), (lx, baseline), &sk_font, &paint);
        }
        canvas.restore();
    }

    fn text_extents(&self, font: &FontDesc, text: &str) -> (i32, i32) {
        let sk_font = resolve_font(font);
        let (spacing, _) = sk_font.metrics();
        let mut width = 0_f32;
        let mut lines = 0_i32;
        for line in text.split('\n') {
            width = width.max(sk_font.measure_str(line, None).0);
            lines += 1;
        }
        if text.is_empty() {
            return (0, 0);
        }
        (width.ceil() as i32, (spacing * lines as f32).ceil() as i32)
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
        let (iw, ih) = (image.width(), image.height());
        if iw == 0 || ih == 0 {
            return;
        }
        let info = sk::ImageInfo::new(
            (iw as i32, ih as i32),
            sk::ColorType::RGBA8888,
            sk::AlphaType::Unpremul,
            None,
        );
        let data = sk::Data::new_copy(&pixels);
        let row_bytes = iw as usize * 4;
        let Some(img) = sk::images::raster_from_data(&info, data, row_bytes) else {
            return;
        };
        let paint = sk::Paint::default();
        let canvas = self.target.surface.canvas();
        if w > 0 && h > 0 {
            // This backend supports arbitrary scaling.
            let dst = sk::Rect::new(x as f32, y as f32, (x + w) as f32, (y + h) as f32);
            canvas.draw_image_rect(&img, None, dst, &paint);
        } else {
            canvas.draw_image(&img, (x as f32, y as f32), Some(&paint));
        }
    }

    fn flush(&mut self) {
        let canvas = self.target.surface.canvas();
        if self.clip_saved {
            canvas.restore();
            self.clip_saved = false;
        }
        self.clip.reset();
        // Snapshot for the toolkit's deferred repaint to present.
        self.target.last_frame = Some(self.target.surface.image_snapshot());
    }
}
