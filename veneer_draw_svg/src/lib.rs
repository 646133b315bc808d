// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG export backend for the Veneer draw contract.
//!
//! Records every draw call as SVG elements and assembles a document on
//! demand. Intended for debugging, inspection, and golden-file diffing
//! rather than pixel-perfect rendering:
//! - The single active clip rectangle maps to `<g clip-path="...">`
//!   scopes, one per clip change.
//! - Text becomes `<text>` elements with anchor-based alignment; wrap and
//!   ellipsis are not supported (capability gap shared with the other
//!   backends that have no text engine).
//! - Images are emitted as placeholder rectangles, not embedded pixels.

#![no_std]

extern crate alloc;

use alloc::string::String;
use core::fmt::Write as _;

use kurbo::{BezPath, PathEl};
use veneer_draw::{
    BitmapFont, ClipRect, ClipRegion, ClipTracker, Color, DrawCanvas, DrawStyle, FontDesc,
    GradientDir, HAlign, ImageBits, TextFlags, path,
};

/// A draw canvas that records into an SVG document.
#[derive(Clone, Debug)]
pub struct SvgCanvas {
    width: i32,
    height: i32,
    clip: ClipTracker,
    /// `<defs>` content: clip paths and gradient definitions.
    defs: String,
    /// Element stream, inside the currently open clip group (if any).
    body: String,
    group_open: bool,
    next_id: u32,
}

impl SvgCanvas {
    /// Create a canvas for a document of the given pixel size. Returns
    /// `None` for a non-positive size.
    pub fn new(width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            clip: ClipTracker::new(),
            defs: String::new(),
            body: String::new(),
            group_open: false,
            next_id: 0,
        })
    }

    /// Assemble the SVG document from everything recorded so far.
    pub fn document(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
            self.width, self.height, self.width, self.height
        );
        if !self.defs.is_empty() {
            let _ = write!(out, "<defs>{}</defs>", self.defs);
        }
        out.push_str(&self.body);
        if self.group_open {
            out.push_str("</g>");
        }
        out.push_str("</svg>");
        out
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        let id = self.next_id;
        self.next_id += 1;
        alloc::format!("{prefix}{id}")
    }

    /// Close the current clip group and open one for the active clip.
    ///
    /// Called on every clip change; drawing with an empty clip region
    /// goes into a group clipped to a zero-area rectangle.
    fn reopen_group(&mut self) {
        if self.group_open {
            self.body.push_str("</g>");
            self.group_open = false;
        }
        let rect = match self.clip.region(self.width, self.height) {
            ClipRegion::Full => return,
            ClipRegion::Empty => ClipRect::ZERO,
            ClipRegion::Rect(r) => r,
        };
        let id = self.fresh_id("clip");
        let _ = write!(
            self.defs,
            "<clipPath id=\"{id}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/></clipPath>",
            rect.x1,
            rect.y1,
            rect.x2 - rect.x1,
            rect.y2 - rect.y1
        );
        let _ = write!(self.body, "<g clip-path=\"url(#{id})\">");
        self.group_open = true;
    }

    fn paint_attrs(&self, color: Color, style: DrawStyle, line_width: i32) -> String {
        let mut out = String::new();
        let (r, g, b) = (color.red(), color.green(), color.blue());
        if style.is_fill() {
            let _ = write!(out, "fill=\"rgb({r},{g},{b})\" fill-rule=\"evenodd\"");
            if color.alpha() != 255 {
                let _ = write!(out, " fill-opacity=\"{}\"", opacity(color));
            }
        } else {
            let _ = write!(
                out,
                "fill=\"none\" stroke=\"rgb({r},{g},{b})\" stroke-width=\"{}\"",
                line_width.max(1)
            );
            if color.alpha() != 255 {
                let _ = write!(out, " stroke-opacity=\"{}\"", opacity(color));
            }
            if let Some(pattern) = style.dash_pattern() {
                out.push_str(" stroke-dasharray=\"");
                for (i, seg) in pattern.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    let _ = write!(out, "{seg}");
                }
                out.push('"');
            }
        }
        out
    }

    fn emit_path(&mut self, p: &BezPath, color: Color, style: DrawStyle, line_width: i32) {
        let attrs = self.paint_attrs(color, style, line_width);
        let _ = write!(self.body, "<path d=\"{}\" {attrs}/>", path_data(p));
    }
}

fn opacity(color: Color) -> f64 {
    f64::from(color.alpha()) / 255.0
}

/// Serialize a Bézier path into SVG path data.
fn path_data(p: &BezPath) -> String {
    let mut d = String::new();
    for el in p.elements() {
        match *el {
            PathEl::MoveTo(pt) => {
                let _ = write!(d, "M{} {}", pt.x, pt.y);
            }
            PathEl::LineTo(pt) => {
                let _ = write!(d, "L{} {}", pt.x, pt.y);
            }
            PathEl::QuadTo(c, pt) => {
                let _ = write!(d, "Q{} {} {} {}", c.x, c.y, pt.x, pt.y);
            }
            PathEl::CurveTo(c1, c2, pt) => {
                let _ = write!(d, "C{} {} {} {} {} {}", c1.x, c1.y, c2.x, c2.y, pt.x, pt.y);
            }
            PathEl::ClosePath => d.push('Z'),
        }
    }
    d
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

impl DrawCanvas for SvgCanvas {
    fn description(&self) -> &'static str {
        "SVG"
    }

    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn update_size(&mut self, width: i32, height: i32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
        }
    }

    fn set_clip_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.clip.set(x1, y1, x2, y2);
        self.reopen_group();
    }

    fn reset_clip(&mut self) {
        self.clip.reset();
        self.reopen_group();
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
        let attrs = self.paint_attrs(color, style, line_width);
        let _ = write!(
            self.body,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {attrs}/>",
            f64::from(x1) + 0.5,
            f64::from(y1) + 0.5,
            f64::from(x2) + 0.5,
            f64::from(y2) + 0.5
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
        let attrs = self.paint_attrs(color, style, line_width);
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {attrs}/>",
            r.x0,
            r.y0,
            r.width(),
            r.height()
        );
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
        self.emit_path(&p, color, style, line_width);
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
        self.emit_path(&p, color, style, line_width);
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
        self.emit_path(&p, color, style, line_width);
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
        self.emit_path(&p, color, style, line_width);
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
        self.emit_path(&p, color, style, line_width);
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
        let id = self.fresh_id("grad");
        let (gx2, gy2) = match dir {
            GradientDir::Horizontal => ("100%", "0%"),
            GradientDir::Vertical => ("0%", "100%"),
        };
        let _ = write!(
            self.defs,
            "<linearGradient id=\"{id}\" x1=\"0%\" y1=\"0%\" x2=\"{gx2}\" y2=\"{gy2}\">\
             <stop offset=\"0\" stop-color=\"rgb({},{},{})\" stop-opacity=\"{}\"/>\
             <stop offset=\"1\" stop-color=\"rgb({},{},{})\" stop-opacity=\"{}\"/>\
             </linearGradient>",
            from.red(),
            from.green(),
            from.blue(),
            opacity(from),
            to.red(),
            to.green(),
            to.blue(),
            opacity(to)
        );
        let r = path::fill_rect(x1, y1, x2, y2);
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"url(#{id})\"/>",
            r.x0,
            r.y0,
            r.width(),
            r.height()
        );
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
        let size = font.size_px();
        let (tw, th) = self.text_extents(font, text);
        let bw = if w > 0 { w } else { tw };
        let bh = if h > 0 { h } else { th };
        let (anchor, ax) = match flags.halign() {
            HAlign::Left => ("start", x),
            HAlign::Center => ("middle", x + bw / 2),
            HAlign::Right => ("end", x + bw),
        };
        let oy = y + if flags.contains(TextFlags::LAYOUT_CENTER) {
            (bh - th) / 2
        } else {
            0
        };
        let mut style_attrs = String::new();
        if font.bold {
            style_attrs.push_str(" font-weight=\"bold\"");
        }
        if font.italic {
            style_attrs.push_str(" font-style=\"italic\"");
        }
        if orientation != 0.0 {
            let _ = write!(style_attrs, " transform=\"rotate({} {x} {y})\"", -orientation);
        }
        let line_height = size;
        for (i, line) in text.split('\n').enumerate() {
            // Place the baseline roughly at 80% of the line box.
            let baseline = oy + line_height * i32::try_from(i).unwrap_or(0) + (line_height * 4) / 5;
            let _ = write!(
                self.body,
                "<text x=\"{ax}\" y=\"{baseline}\" font-family=\"{}\" font-size=\"{size}\" \
                 fill=\"rgb({},{},{})\" text-anchor=\"{anchor}\"{style_attrs}>{}</text>",
                font.family,
                color.red(),
                color.green(),
                color.blue(),
                escape_text(line)
            );
        }
    }

    fn text_extents(&self, font: &FontDesc, text: &str) -> (i32, i32) {
        // Layout-only approximation from the bitmap face metrics.
        BitmapFont::text_extents(text, BitmapFont::scale_for(font))
    }

    fn draw_image(
        &mut self,
        image: &ImageBits,
        _inactive: bool,
        _background: Color,
        x: i32,
        y: i32,
        _w: i32,
        _h: i32,
    ) {
        // Placeholder, not embedded pixels.
        let _ = write!(
            self.body,
            "<rect x=\"{x}\" y=\"{y}\" width=\"{}\" height=\"{}\" fill=\"none\" \
             stroke=\"rgb(128,128,128)\" stroke-dasharray=\"2 2\"/>",
            image.width(),
            image.height()
        );
    }

    fn flush(&mut self) {
        if self.group_open {
            self.body.push_str("</g>");
            self.group_open = false;
        }
        self.clip.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_degenerate_size() {
        assert!(SvgCanvas::new(0, 10).is_none());
        assert!(SvgCanvas::new(100, 50).is_some());
    }

    #[test]
    fn document_wraps_viewbox() {
        let mut c = SvgCanvas::new(100, 50).unwrap();
        c.flush();
        let doc = c.document();
        assert!(doc.starts_with("<svg "));
        assert!(doc.contains("viewBox=\"0 0 100 50\""));
        assert!(doc.ends_with("</svg>"));
    }

    #[test]
    fn filled_rect_covers_inclusive_bounds() {
        let mut c = SvgCanvas::new(100, 50).unwrap();
        c.draw_rect(0, 0, 99, 49, Color::rgb(255, 0, 0), DrawStyle::Fill, 1);
        c.flush();
        let doc = c.document();
        assert!(doc.contains("width=\"100\""), "{doc}");
        assert!(doc.contains("fill=\"rgb(255,0,0)\""));
    }

    #[test]
    fn clip_opens_group_and_reset_closes_it() {
        let mut c = SvgCanvas::new(64, 64).unwrap();
        c.set_clip_rect(4, 4, 20, 20);
        c.draw_rect(0, 0, 63, 63, Color::BLACK, DrawStyle::Fill, 1);
        c.reset_clip();
        c.draw_rect(0, 0, 63, 63, Color::BLACK, DrawStyle::Fill, 1);
        c.flush();
        let doc = c.document();
        assert!(doc.contains("<clipPath id=\"clip0\">"));
        assert!(doc.contains("clip-path=\"url(#clip0)\""));
        assert_eq!(doc.matches("<g ").count(), 1);
        assert_eq!(doc.matches("</g>").count(), 1);
    }

    #[test]
    fn zero_clip_sentinel_equals_reset() {
        let mut a = SvgCanvas::new(32, 32).unwrap();
        let mut b = SvgCanvas::new(32, 32).unwrap();
        a.set_clip_rect(2, 2, 9, 9);
        b.set_clip_rect(2, 2, 9, 9);
        a.reset_clip();
        b.set_clip_rect(0, 0, 0, 0);
        a.draw_rect(0, 0, 31, 31, Color::BLACK, DrawStyle::Fill, 1);
        b.draw_rect(0, 0, 31, 31, Color::BLACK, DrawStyle::Fill, 1);
        a.flush();
        b.flush();
        assert_eq!(a.document(), b.document());
    }

    #[test]
    fn dashed_stroke_emits_dasharray() {
        let mut c = SvgCanvas::new(32, 32).unwrap();
        c.draw_line(0, 0, 31, 31, Color::BLACK, DrawStyle::StrokeDash, 1);
        c.flush();
        assert!(c.document().contains("stroke-dasharray=\"6 2\""));
    }

    #[test]
    fn swapped_line_endpoints_produce_identical_markup() {
        let mut a = SvgCanvas::new(32, 32).unwrap();
        let mut b = SvgCanvas::new(32, 32).unwrap();
        a.draw_line(3, 5, 20, 17, Color::BLACK, DrawStyle::Stroke, 1);
        b.draw_line(20, 17, 3, 5, Color::BLACK, DrawStyle::Stroke, 1);
        a.flush();
        b.flush();
        assert_eq!(a.document(), b.document());
    }

    #[test]
    fn centered_text_uses_middle_anchor_at_box_center() {
        let mut c = SvgCanvas::new(200, 40).unwrap();
        c.draw_text(
            "hi",
            10,
            4,
            100,
            0,
            Color::BLACK,
            &FontDesc::default(),
            TextFlags::CENTER,
            0.0,
        );
        c.flush();
        let doc = c.document();
        assert!(doc.contains("text-anchor=\"middle\""));
        assert!(doc.contains("x=\"60\""), "{doc}");
    }

    #[test]
    fn text_escapes_markup() {
        let mut c = SvgCanvas::new(64, 16).unwrap();
        c.draw_text(
            "a<b&c",
            0,
            0,
            0,
            0,
            Color::BLACK,
            &FontDesc::default(),
            TextFlags::default(),
            0.0,
        );
        c.flush();
        assert!(c.document().contains("a&lt;b&amp;c"));
    }

    #[test]
    fn gradient_defines_two_stops() {
        let mut c = SvgCanvas::new(32, 32).unwrap();
        c.draw_gradient(
            0,
            0,
            31,
            31,
            Color::BLACK,
            Color::WHITE,
            GradientDir::Vertical,
        );
        c.flush();
        let doc = c.document();
        assert!(doc.contains("<linearGradient id=\"grad0\""));
        assert!(doc.contains("y2=\"100%\""));
        assert!(doc.contains("fill=\"url(#grad0)\""));
    }
}
