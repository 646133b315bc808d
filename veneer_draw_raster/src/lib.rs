// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw raster backend for the Veneer draw contract.
//!
//! This backend owns its pixels outright: a persistent off-screen RGBA8
//! back buffer plus the visible front buffer, with every primitive
//! rasterized by hand — Bresenham lines with per-pixel dash cadence,
//! scanline fills, parametric arc walking, and the embedded bitmap font
//! for text. It doubles as the reference implementation the conformance
//! suite compares the other backends against.
//!
//! Capability gaps (documented, not errors): no text wrap/ellipsis/
//! rotation (single-line alignment only, manual `\n` splitting, matching
//! a server-side bitmap-font model) and no image scaling (images always
//! blit at native size).

#![no_std]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _; // for `sqrt`, `atan2`, `sin`, `cos`

use smallvec::SmallVec;

use veneer_draw::{
    BitmapFont, ClipRect, ClipRegion, ClipTracker, Color, DrawCanvas, DrawStyle, FontDesc,
    GradientDir, HAlign, ImageBits, TextFlags,
};

/// A tightly packed, row-major, straight-alpha RGBA8 pixel buffer.
#[derive(Clone, Debug)]
pub struct Pixmap {
    width: i32,
    height: i32,
    data: Vec<u8>,
}

impl Pixmap {
    /// Allocate a zeroed (transparent black) pixmap.
    pub fn new(width: i32, height: i32) -> Self {
        let w = width.max(0);
        let h = height.max(0);
        Self {
            width: w,
            height: h,
            data: vec![0; (w as usize) * (h as usize) * 4],
        }
    }

    /// Buffer width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Buffer height in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// The raw RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The RGBA components at a pixel; zeros outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    fn index(&self, x: i32, y: i32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Source-over blend of a straight-alpha color into the pixel.
    fn blend(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        let a = rgba[3] as u32;
        if a == 0 {
            return;
        }
        let i = self.index(x, y);
        if a == 255 {
            self.data[i..i + 4].copy_from_slice(&rgba);
            return;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let src = rgba[c] as u32;
            let dst = self.data[i + c] as u32;
            self.data[i + c] = ((src * a + dst * inv + 127) / 255) as u8;
        }
        let dst_a = self.data[i + 3] as u32;
        self.data[i + 3] = (a + (dst_a * inv + 127) / 255) as u8;
    }
}

/// The persistent per-widget surface pair: the retained off-screen back
/// buffer all drawing lands in, and the visible front buffer that only
/// changes on flush.
#[derive(Clone, Debug)]
pub struct RasterTarget {
    back: Pixmap,
    front: Pixmap,
}

impl RasterTarget {
    /// Bind to a drawable of the given size. Returns `None` when the
    /// owner has no realized drawable yet (a non-positive size).
    pub fn new(width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(Self {
            back: Pixmap::new(width, height),
            front: Pixmap::new(width, height),
        })
    }

    /// Current size of the bound drawable.
    pub fn size(&self) -> (i32, i32) {
        (self.back.width, self.back.height)
    }

    /// The visible surface. Untouched by draw calls until a flush.
    pub fn front(&self) -> &Pixmap {
        &self.front
    }

    fn resize(&mut self, width: i32, height: i32) {
        if (width, height) != self.size() && width > 0 && height > 0 {
            self.back = Pixmap::new(width, height);
            self.front = Pixmap::new(width, height);
        }
    }
}

/// Dash cadence along a stroked path, advanced in pixel distance.
#[derive(Clone, Debug)]
struct DashPen {
    pattern: Option<&'static [f64]>,
    pos: f64,
    total: f64,
}

impl DashPen {
    fn new(style: DrawStyle) -> Self {
        let pattern = style.dash_pattern();
        let total = pattern.map_or(0.0, |p| p.iter().sum());
        Self {
            pattern,
            pos: 0.0,
            total,
        }
    }

    /// Whether the pen is in an "on" segment at the current position,
    /// then advance by `step`.
    fn sample(&mut self, step: f64) -> bool {
        let Some(pattern) = self.pattern else {
            self.pos += step;
            return true;
        };
        let mut p = self.pos % self.total;
        let mut on = true;
        for &seg in pattern {
            if p < seg {
                break;
            }
            p -= seg;
            on = !on;
        }
        self.pos += step;
        on
    }
}

/// A draw canvas rasterizing into a [`RasterTarget`]'s back buffer.
///
/// Created at the start of a redraw, flushed once, then dropped. The
/// back buffer persists on the target between redraws.
#[derive(Debug)]
pub struct RasterCanvas<'t> {
    target: &'t mut RasterTarget,
    width: i32,
    height: i32,
    clip: ClipTracker,
}

impl<'t> RasterCanvas<'t> {
    /// Bind a canvas to the target's current size.
    pub fn new(target: &'t mut RasterTarget) -> Self {
        let (width, height) = target.size();
        Self {
            target,
            width,
            height,
            clip: ClipTracker::new(),
        }
    }

    /// The off-screen buffer in its current (unflushed) state.
    pub fn back(&self) -> &Pixmap {
        &self.target.back
    }

    /// The drawable region for the active clip; `None` suppresses drawing.
    fn bounds(&self) -> Option<ClipRect> {
        match self.clip.region(self.width, self.height) {
            ClipRegion::Full => Some(ClipRect::new(0, 0, self.width, self.height)),
            ClipRegion::Empty => None,
            ClipRegion::Rect(r) => Some(r),
        }
    }

    fn plot(&mut self, b: ClipRect, x: i32, y: i32, rgba: [u8; 4]) {
        if x >= b.x1 && x < b.x2 && y >= b.y1 && y < b.y2 {
            self.target.back.blend(x, y, rgba);
        }
    }

    /// A `width`-sized square centered on the point, for thick strokes.
    fn block(&mut self, b: ClipRect, x: i32, y: i32, width: i32, rgba: [u8; 4]) {
        if width <= 1 {
            self.plot(b, x, y, rgba);
            return;
        }
        let half = (width - 1) / 2;
        for dy in 0..width {
            for dx in 0..width {
                self.plot(b, x - half + dx, y - half + dy, rgba);
            }
        }
    }

    fn fill_span(&mut self, b: ClipRect, y: i32, x1: i32, x2: i32, rgba: [u8; 4]) {
        if y < b.y1 || y >= b.y2 {
            return;
        }
        let xa = x1.max(b.x1);
        let xb = x2.min(b.x2 - 1);
        for x in xa..=xb {
            self.target.back.blend(x, y, rgba);
        }
    }

    /// Bresenham segment with shared dash cadence; no endpoint
    /// normalization (polyline callers need direction continuity).
    fn stroke_segment(
        &mut self,
        b: ClipRect,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        rgba: [u8; 4],
        line_width: i32,
        pen: &mut DashPen,
    ) {
        let dx = (x2 - x1).abs();
        let dy = -(y2 - y1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x1, y1);
        loop {
            if pen.sample(1.0) {
                self.block(b, x, y, line_width, rgba);
            }
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn rect_outline(
        &mut self,
        b: ClipRect,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        rgba: [u8; 4],
        style: DrawStyle,
    ) {
        let edges = [
            (x1, y1, x2, y1),
            (x2, y1, x2, y2),
            (x2, y2, x1, y2),
            (x1, y2, x1, y1),
        ];
        for (ax, ay, bx, by) in edges {
            let mut pen = DashPen::new(style);
            self.stroke_segment(b, ax, ay, bx, by, rgba, 1, &mut pen);
        }
    }

    /// Walk an elliptic arc parametrically in the canonical orientation,
    /// plotting blocks with dash cadence advanced by arc distance.
    fn stroke_arc(
        &mut self,
        b: ClipRect,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        a1: f64,
        a2: f64,
        rgba: [u8; 4],
        style: DrawStyle,
        line_width: i32,
    ) {
        let sweep = a2 - a1;
        let rmax = rx.max(ry).max(0.5);
        let steps = ((sweep.to_radians().abs() * rmax * 2.0) as usize).max(16);
        let mut pen = DashPen::new(style);
        let mut last: Option<(f64, f64)> = None;
        for i in 0..=steps {
            let theta = (a1 + sweep * (i as f64) / (steps as f64)).to_radians();
            let px = cx + rx * theta.cos();
            let py = cy - ry * theta.sin();
            let dist = match last {
                Some((lx, ly)) => {
                    let (dx, dy) = (px - lx, py - ly);
                    (dx * dx + dy * dy).sqrt()
                }
                None => 0.0,
            };
            last = Some((px, py));
            if pen.sample(dist) {
                #[allow(clippy::cast_possible_truncation, reason = "rounded pixel coordinates")]
                self.block(
                    b,
                    (px + 0.5) as i32,
                    (py + 0.5) as i32,
                    line_width,
                    rgba,
                );
            }
        }
    }

    fn blit_rgba(
        &mut self,
        b: ClipRect,
        pixels: &[u8],
        src_w: i32,
        src_h: i32,
        x: i32,
        y: i32,
    ) {
        for sy in 0..src_h {
            for sx in 0..src_w {
                let i = ((sy as usize) * (src_w as usize) + (sx as usize)) * 4;
                let rgba = [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]];
                self.plot(b, x + sx, y + sy, rgba);
            }
        }
    }
}

/// Angle membership test in the canonical orientation, `a1 <= a2`.
fn angle_in_sweep(theta: f64, a1: f64, sweep: f64) -> bool {
    if sweep >= 360.0 {
        return true;
    }
    (theta - a1).rem_euclid(360.0) <= sweep
}

impl DrawCanvas for RasterCanvas<'_> {
    fn description(&self) -> &'static str {
        "RASTER"
    }

    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn update_size(&mut self, width: i32, height: i32) {
        if (width, height) != self.target.size() {
            self.target.resize(width, height);
            let (w, h) = self.target.size();
            self.width = w;
            self.height = h;
        }
    }

    fn set_clip_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.clip.set(x1, y1, x2, y2);
    }

    fn reset_clip(&mut self) {
        self.clip.reset();
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
        let Some(b) = self.bounds() else { return };
        // Normalize the endpoint order so swapped endpoints rasterize
        // identically (Bresenham is direction-sensitive).
        let ((x1, y1), (x2, y2)) = if (x1, y1) <= (x2, y2) {
            ((x1, y1), (x2, y2))
        } else {
            ((x2, y2), (x1, y1))
        };
        let mut pen = DashPen::new(style);
        self.stroke_segment(b, x1, y1, x2, y2, color.to_rgba8(), line_width.max(1), &mut pen);
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
        let Some(b) = self.bounds() else { return };
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        let rgba = color.to_rgba8();
        if style.is_fill() {
            for y in y1..=y2 {
                self.fill_span(b, y, x1, x2, rgba);
            }
        } else {
            let w = line_width.max(1);
            for i in 0..w {
                let d = i - (w - 1) / 2;
                self.rect_outline(b, x1 - d, y1 - d, x2 + d, y2 + d, rgba, style);
            }
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
        let Some(b) = self.bounds() else { return };
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        let (a1, a2) = if a1 <= a2 { (a1, a2) } else { (a2, a1) };
        let cx = (f64::from(x1) + f64::from(x2)) / 2.0;
        let cy = (f64::from(y1) + f64::from(y2)) / 2.0;
        let rx = ((f64::from(x2) - f64::from(x1)) / 2.0).max(0.5);
        let ry = ((f64::from(y2) - f64::from(y1)) / 2.0).max(0.5);
        let rgba = color.to_rgba8();
        if style.is_fill() {
            let sweep = a2 - a1;
            for y in y1..=y2 {
                for x in x1..=x2 {
                    let dx = (f64::from(x) - cx) / rx;
                    let dy = (f64::from(y) - cy) / ry;
                    if dx * dx + dy * dy > 1.0 {
                        continue;
                    }
                    // The pie slice: pixel angle in canonical orientation.
                    let theta = (-(f64::from(y) - cy)).atan2(f64::from(x) - cx).to_degrees();
                    let theta = theta.rem_euclid(360.0);
                    if angle_in_sweep(theta, a1.rem_euclid(360.0), sweep)
                        || (dx == 0.0 && dy == 0.0)
                    {
                        self.plot(b, x, y, rgba);
                    }
                }
            }
        } else {
            self.stroke_arc(b, cx, cy, rx, ry, a1, a2, rgba, style, line_width.max(1));
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
        let Some(b) = self.bounds() else { return };
        let rgba = color.to_rgba8();
        if style.is_fill() {
            // Even-odd scanline fill over the implicitly closed outline.
            let ymin = points.iter().map(|p| p.1).min().unwrap_or(0);
            let ymax = points.iter().map(|p| p.1).max().unwrap_or(0);
            let mut xs: SmallVec<[f64; 8]> = SmallVec::new();
            for y in ymin..=ymax {
                let yc = f64::from(y) + 0.5;
                xs.clear();
                for i in 0..points.len() {
                    let (ax, ay) = points[i];
                    let (bx, by) = points[(i + 1) % points.len()];
                    let (ax, ay, bx, by) =
                        (f64::from(ax), f64::from(ay), f64::from(bx), f64::from(by));
                    if (ay <= yc && yc < by) || (by <= yc && yc < ay) {
                        xs.push(ax + (yc - ay) * (bx - ax) / (by - ay));
                    }
                }
                xs.sort_by(|p, q| p.partial_cmp(q).unwrap_or(core::cmp::Ordering::Equal));
                for pair in xs.chunks_exact(2) {
                    // Pixels whose centers fall inside [pair[0], pair[1]).
                    #[allow(clippy::cast_possible_truncation, reason = "span bounds fit i32")]
                    let (sx, ex) = (
                        (pair[0] - 0.5).ceil() as i32,
                        ((pair[1] - 0.5).ceil() as i32) - 1,
                    );
                    self.fill_span(b, y, sx, ex, rgba);
                }
            }
        } else {
            let mut pen = DashPen::new(style);
            for seg in points.windows(2) {
                let (ax, ay) = seg[0];
                let (bx, by) = seg[1];
                self.stroke_segment(b, ax, ay, bx, by, rgba, line_width.max(1), &mut pen);
            }
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
        let Some(b) = self.bounds() else { return };
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        let r = radius.max(0).min((x2 - x1) / 2).min((y2 - y1) / 2);
        if r == 0 {
            return self.draw_rect(x1, y1, x2, y2, color, style, line_width);
        }
        let rgba = color.to_rgba8();
        let corners = [
            (x1 + r, y1 + r),
            (x2 - r, y1 + r),
            (x2 - r, y2 - r),
            (x1 + r, y2 - r),
        ];
        if style.is_fill() {
            for y in y1..=y2 {
                for x in x1..=x2 {
                    let in_corner_band = (x < x1 + r || x > x2 - r) && (y < y1 + r || y > y2 - r);
                    if in_corner_band {
                        let (cx, cy) = corners[match (x > x2 - r, y > y2 - r) {
                            (false, false) => 0,
                            (true, false) => 1,
                            (true, true) => 2,
                            (false, true) => 3,
                        }];
                        let (dx, dy) = (x - cx, y - cy);
                        if dx * dx + dy * dy > r * r {
                            continue;
                        }
                    }
                    self.plot(b, x, y, rgba);
                }
            }
        } else {
            let lw = line_width.max(1);
            let mut pen = DashPen::new(style);
            self.stroke_segment(b, x1 + r, y1, x2 - r, y1, rgba, lw, &mut pen);
            let mut pen = DashPen::new(style);
            self.stroke_segment(b, x2, y1 + r, x2, y2 - r, rgba, lw, &mut pen);
            let mut pen = DashPen::new(style);
            self.stroke_segment(b, x1 + r, y2, x2 - r, y2, rgba, lw, &mut pen);
            let mut pen = DashPen::new(style);
            self.stroke_segment(b, x1, y1 + r, x1, y2 - r, rgba, lw, &mut pen);
            let rf = f64::from(r);
            let quads = [(90.0, 180.0, 0), (0.0, 90.0, 1), (270.0, 360.0, 2), (180.0, 270.0, 3)];
            for (qa1, qa2, ci) in quads {
                let (cx, cy) = corners[ci];
                self.stroke_arc(
                    b,
                    f64::from(cx),
                    f64::from(cy),
                    rf,
                    rf,
                    qa1,
                    qa2,
                    rgba,
                    style,
                    lw,
                );
            }
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
        let Some(b) = self.bounds() else { return };
        let pts = [
            (f64::from(x1), f64::from(y1)),
            (f64::from(cx1), f64::from(cy1)),
            (f64::from(cx2), f64::from(cy2)),
            (f64::from(x2), f64::from(y2)),
        ];
        let hull: f64 = pts
            .windows(2)
            .map(|s| {
                let (dx, dy) = (s[1].0 - s[0].0, s[1].1 - s[0].1);
                (dx * dx + dy * dy).sqrt()
            })
            .sum();
        let steps = (hull as usize).max(8);
        let rgba = color.to_rgba8();
        let mut pen = DashPen::new(style);
        let mut prev: Option<(i32, i32)> = None;
        for i in 0..=steps {
            let t = (i as f64) / (steps as f64);
            let u = 1.0 - t;
            let px = u * u * u * pts[0].0
                + 3.0 * u * u * t * pts[1].0
                + 3.0 * u * t * t * pts[2].0
                + t * t * t * pts[3].0;
            let py = u * u * u * pts[0].1
                + 3.0 * u * u * t * pts[1].1
                + 3.0 * u * t * t * pts[2].1
                + t * t * t * pts[3].1;
            #[allow(clippy::cast_possible_truncation, reason = "rounded pixel coordinates")]
            let p = ((px + 0.5) as i32, (py + 0.5) as i32);
            if let Some(q) = prev {
                if p != q {
                    self.stroke_segment(b, q.0, q.1, p.0, p.1, rgba, line_width.max(1), &mut pen);
                }
            }
            prev = Some(p);
        }
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
        // Degree-elevate to the cubic equivalent and reuse that walker.
        let c1x = x1 + ((cx - x1) * 2) / 3;
        let c1y = y1 + ((cy - y1) * 2) / 3;
        let c2x = x2 + ((cx - x2) * 2) / 3;
        let c2y = y2 + ((cy - y2) * 2) / 3;
        self.draw_bezier(x1, y1, c1x, c1y, c2x, c2y, x2, y2, color, style, line_width);
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
        let Some(b) = self.bounds() else { return };
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        let (fa, ta) = (from.to_rgba8(), to.to_rgba8());
        let lerp = |t: f64, c: usize| -> u8 {
            #[allow(clippy::cast_possible_truncation, reason = "t is in [0, 1]")]
            let v = (f64::from(fa[c]) + (f64::from(ta[c]) - f64::from(fa[c])) * t + 0.5) as u8;
            v
        };
        for y in y1..=y2 {
            for x in x1..=x2 {
                let t = match dir {
                    GradientDir::Horizontal if x2 > x1 => {
                        f64::from(x - x1) / f64::from(x2 - x1)
                    }
                    GradientDir::Vertical if y2 > y1 => f64::from(y - y1) / f64::from(y2 - y1),
                    _ => 0.0,
                };
                self.plot(b, x, y, [lerp(t, 0), lerp(t, 1), lerp(t, 2), lerp(t, 3)]);
            }
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
        _orientation: f64,
    ) {
        // Rotation is not supported by the bitmap-font path.
        if text.is_empty() {
            return;
        }
        let Some(mut b) = self.bounds() else { return };
        let scale = BitmapFont::scale_for(font);
        let mask = BitmapFont::render_mask(text, scale, flags.halign());
        let (tw, th) = (mask.width, mask.height);
        let bw = if w > 0 { w } else { tw };
        let bh = if h > 0 { h } else { th };
        if flags.contains(TextFlags::CLIP) {
            b = b.intersect(ClipRect::new(x, y, x + bw, y + bh));
            if b.x1 >= b.x2 || b.y1 >= b.y2 {
                return;
            }
        }
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
        let rgba = color.to_rgba8();
        for my in 0..th {
            for mx in 0..tw {
                if mask.coverage[(my * tw + mx) as usize] != 0 {
                    self.plot(b, ox + mx, oy + my, rgba);
                }
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
        // Scaling is not supported here; images blit at native size.
        let Some(b) = self.bounds() else { return };
        let pixels = image.resolve_rgba8(inactive, background);
        let (sw, sh) = (
            i32::try_from(image.width()).unwrap_or(i32::MAX),
            i32::try_from(image.height()).unwrap_or(i32::MAX),
        );
        self.blit_rgba(b, &pixels, sw, sh, x, y);
    }

    fn flush(&mut self) {
        self.target.front.data.copy_from_slice(&self.target.back.data);
        self.clip.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_draw::PixelFormat;

    fn red() -> Color {
        Color::rgb(255, 0, 0)
    }

    fn canvas(target: &mut RasterTarget) -> RasterCanvas<'_> {
        RasterCanvas::new(target)
    }

    #[test]
    fn create_fails_without_realized_drawable() {
        assert!(RasterTarget::new(0, 10).is_none());
        assert!(RasterTarget::new(10, -1).is_none());
        assert!(RasterTarget::new(1, 1).is_some());
    }

    #[test]
    fn full_canvas_fill_is_solid_after_flush() {
        let mut target = RasterTarget::new(100, 50).unwrap();
        let mut c = canvas(&mut target);
        c.draw_rect(0, 0, 99, 49, red(), DrawStyle::Fill, 1);
        // Nothing visible before the flush.
        assert_eq!(c.target.front.pixel(10, 10), [0; 4]);
        c.flush();
        for y in 0..50 {
            for x in 0..100 {
                assert_eq!(target.front().pixel(x, y), [255, 0, 0, 255]);
            }
        }
    }

    #[test]
    fn fill_is_corner_order_invariant() {
        let mut a = RasterTarget::new(32, 32).unwrap();
        let mut b = RasterTarget::new(32, 32).unwrap();
        {
            let mut c = canvas(&mut a);
            c.draw_rect(4, 6, 20, 25, red(), DrawStyle::Fill, 1);
            c.flush();
        }
        {
            let mut c = canvas(&mut b);
            c.draw_rect(20, 25, 4, 6, red(), DrawStyle::Fill, 1);
            c.flush();
        }
        assert_eq!(a.front().data(), b.front().data());
    }

    #[test]
    fn swapped_line_endpoints_are_pixel_identical() {
        let cases = [(2, 3, 29, 17), (5, 20, 25, 4), (7, 7, 7, 30), (3, 9, 30, 9)];
        for (x1, y1, x2, y2) in cases {
            let mut a = RasterTarget::new(32, 32).unwrap();
            let mut b = RasterTarget::new(32, 32).unwrap();
            {
                let mut c = canvas(&mut a);
                c.draw_line(x1, y1, x2, y2, red(), DrawStyle::Stroke, 1);
                c.flush();
            }
            {
                let mut c = canvas(&mut b);
                c.draw_line(x2, y2, x1, y1, red(), DrawStyle::Stroke, 1);
                c.flush();
            }
            assert_eq!(a.front().data(), b.front().data(), "case {x1},{y1} {x2},{y2}");
        }
    }

    #[test]
    fn clip_reset_and_zero_sentinel_match() {
        let mut target = RasterTarget::new(16, 16).unwrap();
        let mut c = canvas(&mut target);
        c.set_clip_rect(2, 2, 8, 8);
        c.set_clip_rect(0, 0, 0, 0);
        assert_eq!(c.clip_rect(), ClipRect::ZERO);
        c.draw_rect(0, 0, 15, 15, red(), DrawStyle::Fill, 1);
        c.flush();
        assert_eq!(target.front().pixel(15, 15), [255, 0, 0, 255]);
        assert_eq!(target.front().pixel(0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn degenerate_clip_suppresses_all_drawing() {
        let mut target = RasterTarget::new(16, 16).unwrap();
        let mut c = canvas(&mut target);
        c.set_clip_rect(5, 2, 5, 12);
        c.draw_rect(0, 0, 15, 15, red(), DrawStyle::Fill, 1);
        c.flush();
        assert!(target.front().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn clip_restricts_fill() {
        let mut target = RasterTarget::new(16, 16).unwrap();
        let mut c = canvas(&mut target);
        c.set_clip_rect(4, 4, 8, 8);
        c.draw_rect(0, 0, 15, 15, red(), DrawStyle::Fill, 1);
        c.flush();
        assert_eq!(target.front().pixel(4, 4), [255, 0, 0, 255]);
        assert_eq!(target.front().pixel(7, 7), [255, 0, 0, 255]);
        assert_eq!(target.front().pixel(8, 8), [0; 4]);
        assert_eq!(target.front().pixel(3, 4), [0; 4]);
    }

    #[test]
    fn dashed_line_has_gaps_and_starts_on() {
        let mut target = RasterTarget::new(64, 8).unwrap();
        let mut c = canvas(&mut target);
        c.draw_line(0, 4, 63, 4, red(), DrawStyle::StrokeDash, 1);
        c.flush();
        // Pattern [6, 2]: first six pixels on, next two off.
        for x in 0..6 {
            assert_eq!(target.front().pixel(x, 4), [255, 0, 0, 255], "x={x}");
        }
        assert_eq!(target.front().pixel(6, 4), [0; 4]);
        assert_eq!(target.front().pixel(7, 4), [0; 4]);
        assert_eq!(target.front().pixel(8, 4), [255, 0, 0, 255]);
    }

    #[test]
    fn filled_quarter_pie_stays_in_its_quadrant() {
        let mut target = RasterTarget::new(64, 64).unwrap();
        let mut c = canvas(&mut target);
        // 0..90 degrees: up-and-right of the center in screen coordinates.
        c.draw_arc(0, 0, 63, 63, 0.0, 90.0, red(), DrawStyle::Fill, 1);
        c.flush();
        let mut painted = 0;
        for y in 0..64 {
            for x in 0..64 {
                if target.front().pixel(x, y) != [0; 4] {
                    painted += 1;
                    assert!(x >= 31 && y <= 32, "pixel ({x}, {y}) outside quadrant");
                }
            }
        }
        assert!(painted > 200, "quarter pie should cover a real area");
    }

    #[test]
    fn ellipse_stroke_stays_on_ring() {
        let mut target = RasterTarget::new(41, 41).unwrap();
        let mut c = canvas(&mut target);
        c.draw_ellipse(0, 0, 40, 40, red(), DrawStyle::Stroke, 1);
        c.flush();
        assert_eq!(target.front().pixel(20, 20), [0; 4], "center untouched");
        assert_eq!(target.front().pixel(40, 20), [255, 0, 0, 255], "3 o'clock");
        assert_eq!(target.front().pixel(20, 0), [255, 0, 0, 255], "12 o'clock");
    }

    #[test]
    fn polygon_fill_covers_triangle_interior() {
        let mut target = RasterTarget::new(32, 32).unwrap();
        let mut c = canvas(&mut target);
        c.draw_polygon(&[(2, 2), (29, 2), (2, 29)], red(), DrawStyle::Fill, 1);
        c.flush();
        assert_eq!(target.front().pixel(5, 5), [255, 0, 0, 255]);
        assert_eq!(target.front().pixel(28, 28), [0; 4]);
    }

    #[test]
    fn gradient_hits_both_end_colors() {
        let mut target = RasterTarget::new(32, 8).unwrap();
        let mut c = canvas(&mut target);
        c.draw_gradient(
            0,
            0,
            31,
            7,
            Color::rgb(0, 0, 0),
            Color::rgb(255, 255, 255),
            GradientDir::Horizontal,
        );
        c.flush();
        assert_eq!(target.front().pixel(0, 4), [0, 0, 0, 255]);
        assert_eq!(target.front().pixel(31, 4), [255, 255, 255, 255]);
        let mid = target.front().pixel(16, 4);
        assert!(mid[0] > 64 && mid[0] < 192, "midpoint is mid-gray");
    }

    #[test]
    fn centered_text_equals_left_text_at_computed_offset() {
        let font = FontDesc::default();
        let text = "ab";
        let mut a = RasterTarget::new(120, 40).unwrap();
        let mut b = RasterTarget::new(120, 40).unwrap();
        let tw = {
            let mut c = canvas(&mut a);
            let (tw, _) = c.text_extents(&font, text);
            c.draw_text(text, 10, 4, 100, 0, red(), &font, TextFlags::CENTER, 0.0);
            c.flush();
            tw
        };
        {
            let mut c = canvas(&mut b);
            c.draw_text(
                text,
                10 + (100 - tw) / 2,
                4,
                0,
                0,
                red(),
                &font,
                TextFlags::default(),
                0.0,
            );
            c.flush();
        }
        assert!(a.front().data().iter().any(|&v| v != 0), "text drew pixels");
        assert_eq!(a.front().data(), b.front().data());
    }

    #[test]
    fn text_clip_flag_confines_glyphs_to_box() {
        let font = FontDesc::default();
        let mut target = RasterTarget::new(64, 32).unwrap();
        let mut c = canvas(&mut target);
        c.draw_text(
            "wwwwwwww",
            2,
            2,
            20,
            10,
            red(),
            &font,
            TextFlags::CLIP,
            0.0,
        );
        c.flush();
        for y in 0..32 {
            for x in 0..64 {
                if target.front().pixel(x, y) != [0; 4] {
                    assert!((2..22).contains(&x) && (2..12).contains(&y));
                }
            }
        }
    }

    #[test]
    fn image_blits_at_native_size_ignoring_scale_request() {
        let img = ImageBits::solid(4, 4, Color::rgb(0, 255, 0));
        let mut target = RasterTarget::new(16, 16).unwrap();
        let mut c = canvas(&mut target);
        c.draw_image(&img, false, Color::WHITE, 2, 2, 12, 12);
        c.flush();
        assert_eq!(target.front().pixel(2, 2), [0, 255, 0, 255]);
        assert_eq!(target.front().pixel(5, 5), [0, 255, 0, 255]);
        assert_eq!(target.front().pixel(6, 6), [0; 4], "native 4x4, not scaled");
    }

    #[test]
    fn inactive_image_is_recolored() {
        let img = ImageBits::new(
            1,
            1,
            PixelFormat::Rgba8,
            alloc::vec![200, 0, 0, 255],
        )
        .unwrap();
        let mut target = RasterTarget::new(4, 4).unwrap();
        let mut c = canvas(&mut target);
        c.draw_image(&img, true, Color::WHITE, 0, 0, 0, 0);
        c.flush();
        let px = target.front().pixel(0, 0);
        assert_ne!(px, [200, 0, 0, 255]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn update_size_reallocates_and_clears() {
        let mut target = RasterTarget::new(8, 8).unwrap();
        {
            let mut c = canvas(&mut target);
            c.draw_rect(0, 0, 7, 7, red(), DrawStyle::Fill, 1);
            c.flush();
        }
        let mut c = canvas(&mut target);
        c.update_size(12, 10);
        assert_eq!(c.size(), (12, 10));
        assert!(c.back().data().iter().all(|&v| v == 0), "buffer cleared");
    }

    #[test]
    fn alpha_blends_toward_destination() {
        let mut target = RasterTarget::new(4, 4).unwrap();
        let mut c = canvas(&mut target);
        c.draw_rect(0, 0, 3, 3, Color::WHITE, DrawStyle::Fill, 1);
        c.draw_rect(0, 0, 3, 3, Color::new(0, 0, 0, 128), DrawStyle::Fill, 1);
        c.flush();
        let px = target.front().pixel(1, 1);
        assert!(px[0] > 100 && px[0] < 150, "half-black over white: {px:?}");
        assert_eq!(px[3], 255);
    }
}
