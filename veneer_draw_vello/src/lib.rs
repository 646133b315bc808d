// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vello scenegraph backend for the Veneer draw contract.
//!
//! Every draw call appends nodes to a retained [`vello::Scene`] that the
//! embedding window system's compositor renders; flush is therefore a
//! no-op apart from clip-state cleanup. Primitives the scene cannot
//! express directly — text, and images needing the disabled-state
//! recolor — are synthesized into RGBA8 buffers and inserted as image
//! nodes positioned by affine transforms.
//!
//! Buffers synthesized during a frame are not released when the canvas
//! dies: the compositor may still be sampling them asynchronously. They
//! move to a pending-disposal list on the persistent target and are
//! drained at the start of the *next* canvas creation, when the previous
//! frame's scene has been replaced.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{Affine, BezPath, Point, Stroke};
use vello::Scene;
use vello::peniko::{
    Blob, Brush, Color as VColor, ColorStop, Extend, Fill, Gradient, GradientKind, ImageAlphaType,
    ImageBrush, ImageData, ImageFormat, ImageSampler, LinearGradientPosition,
};

use veneer_draw::{
    BitmapFont, ClipRect, ClipRegion, ClipTracker, Color, DrawCanvas, DrawStyle, FontDesc,
    GradientDir, HAlign, ImageBits, TextFlags, path,
};

/// Persistent per-widget state for the scenegraph backend.
#[derive(Debug, Default)]
pub struct VelloTarget {
    width: i32,
    height: i32,
    /// Frame-synthesized image resources awaiting disposal. Drained at
    /// the start of the next canvas creation, not at the end of the
    /// frame that made them — the compositor may still read them.
    pending_release: Vec<ImageData>,
}

impl VelloTarget {
    /// Bind to a drawable of the given size; `None` when unrealized.
    pub fn new(width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            pending_release: Vec::new(),
        })
    }

    /// Current size of the bound drawable.
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Number of synthesized resources currently awaiting disposal.
    pub fn pending_disposals(&self) -> usize {
        self.pending_release.len()
    }
}

/// A draw canvas appending to a retained Vello scene.
pub struct VelloCanvas<'t, 's> {
    target: &'t mut VelloTarget,
    /// Scene being (re)built for this frame.
    pub scene: &'s mut Scene,
    clip: ClipTracker,
    clip_pushed: bool,
    /// Images synthesized this frame; handed to the target on drop.
    frame_images: Vec<ImageData>,
}

impl core::fmt::Debug for VelloCanvas<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("VelloCanvas { .. }")
    }
}

fn to_vello_color(color: Color) -> VColor {
    let [r, g, b, a] = color.to_rgba8();
    VColor::from_rgba8(r, g, b, a)
}

fn solid(color: Color) -> Brush {
    Brush::Solid(to_vello_color(color))
}

fn stroke_for(style: DrawStyle, line_width: i32) -> Stroke {
    let mut stroke = Stroke::new(f64::from(line_width.max(1)));
    if let Some(pattern) = style.dash_pattern() {
        stroke.dash_pattern = pattern.iter().copied().collect();
        stroke.dash_offset = 0.0;
    }
    stroke
}

impl<'t, 's> VelloCanvas<'t, 's> {
    /// Bind a canvas to the target, resetting the scene for this frame
    /// and draining the previous frame's pending disposals.
    pub fn new(target: &'t mut VelloTarget, scene: &'s mut Scene) -> Self {
        // The previous scene is gone once we reset, so its synthesized
        // buffers can finally be dropped.
        target.pending_release.clear();
        scene.reset();
        Self {
            target,
            scene,
            clip: ClipTracker::new(),
            clip_pushed: false,
            frame_images: Vec::new(),
        }
    }

    fn apply_clip(&mut self) {
        if self.clip_pushed {
            self.scene.pop_layer();
            self.clip_pushed = false;
        }
        let rect = match self.clip.region(self.target.width, self.target.height) {
            ClipRegion::Full => return,
            ClipRegion::Empty => ClipRect::ZERO,
            ClipRegion::Rect(r) => r,
        };
        let clip = kurbo::Rect::new(
            f64::from(rect.x1),
            f64::from(rect.y1),
            f64::from(rect.x2),
            f64::from(rect.y2),
        );
        self.scene.push_clip_layer(Affine::IDENTITY, &clip);
        self.clip_pushed = true;
    }

    fn fill_path(&mut self, p: &BezPath, color: Color) {
        self.scene
            .fill(Fill::EvenOdd, Affine::IDENTITY, &solid(color), None, p);
    }

    fn stroke_path(&mut self, p: &BezPath, color: Color, style: DrawStyle, line_width: i32) {
        self.scene.stroke(
            &stroke_for(style, line_width),
            Affine::IDENTITY,
            &solid(color),
            None,
            p,
        );
    }

    /// Insert straight-alpha RGBA8 pixels as an image node at `(x, y)`.
    ///
    /// The backing blob is retained on the frame list until the frame
    /// after next (deferred disposal).
    fn blit_rgba(&mut self, pixels: Vec<u8>, w: u32, h: u32, x: i32, y: i32) {
        if w == 0 || h == 0 {
            return;
        }
        let image = ImageData {
            data: Blob::from(pixels),
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            width: w,
            height: h,
        };
        let brush = ImageBrush {
            image: &image,
            sampler: ImageSampler::default(),
        };
        self.scene
            .draw_image(brush, Affine::translate((f64::from(x), f64::from(y))));
        self.frame_images.push(image);
    }
}

impl Drop for VelloCanvas<'_, '_> {
    fn drop(&mut self) {
        // Keep this frame's synthesized buffers alive until the next
        // canvas creation replaces the scene.
        self.target
            .pending_release
            .append(&mut self.frame_images);
    }
}

impl DrawCanvas for VelloCanvas<'_, '_> {
    fn description(&self) -> &'static str {
        "VELLO"
    }

    fn size(&self) -> (i32, i32) {
        self.target.size()
    }

    fn update_size(&mut self, width: i32, height: i32) {
        if width <= 0 || height <= 0 || (width, height) == self.target.size() {
            return;
        }
        self.target.width = width;
        self.target.height = height;
        // The scene holds stale geometry for the old size; every caller
        // repaints after a resize.
        self.scene.reset();
        self.clip_pushed = false;
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
        let mut p = BezPath::new();
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
            self.scene
                .fill(Fill::EvenOdd, Affine::IDENTITY, &solid(color), None, &r);
        } else {
            let r = path::stroke_rect(x1, y1, x2, y2);
            self.scene.stroke(
                &stroke_for(style, line_width),
                Affine::IDENTITY,
                &solid(color),
                None,
                &r,
            );
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
            GradientDir::Horizontal => (Point::new(r.x0, r.y0), Point::new(r.x1, r.y0)),
            GradientDir::Vertical => (Point::new(r.x0, r.y0), Point::new(r.x0, r.y1)),
        };
        let stops = [
            ColorStop::from((0.0, to_vello_color(from))),
            ColorStop::from((1.0, to_vello_color(to))),
        ];
        let gradient = Gradient {
            kind: GradientKind::Linear(LinearGradientPosition::new(start, end)),
            extend: Extend::Pad,
            stops: stops.as_slice().into(),
            ..Gradient::default()
        };
        self.scene.fill(
            Fill::EvenOdd,
            Affine::IDENTITY,
            &Brush::Gradient(gradient),
            None,
            &r,
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
        let width = u32::try_from(tw).unwrap_or(0);
        let height = u32::try_from(th).unwrap_or(0);
        let image = ImageData {
            data: Blob::from(pixels),
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            width,
            height,
        };
        // Rotation is an affine on the image node, around the box origin.
        let transform = if orientation != 0.0 {
            Affine::translate((f64::from(x), f64::from(y)))
                * Affine::rotate(-orientation.to_radians())
                * Affine::translate((f64::from(ox - x), f64::from(oy - y)))
        } else {
            Affine::translate((f64::from(ox), f64::from(oy)))
        };
        let clipped = flags.contains(TextFlags::CLIP);
        if clipped {
            let clip = kurbo::Rect::new(
                f64::from(x),
                f64::from(y),
                f64::from(x + bw),
                f64::from(y + bh),
            );
            self.scene.push_clip_layer(Affine::IDENTITY, &clip);
        }
        let brush = ImageBrush {
            image: &image,
            sampler: ImageSampler::default(),
        };
        self.scene.draw_image(brush, transform);
        if clipped {
            self.scene.pop_layer();
        }
        self.frame_images.push(image);
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
        // Native size only on this backend.
        let pixels = image.resolve_rgba8(inactive, background);
        self.blit_rgba(pixels, image.width(), image.height(), x, y);
    }

    fn flush(&mut self) {
        // The scene is retained by the embedding compositor; nothing to
        // copy here. Residual clip state must not leak into the next
        // frame's scene.
        if self.clip_pushed {
            self.scene.pop_layer();
            self.clip_pushed = false;
        }
        self.clip.reset();
    }
}
