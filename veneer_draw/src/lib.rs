// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Veneer Draw: the backend-agnostic flat-widget canvas contract.
//!
//! This crate defines the immediate-mode drawing contract that every
//! Veneer backend satisfies, plus the plain-data types the contract is
//! expressed in. It sits between the flat-widget helper layer and the
//! concrete backends.
//!
//! # Position in the stack
//!
//! - **Flat widgets / helper layer**: custom-drawn controls and the
//!   border/box/icon primitives they share. Lives in `veneer_flat`;
//!   consumes only this crate's contract.
//! - **Draw contract (this crate)**: the [`DrawCanvas`] trait, the packed
//!   [`Color`] model, clip-rectangle state, draw styles, text flags, font
//!   descriptors, and source-image pixel formats.
//! - **Backends**: one crate per native graphics system
//!   (`veneer_draw_raster`, `veneer_draw_cairo`, `veneer_draw_vello`,
//!   `veneer_draw_vello_cpu`, `veneer_draw_skia`, `veneer_draw_svg`).
//!   Exactly one is linked into a consumer binary.
//!
//! # Canvas lifecycle
//!
//! A canvas is created at the start of a redraw bound to the owning
//! widget's current drawable and size, receives any number of draw calls,
//! is flushed exactly once (compositing its off-screen buffer onto the
//! visible surface), and is then dropped. A canvas never outlives the
//! redraw that created it and is never shared; the only state retained
//! across redraws is each backend's persistent off-screen buffer.
//!
//! # Failure semantics
//!
//! Nothing here raises errors to the caller. Degenerate input (empty
//! text, zero-area geometry) is a silent no-op; a backend whose native
//! surface cannot be bound returns `None` from its constructor and no
//! canvas ever exists for that redraw. A failed draw degrades to
//! "nothing drawn", never to a crash.

#![no_std]

extern crate alloc;

pub mod color;
pub mod font;
pub mod image;

pub use color::{Color, Shadows, compute_shadows, format_color};
pub use font::{BitmapFont, FontDesc, GLYPH_HEIGHT, GLYPH_WIDTH, TextMask};
pub use image::{ImageBits, PixelFormat};

use bitflags::bitflags;

/// The active clip rectangle of a canvas.
///
/// Bounds are min-inclusive, max-exclusive: the rectangle covers pixels
/// with `x1 <= x < x2` and `y1 <= y < y2`. The all-zero quadruple is the
/// "no clipping" sentinel; a rectangle with `x1 >= x2` or `y1 >= y2` is an
/// *empty* clip — valid, suppressing all drawing — and is never confused
/// with the sentinel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClipRect {
    /// Left edge, inclusive.
    pub x1: i32,
    /// Top edge, inclusive.
    pub y1: i32,
    /// Right edge, exclusive.
    pub x2: i32,
    /// Bottom edge, exclusive.
    pub y2: i32,
}

impl ClipRect {
    /// The "no clipping" sentinel.
    pub const ZERO: Self = Self {
        x1: 0,
        y1: 0,
        x2: 0,
        y2: 0,
    };

    /// Create a clip rectangle from its four edges.
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Whether this is the literal all-zero sentinel.
    pub const fn is_zero(self) -> bool {
        self.x1 == 0 && self.y1 == 0 && self.x2 == 0 && self.y2 == 0
    }

    /// Intersection with another rectangle.
    pub fn intersect(self, other: Self) -> Self {
        Self {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        }
    }
}

/// The clip region a backend must actually honor for a draw call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClipRegion {
    /// No clip set; the canvas bounds are the only limit.
    Full,
    /// An empty clip is active; every draw call is suppressed.
    Empty,
    /// A non-empty rectangle, already intersected with the canvas bounds.
    Rect(ClipRect),
}

/// Shared clip-state machine embedded by every backend.
///
/// Implements the contract's sentinel handling, degenerate-rectangle
/// normalization, and canvas-bounds intersection once, so the observable
/// clip behavior is identical across backends.
#[derive(Clone, Debug, Default)]
pub struct ClipTracker {
    rect: Option<ClipRect>,
}

impl ClipTracker {
    /// New tracker in the unclipped state.
    pub const fn new() -> Self {
        Self { rect: None }
    }

    /// Set the clip rectangle. The all-zero quadruple resets instead.
    pub fn set(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let r = ClipRect::new(x1, y1, x2, y2);
        if r.is_zero() {
            self.rect = None;
        } else {
            self.rect = Some(r);
        }
    }

    /// Remove any active clip.
    pub fn reset(&mut self) {
        self.rect = None;
    }

    /// The stored rectangle, or the all-zero sentinel when unclipped.
    pub fn get(&self) -> ClipRect {
        self.rect.unwrap_or(ClipRect::ZERO)
    }

    /// Whether a clip rectangle is currently set.
    pub fn is_active(&self) -> bool {
        self.rect.is_some()
    }

    /// Resolve the region to honor on a canvas of the given size.
    pub fn region(&self, width: i32, height: i32) -> ClipRegion {
        let Some(r) = self.rect else {
            return ClipRegion::Full;
        };
        let clamped = r.intersect(ClipRect::new(0, 0, width, height));
        if clamped.x1 >= clamped.x2 || clamped.y1 >= clamped.y2 {
            ClipRegion::Empty
        } else {
            ClipRegion::Rect(clamped)
        }
    }
}

/// How a shape primitive paints: filled interior or an outline with an
/// optional dash cadence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawStyle {
    /// Paint the interior; line width is ignored.
    Fill,
    /// Solid outline.
    Stroke,
    /// Dashed outline.
    StrokeDash,
    /// Dotted outline.
    StrokeDot,
    /// Dash-dot outline.
    StrokeDashDot,
    /// Dash-dot-dot outline.
    StrokeDashDotDot,
}

impl DrawStyle {
    /// Whether this style fills the interior.
    pub const fn is_fill(self) -> bool {
        matches!(self, Self::Fill)
    }

    /// The on/off dash pattern in pixels, `None` for fill or solid stroke.
    ///
    /// Patterns are defined here once so every backend strokes the same
    /// cadence, whatever its native dash representation.
    pub const fn dash_pattern(self) -> Option<&'static [f64]> {
        match self {
            Self::Fill | Self::Stroke => None,
            Self::StrokeDash => Some(&[6.0, 2.0]),
            Self::StrokeDot => Some(&[2.0, 2.0]),
            Self::StrokeDashDot => Some(&[7.0, 3.0, 1.0, 3.0]),
            Self::StrokeDashDotDot => Some(&[7.0, 3.0, 1.0, 3.0, 1.0, 3.0]),
        }
    }
}

/// Direction of an axis-aligned linear gradient fill.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GradientDir {
    /// Colors interpolate left to right.
    Horizontal,
    /// Colors interpolate top to bottom.
    Vertical,
}

/// Horizontal alignment of text lines inside their box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HAlign {
    /// Align to the left edge.
    #[default]
    Left,
    /// Center within the box.
    Center,
    /// Align to the right edge.
    Right,
}

bitflags! {
    /// Text rendering policy bits.
    ///
    /// The horizontal-alignment bits are mutually exclusive; when both are
    /// set, `CENTER` wins. The remaining bits combine freely.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct TextFlags: u8 {
        /// Center lines horizontally (default is left).
        const CENTER = 1 << 0;
        /// Right-align lines.
        const RIGHT = 1 << 1;
        /// Wrap lines to the box width (backends with a text engine only).
        const WRAP = 1 << 2;
        /// Elide overflowing text with `…` (backends with a text engine only).
        const ELLIPSIS = 1 << 3;
        /// Clip glyphs to the box.
        const CLIP = 1 << 4;
        /// Center the laid-out block vertically inside the box.
        const LAYOUT_CENTER = 1 << 5;
    }
}

impl TextFlags {
    /// Resolve the horizontal-alignment group.
    pub fn halign(self) -> HAlign {
        if self.contains(Self::CENTER) {
            HAlign::Center
        } else if self.contains(Self::RIGHT) {
            HAlign::Right
        } else {
            HAlign::Left
        }
    }
}

/// The draw contract every backend satisfies.
///
/// All coordinates are integer pixels. Shape bounds are inclusive on both
/// ends and are ordered by the callee: callers never need to pre-sort
/// corner pairs, and swapped corners produce identical output. Clip
/// bounds follow [`ClipRect`]'s min-inclusive/max-exclusive convention.
///
/// Arc angles are degrees, counter-clockwise on screen from the
/// 3-o'clock direction: the point at angle θ on an arc with center
/// `(cx, cy)` and radii `(rx, ry)` is `(cx + rx·cos θ, cy − ry·sin θ)`.
/// Reconciling a native arc primitive's sign/rotation convention to this
/// canonical orientation is each backend's responsibility.
pub trait DrawCanvas {
    /// Backend-identifier marker for diagnostics (e.g. `"RASTER"`).
    fn description(&self) -> &'static str;

    /// Canvas dimensions in pixels, captured at creation.
    fn size(&self) -> (i32, i32);

    /// Rebind to a new owner size. When the size changed, the off-screen
    /// buffer is reallocated and its prior content is undefined — the
    /// caller must fully repaint.
    fn update_size(&mut self, width: i32, height: i32);

    /// Set the active clip rectangle. Passing the all-zero quadruple is
    /// equivalent to [`DrawCanvas::reset_clip`]; a degenerate rectangle
    /// becomes an empty clip that suppresses all drawing.
    fn set_clip_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32);

    /// Remove any active clip.
    fn reset_clip(&mut self);

    /// The stored clip rectangle, all-zero when unclipped.
    fn clip_rect(&self) -> ClipRect;

    /// Draw a line between two points. Endpoints are normalized by the
    /// callee so swapped endpoints rasterize identically.
    fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        style: DrawStyle,
        line_width: i32,
    );

    /// Draw a rectangle with inclusive corner coordinates.
    fn draw_rect(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        style: DrawStyle,
        line_width: i32,
    );

    /// Draw an elliptic arc inside the bounding box, from `a1` to `a2`
    /// degrees in the canonical orientation. `Fill` paints the pie slice.
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
    );

    /// Draw a full ellipse inside the bounding box.
    fn draw_ellipse(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        style: DrawStyle,
        line_width: i32,
    ) {
        self.draw_arc(x1, y1, x2, y2, 0.0, 360.0, color, style, line_width);
    }

    /// Draw a polygon. `Fill` closes the point list and fills even-odd;
    /// stroke styles follow the open point list.
    fn draw_polygon(&mut self, points: &[(i32, i32)], color: Color, style: DrawStyle, line_width: i32);

    /// Draw a rectangle with rounded corners.
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
    );

    /// Stroke a cubic Bézier curve from `(x1, y1)` to `(x2, y2)` with
    /// control points `(cx1, cy1)` and `(cx2, cy2)`. `Fill` is treated as
    /// a solid stroke.
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
    );

    /// Stroke a quadratic Bézier curve with one control point.
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
    );

    /// Fill a rectangle with an axis-aligned linear gradient.
    fn draw_gradient(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        from: Color,
        to: Color,
        dir: GradientDir,
    );

    /// Render text inside the `(x, y, w, h)` box honoring `flags` and a
    /// rotation of `orientation` degrees counter-clockwise around the box
    /// origin. Empty text is a no-op; a `w`/`h` of 0 auto-sizes the box
    /// to the text's natural metrics.
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
    );

    /// Multi-line pixel extents of `text` under `font` on this backend.
    fn text_extents(&self, font: &FontDesc, text: &str) -> (i32, i32);

    /// Blit a source image with its top-left corner at `(x, y)`. A `w`/`h`
    /// of 0 or below draws at the image's native size; backends without
    /// scaling support always draw at native size (a documented
    /// capability gap, not an error). `inactive` recolors toward
    /// `background` via the disabled-control blend.
    fn draw_image(
        &mut self,
        image: &ImageBits,
        inactive: bool,
        background: Color,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    );

    /// Composite the off-screen buffer onto the visible surface. Called
    /// exactly once per redraw; resets any residual clip state so the
    /// next canvas starts clean.
    fn flush(&mut self);
}

/// Geometry helpers shared by the vector-path backends.
///
/// Centralizes the canonical-orientation arc construction and the
/// half-pixel conventions that keep fills and strokes bit-compatible with
/// the raster backend.
pub mod path {
    use kurbo::{Arc, BezPath, PathEl, Point, Rect, RoundedRect, Shape, Vec2};

    /// Flattening tolerance used when lowering shapes to Bézier paths.
    pub const TOLERANCE: f64 = 0.25;

    /// Order a coordinate pair ascending.
    pub const fn ordered(a: i32, b: i32) -> (i32, i32) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// The fill rectangle covering the inclusive pixel bounds
    /// `[x1..=x2] × [y1..=y2]`, corners auto-swapped.
    pub fn fill_rect(x1: i32, y1: i32, x2: i32, y2: i32) -> Rect {
        let (x1, x2) = ordered(x1, x2);
        let (y1, y2) = ordered(y1, y2);
        Rect::new(
            f64::from(x1),
            f64::from(y1),
            f64::from(x2) + 1.0,
            f64::from(y2) + 1.0,
        )
    }

    /// The stroke rectangle whose outline lands on the centers of the
    /// boundary pixels of `[x1..=x2] × [y1..=y2]`.
    pub fn stroke_rect(x1: i32, y1: i32, x2: i32, y2: i32) -> Rect {
        let (x1, x2) = ordered(x1, x2);
        let (y1, y2) = ordered(y1, y2);
        Rect::new(
            f64::from(x1) + 0.5,
            f64::from(y1) + 0.5,
            f64::from(x2) + 0.5,
            f64::from(y2) + 0.5,
        )
    }

    fn arc_shape(x1: i32, y1: i32, x2: i32, y2: i32, a1: f64, a2: f64) -> Arc {
        let (x1, x2) = ordered(x1, x2);
        let (y1, y2) = ordered(y1, y2);
        let cx = (f64::from(x1) + f64::from(x2)) / 2.0;
        let cy = (f64::from(y1) + f64::from(y2)) / 2.0;
        let rx = (f64::from(x2) - f64::from(x1)) / 2.0;
        let ry = (f64::from(y2) - f64::from(y1)) / 2.0;
        // Canonical angles increase counter-clockwise on screen; kurbo's
        // increase clockwise in the y-down frame, hence the negation.
        Arc {
            center: Point::new(cx, cy),
            radii: Vec2::new(rx, ry),
            start_angle: -a1.to_radians(),
            sweep_angle: -(a2 - a1).to_radians(),
            x_rotation: 0.0,
        }
    }

    /// An arc path in the canonical orientation. With `pie` the path runs
    /// center → arc start → arc → closed, suitable for filling the slice;
    /// otherwise it is the bare arc for stroking.
    pub fn arc(x1: i32, y1: i32, x2: i32, y2: i32, a1: f64, a2: f64, pie: bool) -> BezPath {
        let shape = arc_shape(x1, y1, x2, y2, a1, a2);
        let mut p = BezPath::new();
        if pie {
            p.move_to(shape.center);
            for el in shape.path_elements(TOLERANCE) {
                match el {
                    PathEl::MoveTo(pt) => p.line_to(pt),
                    other => p.push(other),
                }
            }
            p.close_path();
        } else {
            for el in shape.path_elements(TOLERANCE) {
                p.push(el);
            }
        }
        p
    }

    /// A rounded-rectangle path over the inclusive pixel bounds.
    pub fn rounded_rect(x1: i32, y1: i32, x2: i32, y2: i32, radius: i32) -> BezPath {
        let r = fill_rect(x1, y1, x2, y2);
        RoundedRect::from_rect(r, f64::from(radius.max(0))).to_path(TOLERANCE)
    }

    /// A polygon path; closed when `close` is set.
    pub fn polygon(points: &[(i32, i32)], close: bool) -> BezPath {
        let mut p = BezPath::new();
        let mut iter = points.iter();
        let Some(&(x, y)) = iter.next() else {
            return p;
        };
        p.move_to((f64::from(x), f64::from(y)));
        for &(x, y) in iter {
            p.line_to((f64::from(x), f64::from(y)));
        }
        if close {
            p.close_path();
        }
        p
    }

    /// A single cubic Bézier segment.
    pub fn cubic(
        x1: i32,
        y1: i32,
        cx1: i32,
        cy1: i32,
        cx2: i32,
        cy2: i32,
        x2: i32,
        y2: i32,
    ) -> BezPath {
        let mut p = BezPath::new();
        p.move_to((f64::from(x1), f64::from(y1)));
        p.curve_to(
            (f64::from(cx1), f64::from(cy1)),
            (f64::from(cx2), f64::from(cy2)),
            (f64::from(x2), f64::from(y2)),
        );
        p
    }

    /// A single quadratic Bézier segment.
    pub fn quadratic(x1: i32, y1: i32, cx: i32, cy: i32, x2: i32, y2: i32) -> BezPath {
        let mut p = BezPath::new();
        p.move_to((f64::from(x1), f64::from(y1)));
        p.quad_to((f64::from(cx), f64::from(cy)), (f64::from(x2), f64::from(y2)));
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinel_resets_clip() {
        let mut clip = ClipTracker::new();
        clip.set(10, 10, 50, 40);
        assert!(clip.is_active());
        clip.set(0, 0, 0, 0);
        assert!(!clip.is_active());
        assert_eq!(clip.get(), ClipRect::ZERO);
        assert_eq!(clip.region(100, 100), ClipRegion::Full);
    }

    #[test]
    fn reset_and_zero_sentinel_are_equivalent() {
        let mut a = ClipTracker::new();
        let mut b = ClipTracker::new();
        a.set(5, 5, 20, 20);
        b.set(5, 5, 20, 20);
        a.reset();
        b.set(0, 0, 0, 0);
        assert_eq!(a.get(), b.get());
        assert_eq!(a.region(64, 64), b.region(64, 64));
    }

    #[test]
    fn degenerate_rect_is_empty_not_reset() {
        let mut clip = ClipTracker::new();
        clip.set(7, 3, 7, 30);
        assert!(clip.is_active());
        assert_eq!(clip.region(100, 100), ClipRegion::Empty);
        assert_ne!(clip.get(), ClipRect::ZERO);
    }

    #[test]
    fn region_intersects_canvas_bounds() {
        let mut clip = ClipTracker::new();
        clip.set(-10, -10, 5, 5);
        assert_eq!(
            clip.region(100, 100),
            ClipRegion::Rect(ClipRect::new(0, 0, 5, 5))
        );
        clip.set(90, 90, 300, 300);
        assert_eq!(
            clip.region(100, 100),
            ClipRegion::Rect(ClipRect::new(90, 90, 100, 100))
        );
        clip.set(200, 0, 300, 50);
        assert_eq!(clip.region(100, 100), ClipRegion::Empty);
    }

    #[test]
    fn fill_styles_have_no_dash_pattern() {
        assert!(DrawStyle::Fill.dash_pattern().is_none());
        assert!(DrawStyle::Stroke.dash_pattern().is_none());
        for style in [
            DrawStyle::StrokeDash,
            DrawStyle::StrokeDot,
            DrawStyle::StrokeDashDot,
            DrawStyle::StrokeDashDotDot,
        ] {
            let pattern = style.dash_pattern().expect("stroke cadence");
            assert_eq!(pattern.len() % 2, 0, "on/off pairs");
        }
    }

    #[test]
    fn center_wins_over_right() {
        let flags = TextFlags::CENTER | TextFlags::RIGHT;
        assert_eq!(flags.halign(), HAlign::Center);
        assert_eq!(TextFlags::RIGHT.halign(), HAlign::Right);
        assert_eq!(TextFlags::default().halign(), HAlign::Left);
    }

    #[test]
    fn fill_rect_is_corner_order_invariant() {
        assert_eq!(path::fill_rect(10, 20, 3, 4), path::fill_rect(3, 4, 10, 20));
        let r = path::fill_rect(0, 0, 9, 9);
        assert_eq!((r.width(), r.height()), (10.0, 10.0));
    }

    #[test]
    fn pie_path_starts_at_center() {
        let p = path::arc(0, 0, 100, 100, 0.0, 90.0, true);
        let els: alloc::vec::Vec<_> = p.elements().to_vec();
        match els.first() {
            Some(kurbo::PathEl::MoveTo(pt)) => {
                assert_eq!((pt.x, pt.y), (50.0, 50.0));
            }
            other => panic!("expected MoveTo(center), got {other:?}"),
        }
        assert!(matches!(els.last(), Some(kurbo::PathEl::ClosePath)));
    }

    #[test]
    fn arc_start_point_is_canonical() {
        // 0 degrees is 3 o'clock; 90 degrees is straight up (smaller y).
        let p = path::arc(0, 0, 100, 100, 90.0, 180.0, false);
        match p.elements().first() {
            Some(kurbo::PathEl::MoveTo(pt)) => {
                assert!((pt.x - 50.0).abs() < 1e-6, "x at 12 o'clock");
                assert!((pt.y - 0.0).abs() < 1e-6, "y at 12 o'clock");
            }
            other => panic!("expected MoveTo, got {other:?}"),
        }
    }
}
