// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat-widget drawing primitives.
//!
//! Everything here is built strictly on the [`DrawCanvas`] contract —
//! never on a native API — which is what lets a single flat-widget redraw
//! routine execute unmodified on every backend. The primitives are the
//! shared vocabulary of the flat controls: filled boxes and nested
//! borders with disabled-state recoloring, the image+text icon layout,
//! the small indicator glyphs (arrows, check marks, radio circles), focus
//! feedback, separators, and the derived theme colors.

use std::sync::OnceLock;

use veneer_draw::{
    ClipRect, Color, DrawCanvas, DrawStyle, FontDesc, HAlign, ImageBits, TextFlags,
    compute_shadows,
};

/// Where the image sits relative to the text inside an icon.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ImagePosition {
    /// Image to the left of the text.
    #[default]
    Left,
    /// Image to the right of the text.
    Right,
    /// Image above the text.
    Top,
    /// Image below the text.
    Bottom,
}

/// Vertical alignment of the icon content inside its rectangle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    /// Align to the top edge.
    Top,
    /// Center vertically.
    #[default]
    Center,
    /// Align to the bottom edge.
    Bottom,
}

/// Direction an arrow glyph points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArrowDirection {
    /// Pointing left.
    Left,
    /// Pointing right.
    Right,
    /// Pointing up.
    Up,
    /// Pointing down.
    Down,
}

/// Extra margin reserved around icon content for keyboard-focus feedback.
const FOCUS_MARGIN: i32 = 2;

fn resolve(fg: Color, bg: Color, active: bool) -> Color {
    if active { fg } else { fg.to_inactive(bg) }
}

/// Fill the rectangle with `fg`, recolored toward `bg` when inactive.
pub fn draw_box(
    canvas: &mut dyn DrawCanvas,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    fg: Color,
    bg: Color,
    active: bool,
) {
    canvas.draw_rect(x1, y1, x2, y2, resolve(fg, bg, active), DrawStyle::Fill, 1);
}

/// Stroke `width` nested rectangle outlines, outermost first.
///
/// No-op when `width` is zero or the rectangle is degenerate. The
/// disabled recoloring is applied before stroking.
pub fn draw_border(
    canvas: &mut dyn DrawCanvas,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    width: i32,
    fg: Color,
    bg: Color,
    active: bool,
) {
    if width <= 0 || x1 >= x2 || y1 >= y2 {
        return;
    }
    let color = resolve(fg, bg, active);
    for i in 0..width {
        if x1 + i > x2 - i || y1 + i > y2 - i {
            break;
        }
        canvas.draw_rect(
            x1 + i,
            y1 + i,
            x2 - i,
            y2 - i,
            color,
            DrawStyle::Stroke,
            1,
        );
    }
}

/// Text extents under `orientation`: a rotation within a right angle of
/// vertical swaps the box, anything else keeps the horizontal metrics
/// (the same approximation the icon layout has always used).
fn oriented_text_extents(
    canvas: &dyn DrawCanvas,
    font: &FontDesc,
    text: &str,
    orientation: f64,
) -> (i32, i32) {
    let (w, h) = canvas.text_extents(font, text);
    let a = orientation.rem_euclid(180.0);
    if (45.0..135.0).contains(&a) { (h, w) } else { (w, h) }
}

/// Combined bounding box of an optional image and optional text arranged
/// per `position` with `spacing` between them and `padding` on all sides.
///
/// When either part is absent its size — and the spacing between the two
/// parts — collapses to zero. `focus_feedback` reserves the extra margin
/// keyboard-focusable controls need for their focus rectangle.
pub fn icon_size(
    canvas: &dyn DrawCanvas,
    image: Option<&ImageBits>,
    title: Option<&str>,
    font: &FontDesc,
    position: ImagePosition,
    spacing: i32,
    padding: (i32, i32),
    orientation: f64,
    focus_feedback: bool,
) -> (i32, i32) {
    let (iw, ih) = image.map_or((0, 0), |img| {
        (
            i32::try_from(img.width()).unwrap_or(0),
            i32::try_from(img.height()).unwrap_or(0),
        )
    });
    let (tw, th) = title
        .filter(|t| !t.is_empty())
        .map_or((0, 0), |t| oriented_text_extents(canvas, font, t, orientation));
    let gap = if iw > 0 && tw > 0 { spacing } else { 0 };
    let (mut w, mut h) = match position {
        ImagePosition::Left | ImagePosition::Right => (iw + gap + tw, ih.max(th)),
        ImagePosition::Top | ImagePosition::Bottom => (iw.max(tw), ih + gap + th),
    };
    w += 2 * padding.0;
    h += 2 * padding.1;
    if focus_feedback {
        w += 2 * FOCUS_MARGIN;
        h += 2 * FOCUS_MARGIN;
    }
    (w, h)
}

/// Lay out and paint an image+text icon inside the rectangle.
///
/// The canvas clip is narrowed to the icon rectangle (intersected with
/// any pre-existing clip) for the duration of the call and restored on
/// exit. Alignment places the combined content block; text wider than
/// its slot is left to [`DrawCanvas::draw_text`]'s wrap/ellipsis flags.
pub fn draw_icon(
    canvas: &mut dyn DrawCanvas,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    image: Option<&ImageBits>,
    title: Option<&str>,
    font: &FontDesc,
    position: ImagePosition,
    spacing: i32,
    halign: HAlign,
    valign: VAlign,
    padding: (i32, i32),
    text_flags: TextFlags,
    orientation: f64,
    fg: Color,
    bg: Color,
    active: bool,
) {
    if x1 >= x2 || y1 >= y2 {
        return;
    }
    let prev = canvas.clip_rect();
    let icon = ClipRect::new(x1, y1, x2 + 1, y2 + 1);
    let clip = if prev.is_zero() {
        icon
    } else {
        prev.intersect(icon)
    };
    canvas.set_clip_rect(clip.x1, clip.y1, clip.x2, clip.y2);

    let (iw, ih) = image.map_or((0, 0), |img| {
        (
            i32::try_from(img.width()).unwrap_or(0),
            i32::try_from(img.height()).unwrap_or(0),
        )
    });
    let title = title.filter(|t| !t.is_empty());
    let (tw, th) = title.map_or((0, 0), |t| oriented_text_extents(canvas, font, t, orientation));
    let gap = if iw > 0 && tw > 0 { spacing } else { 0 };
    let (cw, ch) = match position {
        ImagePosition::Left | ImagePosition::Right => (iw + gap + tw, ih.max(th)),
        ImagePosition::Top | ImagePosition::Bottom => (iw.max(tw), ih + gap + th),
    };

    let avail_w = (x2 - x1 + 1) - 2 * padding.0;
    let avail_h = (y2 - y1 + 1) - 2 * padding.1;
    let cx = x1 + padding.0
        + match halign {
            HAlign::Left => 0,
            HAlign::Center => (avail_w - cw) / 2,
            HAlign::Right => avail_w - cw,
        };
    let cy = y1 + padding.1
        + match valign {
            VAlign::Top => 0,
            VAlign::Center => (avail_h - ch) / 2,
            VAlign::Bottom => avail_h - ch,
        };

    let (img_pos, txt_pos) = match position {
        ImagePosition::Left => (
            (cx, cy + (ch - ih) / 2),
            (cx + iw + gap, cy + (ch - th) / 2),
        ),
        ImagePosition::Right => (
            (cx + tw + gap, cy + (ch - ih) / 2),
            (cx, cy + (ch - th) / 2),
        ),
        ImagePosition::Top => (
            (cx + (cw - iw) / 2, cy),
            (cx + (cw - tw) / 2, cy + ih + gap),
        ),
        ImagePosition::Bottom => (
            (cx + (cw - iw) / 2, cy + th + gap),
            (cx + (cw - tw) / 2, cy),
        ),
    };

    if let Some(img) = image {
        canvas.draw_image(img, !active, bg, img_pos.0, img_pos.1, 0, 0);
    }
    if let Some(text) = title {
        canvas.draw_text(
            text,
            txt_pos.0,
            txt_pos.1,
            tw,
            th,
            resolve(fg, bg, active),
            font,
            text_flags,
            orientation,
        );
    }

    if prev.is_zero() {
        canvas.reset_clip();
    } else {
        canvas.set_clip_rect(prev.x1, prev.y1, prev.x2, prev.y2);
    }
}

/// Paint a filled triangular arrow glyph with its bounding box anchored
/// at `(x, y)` and the given edge size.
pub fn draw_arrow(
    canvas: &mut dyn DrawCanvas,
    x: i32,
    y: i32,
    size: i32,
    fg: Color,
    bg: Color,
    active: bool,
    direction: ArrowDirection,
) {
    if size <= 0 {
        return;
    }
    let color = resolve(fg, bg, active);
    let half = size / 2;
    let points = match direction {
        ArrowDirection::Down => [(x, y), (x + size, y), (x + half, y + half)],
        ArrowDirection::Up => [(x, y + half), (x + size, y + half), (x + half, y)],
        ArrowDirection::Right => [(x, y), (x, y + size), (x + half, y + half)],
        ArrowDirection::Left => [(x + half, y), (x + half, y + size), (x, y + half)],
    };
    canvas.draw_polygon(&points, color, DrawStyle::Fill, 1);
}

/// Paint a check-mark glyph filling the rectangle.
pub fn draw_check_mark(
    canvas: &mut dyn DrawCanvas,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    fg: Color,
    bg: Color,
    active: bool,
) {
    if x1 >= x2 || y1 >= y2 {
        return;
    }
    let color = resolve(fg, bg, active);
    let w = x2 - x1;
    let h = y2 - y1;
    let points = [
        (x1, y1 + h / 2),
        (x1 + w / 3, y2),
        (x2, y1),
        (x1 + w / 3, y2 - h / 4),
    ];
    canvas.draw_polygon(&points, color, DrawStyle::Fill, 1);
}

/// Paint a circle glyph (radio indicator), filled or outlined.
pub fn draw_circle(
    canvas: &mut dyn DrawCanvas,
    cx: i32,
    cy: i32,
    radius: i32,
    filled: bool,
    fg: Color,
    bg: Color,
    active: bool,
) {
    if radius <= 0 {
        return;
    }
    let color = resolve(fg, bg, active);
    let style = if filled { DrawStyle::Fill } else { DrawStyle::Stroke };
    canvas.draw_arc(
        cx - radius,
        cy - radius,
        cx + radius,
        cy + radius,
        0.0,
        360.0,
        color,
        style,
        1,
    );
}

/// Dotted 1-pixel focus-feedback rectangle.
pub fn draw_focus_rect(canvas: &mut dyn DrawCanvas, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
    canvas.draw_rect(x1, y1, x2, y2, color, DrawStyle::StrokeDot, 1);
}

/// Horizontal separator line across the rectangle's vertical middle.
pub fn draw_separator_h(canvas: &mut dyn DrawCanvas, x1: i32, x2: i32, y: i32, color: Color) {
    canvas.draw_line(x1, y, x2, y, color, DrawStyle::Stroke, 1);
}

/// Vertical separator line across the rectangle's horizontal middle.
pub fn draw_separator_v(canvas: &mut dyn DrawCanvas, x: i32, y1: i32, y2: i32, color: Color) {
    canvas.draw_line(x, y1, x, y2, color, DrawStyle::Stroke, 1);
}

/// Legacy sunken 3D bevel: dark shadow on the top/left edges, light on
/// the bottom/right, derived from the background color.
pub fn draw_sunken_rect(
    canvas: &mut dyn DrawCanvas,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    bg: Color,
) {
    if x1 >= x2 || y1 >= y2 {
        return;
    }
    let shadows = compute_shadows(bg);
    canvas.draw_line(x1, y1, x2 - 1, y1, shadows.dark, DrawStyle::Stroke, 1);
    canvas.draw_line(x1, y1, x1, y2 - 1, shadows.dark, DrawStyle::Stroke, 1);
    canvas.draw_line(x1 + 1, y1 + 1, x2 - 2, y1 + 1, shadows.mid, DrawStyle::Stroke, 1);
    canvas.draw_line(x1 + 1, y1 + 1, x1 + 1, y2 - 2, shadows.mid, DrawStyle::Stroke, 1);
    canvas.draw_line(x1, y2, x2, y2, shadows.light, DrawStyle::Stroke, 1);
    canvas.draw_line(x2, y1, x2, y2, shadows.light, DrawStyle::Stroke, 1);
}

static DARKER_BACKGROUND: OnceLock<Color> = OnceLock::new();

/// The default pressed/bordered shade for flat buttons: the system
/// dialog background darkened to 90% luminance.
///
/// Computed once per process from the first `theme_bg` passed in and
/// memoized; later calls return the cached value regardless of argument
/// (the theme background does not change within a process lifetime).
pub fn darker_background(theme_bg: Color) -> Color {
    *DARKER_BACKGROUND.get_or_init(|| {
        let scale = |c: u8| -> u8 {
            #[allow(clippy::cast_possible_truncation, reason = "scaled value stays below 256")]
            let v = ((u32::from(c) * 90) / 100) as u8;
            v
        };
        Color::new(
            scale(theme_bg.red()),
            scale(theme_bg.green()),
            scale(theme_bg.blue()),
            theme_bg.alpha(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_draw_raster::{RasterCanvas, RasterTarget};

    fn white_bg(target: &mut RasterTarget) -> RasterCanvas<'_> {
        let mut c = RasterCanvas::new(target);
        let (w, h) = c.size();
        c.draw_rect(0, 0, w - 1, h - 1, Color::WHITE, DrawStyle::Fill, 1);
        c
    }

    #[test]
    fn inactive_box_lands_between_colors() {
        let fg = Color::parse("255 0 0").unwrap();
        let mut target = RasterTarget::new(20, 20).unwrap();
        let mut c = white_bg(&mut target);
        draw_box(&mut c, 0, 0, 19, 19, fg, Color::WHITE, false);
        c.flush();
        let px = target.front().pixel(10, 10);
        let drawn = Color::rgb(px[0], px[1], px[2]);
        assert_ne!(drawn, fg);
        assert_ne!(drawn, Color::WHITE);
        let dist = |a: Color, b: Color| (a.luma() as i32 - b.luma() as i32).abs();
        assert!(dist(drawn, Color::WHITE) < dist(fg, Color::WHITE));
    }

    #[test]
    fn active_box_keeps_foreground() {
        let mut target = RasterTarget::new(8, 8).unwrap();
        let mut c = white_bg(&mut target);
        draw_box(&mut c, 0, 0, 7, 7, Color::rgb(255, 0, 0), Color::WHITE, true);
        c.flush();
        assert_eq!(target.front().pixel(4, 4), [255, 0, 0, 255]);
    }

    #[test]
    fn border_outlines_do_not_touch_interior() {
        let mut target = RasterTarget::new(20, 20).unwrap();
        let mut c = white_bg(&mut target);
        draw_border(&mut c, 2, 2, 17, 17, 2, Color::BLACK, Color::WHITE, true);
        c.flush();
        assert_eq!(target.front().pixel(2, 2), [0, 0, 0, 255]);
        assert_eq!(target.front().pixel(3, 3), [0, 0, 0, 255]);
        assert_eq!(target.front().pixel(10, 10), [255, 255, 255, 255]);
        assert_eq!(target.front().pixel(4, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn zero_width_border_is_a_noop() {
        let mut target = RasterTarget::new(10, 10).unwrap();
        let mut c = white_bg(&mut target);
        draw_border(&mut c, 1, 1, 8, 8, 0, Color::BLACK, Color::WHITE, true);
        c.flush();
        assert!(target.front().data().chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
    }

    #[test]
    fn icon_size_collapses_without_title() {
        let img = ImageBits::solid(16, 16, Color::BLACK);
        let target = &mut RasterTarget::new(4, 4).unwrap();
        let c = RasterCanvas::new(target);
        let size = icon_size(
            &c,
            Some(&img),
            None,
            &FontDesc::default(),
            ImagePosition::Left,
            2,
            (0, 0),
            0.0,
            false,
        );
        assert_eq!(size, (16, 16));
    }

    #[test]
    fn icon_size_adds_spacing_padding_and_focus_margin() {
        let img = ImageBits::solid(16, 16, Color::BLACK);
        let font = FontDesc::default();
        let target = &mut RasterTarget::new(4, 4).unwrap();
        let c = RasterCanvas::new(target);
        let (tw, th) = c.text_extents(&font, "ok");
        let plain = icon_size(
            &c,
            Some(&img),
            Some("ok"),
            &font,
            ImagePosition::Left,
            3,
            (5, 4),
            0.0,
            false,
        );
        assert_eq!(plain, (16 + 3 + tw + 10, th.max(16) + 8));
        let focused = icon_size(
            &c,
            Some(&img),
            Some("ok"),
            &font,
            ImagePosition::Left,
            3,
            (5, 4),
            0.0,
            true,
        );
        assert_eq!(focused, (plain.0 + 4, plain.1 + 4));
    }

    #[test]
    fn icon_size_stacks_vertically_for_top_position() {
        let img = ImageBits::solid(16, 16, Color::BLACK);
        let font = FontDesc::default();
        let target = &mut RasterTarget::new(4, 4).unwrap();
        let c = RasterCanvas::new(target);
        let (tw, th) = c.text_extents(&font, "title");
        let size = icon_size(
            &c,
            Some(&img),
            Some("title"),
            &font,
            ImagePosition::Top,
            2,
            (0, 0),
            0.0,
            false,
        );
        assert_eq!(size, (tw.max(16), 16 + 2 + th));
    }

    #[test]
    fn vertical_orientation_swaps_text_extents() {
        let font = FontDesc::default();
        let target = &mut RasterTarget::new(4, 4).unwrap();
        let c = RasterCanvas::new(target);
        let (tw, th) = c.text_extents(&font, "long title");
        let size = icon_size(
            &c,
            None,
            Some("long title"),
            &font,
            ImagePosition::Left,
            0,
            (0, 0),
            90.0,
            false,
        );
        assert_eq!(size, (th, tw));
    }

    #[test]
    fn draw_icon_restores_previous_clip() {
        let mut target = RasterTarget::new(40, 40).unwrap();
        let mut c = white_bg(&mut target);
        c.set_clip_rect(1, 1, 39, 39);
        let img = ImageBits::solid(8, 8, Color::rgb(0, 0, 255));
        draw_icon(
            &mut c,
            4,
            4,
            35,
            35,
            Some(&img),
            None,
            &FontDesc::default(),
            ImagePosition::Left,
            0,
            HAlign::Center,
            VAlign::Center,
            (0, 0),
            TextFlags::default(),
            0.0,
            Color::BLACK,
            Color::WHITE,
            true,
        );
        assert_eq!(c.clip_rect(), ClipRect::new(1, 1, 39, 39));
    }

    #[test]
    fn draw_icon_centers_image() {
        let mut target = RasterTarget::new(40, 40).unwrap();
        let mut c = white_bg(&mut target);
        let img = ImageBits::solid(8, 8, Color::rgb(0, 0, 255));
        draw_icon(
            &mut c,
            0,
            0,
            39,
            39,
            Some(&img),
            None,
            &FontDesc::default(),
            ImagePosition::Left,
            0,
            HAlign::Center,
            VAlign::Center,
            (0, 0),
            TextFlags::default(),
            0.0,
            Color::BLACK,
            Color::WHITE,
            true,
        );
        c.flush();
        // 40-wide rect, 8-wide image: image spans 16..=23.
        assert_eq!(target.front().pixel(16, 16), [0, 0, 255, 255]);
        assert_eq!(target.front().pixel(23, 23), [0, 0, 255, 255]);
        assert_eq!(target.front().pixel(15, 16), [255, 255, 255, 255]);
        assert_eq!(target.front().pixel(24, 16), [255, 255, 255, 255]);
    }

    #[test]
    fn arrow_glyph_fills_pixels_in_direction() {
        let mut target = RasterTarget::new(20, 20).unwrap();
        let mut c = white_bg(&mut target);
        draw_arrow(&mut c, 4, 4, 10, Color::BLACK, Color::WHITE, true, ArrowDirection::Down);
        c.flush();
        // Wide at the top, narrowing downward.
        assert_eq!(target.front().pixel(9, 5), [0, 0, 0, 255]);
        assert_eq!(target.front().pixel(4, 8), [255, 255, 255, 255]);
    }

    #[test]
    fn circle_outline_leaves_center_untouched() {
        let mut target = RasterTarget::new(32, 32).unwrap();
        let mut c = white_bg(&mut target);
        draw_circle(&mut c, 16, 16, 10, false, Color::BLACK, Color::WHITE, true);
        c.flush();
        assert_eq!(target.front().pixel(16, 16), [255, 255, 255, 255]);
        assert_eq!(target.front().pixel(26, 16), [0, 0, 0, 255]);
    }

    #[test]
    fn sunken_rect_uses_dark_top_light_bottom() {
        let bg = Color::rgb(200, 200, 200);
        let shadows = compute_shadows(bg);
        let mut target = RasterTarget::new(20, 20).unwrap();
        let mut c = white_bg(&mut target);
        draw_sunken_rect(&mut c, 2, 2, 17, 17, bg);
        c.flush();
        let top = target.front().pixel(8, 2);
        assert_eq!([top[0], top[1], top[2]], [shadows.dark.red(), shadows.dark.green(), shadows.dark.blue()]);
        let bottom = target.front().pixel(8, 17);
        assert_eq!(
            [bottom[0], bottom[1], bottom[2]],
            [shadows.light.red(), shadows.light.green(), shadows.light.blue()]
        );
    }

    #[test]
    fn darker_background_is_90_percent_and_memoized() {
        let bg = Color::rgb(200, 100, 50);
        let first = darker_background(bg);
        assert_eq!(first, Color::rgb(180, 90, 45));
        // Memoized: a different argument returns the cached value.
        assert_eq!(darker_background(Color::WHITE), first);
    }
}
