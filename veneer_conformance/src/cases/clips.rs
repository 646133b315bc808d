// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;
use veneer_draw::ClipRect;

/// Passing the all-zero quadruple to `set_clip_rect` must behave exactly
/// like `reset_clip`: a following full-canvas fill reaches everything.
pub(super) struct ClipResetEquivalence;

impl ConformanceCase for ClipResetEquivalence {
    fn name(&self) -> &'static str {
        "clip_reset_equivalence"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        0
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        canvas.set_clip_rect(10, 10, 30, 30);
        canvas.reset_clip();
        assert_eq!(canvas.clip_rect(), ClipRect::ZERO, "after reset_clip");
        canvas.set_clip_rect(10, 10, 30, 30);
        canvas.set_clip_rect(0, 0, 0, 0);
        assert_eq!(canvas.clip_rect(), ClipRect::ZERO, "after zero sentinel");
        let (w, h) = canvas.size();
        canvas.draw_rect(0, 0, w - 1, h - 1, Color::rgb(255, 0, 0), DrawStyle::Fill, 1);
    }

    fn check(&self, view: &RgbaView<'_>) {
        let red = Color::rgb(255, 0, 0);
        for (x, y) in [
            (0, 0),
            (view.width - 1, 0),
            (0, view.height - 1),
            (view.width - 1, view.height - 1),
            (view.width / 2, view.height / 2),
        ] {
            assert_rgb(view, x, y, red, "unclipped fill");
        }
    }
}

/// A zero-width clip rectangle is an empty region, not "no clip": every
/// following draw call is suppressed.
pub(super) struct DegenerateClipSuppressesDrawing;

impl ConformanceCase for DegenerateClipSuppressesDrawing {
    fn name(&self) -> &'static str {
        "degenerate_clip_suppresses_drawing"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        0
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        canvas.set_clip_rect(30, 8, 30, 40);
        let (w, h) = canvas.size();
        canvas.draw_rect(0, 0, w - 1, h - 1, Color::rgb(255, 0, 0), DrawStyle::Fill, 1);
        canvas.draw_line(0, 0, w - 1, h - 1, Color::rgb(0, 0, 255), DrawStyle::Stroke, 3);
    }

    fn check(&self, view: &RgbaView<'_>) {
        for y in 0..view.height {
            for x in 0..view.width {
                assert!(
                    !view.is_painted(x, y),
                    "pixel ({x}, {y}) painted through an empty clip"
                );
            }
        }
    }
}

/// A clip rectangle confines fills to its interior and leaves the rest
/// of the surface untouched.
pub(super) struct ClipRestrictsFill;

impl ConformanceCase for ClipRestrictsFill {
    fn name(&self) -> &'static str {
        "clip_restricts_fill"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        16
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        canvas.set_clip_rect(16, 16, 48, 32);
        let (w, h) = canvas.size();
        canvas.draw_rect(0, 0, w - 1, h - 1, Color::rgb(255, 0, 0), DrawStyle::Fill, 1);
    }

    fn check(&self, view: &RgbaView<'_>) {
        let red = Color::rgb(255, 0, 0);
        assert_rgb(view, 18, 18, red, "inside clip");
        assert_rgb(view, 46, 30, red, "inside clip");
        for (x, y) in [(13, 18), (50, 18), (30, 13), (30, 34)] {
            assert!(!view.is_painted(x, y), "pixel ({x}, {y}) outside the clip");
        }
    }
}
