// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;
use veneer_draw::GradientDir;

/// A full-canvas fill must reach every pixel of the visible surface
/// after the flush, on every backend.
pub(super) struct FullCanvasFill;

impl ConformanceCase for FullCanvasFill {
    fn name(&self) -> &'static str {
        "full_canvas_fill"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        0
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        let (w, h) = canvas.size();
        let red = Color::parse("255 0 0").expect("literal color string");
        canvas.draw_rect(0, 0, w - 1, h - 1, red, DrawStyle::Fill, 1);
    }

    fn check(&self, view: &RgbaView<'_>) {
        let red = Color::rgb(255, 0, 0);
        for y in 0..view.height {
            for x in 0..view.width {
                assert_rgb(view, x, y, red, "full-canvas fill");
            }
        }
    }
}

/// Swapped corner pairs must produce the identical filled region.
pub(super) struct FillCornerOrderInvariance;

impl ConformanceCase for FillCornerOrderInvariance {
    fn name(&self) -> &'static str {
        "fill_corner_order_invariance"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        0
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        let red = Color::rgb(255, 0, 0);
        canvas.draw_rect(8, 8, 40, 24, red, DrawStyle::Fill, 1);
        // The mirror rectangle below, corners given in reverse order.
        canvas.draw_rect(40, 56, 8, 40, red, DrawStyle::Fill, 1);
    }

    fn check(&self, view: &RgbaView<'_>) {
        // Both rectangles cover the same columns; rows are offset by 32.
        for y in 8..=24 {
            for x in 8..=40 {
                assert!(view.is_painted(x, y), "top rect pixel ({x}, {y})");
                assert!(view.is_painted(x, y + 32), "bottom rect pixel ({x}, {y})");
            }
        }
        assert!(!view.is_painted(42, 16), "right of top rect");
        assert!(!view.is_painted(42, 48), "right of bottom rect");
    }
}

/// An axis-aligned gradient must land exactly on both end colors.
pub(super) struct GradientEndpoints;

impl ConformanceCase for GradientEndpoints {
    fn name(&self) -> &'static str {
        "gradient_endpoints"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        // Interpolation color-space differences can show up across the
        // whole ramp; the endpoint predicates carry the real check.
        3200
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        canvas.draw_gradient(
            0,
            16,
            95,
            47,
            Color::BLACK,
            Color::WHITE,
            GradientDir::Horizontal,
        );
    }

    fn check(&self, view: &RgbaView<'_>) {
        // The first and last pixel centers sit a half pixel into the
        // ramp, so allow a little more than the usual tolerance.
        let start = view.pixel(0, 30);
        assert!(start[0] <= 24, "gradient start near black, got {start:?}");
        let end = view.pixel(95, 30);
        assert!(end[0] >= 231, "gradient end near white, got {end:?}");
        let mid = view.pixel(48, 30);
        assert!(
            mid[0] > 48 && mid[0] < 224,
            "gradient midpoint should sit between the ends, got {mid:?}"
        );
    }
}
