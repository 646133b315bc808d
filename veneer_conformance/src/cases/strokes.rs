// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

/// Two lines with swapped endpoint order must rasterize identically.
/// The second line is drawn 32 pixels lower; the two horizontal bands
/// must then match pixel for pixel.
pub(super) struct SwappedLineIdentity;

impl ConformanceCase for SwappedLineIdentity {
    fn name(&self) -> &'static str {
        "swapped_line_identity"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        // The two backends rasterize the line differently; the identity
        // being tested is between the two bands within one backend.
        240
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        let blue = Color::rgb(0, 0, 255);
        canvas.draw_line(8, 8, 40, 24, blue, DrawStyle::Stroke, 1);
        // Same geometry shifted down, endpoints given in reverse order.
        canvas.draw_line(40, 56, 8, 40, blue, DrawStyle::Stroke, 1);
    }

    fn check(&self, view: &RgbaView<'_>) {
        let mut painted_any = false;
        for y in 0..32 {
            for x in 0..view.width {
                assert_eq!(
                    view.pixel(x, y),
                    view.pixel(x, y + 32),
                    "bands differ at ({x}, {y})"
                );
                painted_any |= view.is_painted(x, y);
            }
        }
        assert!(painted_any, "the line drew nothing");
    }
}

/// Dashed strokes follow the shared `[6, 2]` cadence starting "on".
pub(super) struct DashedLineHasGaps;

impl ConformanceCase for DashedLineHasGaps {
    fn name(&self) -> &'static str {
        "dashed_line_has_gaps"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        160
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        canvas.draw_line(8, 10, 87, 10, Color::BLACK, DrawStyle::StrokeDash, 1);
    }

    fn check(&self, view: &RgbaView<'_>) {
        let row = |x: i32| view.is_painted(x, 10);
        assert!(row(9), "first dash segment");
        assert!(!row(15), "first gap");
        assert!(row(17), "second dash segment");
        assert!(row(40), "cadence continues at a full period");
        // Nothing strays off the line's row (allow the adjacent rows for
        // anti-aliased backends).
        for x in 0..view.width {
            for y in 0..view.height {
                if view.is_painted(x, y) {
                    assert!((9..=11).contains(&y), "stray pixel at ({x}, {y})");
                }
            }
        }
    }
}
