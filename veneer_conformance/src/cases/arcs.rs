// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

/// Pins the canonical arc orientation: a filled pie from 0 to 90 degrees
/// covers the up-and-right quadrant of its bounding box on screen.
///
/// Backends reconcile their native arc conventions to this; a sign error
/// in any of them flips the slice into another quadrant and fails here.
pub(super) struct QuarterPieQuadrant;

impl ConformanceCase for QuarterPieQuadrant {
    fn name(&self) -> &'static str {
        "quarter_pie_quadrant"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        600
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        canvas.draw_arc(16, 0, 79, 63, 0.0, 90.0, Color::rgb(255, 0, 0), DrawStyle::Fill, 1);
    }

    fn check(&self, view: &RgbaView<'_>) {
        // Bounding box center is (47.5, 31.5).
        let mut painted = 0;
        for y in 0..view.height {
            for x in 0..view.width {
                if view.is_painted(x, y) {
                    painted += 1;
                    assert!(x >= 46 && y <= 33, "pie pixel ({x}, {y}) outside its quadrant");
                }
            }
        }
        assert!(painted > 300, "quarter pie covers a real area, got {painted}");
        // A point mid-slice at 45 degrees.
        assert!(view.is_painted(62, 17), "mid-slice sample");
    }
}

/// A stroked full ellipse touches its four extreme points and leaves the
/// center empty.
pub(super) struct EllipseStrokeRing;

impl ConformanceCase for EllipseStrokeRing {
    fn name(&self) -> &'static str {
        "ellipse_stroke_ring"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        700
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        canvas.draw_ellipse(8, 4, 87, 59, Color::BLACK, DrawStyle::Stroke, 1);
    }

    fn check(&self, view: &RgbaView<'_>) {
        let near = |cx: i32, cy: i32| {
            (cx - 1..=cx + 1).any(|x| (cy - 1..=cy + 1).any(|y| view.is_painted(x, y)))
        };
        assert!(near(87, 31), "3 o'clock point");
        assert!(near(8, 31), "9 o'clock point");
        assert!(near(47, 4), "12 o'clock point");
        assert!(near(47, 59), "6 o'clock point");
        assert!(!view.is_painted(47, 31), "ellipse center stays empty");
    }
}
