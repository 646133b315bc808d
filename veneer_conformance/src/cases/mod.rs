// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use veneer_draw::{Color, DrawCanvas, DrawStyle};

mod arcs;
mod clips;
mod fills;
mod icons;
mod strokes;
mod text;

pub const DEFAULT_WIDTH: i32 = 96;
pub const DEFAULT_HEIGHT: i32 = 64;

/// Background every case paints first, so "untouched" is well-defined.
pub const BACKGROUND: Color = Color::WHITE;

/// RGBA8 readback of a backend's visible surface.
#[derive(Copy, Clone, Debug)]
pub struct RgbaView<'a> {
    pub width: i32,
    pub height: i32,
    pub pixels: &'a [u8],
}

impl RgbaView<'_> {
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Whether a pixel differs from the case background by more than the
    /// anti-aliasing tolerance on any channel.
    pub fn is_painted(&self, x: i32, y: i32) -> bool {
        let [r, g, b, _] = self.pixel(x, y);
        let bg = BACKGROUND.to_rgba8();
        r.abs_diff(bg[0]) > 24 || g.abs_diff(bg[1]) > 24 || b.abs_diff(bg[2]) > 24
    }

    /// Bounding box of painted pixels, `None` when nothing was painted.
    pub fn painted_bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_painted(x, y) {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
                    });
                }
            }
        }
        bounds
    }
}

/// One backend-agnostic drawing scenario plus its output predicate.
pub trait ConformanceCase: Sync {
    fn name(&self) -> &'static str;

    /// Pixel budget when diffing a backend against the raster reference.
    fn max_cross_diff_pixels(&self) -> u64 {
        64
    }

    /// Issue the draw calls. The canvas arrives freshly created; the
    /// case must paint [`BACKGROUND`] itself and must not flush.
    fn run(&self, canvas: &mut dyn DrawCanvas);

    /// Assert the predicates over the flushed surface.
    fn check(&self, view: &RgbaView<'_>);
}

/// Paint the canvas-wide background; every case starts with this.
pub(crate) fn paint_background(canvas: &mut dyn DrawCanvas) {
    let (w, h) = canvas.size();
    canvas.draw_rect(0, 0, w - 1, h - 1, BACKGROUND, DrawStyle::Fill, 1);
}

pub(crate) fn assert_rgb(view: &RgbaView<'_>, x: i32, y: i32, expected: Color, what: &str) {
    let [r, g, b, _] = view.pixel(x, y);
    let e = expected.to_rgba8();
    assert!(
        r.abs_diff(e[0]) <= 8 && g.abs_diff(e[1]) <= 8 && b.abs_diff(e[2]) <= 8,
        "{what}: pixel ({x}, {y}) is [{r}, {g}, {b}], expected {expected:?}"
    );
}

fn matches_glob(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if !pattern.contains('*') {
        return pattern == text;
    }
    let mut remainder = text;
    let mut first_part = true;
    for part in pattern.split('*') {
        if part.is_empty() {
            continue;
        }
        match remainder.find(part) {
            Some(idx) => {
                if first_part && !pattern.starts_with('*') && idx != 0 {
                    return false;
                }
                remainder = &remainder[idx + part.len()..];
            }
            None => return false,
        }
        first_part = false;
    }
    if !pattern.ends_with('*') {
        remainder.is_empty()
    } else {
        true
    }
}

fn case_filters() -> Option<Vec<String>> {
    let raw = std::env::var("VENEER_CONFORMANCE_CASE").ok()?;
    let filters: Vec<String> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    (!filters.is_empty()).then_some(filters)
}

pub fn selected_cases() -> Vec<&'static dyn ConformanceCase> {
    let Some(filters) = case_filters() else {
        return CASES.to_vec();
    };
    let selected: Vec<&'static dyn ConformanceCase> = CASES
        .iter()
        .copied()
        .filter(|case| filters.iter().any(|f| matches_glob(f, case.name())))
        .collect();
    if selected.is_empty() {
        let available: Vec<&str> = CASES.iter().map(|c| c.name()).collect();
        panic!(
            "VENEER_CONFORMANCE_CASE matched no cases.\n  filter: {filters:?}\n  available: {available:?}"
        );
    }
    selected
}

pub const CASES: &[&dyn ConformanceCase] = &[
    &fills::FullCanvasFill,
    &fills::FillCornerOrderInvariance,
    &fills::GradientEndpoints,
    &clips::ClipResetEquivalence,
    &clips::DegenerateClipSuppressesDrawing,
    &clips::ClipRestrictsFill,
    &strokes::SwappedLineIdentity,
    &strokes::DashedLineHasGaps,
    &arcs::QuarterPieQuadrant,
    &arcs::EllipseStrokeRing,
    &text::CenteredTextOffset,
    &icons::InactiveBoxBlend,
    &icons::CenteredIconImage,
];
