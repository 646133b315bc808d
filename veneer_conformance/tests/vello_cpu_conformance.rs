// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conformance run for the Vello CPU backend: the shared predicates plus
//! a pixel diff against the raster reference within per-case budgets.

#![cfg(feature = "vello_cpu")]

use veneer_conformance::cases::{
    ConformanceCase, DEFAULT_HEIGHT, DEFAULT_WIDTH, RgbaView, selected_cases,
};
use veneer_draw::DrawCanvas;
use veneer_draw_vello_cpu::{VelloCpuCanvas, VelloCpuTarget};

mod common;

fn render_vello_cpu(case: &dyn ConformanceCase) -> Vec<u8> {
    let mut target =
        VelloCpuTarget::new(DEFAULT_WIDTH, DEFAULT_HEIGHT).expect("vello_cpu target binds");
    let mut canvas = VelloCpuCanvas::new(&mut target);
    case.run(&mut canvas);
    canvas.flush();
    let front = target.front().to_vec();
    assert!(!front.is_empty(), "flush renders the front buffer");
    front
}

#[test]
fn conformance() {
    for case in selected_cases() {
        let pixels = render_vello_cpu(case);
        let view = RgbaView {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            pixels: &pixels,
        };
        case.check(&view);
    }
}

#[test]
fn matches_raster_reference_within_budget() {
    for case in selected_cases() {
        let reference = common::render_raster(case);
        let actual = render_vello_cpu(case);
        let diff = common::count_diff_pixels(&reference, &actual);
        assert!(
            diff <= case.max_cross_diff_pixels(),
            "case `{}`: {diff} pixels differ from the raster reference (budget {})",
            case.name(),
            case.max_cross_diff_pixels()
        );
    }
}
