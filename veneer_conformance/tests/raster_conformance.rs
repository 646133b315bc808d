// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conformance run against the raster reference backend.

use veneer_conformance::cases::{DEFAULT_HEIGHT, DEFAULT_WIDTH, RgbaView, selected_cases};

mod common;

#[test]
fn conformance() {
    for case in selected_cases() {
        let pixels = common::render_raster(case);
        let view = RgbaView {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            pixels: &pixels,
        };
        case.check(&view);
    }
}
