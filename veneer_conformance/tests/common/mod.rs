// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the conformance integration tests.

#![allow(
    missing_docs,
    dead_code,
    reason = "integration-test helper module; not every harness uses every helper"
)]

use veneer_conformance::cases::{ConformanceCase, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use veneer_draw::DrawCanvas;
use veneer_draw_raster::{RasterCanvas, RasterTarget};

/// Render a case on the raster reference backend and return the flushed
/// front buffer.
pub(crate) fn render_raster(case: &dyn ConformanceCase) -> Vec<u8> {
    let mut target =
        RasterTarget::new(DEFAULT_WIDTH, DEFAULT_HEIGHT).expect("reference target binds");
    let mut canvas = RasterCanvas::new(&mut target);
    case.run(&mut canvas);
    canvas.flush();
    target.front().data().to_vec()
}

/// Count pixels whose RGB channels differ beyond the anti-aliasing
/// tolerance between two same-sized RGBA8 buffers.
pub(crate) fn count_diff_pixels(a: &[u8], b: &[u8]) -> u64 {
    assert_eq!(a.len(), b.len(), "buffers must be the same size");
    let mut diff = 0;
    for (pa, pb) in a.chunks_exact(4).zip(b.chunks_exact(4)) {
        if pa[0].abs_diff(pb[0]) > 24 || pa[1].abs_diff(pb[1]) > 24 || pa[2].abs_diff(pb[2]) > 24 {
            diff += 1;
        }
    }
    diff
}
