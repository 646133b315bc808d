// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;
use veneer_draw::{FontDesc, TextFlags};

/// Horizontally centered text starts at `(box_width - text_width) / 2`
/// from the box origin: all glyph pixels stay inside the centered span,
/// with coverage beginning in the first glyph cell and ending in the
/// last.
pub(super) struct CenteredTextOffset;

impl CenteredTextOffset {
    const BOX_X: i32 = 8;
    const BOX_W: i32 = 80;
    const TEXT: &'static str = "II";
}

impl ConformanceCase for CenteredTextOffset {
    fn name(&self) -> &'static str {
        "centered_text_offset"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        200
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        canvas.draw_text(
            Self::TEXT,
            Self::BOX_X,
            8,
            Self::BOX_W,
            0,
            Color::BLACK,
            &FontDesc::default(),
            TextFlags::CENTER,
            0.0,
        );
    }

    fn check(&self, view: &RgbaView<'_>) {
        let font = FontDesc::default();
        let scale = veneer_draw::BitmapFont::scale_for(&font);
        let (tw, th) = veneer_draw::BitmapFont::text_extents(Self::TEXT, scale);
        let expected_left = Self::BOX_X + (Self::BOX_W - tw) / 2;
        let cell = veneer_draw::GLYPH_WIDTH * scale;

        let (min_x, min_y, max_x, max_y) = view.painted_bounds().expect("text drew pixels");
        assert!(
            min_x >= expected_left && min_x < expected_left + cell,
            "text starts at the centered offset: left edge {min_x}, expected within \
             [{expected_left}, {})",
            expected_left + cell
        );
        assert!(
            max_x >= expected_left + tw - cell && max_x < expected_left + tw,
            "text ends inside the centered span: right edge {max_x}"
        );
        assert!(min_y >= 8 && max_y < 8 + th, "text stays in its line band");
    }
}
