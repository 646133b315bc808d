// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;
use veneer_draw::{FontDesc, HAlign, ImageBits, TextFlags};
use veneer_flat::{ImagePosition, VAlign, draw_box, draw_icon, icon_size};

/// An inactive box over a white background renders a color that differs
/// from both the foreground and the background and sits closer to the
/// background in luminance — the grayed-out look.
pub(super) struct InactiveBoxBlend;

impl ConformanceCase for InactiveBoxBlend {
    fn name(&self) -> &'static str {
        "inactive_box_blend"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        0
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        let fg = Color::parse("255 0 0").expect("literal color string");
        draw_box(canvas, 8, 8, 87, 55, fg, BACKGROUND, false);
    }

    fn check(&self, view: &RgbaView<'_>) {
        let [r, g, b, _] = view.pixel(48, 32);
        let drawn = Color::rgb(r, g, b);
        let fg = Color::rgb(255, 0, 0);
        assert_ne!(drawn, fg, "inactive box must not keep the foreground");
        assert_ne!(drawn, BACKGROUND, "inactive box must still be visible");
        let dist = |a: Color, b: Color| (i32::from(a.luma()) - i32::from(b.luma())).abs();
        assert!(
            dist(drawn, BACKGROUND) < dist(fg, BACKGROUND),
            "inactive blend moves toward the background luminance"
        );
    }
}

/// The icon layout: an image with no title measures exactly its own size
/// (spacing collapses), and centered placement puts it in the middle of
/// the icon rectangle.
pub(super) struct CenteredIconImage;

impl ConformanceCase for CenteredIconImage {
    fn name(&self) -> &'static str {
        "centered_icon_image"
    }

    fn max_cross_diff_pixels(&self) -> u64 {
        16
    }

    fn run(&self, canvas: &mut dyn DrawCanvas) {
        paint_background(canvas);
        let img = ImageBits::solid(16, 16, Color::rgb(0, 0, 255));
        let font = FontDesc::default();
        let size = icon_size(
            canvas,
            Some(&img),
            None,
            &font,
            ImagePosition::Left,
            2,
            (0, 0),
            0.0,
            false,
        );
        assert_eq!(size, (16, 16), "image-only icon collapses spacing");
        draw_icon(
            canvas,
            0,
            0,
            95,
            63,
            Some(&img),
            None,
            &font,
            ImagePosition::Left,
            2,
            HAlign::Center,
            VAlign::Center,
            (0, 0),
            TextFlags::default(),
            0.0,
            Color::BLACK,
            BACKGROUND,
            true,
        );
    }

    fn check(&self, view: &RgbaView<'_>) {
        // 96x64 rect, 16x16 image: the image spans (40, 24)..=(55, 39).
        let blue = Color::rgb(0, 0, 255);
        assert_rgb(view, 40, 24, blue, "image top-left");
        assert_rgb(view, 55, 39, blue, "image bottom-right");
        assert_rgb(view, 48, 32, blue, "image center");
        for (x, y) in [(38, 32), (57, 32), (48, 22), (48, 41)] {
            assert!(!view.is_painted(x, y), "pixel ({x}, {y}) outside the image");
        }
    }
}
