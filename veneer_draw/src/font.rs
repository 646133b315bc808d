// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font descriptors and the embedded fallback bitmap font.
//!
//! Font resolution and shaping belong to the native text engines behind the
//! backends (Pango, Skia). This module only carries what the draw contract
//! itself needs: the parsed form of a font-descriptor string, and a small
//! fixed-cell bitmap face for backends that have no native text system
//! (the raster backend, and the scenegraph backends that synthesize text
//! into off-screen buffers).

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use crate::HAlign;

/// Parsed font descriptor.
///
/// The string form is `"family, [Bold] [Italic] size"`, e.g.
/// `"Helvetica, Bold 12"` or `"Monospace, 10"`. A positive size is in
/// points; a negative size is in raw pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontDesc {
    /// Family name, passed through to the native font system.
    pub family: String,
    /// Bold weight.
    pub bold: bool,
    /// Italic slant.
    pub italic: bool,
    /// Size in points when positive, in pixels when negative.
    pub size: i32,
}

impl Default for FontDesc {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            bold: false,
            italic: false,
            size: 12,
        }
    }
}

impl FontDesc {
    /// Create a descriptor with the given family and size, regular style.
    pub fn new(family: &str, size: i32) -> Self {
        Self {
            family: family.to_string(),
            size,
            ..Self::default()
        }
    }

    /// Parse a descriptor string, falling back to the default descriptor
    /// for anything unparseable. Unknown style tokens are ignored.
    pub fn parse(text: &str) -> Self {
        let mut out = Self::default();
        let Some((family, rest)) = text.split_once(',') else {
            return out;
        };
        let family = family.trim();
        if !family.is_empty() {
            out.family = family.to_string();
        }
        for token in rest.split_ascii_whitespace() {
            if token.eq_ignore_ascii_case("bold") {
                out.bold = true;
            } else if token.eq_ignore_ascii_case("italic") {
                out.italic = true;
            } else if let Ok(size) = token.parse::<i32>() {
                if size != 0 {
                    out.size = size;
                }
            }
        }
        out
    }

    /// Size in pixels, resolving point sizes at 96 dpi.
    pub fn size_px(&self) -> i32 {
        if self.size < 0 {
            -self.size
        } else {
            (self.size * 96) / 72
        }
    }
}

/// Glyph cell width of the embedded bitmap face, in pixels.
pub const GLYPH_WIDTH: i32 = 8;
/// Glyph cell height of the embedded bitmap face, in pixels.
pub const GLYPH_HEIGHT: i32 = 8;

/// A rendered text coverage mask.
///
/// One byte per pixel, row-major: 255 where the glyphs cover, 0 elsewhere.
/// Backends tint the mask with the text color when blitting.
#[derive(Clone, Debug)]
pub struct TextMask {
    /// Mask width in pixels.
    pub width: i32,
    /// Mask height in pixels.
    pub height: i32,
    /// `width * height` coverage bytes.
    pub coverage: Vec<u8>,
}

/// The embedded 8×8 fixed-cell bitmap face.
///
/// Covers printable ASCII; anything else renders as `?`. In each row byte,
/// bit `x` (from the least significant bit) is the pixel at column `x`.
#[derive(Copy, Clone, Debug, Default)]
pub struct BitmapFont;

impl BitmapFont {
    /// Integer scale factor used to approximate the requested size.
    pub fn scale_for(font: &FontDesc) -> i32 {
        (font.size_px() / GLYPH_HEIGHT).max(1)
    }

    /// The 8 row bytes for a character.
    pub fn glyph(ch: char) -> &'static [u8; 8] {
        let idx = (ch as u32).wrapping_sub(0x20);
        if idx < 95 {
            &GLYPHS[idx as usize]
        } else {
            &GLYPHS[(b'?' - 0x20) as usize]
        }
    }

    /// Pixel width of a single line (no `\n` handling).
    pub fn line_width(line: &str, scale: i32) -> i32 {
        let chars = i32::try_from(line.chars().count()).unwrap_or(i32::MAX);
        chars.saturating_mul(GLYPH_WIDTH).saturating_mul(scale)
    }

    /// Pixel extents of possibly multi-line text: the widest line by the
    /// line count. Empty text measures zero.
    pub fn text_extents(text: &str, scale: i32) -> (i32, i32) {
        if text.is_empty() {
            return (0, 0);
        }
        let mut w = 0;
        let mut lines = 0;
        for line in text.split('\n') {
            w = w.max(Self::line_width(line, scale));
            lines += 1;
        }
        (w, lines * GLYPH_HEIGHT * scale)
    }

    /// Render text into a coverage mask, splitting on `\n` and aligning
    /// each line inside the overall extent per `halign`.
    ///
    /// Wrap and ellipsis are not supported by the bitmap face; callers
    /// that need them use a backend with a native text engine.
    pub fn render_mask(text: &str, scale: i32, halign: HAlign) -> TextMask {
        let (width, height) = Self::text_extents(text, scale);
        let mut coverage = vec![0_u8; (width.max(0) as usize) * (height.max(0) as usize)];
        let mut top = 0;
        for line in text.split('\n') {
            let lw = Self::line_width(line, scale);
            let left = match halign {
                HAlign::Left => 0,
                HAlign::Center => (width - lw) / 2,
                HAlign::Right => width - lw,
            };
            let mut pen = left;
            for ch in line.chars() {
                let rows = Self::glyph(ch);
                for (gy, row) in rows.iter().enumerate() {
                    for gx in 0..8 {
                        if row & (1 << gx) == 0 {
                            continue;
                        }
                        // Expand the font pixel to a scale x scale block.
                        for sy in 0..scale {
                            let y = top + (gy as i32) * scale + sy;
                            let base = y * width;
                            for sx in 0..scale {
                                let x = pen + gx * scale + sx;
                                coverage[(base + x) as usize] = 255;
                            }
                        }
                    }
                }
                pen += GLYPH_WIDTH * scale;
            }
            top += GLYPH_HEIGHT * scale;
        }
        TextMask {
            width,
            height,
            coverage,
        }
    }
}

/// Printable-ASCII glyph rows (0x20..=0x7E), LSB = leftmost column.
///
/// Derived from the widely-circulated public-domain 8x8 console face.
static GLYPHS: [[u8; 8]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x18, 0x3C, 0x3C, 0x18, 0x18, 0x00, 0x18, 0x00], // !
    [0x36, 0x36, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // "
    [0x36, 0x36, 0x7F, 0x36, 0x7F, 0x36, 0x36, 0x00], // #
    [0x0C, 0x3E, 0x03, 0x1E, 0x30, 0x1F, 0x0C, 0x00], // $
    [0x00, 0x63, 0x33, 0x18, 0x0C, 0x66, 0x63, 0x00], // %
    [0x1C, 0x36, 0x1C, 0x6E, 0x3B, 0x33, 0x6E, 0x00], // &
    [0x06, 0x06, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00], // '
    [0x18, 0x0C, 0x06, 0x06, 0x06, 0x0C, 0x18, 0x00], // (
    [0x06, 0x0C, 0x18, 0x18, 0x18, 0x0C, 0x06, 0x00], // )
    [0x00, 0x66, 0x3C, 0xFF, 0x3C, 0x66, 0x00, 0x00], // *
    [0x00, 0x0C, 0x0C, 0x3F, 0x0C, 0x0C, 0x00, 0x00], // +
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0x06], // ,
    [0x00, 0x00, 0x00, 0x3F, 0x00, 0x00, 0x00, 0x00], // -
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0x00], // .
    [0x60, 0x30, 0x18, 0x0C, 0x06, 0x03, 0x01, 0x00], // /
    [0x3E, 0x63, 0x73, 0x7B, 0x6F, 0x67, 0x3E, 0x00], // 0
    [0x0C, 0x0E, 0x0C, 0x0C, 0x0C, 0x0C, 0x3F, 0x00], // 1
    [0x1E, 0x33, 0x30, 0x1C, 0x06, 0x33, 0x3F, 0x00], // 2
    [0x1E, 0x33, 0x30, 0x1C, 0x30, 0x33, 0x1E, 0x00], // 3
    [0x38, 0x3C, 0x36, 0x33, 0x7F, 0x30, 0x78, 0x00], // 4
    [0x3F, 0x03, 0x1F, 0x30, 0x30, 0x33, 0x1E, 0x00], // 5
    [0x1C, 0x06, 0x03, 0x1F, 0x33, 0x33, 0x1E, 0x00], // 6
    [0x3F, 0x33, 0x30, 0x18, 0x0C, 0x0C, 0x0C, 0x00], // 7
    [0x1E, 0x33, 0x33, 0x1E, 0x33, 0x33, 0x1E, 0x00], // 8
    [0x1E, 0x33, 0x33, 0x3E, 0x30, 0x18, 0x0E, 0x00], // 9
    [0x00, 0x0C, 0x0C, 0x00, 0x00, 0x0C, 0x0C, 0x00], // :
    [0x00, 0x0C, 0x0C, 0x00, 0x00, 0x0C, 0x0C, 0x06], // ;
    [0x18, 0x0C, 0x06, 0x03, 0x06, 0x0C, 0x18, 0x00], // <
    [0x00, 0x00, 0x3F, 0x00, 0x00, 0x3F, 0x00, 0x00], // =
    [0x06, 0x0C, 0x18, 0x30, 0x18, 0x0C, 0x06, 0x00], // >
    [0x1E, 0x33, 0x30, 0x18, 0x0C, 0x00, 0x0C, 0x00], // ?
    [0x3E, 0x63, 0x7B, 0x7B, 0x7B, 0x03, 0x1E, 0x00], // @
    [0x0C, 0x1E, 0x33, 0x33, 0x3F, 0x33, 0x33, 0x00], // A
    [0x3F, 0x66, 0x66, 0x3E, 0x66, 0x66, 0x3F, 0x00], // B
    [0x3C, 0x66, 0x03, 0x03, 0x03, 0x66, 0x3C, 0x00], // C
    [0x1F, 0x36, 0x66, 0x66, 0x66, 0x36, 0x1F, 0x00], // D
    [0x7F, 0x46, 0x16, 0x1E, 0x16, 0x46, 0x7F, 0x00], // E
    [0x7F, 0x46, 0x16, 0x1E, 0x16, 0x06, 0x0F, 0x00], // F
    [0x3C, 0x66, 0x03, 0x03, 0x73, 0x66, 0x7C, 0x00], // G
    [0x33, 0x33, 0x33, 0x3F, 0x33, 0x33, 0x33, 0x00], // H
    [0x1E, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x1E, 0x00], // I
    [0x78, 0x30, 0x30, 0x30, 0x33, 0x33, 0x1E, 0x00], // J
    [0x67, 0x66, 0x36, 0x1E, 0x36, 0x66, 0x67, 0x00], // K
    [0x0F, 0x06, 0x06, 0x06, 0x46, 0x66, 0x7F, 0x00], // L
    [0x63, 0x77, 0x7F, 0x7F, 0x6B, 0x63, 0x63, 0x00], // M
    [0x63, 0x67, 0x6F, 0x7B, 0x73, 0x63, 0x63, 0x00], // N
    [0x1C, 0x36, 0x63, 0x63, 0x63, 0x36, 0x1C, 0x00], // O
    [0x3F, 0x66, 0x66, 0x3E, 0x06, 0x06, 0x0F, 0x00], // P
    [0x1E, 0x33, 0x33, 0x33, 0x3B, 0x1E, 0x38, 0x00], // Q
    [0x3F, 0x66, 0x66, 0x3E, 0x36, 0x66, 0x67, 0x00], // R
    [0x1E, 0x33, 0x07, 0x0E, 0x38, 0x33, 0x1E, 0x00], // S
    [0x3F, 0x2D, 0x0C, 0x0C, 0x0C, 0x0C, 0x1E, 0x00], // T
    [0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x3F, 0x00], // U
    [0x33, 0x33, 0x33, 0x33, 0x33, 0x1E, 0x0C, 0x00], // V
    [0x63, 0x63, 0x63, 0x6B, 0x7F, 0x77, 0x63, 0x00], // W
    [0x63, 0x63, 0x36, 0x1C, 0x1C, 0x36, 0x63, 0x00], // X
    [0x33, 0x33, 0x33, 0x1E, 0x0C, 0x0C, 0x1E, 0x00], // Y
    [0x7F, 0x63, 0x31, 0x18, 0x4C, 0x66, 0x7F, 0x00], // Z
    [0x1E, 0x06, 0x06, 0x06, 0x06, 0x06, 0x1E, 0x00], // [
    [0x03, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x40, 0x00], // backslash
    [0x1E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x1E, 0x00], // ]
    [0x08, 0x1C, 0x36, 0x63, 0x00, 0x00, 0x00, 0x00], // ^
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF], // _
    [0x0C, 0x0C, 0x18, 0x00, 0x00, 0x00, 0x00, 0x00], // `
    [0x00, 0x00, 0x1E, 0x30, 0x3E, 0x33, 0x6E, 0x00], // a
    [0x07, 0x06, 0x06, 0x3E, 0x66, 0x66, 0x3B, 0x00], // b
    [0x00, 0x00, 0x1E, 0x33, 0x03, 0x33, 0x1E, 0x00], // c
    [0x38, 0x30, 0x30, 0x3E, 0x33, 0x33, 0x6E, 0x00], // d
    [0x00, 0x00, 0x1E, 0x33, 0x3F, 0x03, 0x1E, 0x00], // e
    [0x1C, 0x36, 0x06, 0x0F, 0x06, 0x06, 0x0F, 0x00], // f
    [0x00, 0x00, 0x6E, 0x33, 0x33, 0x3E, 0x30, 0x1F], // g
    [0x07, 0x06, 0x36, 0x6E, 0x66, 0x66, 0x67, 0x00], // h
    [0x0C, 0x00, 0x0E, 0x0C, 0x0C, 0x0C, 0x1E, 0x00], // i
    [0x30, 0x00, 0x30, 0x30, 0x30, 0x33, 0x33, 0x1E], // j
    [0x07, 0x06, 0x66, 0x36, 0x1E, 0x36, 0x67, 0x00], // k
    [0x0E, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x1E, 0x00], // l
    [0x00, 0x00, 0x33, 0x7F, 0x7F, 0x6B, 0x63, 0x00], // m
    [0x00, 0x00, 0x1F, 0x33, 0x33, 0x33, 0x33, 0x00], // n
    [0x00, 0x00, 0x1E, 0x33, 0x33, 0x33, 0x1E, 0x00], // o
    [0x00, 0x00, 0x3B, 0x66, 0x66, 0x3E, 0x06, 0x0F], // p
    [0x00, 0x00, 0x6E, 0x33, 0x33, 0x3E, 0x30, 0x78], // q
    [0x00, 0x00, 0x3B, 0x6E, 0x66, 0x06, 0x0F, 0x00], // r
    [0x00, 0x00, 0x3E, 0x03, 0x1E, 0x30, 0x1F, 0x00], // s
    [0x08, 0x0C, 0x3E, 0x0C, 0x0C, 0x2C, 0x18, 0x00], // t
    [0x00, 0x00, 0x33, 0x33, 0x33, 0x33, 0x6E, 0x00], // u
    [0x00, 0x00, 0x33, 0x33, 0x33, 0x1E, 0x0C, 0x00], // v
    [0x00, 0x00, 0x63, 0x6B, 0x7F, 0x7F, 0x36, 0x00], // w
    [0x00, 0x00, 0x63, 0x36, 0x1C, 0x36, 0x63, 0x00], // x
    [0x00, 0x00, 0x33, 0x33, 0x33, 0x3E, 0x30, 0x1F], // y
    [0x00, 0x00, 0x3F, 0x19, 0x0C, 0x26, 0x3F, 0x00], // z
    [0x38, 0x0C, 0x0C, 0x07, 0x0C, 0x0C, 0x38, 0x00], // {
    [0x18, 0x18, 0x18, 0x00, 0x18, 0x18, 0x18, 0x00], // |
    [0x07, 0x0C, 0x0C, 0x38, 0x0C, 0x0C, 0x07, 0x00], // }
    [0x6E, 0x3B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ~
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_family_and_size() {
        let f = FontDesc::parse("Helvetica, Bold 12");
        assert_eq!(f.family, "Helvetica");
        assert!(f.bold);
        assert!(!f.italic);
        assert_eq!(f.size, 12);
    }

    #[test]
    fn parse_styles_and_pixel_size() {
        let f = FontDesc::parse("DejaVu Sans, Bold Italic -16");
        assert!(f.bold && f.italic);
        assert_eq!(f.size, -16);
        assert_eq!(f.size_px(), 16);
    }

    #[test]
    fn parse_garbage_falls_back_to_default() {
        assert_eq!(FontDesc::parse("no comma here"), FontDesc::default());
        let f = FontDesc::parse(", 10");
        assert_eq!(f.family, "Sans");
        assert_eq!(f.size, 10);
    }

    #[test]
    fn point_size_resolves_at_96_dpi() {
        assert_eq!(FontDesc::new("Sans", 12).size_px(), 16);
        assert_eq!(FontDesc::new("Sans", 9).size_px(), 12);
    }

    #[test]
    fn extents_count_lines_and_widest_line() {
        assert_eq!(BitmapFont::text_extents("", 1), (0, 0));
        assert_eq!(BitmapFont::text_extents("abc", 1), (24, 8));
        assert_eq!(BitmapFont::text_extents("ab\nlonger", 2), (96, 32));
    }

    #[test]
    fn mask_dimensions_match_extents() {
        let mask = BitmapFont::render_mask("hi\nthere", 1, HAlign::Center);
        let (w, h) = BitmapFont::text_extents("hi\nthere", 1);
        assert_eq!((mask.width, mask.height), (w, h));
        assert_eq!(mask.coverage.len(), (w * h) as usize);
        assert!(mask.coverage.iter().any(|&c| c == 255));
    }

    #[test]
    fn right_alignment_keeps_short_line_pixels_in_right_half() {
        // "x" under a much longer second line; aligned right its coverage
        // must sit entirely in the right half of the first row band.
        let mask = BitmapFont::render_mask("x\n0123456789", 1, HAlign::Right);
        let half = mask.width / 2;
        for y in 0..GLYPH_HEIGHT {
            for x in 0..half {
                assert_eq!(mask.coverage[(y * mask.width + x) as usize], 0);
            }
        }
    }

    #[test]
    fn non_ascii_renders_as_question_mark() {
        assert_eq!(BitmapFont::glyph('é'), BitmapFont::glyph('?'));
    }
}
