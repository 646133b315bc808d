// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Source image pixel formats and conversion to the canonical blit format.
//!
//! Every backend blits from one canonical in-memory representation:
//! tightly packed, row-major, straight-alpha RGBA8. Source images arrive
//! in whatever the image-resource subsystem holds (24-bit RGB, BGRA byte
//! order, 8-bit palette) and are converted explicitly — byte-order
//! compatibility is never assumed.

use alloc::vec::Vec;

use crate::color::Color;

/// Pixel layout of a source image buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 4 bytes per pixel, straight alpha, R G B A byte order.
    Rgba8,
    /// 3 bytes per pixel, opaque, R G B byte order.
    Rgb8,
    /// 4 bytes per pixel, straight alpha, B G R A byte order.
    Bgra8,
    /// 1 byte per pixel indexing into an RGB palette.
    Palette8 {
        /// Palette entries, `[r, g, b]` each.
        palette: Vec<[u8; 3]>,
        /// Index rendered fully transparent, if any.
        transparent: Option<u8>,
    },
}

impl PixelFormat {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Rgb8 => 3,
            Self::Palette8 { .. } => 1,
        }
    }
}

/// A source image: dimensions, layout, and the raw pixel buffer.
///
/// Construction validates that the buffer length matches the dimensions;
/// a mismatched buffer yields `None` rather than a panic.
#[derive(Clone, Debug)]
pub struct ImageBits {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl ImageBits {
    /// Wrap a raw pixel buffer. Returns `None` when the buffer length does
    /// not match `width * height * bytes_per_pixel`.
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(format.bytes_per_pixel())?;
        if pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// A solid-color RGBA8 image, mostly useful in tests.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let rgba = color.to_rgba8();
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels,
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The source layout.
    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    /// Convert to canonical straight-alpha RGBA8.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let count = (self.width as usize) * (self.height as usize);
        let mut out = Vec::with_capacity(count * 4);
        match &self.format {
            PixelFormat::Rgba8 => out.extend_from_slice(&self.pixels),
            PixelFormat::Rgb8 => {
                for px in self.pixels.chunks_exact(3) {
                    out.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
            }
            PixelFormat::Bgra8 => {
                for px in self.pixels.chunks_exact(4) {
                    out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                }
            }
            PixelFormat::Palette8 {
                palette,
                transparent,
            } => {
                for &idx in &self.pixels {
                    if Some(idx) == *transparent {
                        out.extend_from_slice(&[0, 0, 0, 0]);
                    } else {
                        let [r, g, b] = palette.get(idx as usize).copied().unwrap_or([0, 0, 0]);
                        out.extend_from_slice(&[r, g, b, 255]);
                    }
                }
            }
        }
        out
    }

    /// Convert to canonical RGBA8 with the disabled-control recoloring
    /// applied toward `background`. Alpha passes through unchanged.
    pub fn to_rgba8_inactive(&self, background: Color) -> Vec<u8> {
        let mut out = self.to_rgba8();
        for px in out.chunks_exact_mut(4) {
            let c = Color::new(px[0], px[1], px[2], px[3]).to_inactive(background);
            px[0] = c.red();
            px[1] = c.green();
            px[2] = c.blue();
        }
        out
    }

    /// Canonical RGBA8, recolored when `inactive` is set.
    pub fn resolve_rgba8(&self, inactive: bool, background: Color) -> Vec<u8> {
        if inactive {
            self.to_rgba8_inactive(background)
        } else {
            self.to_rgba8()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn rejects_wrong_buffer_length() {
        assert!(ImageBits::new(2, 2, PixelFormat::Rgba8, vec![0; 15]).is_none());
        assert!(ImageBits::new(2, 2, PixelFormat::Rgb8, vec![0; 12]).is_some());
    }

    #[test]
    fn rgb8_expands_opaque() {
        let img = ImageBits::new(1, 1, PixelFormat::Rgb8, vec![10, 20, 30]).unwrap();
        assert_eq!(img.to_rgba8(), vec![10, 20, 30, 255]);
    }

    #[test]
    fn bgra8_swaps_byte_order() {
        let img = ImageBits::new(1, 1, PixelFormat::Bgra8, vec![30, 20, 10, 128]).unwrap();
        assert_eq!(img.to_rgba8(), vec![10, 20, 30, 128]);
    }

    #[test]
    fn palette_expands_with_transparent_index() {
        let img = ImageBits::new(
            2,
            1,
            PixelFormat::Palette8 {
                palette: vec![[1, 2, 3], [4, 5, 6]],
                transparent: Some(1),
            },
            vec![0, 1],
        )
        .unwrap();
        assert_eq!(img.to_rgba8(), vec![1, 2, 3, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn out_of_range_palette_index_is_black() {
        let img = ImageBits::new(
            1,
            1,
            PixelFormat::Palette8 {
                palette: vec![[9, 9, 9]],
                transparent: None,
            },
            vec![7],
        )
        .unwrap();
        assert_eq!(img.to_rgba8(), vec![0, 0, 0, 255]);
    }

    #[test]
    fn inactive_conversion_keeps_alpha() {
        let img = ImageBits::new(1, 1, PixelFormat::Rgba8, vec![200, 0, 0, 99]).unwrap();
        let px = img.to_rgba8_inactive(Color::WHITE);
        assert_eq!(px[3], 99);
        assert_ne!(&px[..3], &[200, 0, 0]);
    }
}
