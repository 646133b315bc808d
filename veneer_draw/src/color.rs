// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed color values and the derived-color math used by flat widgets.
//!
//! Colors are stored as a single `u32` in `0xAARRGGBB` layout where the
//! top byte holds the *complement* of the conventional opacity: a stored
//! alpha byte of `0x00` means fully opaque. This keeps `Color::rgb(..)`
//! values identical to plain `0x00RRGGBB` literals, which is what the
//! flat-widget layer passes around by default.

use alloc::string::String;
use core::fmt;

/// A packed RGBA color value.
///
/// Immutable; constructed from components or parsed from an `"R G B [A]"`
/// string, never mutated in place. The stored alpha byte is the complement
/// of the conventional 0–255 opacity (see [`Color::alpha`]).
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Pack the four components. The alpha component is conventional
    /// opacity (255 = opaque); its complement is what gets stored.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((((!a) as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Pack an opaque color from RGB.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Reinterpret a raw packed value (inverted-alpha `0xAARRGGBB`).
    #[inline]
    pub const fn from_packed(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw packed value (inverted-alpha `0xAARRGGBB`).
    #[inline]
    pub const fn to_packed(self) -> u32 {
        self.0
    }

    /// Red component.
    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green component.
    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue component.
    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Conventional opacity: 0 = transparent, 255 = opaque.
    ///
    /// Complements the stored byte, so `Color::new(r, g, b, a).alpha() == a`
    /// for every input.
    #[inline]
    pub const fn alpha(self) -> u8 {
        !((self.0 >> 24) as u8)
    }

    /// The components as straight-alpha RGBA bytes.
    #[inline]
    pub const fn to_rgba8(self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    /// Integer luma, `(r + g + b) / 3`.
    #[inline]
    pub const fn luma(self) -> u8 {
        ((self.red() as u16 + self.green() as u16 + self.blue() as u16) / 3) as u8
    }

    /// Parse `"R G B"` or `"R G B A"` (space-separated decimal 0–255).
    ///
    /// Returns `None` on any malformed input: wrong field count, non-numeric
    /// fields, or values outside the byte range. Never panics.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_ascii_whitespace();
        let r: u8 = parts.next()?.parse().ok()?;
        let g: u8 = parts.next()?.parse().ok()?;
        let b: u8 = parts.next()?.parse().ok()?;
        match parts.next() {
            None => Some(Self::rgb(r, g, b)),
            Some(last) => {
                let a: u8 = last.parse().ok()?;
                if parts.next().is_some() {
                    return None;
                }
                Some(Self::new(r, g, b, a))
            }
        }
    }

    /// Parse like [`Color::parse`], falling back to `default` when the
    /// string is malformed.
    #[inline]
    pub fn parse_or(text: &str, default: Self) -> Self {
        Self::parse(text).unwrap_or(default)
    }

    /// The disabled-control variant of this color over `background`.
    ///
    /// Desaturates to luma and then meets the background halfway, per
    /// channel. Every output channel lies between the luma value and the
    /// corresponding background channel; alpha is preserved unchanged.
    pub const fn to_inactive(self, background: Self) -> Self {
        let gray = self.luma() as u16;
        let r = ((gray + background.red() as u16) / 2) as u8;
        let g = ((gray + background.green() as u16) / 2) as u8;
        let b = ((gray + background.blue() as u16) / 2) as u8;
        Self::new(r, g, b, self.alpha())
    }
}

impl fmt::Display for Color {
    /// Formats as `"R G B"` for opaque colors and `"R G B A"` otherwise,
    /// round-tripping through [`Color::parse`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha() == 255 {
            write!(f, "{} {} {}", self.red(), self.green(), self.blue())
        } else {
            write!(
                f,
                "{} {} {} {}",
                self.red(),
                self.green(),
                self.blue(),
                self.alpha()
            )
        }
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Color({}, {}, {}, {})",
            self.red(),
            self.green(),
            self.blue(),
            self.alpha()
        )
    }
}

/// Format a color as its attribute-string form.
///
/// Convenience for callers that store colors in string attributes.
pub fn format_color(color: Color) -> String {
    alloc::format!("{color}")
}

/// The bevel shadow triple derived from a background color.
///
/// Used by legacy 3D border rendering: `light` above/left, `dark`
/// below/right, `mid` for the inner transition band.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Shadows {
    /// Highlight variant, per-channel `>=` the background.
    pub light: Color,
    /// Per-channel mean of `dark` and the background.
    pub mid: Color,
    /// Shaded variant, per-channel `<=` the background.
    pub dark: Color,
}

/// Luminance offset used for both the dark shadow and the near-white test.
const SHADOW_OFFSET: u8 = 64;

/// Derive the bevel shadow triple for a background color.
///
/// `light` adds the background's remaining headroom `255 - max(r, g, b)` to
/// every channel, preserving channel differences; when the headroom is
/// smaller than 64 the light shadow saturates to full white. `dark`
/// subtracts a fixed offset with a floor at zero, and `mid` is the exact
/// per-channel mean of `dark` and the background. Pure and deterministic.
pub const fn compute_shadows(background: Color) -> Shadows {
    let (r, g, b) = (background.red(), background.green(), background.blue());

    let max = if r >= g && r >= b {
        r
    } else if g >= b {
        g
    } else {
        b
    };
    let headroom = 255 - max;
    let light = if headroom < SHADOW_OFFSET {
        Color::WHITE
    } else {
        Color::rgb(r + headroom, g + headroom, b + headroom)
    };

    let dark = Color::rgb(
        r.saturating_sub(SHADOW_OFFSET),
        g.saturating_sub(SHADOW_OFFSET),
        b.saturating_sub(SHADOW_OFFSET),
    );

    let mid = Color::rgb(
        ((dark.red() as u16 + r as u16) / 2) as u8,
        ((dark.green() as u16 + g as u16) / 2) as u8,
        ((dark.blue() as u16 + b as u16) / 2) as u8,
    );

    Shadows { light, mid, dark }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn round_trips_every_channel() {
        // Exhaustive per-channel; the channels are independent bytes.
        for v in 0..=255_u8 {
            let c = Color::new(v, 255 - v, v ^ 0x5A, v);
            assert_eq!(c.red(), v);
            assert_eq!(c.green(), 255 - v);
            assert_eq!(c.blue(), v ^ 0x5A);
            assert_eq!(c.alpha(), v);
        }
    }

    #[test]
    fn opaque_stores_zero_alpha_byte() {
        let c = Color::rgb(0x12, 0x34, 0x56);
        assert_eq!(c.to_packed(), 0x0012_3456);
        assert_eq!(c.alpha(), 255);
    }

    #[test]
    fn parse_rgb_and_rgba() {
        assert_eq!(Color::parse("255 0 128"), Some(Color::rgb(255, 0, 128)));
        assert_eq!(Color::parse("1 2 3 4"), Some(Color::new(1, 2, 3, 4)));
        assert_eq!(Color::parse("  10  20  30 "), Some(Color::rgb(10, 20, 30)));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in ["", "1 2", "1 2 3 4 5", "256 0 0", "-1 0 0", "a b c", "1,2,3"] {
            assert_eq!(Color::parse(bad), None, "accepted {bad:?}");
        }
        let sentinel = Color::rgb(9, 9, 9);
        assert_eq!(Color::parse_or("oops", sentinel), sentinel);
    }

    #[test]
    fn format_parse_round_trip() {
        for c in [
            Color::rgb(0, 0, 0),
            Color::rgb(255, 255, 255),
            Color::new(12, 200, 99, 77),
            Color::new(1, 2, 3, 0),
        ] {
            assert_eq!(Color::parse(&c.to_string()), Some(c));
            assert_eq!(Color::parse(&format_color(c)), Some(c));
        }
    }

    #[test]
    fn inactive_is_bounded_and_preserves_alpha() {
        let cases = [
            (Color::new(255, 0, 0, 200), Color::WHITE),
            (Color::rgb(0, 0, 0), Color::rgb(220, 220, 220)),
            (Color::new(30, 144, 255, 10), Color::rgb(60, 60, 60)),
        ];
        for (fg, bg) in cases {
            let out = fg.to_inactive(bg);
            let gray = fg.luma();
            for (o, b) in [
                (out.red(), bg.red()),
                (out.green(), bg.green()),
                (out.blue(), bg.blue()),
            ] {
                assert!(o >= gray.min(b) && o <= gray.max(b), "{fg:?} over {bg:?}");
            }
            assert_eq!(out.alpha(), fg.alpha());
        }
    }

    #[test]
    fn inactive_moves_toward_background_luma() {
        let fg = Color::rgb(255, 0, 0);
        let bg = Color::WHITE;
        let out = fg.to_inactive(bg);
        assert_ne!(out, fg);
        assert_ne!(out, bg);
        let dist = |a: Color, b: Color| (a.luma() as i32 - b.luma() as i32).abs();
        assert!(dist(out, bg) < dist(fg, bg));
    }

    #[test]
    fn shadows_are_ordered_per_channel() {
        for bg in [
            Color::rgb(200, 200, 200),
            Color::rgb(240, 240, 245),
            Color::rgb(10, 20, 30),
            Color::rgb(128, 64, 32),
            Color::WHITE,
            Color::BLACK,
        ] {
            let s = compute_shadows(bg);
            for (d, b, l) in [
                (s.dark.red(), bg.red(), s.light.red()),
                (s.dark.green(), bg.green(), s.light.green()),
                (s.dark.blue(), bg.blue(), s.light.blue()),
            ] {
                assert!(d <= b && b <= l, "shadow ordering for {bg:?}");
            }
        }
    }

    #[test]
    fn mid_shadow_is_exact_mean() {
        let bg = Color::rgb(180, 90, 45);
        let s = compute_shadows(bg);
        assert_eq!(
            s.mid.red() as u16,
            (s.dark.red() as u16 + bg.red() as u16) / 2
        );
        assert_eq!(
            s.mid.green() as u16,
            (s.dark.green() as u16 + bg.green() as u16) / 2
        );
        assert_eq!(
            s.mid.blue() as u16,
            (s.dark.blue() as u16 + bg.blue() as u16) / 2
        );
    }

    #[test]
    fn near_white_background_lightens_to_white() {
        let s = compute_shadows(Color::rgb(250, 248, 246));
        assert_eq!(s.light, Color::WHITE);
    }
}
