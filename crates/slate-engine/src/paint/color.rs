use std::fmt;
use std::str::FromStr;

use super::ColorParseError;

const INV_MAX_CHANNEL: f32 = 1.0 / 255.0;

/// Packed 32-bit ARGB color.
///
/// Layout of the canonical value:
/// - alpha: bits 24–31
/// - red:   bits 16–23
/// - green: bits 8–15
/// - blue:  bits 0–7
///
/// Byte accessors (`0..=255`) and float accessors (`0.0..=1.0`) are two views
/// of the same value. The `with_*` mutators rebuild the value from the three
/// untouched channels plus the new one, so they never disturb other channels.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    value: u32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_value(0x0000_0000);
    pub const BLACK: Color = Color::from_value(0xff00_0000);
    pub const WHITE: Color = Color::from_value(0xffff_ffff);
    pub const RED: Color = Color::from_value(0xffff_0000);
    pub const BLUE: Color = Color::from_value(0xff00_00ff);
    pub const GREEN: Color = Color::from_value(0xff00_ff00);
    pub const MAGENTA: Color = Color::from_value(0xffff_00ff);
    pub const YELLOW: Color = Color::from_value(0xffff_ff00);
    pub const CYAN: Color = Color::from_value(0xff00_ffff);
    pub const PURPLE: Color = Color::from_value(0xff80_0080);
    pub const PINK: Color = Color::from_value(0xffff_c0cb);
    pub const ORANGE: Color = Color::from_value(0xffff_a500);

    // ── constructors ──────────────────────────────────────────────────────

    #[inline]
    pub const fn from_value(value: u32) -> Self {
        Self { value }
    }

    #[inline]
    pub const fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_value(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Opaque color from RGB bytes.
    #[inline]
    pub const fn from_rgb_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::from_bytes(r, g, b, 255)
    }

    /// Color from float channels in `[0, 1]`.
    ///
    /// Out-of-range inputs are clamped; conversion truncates toward zero.
    #[inline]
    pub fn from_floats(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::from_bytes(float_to_byte(r), float_to_byte(g), float_to_byte(b), float_to_byte(a))
    }

    /// Opaque color from float RGB channels.
    #[inline]
    pub fn from_rgb_floats(r: f32, g: f32, b: f32) -> Self {
        Self::from_floats(r, g, b, 1.0)
    }

    /// Parses a CSS functional color: `rgb(r,g,b)` or `rgba(r,g,b,a)`.
    ///
    /// `a` is a float in `[0, 1]`. Hex literals fall through to
    /// [`FromStr`], which uses this crate's `#AARRGGBB` convention.
    pub fn from_css(style: &str) -> Result<Self, ColorParseError> {
        let s = style.trim();
        if s.starts_with('#') {
            return s.parse();
        }

        let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(ColorParseError::new(style, "expected rgb(...), rgba(...) or #hex"));
        };
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| ColorParseError::new(style, "missing closing parenthesis"))?;

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(ColorParseError::new(style, "wrong number of components"));
        }

        let channel = |p: &str| {
            p.parse::<u8>()
                .map_err(|_| ColorParseError::new(style, "channel is not a byte"))
        };
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if has_alpha {
            let a: f32 = parts[3]
                .parse()
                .map_err(|_| ColorParseError::new(style, "alpha is not a number"))?;
            float_to_byte(a)
        } else {
            255
        };
        Ok(Self::from_bytes(r, g, b, a))
    }

    // ── byte view ─────────────────────────────────────────────────────────

    #[inline]
    pub const fn value(self) -> u32 {
        self.value
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.value >> 24) as u8
    }

    #[inline]
    pub const fn red(self) -> u8 {
        ((self.value & 0x00ff_0000) >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        ((self.value & 0x0000_ff00) >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        (self.value & 0x0000_00ff) as u8
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::from_bytes(self.red(), self.green(), self.blue(), a)
    }

    #[inline]
    pub const fn with_red(self, r: u8) -> Self {
        Self::from_bytes(r, self.green(), self.blue(), self.alpha())
    }

    #[inline]
    pub const fn with_green(self, g: u8) -> Self {
        Self::from_bytes(self.red(), g, self.blue(), self.alpha())
    }

    #[inline]
    pub const fn with_blue(self, b: u8) -> Self {
        Self::from_bytes(self.red(), self.green(), b, self.alpha())
    }

    // ── float view ────────────────────────────────────────────────────────

    #[inline]
    pub fn alpha_float(self) -> f32 {
        self.alpha() as f32 * INV_MAX_CHANNEL
    }

    #[inline]
    pub fn red_float(self) -> f32 {
        self.red() as f32 * INV_MAX_CHANNEL
    }

    #[inline]
    pub fn green_float(self) -> f32 {
        self.green() as f32 * INV_MAX_CHANNEL
    }

    #[inline]
    pub fn blue_float(self) -> f32 {
        self.blue() as f32 * INV_MAX_CHANNEL
    }

    #[inline]
    pub fn with_alpha_float(self, a: f32) -> Self {
        self.with_alpha(float_to_byte(a))
    }

    #[inline]
    pub fn with_red_float(self, r: f32) -> Self {
        self.with_red(float_to_byte(r))
    }

    #[inline]
    pub fn with_green_float(self, g: f32) -> Self {
        self.with_green(float_to_byte(g))
    }

    #[inline]
    pub fn with_blue_float(self, b: f32) -> Self {
        self.with_blue(float_to_byte(b))
    }

    // ── conversions ───────────────────────────────────────────────────────

    /// CSS `rgb(r,g,b)` string. Alpha is left out; backends get it
    /// through global alpha.
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.red(), self.green(), self.blue())
    }
}

#[inline]
fn float_to_byte(f: f32) -> u8 {
    // NaN clamps to NaN and casts to 0.
    (f.clamp(0.0, 1.0) * 255.0) as u8
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({self})")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.value)
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::from_value(value)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parses `#RRGGBB` (opaque) or `#AARRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(hex) = s.strip_prefix('#') else {
            return Err(ColorParseError::new(s, "missing '#' prefix"));
        };
        if hex.len() != 6 && hex.len() != 8 {
            return Err(ColorParseError::new(s, "expected 6 or 8 hex digits"));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::new(s, "non-hex digit"));
        }
        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| ColorParseError::new(s, "non-hex digit"))?;
        Ok(if hex.len() == 6 {
            Self::from_value(value | 0xff00_0000)
        } else {
            Self::from_value(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [u32; 6] = [0, 0xffff_ffff, 0x8012_3456, 0x01fe_7f80, 0xff00_0000, 0x00ab_cdef];

    // ── packing ───────────────────────────────────────────────────────────

    #[test]
    fn decompose_recompose_is_lossless() {
        for v in SAMPLES {
            let c = Color::from_value(v);
            let back = Color::from_bytes(c.red(), c.green(), c.blue(), c.alpha());
            assert_eq!(back.value(), v, "round trip of {v:#010x}");
        }
    }

    #[test]
    fn channel_layout_is_argb() {
        let c = Color::from_bytes(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.value(), 0x7812_3456);
    }

    #[test]
    fn default_alpha_is_opaque() {
        assert_eq!(Color::from_rgb_bytes(1, 2, 3).alpha(), 255);
        assert_eq!(Color::from_rgb_floats(0.0, 0.0, 0.0).alpha(), 255);
    }

    // ── channel setters ───────────────────────────────────────────────────

    #[test]
    fn byte_setters_touch_one_channel() {
        for v in SAMPLES {
            let c = Color::from_value(v);

            let r = c.with_red(7);
            assert_eq!((r.red(), r.green(), r.blue(), r.alpha()), (7, c.green(), c.blue(), c.alpha()));

            let g = c.with_green(9);
            assert_eq!((g.red(), g.green(), g.blue(), g.alpha()), (c.red(), 9, c.blue(), c.alpha()));

            let b = c.with_blue(11);
            assert_eq!((b.red(), b.green(), b.blue(), b.alpha()), (c.red(), c.green(), 11, c.alpha()));

            let a = c.with_alpha(13);
            assert_eq!((a.red(), a.green(), a.blue(), a.alpha()), (c.red(), c.green(), c.blue(), 13));
        }
    }

    #[test]
    fn float_setter_preserves_other_bytes_exactly() {
        let c = Color::from_bytes(1, 254, 3, 129);
        let r = c.with_red_float(1.0);
        assert_eq!(r.red(), 255);
        assert_eq!((r.green(), r.blue(), r.alpha()), (254, 3, 129));
    }

    #[test]
    fn float_view_matches_byte_view() {
        let c = Color::from_bytes(255, 0, 51, 102);
        assert_eq!(c.red_float(), 1.0);
        assert_eq!(c.green_float(), 0.0);
        assert!((c.blue_float() - 0.2).abs() < 1e-6);
        assert!((c.alpha_float() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn from_floats_truncates_and_clamps() {
        let c = Color::from_floats(0.5, 2.0, -1.0, 1.0);
        assert_eq!(c.red(), 127);
        assert_eq!(c.green(), 255);
        assert_eq!(c.blue(), 0);
    }

    // ── parsing ───────────────────────────────────────────────────────────

    #[test]
    fn parse_six_digits_forces_opaque() {
        let c: Color = "#FF0000".parse().unwrap();
        assert_eq!(c.alpha(), 255);
        assert_eq!(c, Color::RED);
    }

    #[test]
    fn parse_eight_digits_keeps_alpha() {
        let c: Color = "#80ff8000".parse().unwrap();
        assert_eq!(c.alpha(), 0x80);
        assert_eq!(c.red(), 0xff);
        assert_eq!(c.green(), 0x80);
        assert_eq!(c.blue(), 0x00);
    }

    #[test]
    fn parse_rejects_malformed_literals() {
        for bad in ["not-a-color", "FF0000", "#FFF", "#FF00000", "#GG0000", "#", ""] {
            assert!(bad.parse::<Color>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn parse_error_names_the_literal() {
        let err = "not-a-color".parse::<Color>().unwrap_err();
        assert_eq!(err.literal, "not-a-color");
        assert!(err.to_string().contains("not-a-color"));
    }

    #[test]
    fn css_round_trip_drops_alpha() {
        let c = Color::from_bytes(10, 20, 30, 40);
        assert_eq!(c.to_css(), "rgb(10,20,30)");
        assert_eq!(Color::from_css(&c.to_css()).unwrap(), c.with_alpha(255));
    }

    #[test]
    fn css_rgba_and_hex() {
        assert_eq!(Color::from_css("rgba(255, 0, 0, 0.5)").unwrap().alpha(), 127);
        assert_eq!(Color::from_css("#ff00ff00").unwrap(), Color::GREEN);
        assert!(Color::from_css("rgb(1,2)").is_err());
        assert!(Color::from_css("hsl(1,2,3)").is_err());
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Color::PINK.to_string(), "#FFFFC0CB");
    }
}
