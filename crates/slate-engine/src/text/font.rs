use crate::graphics::DrawingContext;

/// Opaque handle to a face loaded into a [`FontSystem`](super::FontSystem).
///
/// Custom [`GlyphAtlas`](super::GlyphAtlas) implementations may mint their
/// own ids with [`FontId::new`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

impl FontId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
}

impl FontStyle {
    pub const REGULAR: Self = Self { bold: false, italic: false, underlined: false };
    pub const BOLD: Self = Self { bold: true, italic: false, underlined: false };
    pub const ITALIC: Self = Self { bold: false, italic: true, underlined: false };
}

/// A loaded face at a default pixel size.
///
/// Width queries go through a [`DrawingContext`] so they use the same glyph
/// atlas (or backend measurement) that drawing does.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    id: FontId,
    family: String,
    style: FontStyle,
    size: f32,
}

impl Font {
    pub fn new(id: FontId, family: impl Into<String>, style: FontStyle, size: f32) -> Self {
        Self { id, family: family.into(), style, size }
    }

    #[inline]
    pub fn id(&self) -> FontId {
        self.id
    }

    #[inline]
    pub fn family(&self) -> &str {
        &self.family
    }

    #[inline]
    pub fn style(&self) -> FontStyle {
        self.style
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Same face at another size.
    pub fn with_size(&self, size: f32) -> Self {
        Self { size, ..self.clone() }
    }

    /// Line height. Equal to the pixel size.
    #[inline]
    pub fn height(&self) -> f32 {
        self.size
    }

    /// Baseline offset from the top of a line. Glyph quads already place
    /// the baseline, so this is always zero.
    #[inline]
    pub fn baseline_position(&self) -> f32 {
        0.0
    }

    pub fn char_width(&self, ctx: &mut dyn DrawingContext, ch: char) -> f32 {
        let mut buf = [0u8; 4];
        ctx.string_width(self, ch.encode_utf8(&mut buf))
    }

    /// Width of `len` characters of `text` starting at character `offset`.
    pub fn chars_width(
        &self,
        ctx: &mut dyn DrawingContext,
        text: &str,
        offset: usize,
        len: usize,
    ) -> f32 {
        let slice: String = text.chars().skip(offset).take(len).collect();
        ctx.string_width(self, &slice)
    }

    pub fn string_width(&self, ctx: &mut dyn DrawingContext, text: &str) -> f32 {
        ctx.string_width(self, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_size_keeps_face() {
        let f = Font::new(FontId::new(3), "Mono", FontStyle::BOLD, 12.0);
        let g = f.with_size(20.0);
        assert_eq!(g.id(), FontId::new(3));
        assert_eq!(g.family(), "Mono");
        assert_eq!(g.style(), FontStyle::BOLD);
        assert_eq!(g.size(), 20.0);
        assert_eq!(g.height(), 20.0);
        assert_eq!(g.baseline_position(), 0.0);
    }
}
