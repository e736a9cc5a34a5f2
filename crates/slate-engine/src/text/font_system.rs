use std::collections::HashMap;
use std::fmt;

use crate::image::{Image, PixelImage};
use crate::paint::Color;

use super::atlas::{GlyphSheet, RasterGlyph, FIRST_BAKED_CHAR, LAST_BAKED_CHAR};
use super::{Font, FontId, FontStyle, GlyphAtlas, GlyphQuad};

static NOT_READY: PixelImage = PixelImage::empty();

/// Tinted atlas copies kept across all sheets. The least recently requested
/// one is dropped when a new color would exceed this.
pub const MAX_TINTED_SHEETS: usize = 16;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct SheetKey {
    font: FontId,
    size_bits: u32,
}

impl SheetKey {
    fn new(font: &Font, size: f32) -> Option<Self> {
        (size.is_finite() && size > 0.0).then(|| Self { font: font.id(), size_bits: size.to_bits() })
    }

    fn size(self) -> f32 {
        f32::from_bits(self.size_bits)
    }
}

/// Owns loaded faces and their baked glyph atlases.
///
/// Each (face, size) pair gets one coverage sheet holding the printable
/// ASCII range. Tinted RGBA copies are cached per color on request, at most
/// [`MAX_TINTED_SHEETS`] at a time.
pub struct FontSystem {
    faces: Vec<fontdue::Font>,
    sheets: HashMap<SheetKey, GlyphSheet>,
    tinted: HashMap<(SheetKey, Color), TintedSheet>,
    /// Request counter used as the LRU timestamp.
    clock: u64,
    pending: Vec<SheetKey>,
}

struct TintedSheet {
    image: PixelImage,
    last_used: u64,
}

impl FontSystem {
    pub fn new() -> Self {
        Self {
            faces: Vec::new(),
            sheets: HashMap::new(),
            tinted: HashMap::new(),
            clock: 0,
            pending: Vec::new(),
        }
    }

    /// Parses and stores a TrueType or OpenType face from raw bytes.
    ///
    /// Returns a [`Font`] at `size` that identifies the face in draw calls.
    pub fn load_font(
        &mut self,
        family: impl Into<String>,
        style: FontStyle,
        size: f32,
        bytes: &[u8],
    ) -> Result<Font, FontLoadError> {
        let face = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.faces.len());
        self.faces.push(face);
        let font = Font::new(id, family, style, size);
        log::debug!("FontSystem: loaded '{}' as {:?}", font.family(), id);
        Ok(font)
    }

    /// Number of sizes waiting for [`bake_pending`](GlyphAtlas::bake_pending).
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of tinted atlas copies currently cached.
    pub fn tinted_count(&self) -> usize {
        self.tinted.len()
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .tinted
            .iter()
            .min_by_key(|(_, t)| t.last_used)
            .map(|(k, _)| *k);
        if let Some(k) = oldest {
            log::trace!("FontSystem: evicting tint {:?} of {:?}", k.1, k.0.font);
            self.tinted.remove(&k);
        }
    }

    fn bake(&self, key: SheetKey) -> Option<GlyphSheet> {
        let Some(face) = self.faces.get(key.font.0) else {
            log::warn!("FontSystem: no face for {:?}, dropping bake request", key.font);
            return None;
        };
        let size = key.size();
        let ascent = face
            .horizontal_line_metrics(size)
            .map_or(size, |m| m.ascent);

        let glyphs: Vec<RasterGlyph> = (FIRST_BAKED_CHAR..=LAST_BAKED_CHAR)
            .filter_map(|code| {
                let ch = char::from_u32(code)?;
                if face.lookup_glyph_index(ch) == 0 {
                    return None;
                }
                let (m, coverage) = face.rasterize(ch, size);
                Some(RasterGlyph {
                    index: code - FIRST_BAKED_CHAR,
                    width: m.width as u32,
                    height: m.height as u32,
                    x_offset: m.xmin as f32,
                    y_offset: ascent - (m.ymin as f32 + m.height as f32),
                    advance: m.advance_width,
                    coverage,
                })
            })
            .collect();

        let width_hint = (size * 16.0).ceil() as u32;
        Some(GlyphSheet::pack(width_hint, glyphs))
    }

    #[cfg(test)]
    pub(crate) fn insert_sheet(&mut self, font: &Font, size: f32, sheet: GlyphSheet) {
        if let Some(key) = SheetKey::new(font, size) {
            self.sheets.insert(key, sheet);
        }
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphAtlas for FontSystem {
    fn request(&mut self, font: &Font, size: f32, color: Color) {
        let Some(key) = SheetKey::new(font, size) else {
            log::debug!("FontSystem: ignoring request for size {size}");
            return;
        };
        self.clock += 1;
        if let Some(tinted) = self.tinted.get_mut(&(key, color)) {
            tinted.last_used = self.clock;
            return;
        }
        match self.sheets.get(&key) {
            Some(sheet) => {
                let image = sheet.tint(color);
                if self.tinted.len() >= MAX_TINTED_SHEETS {
                    self.evict_least_recent();
                }
                self.tinted.insert((key, color), TintedSheet { image, last_used: self.clock });
            }
            None => {
                if !self.pending.contains(&key) {
                    log::trace!("FontSystem: scheduling {:?} at {size}px", key.font);
                    self.pending.push(key);
                }
            }
        }
    }

    fn image(&self, font: &Font, size: f32, color: Color) -> &dyn Image {
        SheetKey::new(font, size)
            .and_then(|key| self.tinted.get(&(key, color)))
            .map_or(&NOT_READY as &dyn Image, |t| &t.image as &dyn Image)
    }

    fn baked_quad(
        &self,
        font: &Font,
        size: f32,
        char_index: u32,
        pen_x: f32,
        pen_y: f32,
    ) -> Option<GlyphQuad> {
        let key = SheetKey::new(font, size)?;
        self.sheets.get(&key)?.quad(char_index, pen_x, pen_y)
    }

    fn bake_pending(&mut self) {
        for key in std::mem::take(&mut self.pending) {
            if self.sheets.contains_key(&key) {
                continue;
            }
            if let Some(sheet) = self.bake(key) {
                self.sheets.insert(key, sheet);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> GlyphSheet {
        GlyphSheet::pack(
            64,
            vec![RasterGlyph {
                index: 'A' as u32 - FIRST_BAKED_CHAR,
                width: 3,
                height: 4,
                x_offset: 0.0,
                y_offset: 1.0,
                advance: 4.0,
                coverage: vec![255; 12],
            }],
        )
    }

    #[test]
    fn rejects_invalid_font_bytes() {
        let mut fs = FontSystem::new();
        let err = fs.load_font("Broken", FontStyle::REGULAR, 12.0, b"not a font");
        assert!(err.is_err());
    }

    #[test]
    fn unbaked_request_is_pending_and_image_is_empty() {
        let mut fs = FontSystem::new();
        let font = Font::new(FontId::new(0), "Missing", FontStyle::REGULAR, 12.0);
        fs.request(&font, 12.0, Color::WHITE);
        fs.request(&font, 12.0, Color::RED);
        assert_eq!(fs.pending_count(), 1);
        assert!(fs.image(&font, 12.0, Color::WHITE).is_empty());

        // No face behind the id: the request is dropped, nothing is baked.
        fs.bake_pending();
        assert_eq!(fs.pending_count(), 0);
        assert!(fs.baked_quad(&font, 12.0, 33, 0.0, 0.0).is_none());
    }

    #[test]
    fn baked_sheet_is_tinted_per_color() {
        let mut fs = FontSystem::new();
        let font = Font::new(FontId::new(0), "Synthetic", FontStyle::REGULAR, 10.0);
        fs.insert_sheet(&font, 10.0, sheet());

        assert!(fs.image(&font, 10.0, Color::RED).is_empty());
        fs.request(&font, 10.0, Color::RED);
        assert_eq!(fs.pending_count(), 0);

        let img = fs.image(&font, 10.0, Color::RED);
        assert!(!img.is_empty());
        assert_eq!(img.at(1, 1), Color::RED);
        assert!(fs.image(&font, 10.0, Color::BLUE).is_empty());

        let q = fs.baked_quad(&font, 10.0, 'A' as u32 - FIRST_BAKED_CHAR, 5.0, 0.0).unwrap();
        assert_eq!(q.advance, 4.0);
        assert_eq!(q.dst.origin.x, 5.0);
        assert_eq!(q.dst.origin.y, 1.0);
    }

    #[test]
    fn tint_cache_is_bounded_and_keeps_recent_colors() {
        let mut fs = FontSystem::new();
        let font = Font::new(FontId::new(0), "Synthetic", FontStyle::REGULAR, 10.0);
        fs.insert_sheet(&font, 10.0, sheet());

        for i in 0..1000u32 {
            fs.request(&font, 10.0, Color::from_value(0xff00_0000 | i));
            // Keep one color hot; it must survive the churn.
            fs.request(&font, 10.0, Color::WHITE);
        }
        assert_eq!(fs.tinted_count(), MAX_TINTED_SHEETS);
        assert!(!fs.image(&font, 10.0, Color::WHITE).is_empty());
        assert!(!fs.image(&font, 10.0, Color::from_value(0xff00_0000 | 999)).is_empty());
        assert!(fs.image(&font, 10.0, Color::from_value(0xff00_0000)).is_empty());
    }

    #[test]
    fn non_positive_size_is_ignored() {
        let mut fs = FontSystem::new();
        let font = Font::new(FontId::new(0), "Any", FontStyle::REGULAR, 0.0);
        fs.request(&font, 0.0, Color::WHITE);
        assert_eq!(fs.pending_count(), 0);
    }
}
