use crate::coords::Rect;
use crate::image::{Image, PixelImage, TextureFormat};
use crate::paint::Color;

use super::Font;

/// First character code baked into an atlas. Glyph indices count from here.
pub const FIRST_BAKED_CHAR: u32 = 32;
/// Last character code baked into an atlas (inclusive).
pub const LAST_BAKED_CHAR: u32 = 126;

const GLYPH_PADDING: u32 = 1; // pixels between glyphs in the atlas
const MIN_ATLAS_WIDTH: u32 = 64;
const MAX_ATLAS_WIDTH: u32 = 4096;

/// One character's placement, produced per draw call and never retained.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    /// Source box in normalized atlas coordinates (`0..=1`).
    pub uv: Rect,
    /// Destination box in user space.
    pub dst: Rect,
    /// Horizontal pen advance after this glyph.
    pub advance: f32,
}

impl GlyphQuad {
    /// Whitespace and degenerate glyphs have no area and are not blitted.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        !self.uv.is_empty() && !self.dst.is_empty()
    }

    /// Source box in atlas pixels for an atlas of the given size.
    #[inline]
    pub fn source_rect(&self, atlas_width: u32, atlas_height: u32) -> Rect {
        let w = atlas_width as f32;
        let h = atlas_height as f32;
        Rect::new(
            self.uv.origin.x * w,
            self.uv.origin.y * h,
            self.uv.size.x * w,
            self.uv.size.y * h,
        )
    }
}

/// Font-atlas capability consumed by the drawing context.
pub trait GlyphAtlas {
    /// Asks for the atlas of `font` at `size`, tinted with `color`.
    ///
    /// Baking may lag behind the request; until it completes,
    /// [`image`](Self::image) returns an empty image.
    fn request(&mut self, font: &Font, size: f32, color: Color);

    /// Atlas image for the combination, or a zero-width image when not ready.
    fn image(&self, font: &Font, size: f32, color: Color) -> &dyn Image;

    /// Quad for glyph `char_index` (character code minus
    /// [`FIRST_BAKED_CHAR`]) with the pen at `(pen_x, pen_y)`.
    ///
    /// `None` for characters the atlas does not carry.
    fn baked_quad(&self, font: &Font, size: f32, char_index: u32, pen_x: f32, pen_y: f32)
        -> Option<GlyphQuad>;

    /// Bakes everything requested since the last call.
    fn bake_pending(&mut self) {}
}

// ── baked sheet ───────────────────────────────────────────────────────────

/// Rasterized glyph waiting to be packed.
#[derive(Debug, Clone)]
pub(crate) struct RasterGlyph {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    /// Offset from the pen to the bitmap's top-left corner.
    pub x_offset: f32,
    pub y_offset: f32,
    pub advance: f32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

#[derive(Debug, Copy, Clone)]
struct BakedGlyph {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    x_offset: f32,
    y_offset: f32,
    advance: f32,
}

/// All glyphs of one (face, size) packed into a single coverage image.
#[derive(Debug, Clone)]
pub(crate) struct GlyphSheet {
    coverage: PixelImage,
    glyphs: Vec<Option<BakedGlyph>>,
}

impl GlyphSheet {
    /// Packs `glyphs` into shelf rows of at least `width_hint` pixels.
    pub(crate) fn pack(width_hint: u32, glyphs: Vec<RasterGlyph>) -> Self {
        let widest = glyphs.iter().map(|g| g.width).max().unwrap_or(0);
        let width = width_hint
            .clamp(MIN_ATLAS_WIDTH, MAX_ATLAS_WIDTH)
            .max(widest + 2 * GLYPH_PADDING);

        let mut packer = ShelfPacker::new(width);
        let slots = (LAST_BAKED_CHAR - FIRST_BAKED_CHAR + 1) as usize;
        let mut baked: Vec<Option<BakedGlyph>> = vec![None; slots];
        let mut placed: Vec<(u32, u32, &RasterGlyph)> = Vec::with_capacity(glyphs.len());

        for glyph in &glyphs {
            let Some(slot) = baked.get_mut(glyph.index as usize) else {
                log::warn!("GlyphSheet: glyph index {} outside baked range, skipping", glyph.index);
                continue;
            };
            let (x, y) = if glyph.width > 0 && glyph.height > 0 {
                let pos = packer.place(glyph.width, glyph.height);
                placed.push((pos.0, pos.1, glyph));
                pos
            } else {
                (0, 0)
            };
            *slot = Some(BakedGlyph {
                x,
                y,
                width: glyph.width,
                height: glyph.height,
                x_offset: glyph.x_offset,
                y_offset: glyph.y_offset,
                advance: glyph.advance,
            });
        }

        let height = packer.used_height().max(1);
        let mut coverage = vec![0u8; width as usize * height as usize];
        for (gx, gy, glyph) in placed {
            for row in 0..glyph.height as usize {
                let src = row * glyph.width as usize;
                let dst = (gy as usize + row) * width as usize + gx as usize;
                let len = glyph.width as usize;
                if let Some(bytes) = glyph.coverage.get(src..src + len) {
                    coverage[dst..dst + len].copy_from_slice(bytes);
                }
            }
        }

        let coverage = PixelImage::from_grey8(width, height, coverage)
            .unwrap_or_else(|| PixelImage::new(width, height, TextureFormat::Grey8));

        log::trace!("GlyphSheet: packed {} glyphs into {width}×{height}", glyphs.len());
        Self { coverage, glyphs: baked }
    }

    pub(crate) fn quad(&self, char_index: u32, pen_x: f32, pen_y: f32) -> Option<GlyphQuad> {
        let g = (*self.glyphs.get(char_index as usize)?)?;
        let w = self.coverage.width() as f32;
        let h = self.coverage.height() as f32;
        Some(GlyphQuad {
            uv: Rect::new(
                g.x as f32 / w,
                g.y as f32 / h,
                g.width as f32 / w,
                g.height as f32 / h,
            ),
            dst: Rect::new(
                pen_x + g.x_offset,
                pen_y + g.y_offset,
                g.width as f32,
                g.height as f32,
            ),
            advance: g.advance,
        })
    }

    /// RGBA copy of the sheet: `color` with alpha scaled by coverage.
    pub(crate) fn tint(&self, color: Color) -> PixelImage {
        let alpha = color.alpha() as u32;
        PixelImage::from_fn(self.coverage.width(), self.coverage.height(), |x, y| {
            let cov = self.coverage.at(x, y).alpha() as u32;
            color.with_alpha((cov * alpha / 255) as u8)
        })
    }
}

/// Row-based ("shelf") rectangle packer.
#[derive(Debug)]
struct ShelfPacker {
    width: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    fn new(width: u32) -> Self {
        Self {
            width,
            cursor_x: GLYPH_PADDING,
            cursor_y: GLYPH_PADDING,
            row_height: 0,
        }
    }

    fn place(&mut self, w: u32, h: u32) -> (u32, u32) {
        // Advance to a new shelf row when the glyph doesn't fit horizontally.
        if self.cursor_x + w + GLYPH_PADDING > self.width {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = GLYPH_PADDING;
            self.row_height = 0;
        }

        let pos = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        pos
    }

    fn used_height(&self) -> u32 {
        self.cursor_y + self.row_height + GLYPH_PADDING
    }
}
