//! Image resources consumed by the drawing context.
//!
//! The context only needs dimensions and pixel reads; decoding and GPU upload
//! are host concerns. [`PixelImage`] is the in-memory implementation used for
//! glyph atlases and procedurally built images.

mod pixel_image;

pub use pixel_image::{ImageLock, PixelImage};

use crate::paint::Color;

/// Storage layout of an image's pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TextureFormat {
    /// 32-bit packed ARGB, straight alpha.
    #[default]
    Rgba32,
    /// Single 8-bit channel, read back as white with that channel as alpha.
    Grey8,
}

impl TextureFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgba32 => 4,
            TextureFormat::Grey8 => 1,
        }
    }
}

/// Read-only view of an image resource.
pub trait Image {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Pixel at `(x, y)`. Out-of-range coordinates read as transparent.
    fn at(&self, x: u32, y: u32) -> Color;

    /// True when the pixel has a non-zero alpha.
    fn is_opaque(&self, x: u32, y: u32) -> bool {
        self.at(x, y).alpha() != 0
    }

    /// True when the image has no pixels (e.g. an atlas that is still baking).
    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
