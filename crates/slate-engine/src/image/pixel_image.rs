use core::ops::{Deref, DerefMut};

use crate::paint::Color;

use super::{Image, TextureFormat};

#[derive(Debug, Clone, PartialEq)]
enum Pixels {
    Rgba32(Vec<u32>),
    Grey8(Vec<u8>),
}

/// CPU-side image with a fixed size and format.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelImage {
    width: u32,
    height: u32,
    pixels: Pixels,
}

impl PixelImage {
    /// A zero-sized image. Drawing it is always a no-op.
    pub const fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Pixels::Rgba32(Vec::new()),
        }
    }

    /// New image with every pixel transparent (or zero coverage).
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        let len = width as usize * height as usize;
        let pixels = match format {
            TextureFormat::Rgba32 => Pixels::Rgba32(vec![0; len]),
            TextureFormat::Grey8 => Pixels::Grey8(vec![0; len]),
        };
        Self { width, height, pixels }
    }

    /// RGBA image filled by `f(x, y)`.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Color) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y).value());
            }
        }
        Self { width, height, pixels: Pixels::Rgba32(data) }
    }

    /// Single-channel image taking ownership of `coverage` (row-major).
    ///
    /// Returns `None` when the buffer length does not match the size.
    pub fn from_grey8(width: u32, height: u32, coverage: Vec<u8>) -> Option<Self> {
        if coverage.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, pixels: Pixels::Grey8(coverage) })
    }

    pub fn format(&self) -> TextureFormat {
        match self.pixels {
            Pixels::Rgba32(_) => TextureFormat::Rgba32,
            Pixels::Grey8(_) => TextureFormat::Grey8,
        }
    }

    /// Byte length of the locked buffer: `width * height * bytes_per_pixel`.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format().bytes_per_pixel()
    }

    /// Raw pixel bytes for direct writes. The image is unlocked again when
    /// the guard drops.
    ///
    /// RGBA32 pixels are native-endian packed ARGB words.
    pub fn lock(&mut self) -> ImageLock<'_> {
        ImageLock { image: self }
    }

    /// Overwrites one pixel. Out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let Some(i) = self.index(x, y) else { return; };
        match &mut self.pixels {
            Pixels::Rgba32(data) => data[i] = color.value(),
            Pixels::Grey8(data) => data[i] = color.alpha(),
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.pixels {
            Pixels::Rgba32(data) => bytemuck::cast_slice_mut(data.as_mut_slice()),
            Pixels::Grey8(data) => data.as_mut_slice(),
        }
    }

    fn bytes(&self) -> &[u8] {
        match &self.pixels {
            Pixels::Rgba32(data) => bytemuck::cast_slice(data.as_slice()),
            Pixels::Grey8(data) => data.as_slice(),
        }
    }
}

impl Default for PixelImage {
    fn default() -> Self {
        Self::empty()
    }
}

impl Image for PixelImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn at(&self, x: u32, y: u32) -> Color {
        let Some(i) = self.index(x, y) else {
            return Color::TRANSPARENT;
        };
        match &self.pixels {
            Pixels::Rgba32(data) => Color::from_value(data[i]),
            Pixels::Grey8(data) => Color::WHITE.with_alpha(data[i]),
        }
    }
}

/// Scoped raw access to a [`PixelImage`]'s bytes.
pub struct ImageLock<'a> {
    image: &'a mut PixelImage,
}

impl Deref for ImageLock<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.image.bytes()
    }
}

impl DerefMut for ImageLock<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.image.bytes_mut()
    }
}
