//! Software rendering.
//!
//! [`PixmapBackend`] is a CPU [`RasterBackend`](crate::graphics::RasterBackend)
//! writing straight-alpha ARGB pixels. It has no anti-aliasing: polygons are
//! sampled once at each pixel center.

mod pixmap;
mod scanline;

pub use pixmap::PixmapBackend;
