//! Slate engine crate.
//!
//! Immediate-mode 2D drawing on top of an injected raster backend: packed
//! colors, affine matrix algebra, a stateful drawing context with transform
//! and opacity stacks, and glyph-atlas text.

pub mod coords;
pub mod graphics;
pub mod image;
pub mod logging;
pub mod math;
pub mod paint;
pub mod raster;
pub mod text;
