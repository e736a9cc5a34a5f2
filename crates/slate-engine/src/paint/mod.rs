//! Color model shared by the drawing context, images, and backends.
//!
//! Colors are packed 32-bit ARGB values with straight (non-premultiplied)
//! alpha. Backends receive fill/stroke colors as CSS strings and alpha
//! through their global-alpha setting.

mod color;
mod error;

pub use color::Color;
pub use error::ColorParseError;
